// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The solution-reuse cache.
//!
//! Every solved day subproblem is remembered. Before accepting a new master
//! plan, the engine asks whether mixing one cached schedule per day already
//! reaches the master's value; if so, the loop can stop without solving any
//! further subproblems. The selection itself is an optimization problem and
//! lives behind the `ReuseSolver` seam.

use num_traits::{PrimInt, Signed};
use ward_model::index::{DayIndex, IterationIndex};
use ward_model::instance::{Instance, ServiceRequest};
use ward_model::solution::{Assignment, DaySchedule, FinalSchedule, RejectedWindow};

#[derive(Clone, Debug)]
struct CacheEntry<T>
where
    T: PrimInt + Signed,
{
    iteration: IterationIndex,
    schedule: DaySchedule<T>,
    /// Sorted accepted set, used for the duplicate check.
    accepted: Vec<ServiceRequest>,
}

/// One selectable cached schedule of a day.
#[derive(Clone, Copy, Debug)]
pub struct ReuseOption<'a> {
    pub iteration: IterationIndex,
    /// Sorted accepted requests of that schedule.
    pub accepted: &'a [ServiceRequest],
}

/// The selection model handed to the `ReuseSolver`: per day the cached
/// schedules to choose from.
#[derive(Debug)]
pub struct ReuseModel<'a, T>
where
    T: PrimInt + Signed,
{
    pub instance: &'a Instance<T>,
    /// `options[day]` lists the cached schedules of that day.
    pub options: Vec<Vec<ReuseOption<'a>>>,
}

/// The outcome of a reuse-selection solve: at most one cached iteration per
/// day, and the value the combined schedule achieves.
#[derive(Clone, Debug)]
pub struct ReuseSelection<T>
where
    T: PrimInt + Signed,
{
    /// `chosen[day]` names the selected iteration, or `None` for days
    /// without any cached schedule.
    pub chosen: Vec<Option<IterationIndex>>,
    pub objective_value: T,
}

/// Remembers every distinct day schedule solved so far.
///
/// A schedule is distinct per day by its accepted request set; re-recording
/// an accepted set an earlier iteration already produced for that day is
/// skipped, keeping the selection model small.
#[derive(Clone, Debug)]
pub struct SolutionReuseCache<T>
where
    T: PrimInt + Signed,
{
    days: Vec<Vec<CacheEntry<T>>>,
}

impl<T> SolutionReuseCache<T>
where
    T: PrimInt + Signed,
{
    pub fn new(num_days: usize) -> Self {
        Self {
            days: vec![Vec::new(); num_days],
        }
    }

    /// Returns the total number of cached schedules.
    pub fn num_entries(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }

    /// Records one solved day schedule.
    ///
    /// Returns `true` if the schedule was new for the day, `false` if an
    /// earlier iteration already produced the identical accepted set there.
    pub fn record(
        &mut self,
        iteration: IterationIndex,
        day: DayIndex,
        schedule: &DaySchedule<T>,
    ) -> bool {
        let mut accepted: Vec<ServiceRequest> = schedule.accepted().collect();
        accepted.sort();
        let entries = &mut self.days[day.get()];
        if entries.iter().any(|entry| entry.accepted == accepted) {
            return false;
        }
        entries.push(CacheEntry {
            iteration,
            schedule: schedule.clone(),
            accepted,
        });
        true
    }

    /// Builds the selection model over all cached schedules.
    pub fn build_model<'a>(&'a self, instance: &'a Instance<T>) -> ReuseModel<'a, T> {
        let options = self
            .days
            .iter()
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| ReuseOption {
                        iteration: entry.iteration,
                        accepted: &entry.accepted,
                    })
                    .collect()
            })
            .collect();
        ReuseModel { instance, options }
    }

    /// Looks up the cached schedule a selection refers to.
    pub fn schedule(&self, day: DayIndex, iteration: IterationIndex) -> Option<&DaySchedule<T>> {
        self.days[day.get()]
            .iter()
            .find(|entry| entry.iteration == iteration)
            .map(|entry| &entry.schedule)
    }

    /// Composes the final schedule a selection describes, recomputing the
    /// rejected windows from the combined assignments.
    pub fn compose_selection(
        &self,
        instance: &Instance<T>,
        selection: &ReuseSelection<T>,
    ) -> FinalSchedule<T> {
        let scheduled: Vec<Vec<Assignment<T>>> = selection
            .chosen
            .iter()
            .enumerate()
            .map(|(day_id, chosen)| match chosen {
                Some(iteration) => self
                    .schedule(DayIndex::new(day_id), *iteration)
                    .map(|schedule| schedule.assignments().to_vec())
                    .unwrap_or_default(),
                None => Vec::new(),
            })
            .collect();
        reconstruct_schedule(instance, scheduled)
    }
}

/// Builds a `FinalSchedule` from per-day assignments alone, deriving the
/// rejected windows by matching served occurrences to windows.
///
/// Windows of a pair are visited in ascending order; each claims the
/// earliest still unclaimed serving occurrence it contains. Windows left
/// without an occurrence are rejected. Combining cached schedules of
/// different iterations can serve a pair on more days than it has windows;
/// the unclaimed surplus occurrences are dropped from the schedule and do
/// not count towards the value.
pub fn reconstruct_schedule<T>(
    instance: &Instance<T>,
    scheduled: Vec<Vec<Assignment<T>>>,
) -> FinalSchedule<T>
where
    T: PrimInt + Signed,
{
    let mut keep: Vec<Vec<bool>> = scheduled
        .iter()
        .map(|assignments| vec![false; assignments.len()])
        .collect();

    let mut rejected = Vec::new();
    let mut cursor = 0;
    let windows = instance.request_windows();
    while cursor < windows.len() {
        let request = windows[cursor].request;
        let mut end = cursor;
        while end < windows.len() && windows[end].request == request {
            end += 1;
        }

        // Serving occurrences of the pair, in day order.
        let mut occurrences: Vec<(usize, usize)> = Vec::new();
        for (day_id, assignments) in scheduled.iter().enumerate() {
            for (slot, assignment) in assignments.iter().enumerate() {
                if assignment.request == request {
                    occurrences.push((day_id, slot));
                }
            }
        }
        let mut claimed = vec![false; occurrences.len()];

        for window in &windows[cursor..end] {
            let found = (0..occurrences.len()).find(|&index| {
                !claimed[index] && window.window.contains(DayIndex::new(occurrences[index].0))
            });
            match found {
                Some(index) => {
                    claimed[index] = true;
                    let (day_id, slot) = occurrences[index];
                    keep[day_id][slot] = true;
                }
                None => rejected.push(RejectedWindow {
                    request,
                    window: window.window,
                }),
            }
        }
        cursor = end;
    }

    let mut value = T::zero();
    let scheduled: Vec<Vec<Assignment<T>>> = scheduled
        .into_iter()
        .enumerate()
        .map(|(day_id, assignments)| {
            assignments
                .into_iter()
                .enumerate()
                .filter(|(slot, _)| keep[day_id][*slot])
                .map(|(_, assignment)| {
                    value = value + instance.value_of(assignment.request);
                    assignment
                })
                .collect()
        })
        .collect();

    rejected.sort();
    rejected.dedup();
    FinalSchedule::new(scheduled, rejected, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ward_model::index::{CareUnitIndex, OperatorIndex, PatientIndex, ServiceIndex};
    use ward_model::instance::{DayWindow, InstanceBuilder};

    type IntegerType = i64;

    fn request(patient: usize, service: usize) -> ServiceRequest {
        ServiceRequest::new(PatientIndex::new(patient), ServiceIndex::new(service))
    }

    fn assignment(patient: usize, service: usize) -> Assignment<IntegerType> {
        Assignment {
            request: request(patient, service),
            care_unit: CareUnitIndex::new(0),
            operator: OperatorIndex::new(0),
            start: 0,
        }
    }

    fn schedule(accepted: &[(usize, usize)], value: IntegerType) -> DaySchedule<IntegerType> {
        DaySchedule::new(
            accepted.iter().map(|&(p, s)| assignment(p, s)).collect(),
            Vec::new(),
            value,
            true,
        )
    }

    fn instance() -> Instance<IntegerType> {
        let mut builder = InstanceBuilder::<IntegerType>::new(2);
        let unit = builder.add_care_unit("cu0");
        let a = builder.add_service("srv_a", unit, 3);
        let b = builder.add_service("srv_b", unit, 2);
        let p0 = builder.add_patient("pat0");
        let p1 = builder.add_patient("pat1");
        builder.add_request(p0, a, DayWindow::new(DayIndex::new(0), DayIndex::new(1)));
        builder.add_request(p1, b, DayWindow::new(DayIndex::new(0), DayIndex::new(0)));
        builder.add_shift(DayIndex::new(0), unit, 0, 5);
        builder.add_shift(DayIndex::new(1), unit, 0, 5);
        builder.build().expect("instance must build")
    }

    #[test]
    fn test_record_skips_duplicate_accepted_sets() {
        let mut cache = SolutionReuseCache::<IntegerType>::new(2);
        let day = DayIndex::new(0);
        assert!(cache.record(IterationIndex::new(0), day, &schedule(&[(0, 0)], 3)));
        // Same accepted set from a later iteration.
        assert!(!cache.record(IterationIndex::new(1), day, &schedule(&[(0, 0)], 3)));
        // Different accepted set is new.
        assert!(cache.record(IterationIndex::new(1), day, &schedule(&[(1, 1)], 2)));
        assert_eq!(cache.num_entries(), 2);
    }

    #[test]
    fn test_build_model_shape() {
        let mut cache = SolutionReuseCache::<IntegerType>::new(2);
        cache.record(IterationIndex::new(0), DayIndex::new(0), &schedule(&[(0, 0)], 3));
        cache.record(IterationIndex::new(1), DayIndex::new(1), &schedule(&[(0, 0)], 3));
        let instance = instance();
        let model = cache.build_model(&instance);
        assert_eq!(model.options.len(), 2);
        assert_eq!(model.options[0].len(), 1);
        assert_eq!(model.options[0][0].accepted, &[request(0, 0)]);
    }

    #[test]
    fn test_compose_selection() {
        let instance = instance();
        let mut cache = SolutionReuseCache::<IntegerType>::new(2);
        cache.record(
            IterationIndex::new(0),
            DayIndex::new(0),
            &schedule(&[(1, 1)], 2),
        );
        cache.record(
            IterationIndex::new(1),
            DayIndex::new(1),
            &schedule(&[(0, 0)], 3),
        );
        let selection = ReuseSelection {
            chosen: vec![Some(IterationIndex::new(0)), Some(IterationIndex::new(1))],
            objective_value: 5,
        };
        let composed = cache.compose_selection(&instance, &selection);
        assert_eq!(composed.value(), 5);
        assert!(composed.rejected().is_empty());
        assert_eq!(composed.assignments_for(DayIndex::new(0)).len(), 1);
        assert_eq!(composed.assignments_for(DayIndex::new(1)).len(), 1);
    }

    #[test]
    fn test_compose_selection_drops_surplus_occurrences() {
        // Patient 0's single window spans both days. Combining the cached
        // iterations serves the pair on each day; only the first occurrence
        // may survive, and the value must not count the surplus one.
        let instance = instance();
        let mut cache = SolutionReuseCache::<IntegerType>::new(2);
        cache.record(
            IterationIndex::new(0),
            DayIndex::new(0),
            &schedule(&[(0, 0)], 3),
        );
        cache.record(
            IterationIndex::new(1),
            DayIndex::new(1),
            &schedule(&[(0, 0)], 3),
        );
        let selection = ReuseSelection {
            chosen: vec![Some(IterationIndex::new(0)), Some(IterationIndex::new(1))],
            objective_value: 6,
        };
        let composed = cache.compose_selection(&instance, &selection);
        assert_eq!(composed.value(), 3);
        assert_eq!(composed.assignments_for(DayIndex::new(0)).len(), 1);
        assert!(composed.assignments_for(DayIndex::new(1)).is_empty());
        // Patient 1's day-0 window stays unserved by this selection.
        assert_eq!(
            composed.rejected(),
            &[RejectedWindow {
                request: request(1, 1),
                window: DayWindow::new(DayIndex::new(0), DayIndex::new(0)),
            }]
        );
    }

    #[test]
    fn test_reconstruct_marks_unserved_windows_rejected() {
        let instance = instance();
        // Only patient 0 is served; patient 1's single window is rejected.
        let composed = reconstruct_schedule(&instance, vec![vec![assignment(0, 0)], Vec::new()]);
        assert_eq!(composed.value(), 3);
        assert_eq!(
            composed.rejected(),
            &[RejectedWindow {
                request: request(1, 1),
                window: DayWindow::new(DayIndex::new(0), DayIndex::new(0)),
            }]
        );
    }

    #[test]
    fn test_reconstruct_claims_earliest_day_per_window() {
        // Two windows of the same pair; a single serving day inside both
        // must satisfy only one window.
        let mut builder = InstanceBuilder::<IntegerType>::new(2);
        let unit = builder.add_care_unit("cu0");
        let service = builder.add_service("srv", unit, 1);
        let p = builder.add_patient("pat0");
        let window = DayWindow::new(DayIndex::new(0), DayIndex::new(1));
        builder.add_request(p, service, window);
        builder.add_request(p, service, window);
        builder.add_shift(DayIndex::new(0), unit, 0, 4);
        builder.add_shift(DayIndex::new(1), unit, 0, 4);
        let instance = builder.build().expect("instance must build");

        let composed = reconstruct_schedule(&instance, vec![vec![assignment(0, 0)], Vec::new()]);
        assert_eq!(composed.rejected().len(), 1);
        assert_eq!(composed.rejected()[0].request, request(0, 0));
    }
}
