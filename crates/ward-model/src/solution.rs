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

//! Solution records exchanged between the decomposition engine and the
//! solver seams.
//!
//! A `MasterPlan` is what the relaxed day-selection model returns: for each
//! request window either a serving day or a rejection. A `DaySchedule` is
//! what the per-day subproblem returns for the requests proposed on one day:
//! concrete operator and start-time assignments plus the requests it could
//! not fit. A `FinalSchedule` composes the per-day schedules of one
//! iteration into the overall result.

use crate::index::{CareUnitIndex, DayIndex, OperatorIndex};
use crate::instance::{DayWindow, Instance, ServiceRequest};
use num_traits::{PrimInt, Signed};
use ward_core::math::interval::Interval;

/// A request window the master model left unserved.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RejectedWindow {
    pub request: ServiceRequest,
    pub window: DayWindow,
}

/// The outcome of one relaxed master solve: for every request window either
/// a serving day inside the window or a rejection.
#[derive(Clone, Debug)]
pub struct MasterPlan<T>
where
    T: PrimInt + Signed,
{
    proposals: Vec<Vec<ServiceRequest>>,
    rejected: Vec<RejectedWindow>,
    objective_value: T,
}

impl<T> MasterPlan<T>
where
    T: PrimInt + Signed,
{
    /// Creates a new master plan.
    ///
    /// `proposals` must hold one entry per day of the horizon; entry `d`
    /// lists the requests the master placed on day `d`.
    pub fn new(
        proposals: Vec<Vec<ServiceRequest>>,
        rejected: Vec<RejectedWindow>,
        objective_value: T,
    ) -> Self {
        Self {
            proposals,
            rejected,
            objective_value,
        }
    }

    /// Returns the number of days the plan spans.
    #[inline]
    pub fn num_days(&self) -> usize {
        self.proposals.len()
    }

    /// Returns the requests proposed for `day`.
    #[inline]
    pub fn proposals_for(&self, day: DayIndex) -> &[ServiceRequest] {
        &self.proposals[day.get()]
    }

    /// Returns the per-day proposal lists.
    #[inline]
    pub fn proposals(&self) -> &[Vec<ServiceRequest>] {
        &self.proposals
    }

    /// Returns the request windows the master left unserved.
    #[inline]
    pub fn rejected(&self) -> &[RejectedWindow] {
        &self.rejected
    }

    /// Returns the objective value reported by the master backend.
    #[inline]
    pub fn objective_value(&self) -> T {
        self.objective_value
    }

    /// Computes the plan's value from the instance: the sum of
    /// duration times priority over all proposed requests.
    pub fn value(&self, instance: &Instance<T>) -> T {
        self.proposals
            .iter()
            .flatten()
            .fold(T::zero(), |acc, request| acc + instance.value_of(*request))
    }
}

/// One realized assignment: a request served by an operator of the owning
/// care unit's roster, starting at a concrete time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Assignment<T> {
    pub request: ServiceRequest,
    pub care_unit: CareUnitIndex,
    pub operator: OperatorIndex,
    pub start: T,
}

impl<T> Assignment<T>
where
    T: PrimInt + Signed,
{
    /// Returns the occupied time interval given the service duration.
    #[inline]
    pub fn interval(&self, duration: T) -> Interval<T> {
        Interval::from_start_and_length(self.start, duration)
    }
}

/// The outcome of one per-day subproblem solve.
///
/// `certified` is `false` when the backend stopped before proving its
/// schedule optimal; the schedule is still usable but the engine records
/// the iteration as degraded.
#[derive(Clone, Debug)]
pub struct DaySchedule<T>
where
    T: PrimInt + Signed,
{
    assignments: Vec<Assignment<T>>,
    rejected: Vec<ServiceRequest>,
    objective_value: T,
    certified: bool,
}

impl<T> DaySchedule<T>
where
    T: PrimInt + Signed,
{
    pub fn new(
        assignments: Vec<Assignment<T>>,
        rejected: Vec<ServiceRequest>,
        objective_value: T,
        certified: bool,
    ) -> Self {
        Self {
            assignments,
            rejected,
            objective_value,
            certified,
        }
    }

    /// Returns the realized assignments.
    #[inline]
    pub fn assignments(&self) -> &[Assignment<T>] {
        &self.assignments
    }

    /// Returns the proposed requests the subproblem could not fit.
    #[inline]
    pub fn rejected(&self) -> &[ServiceRequest] {
        &self.rejected
    }

    /// Returns the objective value reported by the day backend.
    #[inline]
    pub fn objective_value(&self) -> T {
        self.objective_value
    }

    /// Returns `true` if the backend proved the schedule optimal.
    #[inline]
    pub fn is_certified(&self) -> bool {
        self.certified
    }

    /// Returns an iterator over the accepted requests.
    #[inline]
    pub fn accepted(&self) -> impl Iterator<Item = ServiceRequest> + '_ {
        self.assignments.iter().map(|a| a.request)
    }
}

/// The composed result of one iteration: the union of all per-day
/// schedules plus every rejected request window.
#[derive(Clone, Debug)]
pub struct FinalSchedule<T>
where
    T: PrimInt + Signed,
{
    scheduled: Vec<Vec<Assignment<T>>>,
    rejected: Vec<RejectedWindow>,
    value: T,
}

impl<T> FinalSchedule<T>
where
    T: PrimInt + Signed,
{
    pub fn new(scheduled: Vec<Vec<Assignment<T>>>, rejected: Vec<RejectedWindow>, value: T) -> Self {
        Self {
            scheduled,
            rejected,
            value,
        }
    }

    /// Returns an empty schedule spanning `num_days` days.
    pub fn empty(num_days: usize) -> Self {
        Self {
            scheduled: vec![Vec::new(); num_days],
            rejected: Vec::new(),
            value: T::zero(),
        }
    }

    /// Returns the number of days the schedule spans.
    #[inline]
    pub fn num_days(&self) -> usize {
        self.scheduled.len()
    }

    /// Returns the assignments realized on `day`.
    #[inline]
    pub fn assignments_for(&self, day: DayIndex) -> &[Assignment<T>] {
        &self.scheduled[day.get()]
    }

    /// Returns the per-day assignment lists.
    #[inline]
    pub fn scheduled(&self) -> &[Vec<Assignment<T>>] {
        &self.scheduled
    }

    /// Returns the rejected request windows, sorted and deduplicated by
    /// (patient, service, window).
    #[inline]
    pub fn rejected(&self) -> &[RejectedWindow] {
        &self.rejected
    }

    /// Returns the total number of realized assignments.
    #[inline]
    pub fn num_assignments(&self) -> usize {
        self.scheduled.iter().map(Vec::len).sum()
    }

    /// Returns the achieved value: the sum of duration times priority over
    /// all realized assignments.
    #[inline]
    pub fn value(&self) -> T {
        self.value
    }
}

impl<T> std::fmt::Display for FinalSchedule<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "FinalSchedule")?;
        writeln!(f, "{:<20} {}", "Value:", self.value)?;
        writeln!(f, "{:<20} {}", "Assignments:", self.num_assignments())?;
        writeln!(f, "{:<20} {}", "Rejected windows:", self.rejected.len())?;
        for (day, assignments) in self.scheduled.iter().enumerate() {
            writeln!(f, "  Day {:>4}: {} assignments", day, assignments.len())?;
        }
        Ok(())
    }
}
