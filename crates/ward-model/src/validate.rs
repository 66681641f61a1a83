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

//! Structural validation of master plans, day schedules, and composed
//! final schedules.
//!
//! Validators never mutate; they return the list of violations found so the
//! caller decides whether to log or abort.

use crate::index::{CareUnitIndex, DayIndex, OperatorIndex, PatientIndex};
use crate::instance::{Instance, ServiceRequest};
use crate::solution::{DaySchedule, FinalSchedule, MasterPlan};
use num_traits::{PrimInt, Signed};

/// How the engine reacts to structural violations of backend results.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ValidationMode {
    /// Do not validate backend results.
    Off,
    /// Validate and log violations, but keep going.
    #[default]
    Log,
    /// Validate and abort the run on the first violating result.
    Strict,
}

/// One structural violation of a backend result.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StructuralViolation {
    /// A request was placed on a day outside all of its windows.
    ProposalOutsideWindows { day: DayIndex, request: ServiceRequest },
    /// A day carries the same request more often than it has windows
    /// containing that day.
    RequestMultiplyServed { day: DayIndex, request: ServiceRequest },
    /// A (patient, service) pair resolves fewer occurrences than it has
    /// windows.
    WindowUnresolved { request: ServiceRequest },
    /// A (patient, service) pair resolves more occurrences than it has
    /// windows.
    WindowDoublyResolved { request: ServiceRequest },
    /// A day schedule contains an assignment for a request that was not
    /// proposed for that day.
    UnknownAssignment { day: DayIndex, request: ServiceRequest },
    /// The accepted and rejected requests of a day schedule do not
    /// partition the proposed requests.
    AcceptRejectMismatch { day: DayIndex },
    /// An assignment uses a care unit different from the one owning the
    /// service, or an operator index outside the roster.
    WrongResource { day: DayIndex, request: ServiceRequest },
    /// An assignment's time interval leaves its operator's shift.
    AssignmentOutsideShift { day: DayIndex, request: ServiceRequest },
    /// Two assignments of the same operator overlap in time.
    OperatorOverlap {
        day: DayIndex,
        care_unit: CareUnitIndex,
        operator: OperatorIndex,
    },
    /// Two assignments of the same patient overlap in time.
    PatientOverlap { day: DayIndex, patient: PatientIndex },
}

impl std::fmt::Display for StructuralViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProposalOutsideWindows { day, request } => write!(
                f,
                "Request {} placed on day {} outside all of its windows",
                request,
                day.get()
            ),
            Self::RequestMultiplyServed { day, request } => write!(
                f,
                "Request {} served more often on day {} than it has windows there",
                request,
                day.get()
            ),
            Self::WindowUnresolved { request } => {
                write!(f, "Request {} leaves at least one window unresolved", request)
            }
            Self::WindowDoublyResolved { request } => {
                write!(f, "Request {} resolves more occurrences than it has windows", request)
            }
            Self::UnknownAssignment { day, request } => write!(
                f,
                "Day {} schedule assigns request {} that was never proposed",
                day.get(),
                request
            ),
            Self::AcceptRejectMismatch { day } => write!(
                f,
                "Day {} schedule does not partition the proposed requests into accepted and rejected",
                day.get()
            ),
            Self::WrongResource { day, request } => write!(
                f,
                "Assignment of request {} on day {} uses a foreign care unit or an unknown operator",
                request,
                day.get()
            ),
            Self::AssignmentOutsideShift { day, request } => write!(
                f,
                "Assignment of request {} on day {} leaves its operator's shift",
                request,
                day.get()
            ),
            Self::OperatorOverlap { day, care_unit, operator } => write!(
                f,
                "Operator {} of care unit {} is double-booked on day {}",
                operator.get(),
                care_unit.get(),
                day.get()
            ),
            Self::PatientOverlap { day, patient } => write!(
                f,
                "Patient {} has overlapping assignments on day {}",
                patient.get(),
                day.get()
            ),
        }
    }
}

/// Stateless structural validator for backend results.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScheduleValidator;

impl ScheduleValidator {
    /// Checks a master plan against the instance.
    ///
    /// Verifies that every proposal lands inside one of its windows, that no
    /// day over-serves a request, and that proposals plus rejections resolve
    /// every window of every requested pair exactly once.
    pub fn check_master_plan<T>(
        &self,
        instance: &Instance<T>,
        plan: &MasterPlan<T>,
    ) -> Vec<StructuralViolation>
    where
        T: PrimInt + Signed,
    {
        let mut violations = Vec::new();

        for (day_id, proposals) in plan.proposals().iter().enumerate() {
            let day = DayIndex::new(day_id);
            let mut sorted = proposals.clone();
            sorted.sort();
            let mut cursor = 0;
            while cursor < sorted.len() {
                let request = sorted[cursor];
                let mut count = 0;
                while cursor < sorted.len() && sorted[cursor] == request {
                    count += 1;
                    cursor += 1;
                }
                if !instance.is_reachable(day, request) {
                    violations.push(StructuralViolation::ProposalOutsideWindows { day, request });
                    continue;
                }
                let windows_here = instance
                    .windows_of(request)
                    .iter()
                    .filter(|w| w.window.contains(day))
                    .count();
                if count > windows_here {
                    violations.push(StructuralViolation::RequestMultiplyServed { day, request });
                }
            }
        }

        // Proposals plus rejections must resolve each pair's windows exactly.
        let mut resolved: Vec<ServiceRequest> = plan
            .proposals()
            .iter()
            .flatten()
            .copied()
            .chain(plan.rejected().iter().map(|r| r.request))
            .collect();
        resolved.sort();
        let mut cursor = 0;
        while cursor < resolved.len() {
            let request = resolved[cursor];
            let mut count = 0;
            while cursor < resolved.len() && resolved[cursor] == request {
                count += 1;
                cursor += 1;
            }
            let windows = instance.windows_of(request).len();
            if count < windows {
                violations.push(StructuralViolation::WindowUnresolved { request });
            } else if count > windows {
                violations.push(StructuralViolation::WindowDoublyResolved { request });
            }
        }
        for window in instance.request_windows() {
            if resolved.binary_search(&window.request).is_err() {
                violations.push(StructuralViolation::WindowUnresolved {
                    request: window.request,
                });
            }
        }
        violations.dedup();

        violations
    }

    /// Checks a day schedule against the proposals it was asked to realize.
    pub fn check_day_schedule<T>(
        &self,
        instance: &Instance<T>,
        day: DayIndex,
        proposed: &[ServiceRequest],
        schedule: &DaySchedule<T>,
    ) -> Vec<StructuralViolation>
    where
        T: PrimInt + Signed,
    {
        let mut violations = Vec::new();

        let mut proposed_sorted: Vec<ServiceRequest> = proposed.to_vec();
        proposed_sorted.sort();
        let mut resolved: Vec<ServiceRequest> = schedule
            .accepted()
            .chain(schedule.rejected().iter().copied())
            .collect();
        resolved.sort();
        for request in schedule.accepted() {
            if proposed_sorted.binary_search(&request).is_err() {
                violations.push(StructuralViolation::UnknownAssignment { day, request });
            }
        }
        if resolved != proposed_sorted {
            violations.push(StructuralViolation::AcceptRejectMismatch { day });
        }

        for assignment in schedule.assignments() {
            let request = assignment.request;
            let owner = instance.care_unit_of(request.service);
            let roster = instance.roster(day, owner);
            if assignment.care_unit != owner || assignment.operator.get() >= roster.len() {
                violations.push(StructuralViolation::WrongResource { day, request });
                continue;
            }
            let duration = instance.duration_of(request.service);
            let shift = roster[assignment.operator.get()];
            if !shift.interval().contains_interval(&assignment.interval(duration)) {
                violations.push(StructuralViolation::AssignmentOutsideShift { day, request });
            }
        }

        // Pairwise overlap checks per operator and per patient.
        let assignments = schedule.assignments();
        for (i, a) in assignments.iter().enumerate() {
            let a_duration = instance.duration_of(a.request.service);
            for b in &assignments[i + 1..] {
                let b_duration = instance.duration_of(b.request.service);
                let overlap = a
                    .interval(a_duration)
                    .overlaps(&b.interval(b_duration));
                if !overlap {
                    continue;
                }
                if a.care_unit == b.care_unit && a.operator == b.operator {
                    violations.push(StructuralViolation::OperatorOverlap {
                        day,
                        care_unit: a.care_unit,
                        operator: a.operator,
                    });
                }
                if a.request.patient == b.request.patient {
                    violations.push(StructuralViolation::PatientOverlap {
                        day,
                        patient: a.request.patient,
                    });
                }
            }
        }

        violations
    }

    /// Checks the exactly-one resolution property of a composed schedule:
    /// every window of every requested pair is either served once or listed
    /// as rejected, and nothing is both.
    pub fn check_final_schedule<T>(
        &self,
        instance: &Instance<T>,
        schedule: &FinalSchedule<T>,
    ) -> Vec<StructuralViolation>
    where
        T: PrimInt + Signed,
    {
        let mut violations = Vec::new();

        for (day_id, assignments) in schedule.scheduled().iter().enumerate() {
            let day = DayIndex::new(day_id);
            for assignment in assignments {
                if !instance.is_reachable(day, assignment.request) {
                    violations.push(StructuralViolation::ProposalOutsideWindows {
                        day,
                        request: assignment.request,
                    });
                }
            }
        }

        let mut resolved: Vec<ServiceRequest> = schedule
            .scheduled()
            .iter()
            .flatten()
            .map(|a| a.request)
            .chain(schedule.rejected().iter().map(|r| r.request))
            .collect();
        resolved.sort();
        let mut cursor = 0;
        while cursor < resolved.len() {
            let request = resolved[cursor];
            let mut count = 0;
            while cursor < resolved.len() && resolved[cursor] == request {
                count += 1;
                cursor += 1;
            }
            let windows = instance.windows_of(request).len();
            if count < windows {
                violations.push(StructuralViolation::WindowUnresolved { request });
            } else if count > windows {
                violations.push(StructuralViolation::WindowDoublyResolved { request });
            }
        }
        for window in instance.request_windows() {
            if resolved.binary_search(&window.request).is_err() {
                violations.push(StructuralViolation::WindowUnresolved {
                    request: window.request,
                });
            }
        }
        violations.dedup();

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ServiceIndex;
    use crate::instance::{DayWindow, InstanceBuilder};
    use crate::solution::{Assignment, RejectedWindow};

    type IntegerType = i64;

    fn instance() -> Instance<IntegerType> {
        let mut builder = InstanceBuilder::<IntegerType>::new(2);
        let unit = builder.add_care_unit("cu0");
        let a = builder.add_service("srv_a", unit, 3);
        let b = builder.add_service("srv_b", unit, 3);
        let p = builder.add_patient("pat0");
        builder.add_request(p, a, DayWindow::new(DayIndex::new(0), DayIndex::new(1)));
        builder.add_request(p, b, DayWindow::new(DayIndex::new(0), DayIndex::new(0)));
        builder.add_shift(DayIndex::new(0), unit, 0, 8);
        builder.add_shift(DayIndex::new(1), unit, 0, 8);
        builder.build().expect("instance must build")
    }

    fn request(service: usize) -> ServiceRequest {
        ServiceRequest::new(PatientIndex::new(0), ServiceIndex::new(service))
    }

    #[test]
    fn test_master_plan_valid() {
        let instance = instance();
        let plan = MasterPlan::new(vec![vec![request(1)], vec![request(0)]], Vec::new(), 6);
        assert!(ScheduleValidator.check_master_plan(&instance, &plan).is_empty());
    }

    #[test]
    fn test_master_plan_outside_window() {
        let instance = instance();
        // srv_b only has a window on day 0.
        let plan = MasterPlan::new(
            vec![vec![request(0)], vec![request(1)]],
            Vec::new(),
            6,
        );
        let violations = ScheduleValidator.check_master_plan(&instance, &plan);
        assert!(violations.iter().any(|v| matches!(
            v,
            StructuralViolation::ProposalOutsideWindows { .. }
        )));
    }

    #[test]
    fn test_master_plan_unresolved_window() {
        let instance = instance();
        let plan = MasterPlan::new(vec![vec![request(0)], Vec::new()], Vec::new(), 3);
        let violations = ScheduleValidator.check_master_plan(&instance, &plan);
        assert!(violations
            .iter()
            .any(|v| matches!(v, StructuralViolation::WindowUnresolved { .. })));
    }

    #[test]
    fn test_day_schedule_partition_and_overlap() {
        let instance = instance();
        let day = DayIndex::new(0);
        let proposed = vec![request(0), request(1)];
        // Both services on the single operator at the same time.
        let schedule = DaySchedule::new(
            vec![
                Assignment {
                    request: request(0),
                    care_unit: CareUnitIndex::new(0),
                    operator: OperatorIndex::new(0),
                    start: 0,
                },
                Assignment {
                    request: request(1),
                    care_unit: CareUnitIndex::new(0),
                    operator: OperatorIndex::new(0),
                    start: 1,
                },
            ],
            Vec::new(),
            6,
            true,
        );
        let violations =
            ScheduleValidator.check_day_schedule(&instance, day, &proposed, &schedule);
        assert!(violations
            .iter()
            .any(|v| matches!(v, StructuralViolation::OperatorOverlap { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, StructuralViolation::PatientOverlap { .. })));
    }

    #[test]
    fn test_day_schedule_outside_shift() {
        let instance = instance();
        let day = DayIndex::new(0);
        let proposed = vec![request(0)];
        let schedule = DaySchedule::new(
            vec![Assignment {
                request: request(0),
                care_unit: CareUnitIndex::new(0),
                operator: OperatorIndex::new(0),
                start: 6,
            }],
            Vec::new(),
            3,
            true,
        );
        let violations =
            ScheduleValidator.check_day_schedule(&instance, day, &proposed, &schedule);
        assert_eq!(
            violations,
            vec![StructuralViolation::AssignmentOutsideShift {
                day,
                request: request(0)
            }]
        );
    }

    #[test]
    fn test_final_schedule_exactly_one() {
        let instance = instance();
        let schedule = FinalSchedule::new(
            vec![
                vec![Assignment {
                    request: request(1),
                    care_unit: CareUnitIndex::new(0),
                    operator: OperatorIndex::new(0),
                    start: 0,
                }],
                Vec::new(),
            ],
            vec![RejectedWindow {
                request: request(0),
                window: DayWindow::new(DayIndex::new(0), DayIndex::new(1)),
            }],
            3,
        );
        assert!(ScheduleValidator
            .check_final_schedule(&instance, &schedule)
            .is_empty());
    }

    #[test]
    fn test_final_schedule_double_resolution() {
        let instance = instance();
        let assignment = Assignment {
            request: request(0),
            care_unit: CareUnitIndex::new(0),
            operator: OperatorIndex::new(0),
            start: 0,
        };
        let schedule = FinalSchedule::new(
            vec![vec![assignment], vec![assignment]],
            vec![RejectedWindow {
                request: request(1),
                window: DayWindow::new(DayIndex::new(0), DayIndex::new(0)),
            }],
            6,
        );
        let violations = ScheduleValidator.check_final_schedule(&instance, &schedule);
        assert!(violations
            .iter()
            .any(|v| matches!(v, StructuralViolation::WindowDoublyResolved { .. })));
    }
}
