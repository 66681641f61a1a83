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

//! Core generation from the rejections of one iteration's day schedules.

use crate::cores::{Core, CoreStrategy};
use fixedbitset::FixedBitSet;
use num_traits::{PrimInt, Signed};
use ward_model::index::DayIndex;
use ward_model::instance::{Instance, ServiceRequest};
use ward_model::solution::DaySchedule;

/// Derives cores from the day schedules of one iteration, according to the
/// configured strategy.
#[derive(Clone, Copy, Debug)]
pub struct CoreGenerator {
    strategy: CoreStrategy,
}

impl CoreGenerator {
    #[inline]
    pub fn new(strategy: CoreStrategy) -> Self {
        Self { strategy }
    }

    /// Returns the configured strategy.
    #[inline]
    pub fn strategy(&self) -> CoreStrategy {
        self.strategy
    }

    /// Generates cores from the day schedules of one iteration.
    ///
    /// `schedules[d]` must be the schedule of day `d`. Days without
    /// rejections contribute no cores.
    pub fn generate<T>(
        &self,
        instance: &Instance<T>,
        schedules: &[DaySchedule<T>],
    ) -> Vec<Core>
    where
        T: PrimInt + Signed,
    {
        let mut cores = Vec::new();
        for (day_id, schedule) in schedules.iter().enumerate() {
            if schedule.rejected().is_empty() {
                continue;
            }
            let day = DayIndex::new(day_id);
            let accepted: Vec<ServiceRequest> = schedule.accepted().collect();
            match self.strategy {
                CoreStrategy::Generalist => {
                    let mut components = accepted.clone();
                    components.extend_from_slice(schedule.rejected());
                    cores.push(Core::new(components, vec![day]));
                }
                CoreStrategy::Basic => {
                    for rejection in schedule.rejected() {
                        let mut components = accepted.clone();
                        components.push(*rejection);
                        cores.push(Core::new(components, vec![day]));
                    }
                }
                CoreStrategy::Reduced => {
                    for rejection in schedule.rejected() {
                        let components =
                            reduced_components(instance, &accepted, *rejection);
                        cores.push(Core::new(components, vec![day]));
                    }
                }
            }
        }
        cores
    }
}

/// Computes the connected closure of `rejection` over the bipartite graph of
/// patients and care units touched by the day's accepted requests.
///
/// A scheduled request joins the closure when its patient or its service's
/// care unit is already reachable from the rejection; its other endpoint
/// then becomes reachable in turn.
fn reduced_components<T>(
    instance: &Instance<T>,
    accepted: &[ServiceRequest],
    rejection: ServiceRequest,
) -> Vec<ServiceRequest>
where
    T: PrimInt + Signed,
{
    let mut seen_patients = FixedBitSet::with_capacity(instance.num_patients());
    let mut seen_units = FixedBitSet::with_capacity(instance.num_care_units());
    let mut included = FixedBitSet::with_capacity(accepted.len());
    let mut patient_worklist = Vec::new();
    let mut unit_worklist = Vec::new();

    seen_patients.insert(rejection.patient.get());
    patient_worklist.push(rejection.patient);
    let rejection_unit = instance.care_unit_of(rejection.service);
    seen_units.insert(rejection_unit.get());
    unit_worklist.push(rejection_unit);

    while !patient_worklist.is_empty() || !unit_worklist.is_empty() {
        while let Some(unit) = unit_worklist.pop() {
            for (slot, request) in accepted.iter().enumerate() {
                if included.contains(slot) || instance.care_unit_of(request.service) != unit {
                    continue;
                }
                included.insert(slot);
                if !seen_patients.contains(request.patient.get()) {
                    seen_patients.insert(request.patient.get());
                    patient_worklist.push(request.patient);
                }
            }
        }
        while let Some(patient) = patient_worklist.pop() {
            for (slot, request) in accepted.iter().enumerate() {
                if included.contains(slot) || request.patient != patient {
                    continue;
                }
                included.insert(slot);
                let unit = instance.care_unit_of(request.service);
                if !seen_units.contains(unit.get()) {
                    seen_units.insert(unit.get());
                    unit_worklist.push(unit);
                }
            }
        }
    }

    let mut components: Vec<ServiceRequest> =
        included.ones().map(|slot| accepted[slot]).collect();
    components.push(rejection);
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use ward_model::index::{CareUnitIndex, OperatorIndex, PatientIndex, ServiceIndex};
    use ward_model::instance::{DayWindow, InstanceBuilder};
    use ward_model::solution::Assignment;

    type IntegerType = i64;

    /// Two care units; services 0 and 1 in unit 0, service 2 in unit 1.
    /// Patients 0 and 1 only touch unit 0, patient 2 only touches unit 1.
    fn split_instance() -> Instance<IntegerType> {
        let mut builder = InstanceBuilder::<IntegerType>::new(1);
        let unit0 = builder.add_care_unit("cu0");
        let unit1 = builder.add_care_unit("cu1");
        let s0 = builder.add_service("srv0", unit0, 2);
        let s1 = builder.add_service("srv1", unit0, 2);
        let s2 = builder.add_service("srv2", unit1, 2);
        let window = DayWindow::new(DayIndex::new(0), DayIndex::new(0));
        let p0 = builder.add_patient("pat0");
        let p1 = builder.add_patient("pat1");
        let p2 = builder.add_patient("pat2");
        builder.add_request(p0, s0, window);
        builder.add_request(p1, s1, window);
        builder.add_request(p2, s2, window);
        builder.add_shift(DayIndex::new(0), unit0, 0, 4);
        builder.add_shift(DayIndex::new(0), unit1, 0, 4);
        builder.build().expect("instance must build")
    }

    fn request(patient: usize, service: usize) -> ServiceRequest {
        ServiceRequest::new(PatientIndex::new(patient), ServiceIndex::new(service))
    }

    fn assignment(patient: usize, service: usize, care_unit: usize) -> Assignment<IntegerType> {
        Assignment {
            request: request(patient, service),
            care_unit: CareUnitIndex::new(care_unit),
            operator: OperatorIndex::new(0),
            start: 0,
        }
    }

    #[test]
    fn test_no_rejections_no_cores() {
        let instance = split_instance();
        let schedules = vec![DaySchedule::new(
            vec![assignment(0, 0, 0)],
            Vec::new(),
            2,
            true,
        )];
        let cores = CoreGenerator::new(CoreStrategy::Generalist).generate(&instance, &schedules);
        assert!(cores.is_empty());
    }

    #[test]
    fn test_generalist_one_core_per_day() {
        let instance = split_instance();
        let schedules = vec![DaySchedule::new(
            vec![assignment(0, 0, 0), assignment(2, 2, 1)],
            vec![request(1, 1)],
            4,
            true,
        )];
        let cores = CoreGenerator::new(CoreStrategy::Generalist).generate(&instance, &schedules);
        assert_eq!(cores.len(), 1);
        assert_eq!(
            cores[0].components(),
            &[request(0, 0), request(1, 1), request(2, 2)]
        );
        assert_eq!(cores[0].days(), &[DayIndex::new(0)]);
    }

    #[test]
    fn test_basic_one_core_per_rejection() {
        let instance = split_instance();
        let schedules = vec![DaySchedule::new(
            vec![assignment(0, 0, 0)],
            vec![request(1, 1), request(2, 2)],
            2,
            true,
        )];
        let cores = CoreGenerator::new(CoreStrategy::Basic).generate(&instance, &schedules);
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[0].components(), &[request(0, 0), request(1, 1)]);
        assert_eq!(cores[1].components(), &[request(0, 0), request(2, 2)]);
    }

    #[test]
    fn test_reduced_excludes_disconnected_requests() {
        let instance = split_instance();
        // Rejection in unit 0; patient 2's request lives entirely in unit 1
        // and must not enter the closure.
        let schedules = vec![DaySchedule::new(
            vec![assignment(0, 0, 0), assignment(2, 2, 1)],
            vec![request(1, 1)],
            4,
            true,
        )];
        let cores = CoreGenerator::new(CoreStrategy::Reduced).generate(&instance, &schedules);
        assert_eq!(cores.len(), 1);
        assert_eq!(cores[0].components(), &[request(0, 0), request(1, 1)]);
    }

    #[test]
    fn test_reduced_is_subset_of_basic_and_keeps_rejection() {
        let instance = split_instance();
        let schedules = vec![DaySchedule::new(
            vec![assignment(0, 0, 0), assignment(2, 2, 1)],
            vec![request(1, 1)],
            4,
            true,
        )];
        let basic = CoreGenerator::new(CoreStrategy::Basic).generate(&instance, &schedules);
        let reduced = CoreGenerator::new(CoreStrategy::Reduced).generate(&instance, &schedules);
        assert_eq!(basic.len(), reduced.len());
        for (b, r) in basic.iter().zip(reduced.iter()) {
            assert!(r.contains(request(1, 1)));
            for component in r.components() {
                assert!(b.contains(*component));
            }
        }
    }

    #[test]
    fn test_reduced_closure_through_shared_patient() {
        // Patient 0 holds requests in both units; a rejection in unit 0 must
        // pull patient 0's unit 1 request, and through unit 1 also patient
        // 2's request.
        let mut builder = InstanceBuilder::<IntegerType>::new(1);
        let unit0 = builder.add_care_unit("cu0");
        let unit1 = builder.add_care_unit("cu1");
        let s0 = builder.add_service("srv0", unit0, 2);
        let s1 = builder.add_service("srv1", unit0, 2);
        let s2 = builder.add_service("srv2", unit1, 2);
        let window = DayWindow::new(DayIndex::new(0), DayIndex::new(0));
        let p0 = builder.add_patient("pat0");
        let p1 = builder.add_patient("pat1");
        let p2 = builder.add_patient("pat2");
        builder.add_request(p0, s0, window);
        builder.add_request(p0, s2, window);
        builder.add_request(p1, s1, window);
        builder.add_request(p2, s2, window);
        builder.add_shift(DayIndex::new(0), unit0, 0, 4);
        builder.add_shift(DayIndex::new(0), unit1, 0, 6);
        let instance = builder.build().expect("instance must build");

        let schedules = vec![DaySchedule::new(
            vec![
                assignment(0, 0, 0),
                assignment(0, 2, 1),
                assignment(2, 2, 1),
            ],
            vec![request(1, 1)],
            6,
            true,
        )];
        let cores = CoreGenerator::new(CoreStrategy::Reduced).generate(&instance, &schedules);
        assert_eq!(cores.len(), 1);
        assert_eq!(
            cores[0].components(),
            &[request(0, 0), request(0, 2), request(1, 1), request(2, 2)]
        );
    }
}
