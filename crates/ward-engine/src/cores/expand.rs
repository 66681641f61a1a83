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

//! Core expansion: day propagation through roster domination and component
//! generalization through substitution matchings.

use crate::cores::subsume::DaySubsumptionIndex;
use crate::cores::Core;
use crate::traits::{MatchArc, MatchEnumerator};
use num_traits::{PrimInt, Signed};
use ward_model::index::{CareUnitIndex, DayIndex};
use ward_model::instance::Instance;

/// Which generalization dimensions are enabled.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct GeneralizationConfig {
    /// Allow replacing a component's patient by another patient.
    pub anonymize_patients: bool,
    /// Allow replacing a component's service by another service of the same
    /// care unit with at least the same duration.
    pub anonymize_services: bool,
    /// Upper bound on matchings enumerated per (core, day).
    pub max_matchings_per_core: usize,
}

impl GeneralizationConfig {
    /// Returns `true` if at least one dimension is enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.anonymize_patients || self.anonymize_services
    }
}

/// Expands cores to further days and structurally similar component sets.
#[derive(Debug)]
pub struct CoreExpander<'a, T>
where
    T: PrimInt + Signed,
{
    instance: &'a Instance<T>,
    subsumption: &'a DaySubsumptionIndex,
}

impl<'a, T> CoreExpander<'a, T>
where
    T: PrimInt + Signed,
{
    pub fn new(instance: &'a Instance<T>, subsumption: &'a DaySubsumptionIndex) -> Self {
        Self {
            instance,
            subsumption,
        }
    }

    /// Propagates each core from its originating day to every day dominated
    /// in all care units the core touches.
    ///
    /// Domination is intersected over the touched units: a day with less
    /// room in only some of them gives no valid certificate.
    pub fn expand_days(&self, cores: &mut [Core]) {
        for core in cores.iter_mut() {
            let mut units: Vec<CareUnitIndex> = core
                .components()
                .iter()
                .map(|component| self.instance.care_unit_of(component.service))
                .collect();
            units.sort();
            units.dedup();

            let origin = core.days()[0];
            let mut propagated: Option<Vec<DayIndex>> = None;
            for unit in units {
                let dominated = self.subsumption.dominated(unit, origin);
                propagated = Some(match propagated {
                    None => dominated.to_vec(),
                    Some(current) => intersect_sorted(&current, dominated),
                });
                if propagated.as_ref().is_some_and(Vec::is_empty) {
                    break;
                }
            }

            if let Some(days) = propagated {
                if !days.is_empty() {
                    core.add_days(&days);
                }
            }
        }
    }

    /// Drops core days on which some component is not reachable, and cores
    /// left without any valid day.
    pub fn retain_reachable_days(&self, cores: Vec<Core>) -> Vec<Core> {
        cores
            .into_iter()
            .filter_map(|mut core| {
                let days: Vec<DayIndex> = core
                    .days()
                    .iter()
                    .copied()
                    .filter(|day| {
                        core.components()
                            .iter()
                            .all(|component| self.instance.is_reachable(*day, *component))
                    })
                    .collect();
                if days.is_empty() {
                    None
                } else {
                    core.set_days(days);
                    Some(core)
                }
            })
            .collect()
    }

    /// Generalizes cores to structurally similar component sets via perfect
    /// matchings on the substitution graph.
    ///
    /// For every (core, day), each component may be substituted by a request
    /// reachable on that day, subject to the enabled dimensions; a perfect
    /// matching of all components yields one generalized core on that day.
    /// With service anonymization enabled the results pass a per-care-unit
    /// capacity filter, since a substituted set may exceed what the day's
    /// rosters could ever hold.
    pub fn generalize(
        &self,
        cores: &[Core],
        config: GeneralizationConfig,
        matcher: &mut dyn MatchEnumerator,
    ) -> Vec<Core> {
        if !config.is_enabled() {
            return Vec::new();
        }

        let mut expanded = Vec::new();
        for core in cores {
            for day in core.days() {
                let arcs = self.substitution_arcs(core, *day, config);
                if arcs.is_empty() {
                    continue;
                }
                for matching in matcher.enumerate(&arcs, config.max_matchings_per_core) {
                    let components = matching.iter().map(|arc| arc.target).collect();
                    let candidate = Core::new(components, vec![*day]);
                    // The identity matching reproduces the input core.
                    if candidate.components() == core.components() {
                        continue;
                    }
                    expanded.push(candidate);
                }
            }
        }

        if config.anonymize_services {
            expanded = self.filter_by_capacity(expanded);
        }
        expanded
    }

    fn substitution_arcs(
        &self,
        core: &Core,
        day: DayIndex,
        config: GeneralizationConfig,
    ) -> Vec<MatchArc> {
        let mut arcs = Vec::new();
        for component in core.components() {
            for target in self.instance.reachable_requests(day) {
                if !config.anonymize_patients && component.patient != target.patient {
                    continue;
                }
                if !config.anonymize_services && component.service != target.service {
                    continue;
                }
                if config.anonymize_services {
                    let same_unit = self.instance.care_unit_of(component.service)
                        == self.instance.care_unit_of(target.service);
                    let fits = self.instance.duration_of(component.service)
                        <= self.instance.duration_of(target.service);
                    if !same_unit || !fits {
                        continue;
                    }
                }
                arcs.push(MatchArc {
                    source: *component,
                    target: *target,
                });
            }
        }
        arcs
    }

    /// Keeps only (core, day) pairs whose summed component durations fit the
    /// day's per-care-unit capacities.
    fn filter_by_capacity(&self, cores: Vec<Core>) -> Vec<Core> {
        let num_units = self.instance.num_care_units();
        let mut load = vec![T::zero(); num_units];
        cores
            .into_iter()
            .filter_map(|mut core| {
                let days: Vec<DayIndex> = core
                    .days()
                    .iter()
                    .copied()
                    .filter(|day| {
                        load.iter_mut().for_each(|slot| *slot = T::zero());
                        for component in core.components() {
                            let unit = self.instance.care_unit_of(component.service);
                            load[unit.get()] =
                                load[unit.get()] + self.instance.duration_of(component.service);
                        }
                        (0..num_units).all(|unit_id| {
                            load[unit_id]
                                <= self.instance.capacity(*day, CareUnitIndex::new(unit_id))
                        })
                    })
                    .collect();
                if days.is_empty() {
                    None
                } else {
                    core.set_days(days);
                    Some(core)
                }
            })
            .collect()
    }
}

fn intersect_sorted(left: &[DayIndex], right: &[DayIndex]) -> Vec<DayIndex> {
    let mut result = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result.push(left[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::traits::MatchArc;
    use rustc_hash::FxHashSet;
    use ward_model::index::{PatientIndex, ServiceIndex};
    use ward_model::instance::{DayWindow, InstanceBuilder, ServiceRequest};

    type IntegerType = i64;

    /// Brute-force matching enumerator used by the engine tests as well.
    pub(crate) struct ExhaustiveMatcher;

    impl MatchEnumerator for ExhaustiveMatcher {
        fn enumerate(&mut self, arcs: &[MatchArc], limit: usize) -> Vec<Vec<MatchArc>> {
            let mut sources: Vec<ServiceRequest> = arcs.iter().map(|arc| arc.source).collect();
            sources.sort();
            sources.dedup();

            let mut matchings = Vec::new();
            let mut current: Vec<MatchArc> = Vec::new();
            let mut used: FxHashSet<ServiceRequest> = FxHashSet::default();
            Self::search(arcs, &sources, 0, &mut current, &mut used, &mut matchings, limit);
            matchings
        }
    }

    impl ExhaustiveMatcher {
        #[allow(clippy::too_many_arguments)]
        fn search(
            arcs: &[MatchArc],
            sources: &[ServiceRequest],
            slot: usize,
            current: &mut Vec<MatchArc>,
            used: &mut FxHashSet<ServiceRequest>,
            matchings: &mut Vec<Vec<MatchArc>>,
            limit: usize,
        ) {
            if matchings.len() >= limit {
                return;
            }
            if slot == sources.len() {
                matchings.push(current.clone());
                return;
            }
            for arc in arcs.iter().filter(|arc| arc.source == sources[slot]) {
                if used.contains(&arc.target) {
                    continue;
                }
                used.insert(arc.target);
                current.push(*arc);
                Self::search(arcs, sources, slot + 1, current, used, matchings, limit);
                current.pop();
                used.remove(&arc.target);
            }
        }
    }

    fn request(patient: usize, service: usize) -> ServiceRequest {
        ServiceRequest::new(PatientIndex::new(patient), ServiceIndex::new(service))
    }

    /// Two days with one care unit; day 0's roster dominates day 1's.
    fn dominating_instance() -> Instance<IntegerType> {
        let mut builder = InstanceBuilder::<IntegerType>::new(2);
        let unit = builder.add_care_unit("cu0");
        let service = builder.add_service("srv0", unit, 2);
        let p0 = builder.add_patient("pat0");
        let p1 = builder.add_patient("pat1");
        let window = DayWindow::new(DayIndex::new(0), DayIndex::new(1));
        builder.add_request(p0, service, window);
        builder.add_request(p1, service, window);
        builder.add_shift(DayIndex::new(0), unit, 0, 10);
        builder.add_shift(DayIndex::new(1), unit, 0, 4);
        builder.build().expect("instance must build")
    }

    #[test]
    fn test_expand_days_propagates_to_dominated_days() {
        let instance = dominating_instance();
        let subsumption = DaySubsumptionIndex::build(&instance);
        let expander = CoreExpander::new(&instance, &subsumption);

        let mut cores = vec![Core::new(
            vec![request(0, 0), request(1, 0)],
            vec![DayIndex::new(0)],
        )];
        expander.expand_days(&mut cores);
        assert_eq!(cores[0].days(), &[DayIndex::new(0), DayIndex::new(1)]);

        // The other direction must not propagate.
        let mut cores = vec![Core::new(vec![request(0, 0)], vec![DayIndex::new(1)])];
        expander.expand_days(&mut cores);
        assert_eq!(cores[0].days(), &[DayIndex::new(1)]);
    }

    #[test]
    fn test_expand_days_intersects_over_touched_units() {
        // Unit 0 dominates day 1 from day 0, unit 1 does not.
        let mut builder = InstanceBuilder::<IntegerType>::new(2);
        let unit0 = builder.add_care_unit("cu0");
        let unit1 = builder.add_care_unit("cu1");
        let s0 = builder.add_service("srv0", unit0, 2);
        let s1 = builder.add_service("srv1", unit1, 2);
        let p = builder.add_patient("pat0");
        let window = DayWindow::new(DayIndex::new(0), DayIndex::new(1));
        builder.add_request(p, s0, window);
        builder.add_request(p, s1, window);
        builder.add_shift(DayIndex::new(0), unit0, 0, 10);
        builder.add_shift(DayIndex::new(1), unit0, 0, 4);
        builder.add_shift(DayIndex::new(0), unit1, 0, 4);
        builder.add_shift(DayIndex::new(1), unit1, 0, 10);
        let instance = builder.build().expect("instance must build");
        let subsumption = DaySubsumptionIndex::build(&instance);
        let expander = CoreExpander::new(&instance, &subsumption);

        let mut cores = vec![Core::new(
            vec![request(0, 0), request(0, 1)],
            vec![DayIndex::new(0)],
        )];
        expander.expand_days(&mut cores);
        assert_eq!(cores[0].days(), &[DayIndex::new(0)]);
    }

    #[test]
    fn test_retain_reachable_days_drops_invalid_days() {
        let mut builder = InstanceBuilder::<IntegerType>::new(2);
        let unit = builder.add_care_unit("cu0");
        let service = builder.add_service("srv0", unit, 2);
        let p = builder.add_patient("pat0");
        builder.add_request(p, service, DayWindow::new(DayIndex::new(0), DayIndex::new(0)));
        builder.add_shift(DayIndex::new(0), unit, 0, 4);
        builder.add_shift(DayIndex::new(1), unit, 0, 4);
        let instance = builder.build().expect("instance must build");
        let subsumption = DaySubsumptionIndex::build(&instance);
        let expander = CoreExpander::new(&instance, &subsumption);

        let cores = vec![Core::new(
            vec![request(0, 0)],
            vec![DayIndex::new(0), DayIndex::new(1)],
        )];
        let cores = expander.retain_reachable_days(cores);
        assert_eq!(cores.len(), 1);
        assert_eq!(cores[0].days(), &[DayIndex::new(0)]);

        let cores = vec![Core::new(vec![request(0, 0)], vec![DayIndex::new(1)])];
        assert!(expander.retain_reachable_days(cores).is_empty());
    }

    #[test]
    fn test_generalize_patients() {
        let instance = dominating_instance();
        let subsumption = DaySubsumptionIndex::build(&instance);
        let expander = CoreExpander::new(&instance, &subsumption);

        let cores = vec![Core::new(vec![request(0, 0)], vec![DayIndex::new(0)])];
        let config = GeneralizationConfig {
            anonymize_patients: true,
            anonymize_services: false,
            max_matchings_per_core: 16,
        };
        let expanded = expander.generalize(&cores, config, &mut ExhaustiveMatcher);
        // Patient 1 requests the same service; the identity matching is
        // filtered out.
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].components(), &[request(1, 0)]);
        assert_eq!(expanded[0].days(), &[DayIndex::new(0)]);
    }

    #[test]
    fn test_generalize_services_respects_unit_and_duration() {
        let mut builder = InstanceBuilder::<IntegerType>::new(1);
        let unit0 = builder.add_care_unit("cu0");
        let unit1 = builder.add_care_unit("cu1");
        let short = builder.add_service("short", unit0, 2);
        let long = builder.add_service("long", unit0, 5);
        let foreign = builder.add_service("foreign", unit1, 5);
        let p = builder.add_patient("pat0");
        let window = DayWindow::new(DayIndex::new(0), DayIndex::new(0));
        builder.add_request(p, short, window);
        builder.add_request(p, long, window);
        builder.add_request(p, foreign, window);
        builder.add_shift(DayIndex::new(0), unit0, 0, 8);
        builder.add_shift(DayIndex::new(0), unit1, 0, 8);
        let instance = builder.build().expect("instance must build");
        let subsumption = DaySubsumptionIndex::build(&instance);
        let expander = CoreExpander::new(&instance, &subsumption);

        let cores = vec![Core::new(vec![request(0, 0)], vec![DayIndex::new(0)])];
        let config = GeneralizationConfig {
            anonymize_patients: false,
            anonymize_services: true,
            max_matchings_per_core: 16,
        };
        let expanded = expander.generalize(&cores, config, &mut ExhaustiveMatcher);
        // Only the longer service of the same unit qualifies; the foreign
        // unit's service does not.
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].components(), &[request(0, 1)]);
    }

    #[test]
    fn test_generalize_services_capacity_filter() {
        let mut builder = InstanceBuilder::<IntegerType>::new(1);
        let unit = builder.add_care_unit("cu0");
        let short = builder.add_service("short", unit, 2);
        let long = builder.add_service("long", unit, 9);
        let p = builder.add_patient("pat0");
        let window = DayWindow::new(DayIndex::new(0), DayIndex::new(0));
        builder.add_request(p, short, window);
        builder.add_request(p, long, window);
        builder.add_shift(DayIndex::new(0), unit, 0, 8);
        let instance = builder.build().expect("instance must build");
        let subsumption = DaySubsumptionIndex::build(&instance);
        let expander = CoreExpander::new(&instance, &subsumption);

        let cores = vec![Core::new(vec![request(0, 0)], vec![DayIndex::new(0)])];
        let config = GeneralizationConfig {
            anonymize_patients: false,
            anonymize_services: true,
            max_matchings_per_core: 16,
        };
        // The long service (duration 9) exceeds the day's capacity of 8 and
        // must be filtered out.
        let expanded = expander.generalize(&cores, config, &mut ExhaustiveMatcher);
        assert!(expanded.is_empty());
    }
}
