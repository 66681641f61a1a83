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

//! The decomposition loop.
//!
//! Each iteration: solve the relaxed master under all accumulated cuts, try
//! to short-circuit through the solution-reuse cache, realize the proposals
//! day by day, compose and track the best schedule, then turn the day
//! rejections into cores, expand them, and merge them into the store. The
//! loop stops on convergence, on a reached gap, on a reuse match, or at the
//! iteration cap.

use crate::cores::expand::{CoreExpander, GeneralizationConfig};
use crate::cores::generate::CoreGenerator;
use crate::cores::store::CoreStore;
use crate::cores::subsume::DaySubsumptionIndex;
use crate::cores::CoreStrategy;
use crate::err::EngineError;
use crate::monitor::{IterationMonitor, IterationSummary, NoOperationMonitor};
use crate::result::{EngineOutcome, TerminationReason};
use crate::reuse::SolutionReuseCache;
use crate::stats::EngineStatistics;
use crate::traits::{DayProblem, DaySolver, MasterSolver, MatchEnumerator, ReuseSolver};
use num_traits::{PrimInt, Signed};
use std::time::Instant;
use tracing::{debug, warn};
use ward_model::index::{DayIndex, IterationIndex};
use ward_model::instance::Instance;
use ward_model::solution::{Assignment, DaySchedule, FinalSchedule, MasterPlan, RejectedWindow};
use ward_model::validate::{ScheduleValidator, StructuralViolation, ValidationMode};

/// Configuration of the decomposition loop.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Iteration cap.
    pub max_iterations: usize,
    /// Relative early-stop gap between master bound and best achieved
    /// value. `0.0` disables the check.
    pub early_stop_gap: f64,
    /// How cores are derived from rejections.
    pub core_strategy: CoreStrategy,
    /// Propagate cores to dominated days.
    pub expand_core_days: bool,
    /// Component generalization dimensions.
    pub generalization: GeneralizationConfig,
    /// Record solved day schedules and try to short-circuit through them.
    pub use_reuse_cache: bool,
    /// How backend results are validated.
    pub validation: ValidationMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 16,
            early_stop_gap: 0.0,
            core_strategy: CoreStrategy::default(),
            expand_core_days: true,
            generalization: GeneralizationConfig {
                anonymize_patients: false,
                anonymize_services: false,
                max_matchings_per_core: 32,
            },
            use_reuse_cache: true,
            validation: ValidationMode::default(),
        }
    }
}

/// Builder for `DecompositionEngine`.
pub struct EngineBuilder<'a, T>
where
    T: PrimInt + Signed,
{
    master: &'a mut dyn MasterSolver<T>,
    day_solver: &'a mut dyn DaySolver<T>,
    matcher: Option<&'a mut dyn MatchEnumerator>,
    reuse_solver: Option<&'a mut dyn ReuseSolver<T>>,
    monitor: Box<dyn IterationMonitor<T> + 'a>,
    config: EngineConfig,
}

impl<'a, T> EngineBuilder<'a, T>
where
    T: PrimInt + Signed,
{
    pub fn new(master: &'a mut dyn MasterSolver<T>, day_solver: &'a mut dyn DaySolver<T>) -> Self {
        Self {
            master,
            day_solver,
            matcher: None,
            reuse_solver: None,
            monitor: Box::new(NoOperationMonitor),
            config: EngineConfig::default(),
        }
    }

    /// Sets the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the matching enumerator used for component generalization.
    pub fn with_matcher(mut self, matcher: &'a mut dyn MatchEnumerator) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Sets the reuse-selection backend.
    pub fn with_reuse_solver(mut self, reuse_solver: &'a mut dyn ReuseSolver<T>) -> Self {
        self.reuse_solver = Some(reuse_solver);
        self
    }

    /// Sets the iteration monitor.
    pub fn with_monitor<M>(mut self, monitor: M) -> Self
    where
        M: IterationMonitor<T> + 'a,
    {
        self.monitor = Box::new(monitor);
        self
    }

    pub fn build(self) -> DecompositionEngine<'a, T> {
        DecompositionEngine {
            master: self.master,
            day_solver: self.day_solver,
            matcher: self.matcher,
            reuse_solver: self.reuse_solver,
            monitor: self.monitor,
            config: self.config,
        }
    }
}

/// The iterative master/subproblem decomposition engine.
pub struct DecompositionEngine<'a, T>
where
    T: PrimInt + Signed,
{
    master: &'a mut dyn MasterSolver<T>,
    day_solver: &'a mut dyn DaySolver<T>,
    matcher: Option<&'a mut dyn MatchEnumerator>,
    reuse_solver: Option<&'a mut dyn ReuseSolver<T>>,
    monitor: Box<dyn IterationMonitor<T> + 'a>,
    config: EngineConfig,
}

impl<'a, T> DecompositionEngine<'a, T>
where
    T: PrimInt + Signed,
{
    /// Returns the engine configuration.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the decomposition loop on `instance`.
    ///
    /// # Panics
    ///
    /// Panics if the master backend returns a plan not spanning the
    /// instance horizon.
    pub fn run(&mut self, instance: &Instance<T>) -> Result<EngineOutcome<T>, EngineError> {
        let start = Instant::now();
        let mut statistics = EngineStatistics::default();
        let validator = ScheduleValidator;
        let generator = CoreGenerator::new(self.config.core_strategy);
        let subsumption = DaySubsumptionIndex::build(instance);
        let expander = CoreExpander::new(instance, &subsumption);
        let mut store = CoreStore::new();
        let mut cache = SolutionReuseCache::new(instance.num_days());
        let mut best: Option<FinalSchedule<T>> = None;
        let mut reason = TerminationReason::IterationLimitReached;

        self.monitor.on_run_start(instance);

        for iteration in 0..self.config.max_iterations {
            statistics.on_iteration();

            // Master solve under the full accumulated cut list.
            let num_cuts = store.num_cuts();
            statistics.on_master_solve();
            let plan = {
                let cuts = store.cut_constraints();
                self.master
                    .solve(instance, &cuts)
                    .map_err(|error| EngineError::from((iteration, error)))?
            };
            assert!(
                plan.num_days() == instance.num_days(),
                "master plan spans {} days but the instance has {}",
                plan.num_days(),
                instance.num_days()
            );
            self.check(iteration, || validator.check_master_plan(instance, &plan))?;
            let master_value = plan.value(instance);
            debug!(
                iteration,
                master_value = master_value.to_i64().unwrap_or(-1),
                cuts = num_cuts,
                "master solved"
            );

            // Reuse short-circuit: a mix of cached day schedules reaching
            // the master bound makes further subproblem solves pointless.
            if self.config.use_reuse_cache && iteration > 1 {
                if let Some(reuse_solver) = self.reuse_solver.as_mut() {
                    statistics.on_reuse_attempt();
                    let model = cache.build_model(instance);
                    if let Some(selection) = reuse_solver.solve(&model) {
                        if selection.objective_value >= master_value {
                            let composed = cache.compose_selection(instance, &selection);
                            self.check(iteration, || {
                                validator.check_final_schedule(instance, &composed)
                            })?;
                            debug!(iteration, "reuse selection matches the master bound");
                            best = Some(composed);
                            reason = TerminationReason::ReuseMatched;
                            break;
                        }
                    }
                }
            }

            // Per-day realization. Days without proposals are not handed to
            // the backend.
            let mut schedules: Vec<DaySchedule<T>> = Vec::with_capacity(instance.num_days());
            for day in instance.days() {
                if plan.proposals_for(day).is_empty() {
                    schedules.push(DaySchedule::new(Vec::new(), Vec::new(), T::zero(), true));
                    continue;
                }
                statistics.on_day_solve();
                let schedule = self
                    .day_solver
                    .solve(DayProblem {
                        day,
                        requests: plan.proposals_for(day),
                        instance,
                    })
                    .map_err(|source| EngineError::DayBackend { iteration, source })?;
                if !schedule.is_certified() {
                    statistics.on_uncertified_day_solve();
                    warn!(iteration, day = day.get(), "day schedule without optimality certificate");
                }
                self.check(iteration, || {
                    validator.check_day_schedule(instance, day, plan.proposals_for(day), &schedule)
                })?;
                schedules.push(schedule);
            }
            let day_rejections: usize =
                schedules.iter().map(|schedule| schedule.rejected().len()).sum();
            statistics.on_day_rejections(day_rejections as u64);

            // Compose and track the best schedule.
            let composed = compose(instance, &plan, &schedules);
            self.check(iteration, || validator.check_final_schedule(instance, &composed))?;
            let achieved_value = composed.value();

            if self.config.use_reuse_cache {
                for (day_id, schedule) in schedules.iter().enumerate() {
                    cache.record(
                        IterationIndex::new(iteration),
                        DayIndex::new(day_id),
                        schedule,
                    );
                }
            }

            let improved = best
                .as_ref()
                .is_none_or(|current| achieved_value > current.value());
            if improved {
                best = Some(composed);
            }
            let best_value = best
                .as_ref()
                .map(|schedule| schedule.value())
                .unwrap_or_else(T::zero);

            if day_rejections == 0 {
                self.monitor.on_iteration(&IterationSummary {
                    iteration,
                    master_value,
                    achieved_value,
                    best_value,
                    day_rejections,
                    cores_generated: 0,
                    cores_accepted: 0,
                    total_cuts: store.num_cuts(),
                });
                reason = TerminationReason::Converged;
                break;
            }

            // The gap compares the master bound to what this iteration
            // actually realized, not to the best seen so far.
            if self.config.early_stop_gap > 0.0 {
                let master = master_value.to_f64().unwrap_or(0.0);
                let achieved = achieved_value.to_f64().unwrap_or(0.0);
                if master > 0.0 && (master - achieved) / master <= self.config.early_stop_gap {
                    self.monitor.on_iteration(&IterationSummary {
                        iteration,
                        master_value,
                        achieved_value,
                        best_value,
                        day_rejections,
                        cores_generated: 0,
                        cores_accepted: 0,
                        total_cuts: store.num_cuts(),
                    });
                    reason = TerminationReason::GapReached;
                    break;
                }
            }

            // Derive, expand, and store new cuts.
            let mut cores = generator.generate(instance, &schedules);
            if self.config.expand_core_days {
                expander.expand_days(&mut cores);
                cores = expander.retain_reachable_days(cores);
            }
            if self.config.generalization.is_enabled() {
                if let Some(matcher) = self.matcher.as_mut() {
                    let generalized =
                        expander.generalize(&cores, self.config.generalization, *matcher);
                    cores.extend(generalized);
                }
            }
            let cores_generated = cores.len();
            statistics.on_cores_generated(cores_generated as u64);
            let accepted = store.merge(cores);
            let cores_accepted = accepted.len();
            statistics.on_cores_accepted(cores_accepted as u64);
            let cuts_added: usize = accepted.iter().map(|core| core.days().len()).sum();
            statistics.on_cuts_added(cuts_added as u64);
            if cores_accepted == 0 {
                // Without new cuts the master will repeat its plan; keep
                // iterating up to the cap in case the reuse check fires.
                warn!(iteration, "iteration produced no new cuts");
            }

            self.monitor.on_iteration(&IterationSummary {
                iteration,
                master_value,
                achieved_value,
                best_value,
                day_rejections,
                cores_generated,
                cores_accepted,
                total_cuts: store.num_cuts(),
            });
        }

        statistics.set_total_time(start.elapsed());
        self.monitor.on_run_end(&statistics);

        let best = best.unwrap_or_else(|| FinalSchedule::empty(instance.num_days()));
        Ok(EngineOutcome::new(best, reason, statistics))
    }

    fn check<F>(&self, iteration: usize, violations: F) -> Result<(), EngineError>
    where
        F: FnOnce() -> Vec<StructuralViolation>,
    {
        match self.config.validation {
            ValidationMode::Off => Ok(()),
            ValidationMode::Log => {
                for violation in violations() {
                    warn!(iteration, %violation, "structural violation");
                }
                Ok(())
            }
            ValidationMode::Strict => match violations().into_iter().next() {
                None => Ok(()),
                Some(violation) => Err(EngineError::Validation {
                    iteration,
                    violation,
                }),
            },
        }
    }
}

/// Composes the per-day schedules of one iteration into a `FinalSchedule`.
///
/// The rejected windows are the master's rejections plus, for every request
/// a day rejected, all windows of that request containing the day.
fn compose<T>(
    instance: &Instance<T>,
    plan: &MasterPlan<T>,
    schedules: &[DaySchedule<T>],
) -> FinalSchedule<T>
where
    T: PrimInt + Signed,
{
    let mut value = T::zero();
    let scheduled: Vec<Vec<Assignment<T>>> = schedules
        .iter()
        .map(|schedule| {
            for assignment in schedule.assignments() {
                value = value + instance.value_of(assignment.request);
            }
            schedule.assignments().to_vec()
        })
        .collect();

    let mut rejected: Vec<RejectedWindow> = plan.rejected().to_vec();
    for (day_id, schedule) in schedules.iter().enumerate() {
        let day = DayIndex::new(day_id);
        for request in schedule.rejected() {
            for window in instance.windows_of(*request) {
                if window.window.contains(day) {
                    rejected.push(RejectedWindow {
                        request: *request,
                        window: window.window,
                    });
                }
            }
        }
    }
    rejected.sort();
    rejected.dedup();

    FinalSchedule::new(scheduled, rejected, value)
}
