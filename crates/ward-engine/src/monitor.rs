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

//! Observer hooks invoked by the engine once per iteration.

use crate::stats::EngineStatistics;
use num_traits::{PrimInt, Signed};
use std::time::{Duration, Instant};
use ward_model::instance::Instance;

/// A snapshot of one completed iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationSummary<T> {
    pub iteration: usize,
    /// Value of the master plan (the current upper bound).
    pub master_value: T,
    /// Value the day schedules actually realized.
    pub achieved_value: T,
    /// Best achieved value over all iterations so far.
    pub best_value: T,
    /// Requests rejected by day subproblems in this iteration.
    pub day_rejections: usize,
    /// Cores produced in this iteration before deduplication.
    pub cores_generated: usize,
    /// Cores the store accepted.
    pub cores_accepted: usize,
    /// Total (core, day) cuts the master sees in the next iteration.
    pub total_cuts: usize,
}

/// Trait for observing the progress of the decomposition loop.
pub trait IterationMonitor<T>: Send + Sync
where
    T: PrimInt + Signed,
{
    /// Called once before the first iteration.
    fn on_run_start(&mut self, instance: &Instance<T>);

    /// Called after every completed iteration.
    fn on_iteration(&mut self, summary: &IterationSummary<T>);

    /// Called once after the loop terminated.
    fn on_run_end(&mut self, statistics: &EngineStatistics);

    /// Returns the name of the monitor.
    fn name(&self) -> &str;
}

impl<T> std::fmt::Debug for dyn IterationMonitor<T> + '_
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IterationMonitor({})", self.name())
    }
}

/// A monitor that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOperationMonitor;

impl<T> IterationMonitor<T> for NoOperationMonitor
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    fn on_run_start(&mut self, _instance: &Instance<T>) {}

    #[inline(always)]
    fn on_iteration(&mut self, _summary: &IterationSummary<T>) {}

    #[inline(always)]
    fn on_run_end(&mut self, _statistics: &EngineStatistics) {}

    fn name(&self) -> &str {
        "NoOperationMonitor"
    }
}

/// A monitor that forwards every event to its children, in insertion order.
pub struct CompositeMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    monitors: Vec<Box<dyn IterationMonitor<T> + 'a>>,
}

impl<'a, T> Default for CompositeMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> CompositeMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    /// Creates a new empty `CompositeMonitor`.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    /// Adds a new monitor to the composite monitor.
    #[inline(always)]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: IterationMonitor<T> + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    /// Returns the number of monitors contained in the composite monitor.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Returns `true` if the composite monitor contains no monitors.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a, T> IterationMonitor<T> for CompositeMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    fn on_run_start(&mut self, instance: &Instance<T>) {
        for monitor in &mut self.monitors {
            monitor.on_run_start(instance);
        }
    }

    #[inline(always)]
    fn on_iteration(&mut self, summary: &IterationSummary<T>) {
        for monitor in &mut self.monitors {
            monitor.on_iteration(summary);
        }
    }

    #[inline(always)]
    fn on_run_end(&mut self, statistics: &EngineStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_run_end(statistics);
        }
    }

    fn name(&self) -> &str {
        "CompositeMonitor"
    }
}

/// A monitor that prints one fixed-width table row per iteration.
#[derive(Debug, Clone)]
pub struct LogIterationMonitor {
    start_time: Instant,
}

impl LogIterationMonitor {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    #[inline(always)]
    fn print_header(&self) {
        println!(
            "{:<9} | {:<5} | {:<12} | {:<12} | {:<12} | {:<10} | {:<10}",
            "Elapsed", "Iter", "Master", "Achieved", "Best", "Rejections", "Cuts"
        );
        println!("{}", "-".repeat(86));
    }
}

impl Default for LogIterationMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IterationMonitor<T> for LogIterationMonitor
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn on_run_start(&mut self, _instance: &Instance<T>) {
        self.start_time = Instant::now();
        self.print_header();
    }

    fn on_iteration(&mut self, summary: &IterationSummary<T>) {
        let elapsed: Duration = self.start_time.elapsed();
        let elapsed_field = format!("{:.1}s", elapsed.as_secs_f32());
        println!(
            "{:<9} | {:<5} | {:<12} | {:<12} | {:<12} | {:<10} | {:<10}",
            elapsed_field,
            summary.iteration,
            summary.master_value,
            summary.achieved_value,
            summary.best_value,
            summary.day_rejections,
            summary.total_cuts
        );
    }

    fn on_run_end(&mut self, statistics: &EngineStatistics) {
        println!("{}", "-".repeat(86));
        print!("{}", statistics);
    }

    fn name(&self) -> &str {
        "LogIterationMonitor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ward_model::instance::InstanceBuilder;

    type IntegerType = i64;

    #[derive(Default)]
    struct CountingMonitor {
        starts: usize,
        iterations: usize,
        ends: usize,
    }

    impl IterationMonitor<IntegerType> for CountingMonitor {
        fn on_run_start(&mut self, _instance: &Instance<IntegerType>) {
            self.starts += 1;
        }

        fn on_iteration(&mut self, _summary: &IterationSummary<IntegerType>) {
            self.iterations += 1;
        }

        fn on_run_end(&mut self, _statistics: &EngineStatistics) {
            self.ends += 1;
        }

        fn name(&self) -> &str {
            "CountingMonitor"
        }
    }

    #[test]
    fn test_composite_fans_out() {
        let mut builder = InstanceBuilder::<IntegerType>::new(1);
        builder.add_care_unit("cu0");
        let instance = builder.build().expect("instance must build");

        let mut composite = CompositeMonitor::new();
        composite.add_monitor(CountingMonitor::default());
        composite.add_monitor(NoOperationMonitor);
        assert_eq!(composite.len(), 2);

        composite.on_run_start(&instance);
        composite.on_iteration(&IterationSummary {
            iteration: 0,
            master_value: 10,
            achieved_value: 8,
            best_value: 8,
            day_rejections: 1,
            cores_generated: 1,
            cores_accepted: 1,
            total_cuts: 1,
        });
        composite.on_run_end(&EngineStatistics::default());
    }
}
