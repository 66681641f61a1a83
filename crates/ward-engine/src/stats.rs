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

use std::time::Duration;

/// Statistics collected during one run of the decomposition engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineStatistics {
    /// Iterations started.
    pub iterations: u64,
    /// Master model solves.
    pub master_solves: u64,
    /// Per-day subproblem solves.
    pub day_solves: u64,
    /// Day solves that ended without an optimality certificate.
    pub uncertified_day_solves: u64,
    /// Requests rejected by day subproblems, summed over iterations.
    pub day_rejections: u64,
    /// Cores produced by generation and expansion, before deduplication.
    pub cores_generated: u64,
    /// Cores accepted into the store after deduplication.
    pub cores_accepted: u64,
    /// (core, day) cuts added to the master model.
    pub cuts_added: u64,
    /// Reuse-selection solves attempted.
    pub reuse_attempts: u64,
    /// Total time spent in the engine.
    pub time_total: Duration,
}

impl EngineStatistics {
    #[inline]
    pub fn on_iteration(&mut self) {
        self.iterations = self.iterations.saturating_add(1);
    }

    #[inline]
    pub fn on_master_solve(&mut self) {
        self.master_solves = self.master_solves.saturating_add(1);
    }

    #[inline]
    pub fn on_day_solve(&mut self) {
        self.day_solves = self.day_solves.saturating_add(1);
    }

    #[inline]
    pub fn on_uncertified_day_solve(&mut self) {
        self.uncertified_day_solves = self.uncertified_day_solves.saturating_add(1);
    }

    #[inline]
    pub fn on_day_rejections(&mut self, count: u64) {
        self.day_rejections = self.day_rejections.saturating_add(count);
    }

    #[inline]
    pub fn on_cores_generated(&mut self, count: u64) {
        self.cores_generated = self.cores_generated.saturating_add(count);
    }

    #[inline]
    pub fn on_cores_accepted(&mut self, count: u64) {
        self.cores_accepted = self.cores_accepted.saturating_add(count);
    }

    #[inline]
    pub fn on_cuts_added(&mut self, count: u64) {
        self.cuts_added = self.cuts_added.saturating_add(count);
    }

    #[inline]
    pub fn on_reuse_attempt(&mut self) {
        self.reuse_attempts = self.reuse_attempts.saturating_add(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }
}

impl std::fmt::Display for EngineStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Ward Engine Statistics:")?;
        writeln!(f, "  Iterations:            {}", self.iterations)?;
        writeln!(f, "  Master solves:         {}", self.master_solves)?;
        writeln!(f, "  Day solves:            {}", self.day_solves)?;
        writeln!(f, "  Uncertified day solves:{}", self.uncertified_day_solves)?;
        writeln!(f, "  Day rejections:        {}", self.day_rejections)?;
        writeln!(f, "  Cores generated:       {}", self.cores_generated)?;
        writeln!(f, "  Cores accepted:        {}", self.cores_accepted)?;
        writeln!(f, "  Cuts added:            {}", self.cuts_added)?;
        writeln!(f, "  Reuse attempts:        {}", self.reuse_attempts)?;
        writeln!(f, "  Total time:            {:.2?}", self.time_total)?;
        Ok(())
    }
}
