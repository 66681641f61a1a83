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

use crate::stats::EngineStatistics;
use num_traits::{PrimInt, Signed};
use ward_model::solution::FinalSchedule;

/// Why the decomposition loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// An iteration realized every master proposal; the result is optimal
    /// with respect to the master relaxation.
    Converged,
    /// The relative gap between the master bound and the achieved value
    /// dropped to the configured threshold.
    GapReached,
    /// A combination of cached day schedules already reached the master
    /// bound; no further subproblem solves were needed.
    ReuseMatched,
    /// The iteration cap was hit; the best schedule seen so far is returned.
    IterationLimitReached,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Converged => write!(f, "Converged"),
            Self::GapReached => write!(f, "GapReached"),
            Self::ReuseMatched => write!(f, "ReuseMatched"),
            Self::IterationLimitReached => write!(f, "IterationLimitReached"),
        }
    }
}

/// Result of the engine after termination.
#[derive(Debug, Clone)]
pub struct EngineOutcome<T>
where
    T: PrimInt + Signed,
{
    best: FinalSchedule<T>,
    termination_reason: TerminationReason,
    statistics: EngineStatistics,
}

impl<T> EngineOutcome<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(
        best: FinalSchedule<T>,
        termination_reason: TerminationReason,
        statistics: EngineStatistics,
    ) -> Self {
        Self {
            best,
            termination_reason,
            statistics,
        }
    }

    /// Returns the best schedule found.
    #[inline]
    pub fn best(&self) -> &FinalSchedule<T> {
        &self.best
    }

    /// Consumes the outcome and returns the best schedule.
    #[inline]
    pub fn into_best(self) -> FinalSchedule<T> {
        self.best
    }

    /// Returns the termination reason.
    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    /// Returns the engine statistics.
    #[inline]
    pub fn statistics(&self) -> &EngineStatistics {
        &self.statistics
    }
}
