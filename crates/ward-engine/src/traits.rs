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

//! Seams to the external optimization backends.
//!
//! The engine owns the iteration logic but delegates every actual solve to
//! trait objects: the relaxed day-selection master, the per-day realization
//! subproblem, the perfect-matching enumerator used for core generalization,
//! and the selection model of the solution-reuse cache. Test code scripts
//! these traits with table-driven stubs; production code wires them to real
//! MILP or ASP backends.

use crate::err::{DaySolveError, MasterSolveError};
use crate::reuse::{ReuseModel, ReuseSelection};
use num_traits::{PrimInt, Signed};
use ward_model::index::DayIndex;
use ward_model::instance::{Instance, ServiceRequest};
use ward_model::solution::{DaySchedule, MasterPlan};

/// A combinatorial no-good cut handed to the master backend.
///
/// The backend must ensure that of the `components`, at most
/// `components.len() - 1` are proposed together on `day`.
#[derive(Clone, Copy, Debug)]
pub struct CutConstraint<'a> {
    pub components: &'a [ServiceRequest],
    pub day: DayIndex,
}

/// The relaxed master model: picks a serving day inside the window for every
/// request window, or rejects the window, subject to the accumulated cuts.
pub trait MasterSolver<T>
where
    T: PrimInt + Signed,
{
    /// Solves the master model under the given cuts.
    ///
    /// The full cut list is handed over on every call; the backend decides
    /// whether to rebuild or amend its model.
    fn solve(
        &mut self,
        instance: &Instance<T>,
        cuts: &[CutConstraint<'_>],
    ) -> Result<MasterPlan<T>, MasterSolveError>;
}

/// One per-day subproblem: the requests the master proposed for a single day.
#[derive(Clone, Copy, Debug)]
pub struct DayProblem<'a, T>
where
    T: PrimInt + Signed,
{
    pub day: DayIndex,
    pub requests: &'a [ServiceRequest],
    pub instance: &'a Instance<T>,
}

/// The per-day realization subproblem: assigns each proposed request an
/// operator and a start time, or rejects it.
pub trait DaySolver<T>
where
    T: PrimInt + Signed,
{
    /// Solves one day. Accepted and rejected requests must partition the
    /// proposed set.
    fn solve(&mut self, problem: DayProblem<'_, T>) -> Result<DaySchedule<T>, DaySolveError>;
}

/// One admissible substitution arc of a core generalization problem:
/// `source` (a core component) may be replaced by `target`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MatchArc {
    pub source: ServiceRequest,
    pub target: ServiceRequest,
}

/// Enumerates perfect matchings on the substitution graph of a core.
///
/// A matching assigns every distinct source exactly one of its targets, with
/// pairwise distinct targets. Returning an empty list means no perfect
/// matching exists.
pub trait MatchEnumerator {
    /// Enumerates up to `limit` perfect matchings over `arcs`. Each returned
    /// matching holds one arc per distinct source of `arcs`.
    fn enumerate(&mut self, arcs: &[MatchArc], limit: usize) -> Vec<Vec<MatchArc>>;
}

/// The selection model of the solution-reuse cache: per day, chooses one
/// previously solved iteration so that the combined schedule resolves every
/// window and maximizes the achieved value.
pub trait ReuseSolver<T>
where
    T: PrimInt + Signed,
{
    /// Solves the selection model. Returns `None` if no combination of
    /// cached day schedules resolves every window.
    fn solve(&mut self, model: &ReuseModel<'_, T>) -> Option<ReuseSelection<T>>;
}
