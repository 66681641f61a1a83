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

//! # Ward Engine
//!
//! The iterative master/subproblem decomposition engine for multi-day care
//! scheduling. A relaxed master model picks a serving day for every request
//! window; independent per-day subproblems try to realize the proposals
//! against operator rosters; rejections are turned into combinatorial no-good
//! cuts ("cores"), optionally expanded to further days and structurally
//! similar request sets, and fed back to the master until the loop converges.
//!
//! ## Modules
//!
//! - `traits`: The seams to the external optimization backends: the master
//!   model, the per-day subproblem, the matching enumerator, and the
//!   solution-reuse model.
//! - `cores`: Core generation from day rejections, day subsumption, core
//!   expansion, and the deduplicating `CoreStore`.
//! - `reuse`: The sparse cache of previously solved day subproblems and the
//!   reuse model built from it.
//! - `engine`: The `DecompositionEngine` driving the iteration loop.
//! - `monitor`: Observer hooks invoked once per iteration.
//! - `stats`: Counters collected over a run.
//! - `result`: Termination reasons and the final `EngineOutcome`.

pub mod cores;
pub mod engine;
pub mod err;
pub mod monitor;
pub mod result;
pub mod reuse;
pub mod stats;
pub mod traits;
