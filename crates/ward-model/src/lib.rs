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

//! # Ward Model
//!
//! The validated, immutable problem model for multi-day, capacity-constrained
//! care scheduling: services offered by care units, per-day operator rosters,
//! and patients requesting services inside inclusive day windows.
//!
//! ## Modules
//!
//! - `index`: Typed index tags for patients, services, care units, days,
//!   operators, and iterations.
//! - `instance`: The `Instance` (Structure-of-Arrays layout) and its
//!   validating `InstanceBuilder`, including the precomputed per-day
//!   reachable-request index.
//! - `solution`: Solution records exchanged between the engine and the
//!   solver seams: master plans, per-day schedules, and the composed final
//!   schedule.
//! - `validate`: Structural validators asserting window adherence, capacity
//!   respect, and the exactly-one resolution property of final schedules.
//!
//! Construction:
//! - Use `InstanceBuilder` and call `InstanceBuilder::build` to obtain a
//!   validated `Instance`.

pub mod index;
pub mod instance;
pub mod solution;
pub mod validate;
