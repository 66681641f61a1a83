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

//! # Ward Core
//!
//! Foundational primitives for the Ward scheduling ecosystem. This crate
//! consolidates the reusable building blocks that underpin the model and
//! engine crates, with a focus on correctness and zero-cost abstractions.
//!
//! ## Modules
//!
//! - `math`: Closed-open interval `[start, end)` primitives with validation,
//!   containment and overlap queries, and integer-point iteration.
//! - `utils`: Phantom-tagged, strongly typed indices (`TypedIndex<T>`) that
//!   prevent mixing index spaces (patients, services, days, ...) at compile
//!   time while compiling down to a transparent `usize`.
//!
//! Refer to each module for detailed APIs and examples.

pub mod math;
pub mod utils;
