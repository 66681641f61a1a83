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

//! Error types of the decomposition engine and its backend seams.

use ward_model::index::DayIndex;
use ward_model::validate::StructuralViolation;

/// The error type for master model solves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterSolveError {
    /// The master model admits no solution, even before any cuts.
    Infeasible,
    /// The backend failed for reasons unrelated to the model.
    Backend(String),
}

impl std::fmt::Display for MasterSolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Infeasible => write!(f, "Master model is infeasible"),
            Self::Backend(message) => write!(f, "Master backend failed: {}", message),
        }
    }
}

impl std::error::Error for MasterSolveError {}

/// The error type for per-day subproblem solves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySolveError {
    pub day: DayIndex,
    pub message: String,
}

impl std::fmt::Display for DaySolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Day backend failed on day {}: {}",
            self.day.get(),
            self.message
        )
    }
}

impl std::error::Error for DaySolveError {}

/// The error type for engine runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The master model became infeasible; the accumulated cuts contradict
    /// the window structure, which indicates a backend or model defect.
    MasterInfeasible { iteration: usize },
    /// The master backend failed.
    MasterBackend { iteration: usize, message: String },
    /// A per-day backend failed.
    DayBackend { iteration: usize, source: DaySolveError },
    /// A backend result violated a structural property while validation ran
    /// in strict mode.
    Validation {
        iteration: usize,
        violation: StructuralViolation,
    },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MasterInfeasible { iteration } => {
                write!(f, "Master model infeasible in iteration {}", iteration)
            }
            Self::MasterBackend { iteration, message } => {
                write!(f, "Master backend failed in iteration {}: {}", iteration, message)
            }
            Self::DayBackend { iteration, source } => {
                write!(f, "Iteration {}: {}", iteration, source)
            }
            Self::Validation { iteration, violation } => {
                write!(f, "Structural violation in iteration {}: {}", iteration, violation)
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DayBackend { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<(usize, MasterSolveError)> for EngineError {
    fn from((iteration, error): (usize, MasterSolveError)) -> Self {
        match error {
            MasterSolveError::Infeasible => Self::MasterInfeasible { iteration },
            MasterSolveError::Backend(message) => Self::MasterBackend { iteration, message },
        }
    }
}
