/*
Copyright 2020 Google LLC

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use thiserror::Error;

/// Failures of the compiler itself, as opposed to user errors.
///
/// User errors (rule violations in the program under compilation) are never
/// surfaced through this type: they accumulate as diagnostics and compilation
/// of other components continues. A referenced type missing from the current
/// round is not an error either; the originating element is deferred.
#[derive(Debug, Error)]
pub enum InternalError {
    /// An invariant of the compiler was violated. Indicates a bug in the
    /// compiler, never in the program under compilation.
    #[error("internal invariant violated: {0}")]
    InvariantViolated(String),
}

macro_rules! invariant {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(crate::error::InternalError::InvariantViolated(format!($($arg)*)));
        }
    };
}

pub(crate) use invariant;
