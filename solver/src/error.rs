// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The caller-facing error taxonomy of the solver boundary.

use engine::EngineError;
use thiserror::Error;

/// An error from a facade operation.
///
/// The three categories are deliberately distinguishable: a capability
/// the backend can never provide, a structurally invalid call against a
/// capability it does provide, and a designed-for feature this binding
/// has not finished. Every failure is local to the operation that
/// raised it; the session stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// The backend cannot express this request at all.
    #[error("unsupported capability: {0}")]
    Unsupported(String),
    /// The request is structurally invalid as made.
    #[error("incorrect usage: {0}")]
    IncorrectUsage(String),
    /// Designed for but not finished in this binding.
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// The wrapped engine failed internally.
    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<EngineError> for SolverError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Unsupported(_) => SolverError::Unsupported(e.to_string()),
            EngineError::Unimplemented(_) => SolverError::NotImplemented(e.to_string()),
            // the 64-bit width cap is a limit of this backend, not a
            // structural mistake by the caller
            EngineError::WidthLimit(_) => SolverError::Unsupported(e.to_string()),
            EngineError::SolverFailed => SolverError::Backend(e.to_string()),
            EngineError::SortMismatch(_)
            | EngineError::InvalidLiteral { .. }
            | EngineError::ZeroWidth
            | EngineError::SliceBounds { .. }
            | EngineError::ZeroRepeat
            | EngineError::NoModel => SolverError::IncorrectUsage(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_the_right_category() {
        let e: SolverError = EngineError::ZeroWidth.into();
        assert!(matches!(e, SolverError::IncorrectUsage(_)));
        let e: SolverError = EngineError::Unsupported("arrays".to_string()).into();
        assert!(matches!(e, SolverError::Unsupported(_)));
        let e: SolverError = EngineError::Unimplemented("values".to_string()).into();
        assert!(matches!(e, SolverError::NotImplemented(_)));
        let e: SolverError = EngineError::WidthLimit(128).into();
        assert!(matches!(e, SolverError::Unsupported(_)));
    }
}
