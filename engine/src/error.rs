// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Errors reported by the word-level engine.

use thiserror::Error;

/// An error from a node-construction or solving call on the engine.
///
/// The facade above maps these into its caller-facing taxonomy;
/// within this crate they stay close to the operation that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Operand sorts do not fit the requested primitive.
    #[error("sort mismatch: {0}")]
    SortMismatch(String),
    /// A literal value does not fit the requested sort.
    #[error("literal {value} does not fit sort {sort}")]
    InvalidLiteral {
        /// The requested value.
        value: u64,
        /// Rendering of the sort it was requested at.
        sort: String,
    },
    /// Bit-vector sorts must have at least one bit.
    #[error("bit-vector width must be at least 1")]
    ZeroWidth,
    /// Widths above 64 bits are not representable in this engine.
    #[error("bit-vector width {0} exceeds the engine's 64-bit limit")]
    WidthLimit(u64),
    /// Slice bounds fell outside the operand, or upper < lower.
    #[error("slice bounds [{upper}:{lower}] invalid for width {width}")]
    SliceBounds {
        /// Requested upper bit index.
        upper: u32,
        /// Requested lower bit index.
        lower: u32,
        /// Width of the operand being sliced.
        width: u32,
    },
    /// Repeat requires a count of at least 1.
    #[error("repeat count must be at least 1")]
    ZeroRepeat,
    /// The engine cannot express this construct at all.
    #[error("unsupported by the word-level engine: {0}")]
    Unsupported(String),
    /// Designed-for but not finished in this engine.
    #[error("not implemented: {0}")]
    Unimplemented(String),
    /// Value extraction was requested without a satisfiable check.
    #[error("no model available; check_sat must return sat first")]
    NoModel,
    /// The SAT solver gave up without an answer.
    #[error("the SAT solver failed to reach a verdict")]
    SolverFailed,
}
