// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Per-arity dispatch tables from the neutral operator vocabulary to
//! the backend's native node builders.
//!
//! Each lookup returns an explicit `Option`: absence from a table is a
//! first-class answer, never a caught failure. The facade combines
//! these with [`known`] to tell "wrong operand count for this
//! operator" apart from "this backend never implements this operator".
//! The indexed family (extract, repeat, extends) is deliberately in no
//! table here; those resolve through their construction-time indices.

use engine::{Engine, EngineError, NodeId};
use ir::PrimOp;

pub(crate) type Unary = fn(&mut Engine, NodeId) -> Result<NodeId, EngineError>;
pub(crate) type Binary = fn(&mut Engine, NodeId, NodeId) -> Result<NodeId, EngineError>;
pub(crate) type Ternary = fn(&mut Engine, NodeId, NodeId, NodeId) -> Result<NodeId, EngineError>;

/// The backend builder for a one-operand application of `op`.
pub(crate) fn unary(op: PrimOp) -> Option<Unary> {
    let f: Unary = match op {
        PrimOp::Not => Engine::not,
        PrimOp::BvNeg => Engine::bvneg,
        PrimOp::BvNot => Engine::bvnot,
        _ => return None,
    };
    Some(f)
}

/// The backend builder for a two-operand application of `op`.
pub(crate) fn binary(op: PrimOp) -> Option<Binary> {
    let f: Binary = match op {
        PrimOp::And => Engine::and,
        PrimOp::Or => Engine::or,
        PrimOp::Xor => Engine::xor,
        PrimOp::Implies => Engine::implies,
        PrimOp::Iff => Engine::iff,
        PrimOp::Equal => Engine::eq,
        PrimOp::Distinct => Engine::distinct,
        PrimOp::BvAdd => Engine::bvadd,
        PrimOp::BvSub => Engine::bvsub,
        PrimOp::BvMul => Engine::bvmul,
        PrimOp::BvUdiv => Engine::bvudiv,
        PrimOp::BvUrem => Engine::bvurem,
        PrimOp::BvAnd => Engine::bvand,
        PrimOp::BvOr => Engine::bvor,
        PrimOp::BvXor => Engine::bvxor,
        PrimOp::BvShl => Engine::bvshl,
        PrimOp::BvLshr => Engine::bvlshr,
        PrimOp::BvAshr => Engine::bvashr,
        PrimOp::BvUlt => Engine::bvult,
        PrimOp::BvUle => Engine::bvule,
        PrimOp::BvUgt => Engine::bvugt,
        PrimOp::BvUge => Engine::bvuge,
        PrimOp::BvSlt => Engine::bvslt,
        PrimOp::BvSle => Engine::bvsle,
        PrimOp::BvSgt => Engine::bvsgt,
        PrimOp::BvSge => Engine::bvsge,
        PrimOp::Concat => Engine::concat,
        PrimOp::Select => Engine::select,
        _ => return None,
    };
    Some(f)
}

/// The backend builder for a three-operand application of `op`.
pub(crate) fn ternary(op: PrimOp) -> Option<Ternary> {
    let f: Ternary = match op {
        PrimOp::Ite => Engine::ite,
        PrimOp::Store => Engine::store,
        _ => return None,
    };
    Some(f)
}

/// Whether the backend implements `op` at any arity (including the
/// indexed family, which resolves outside the tables).
pub(crate) fn known(op: PrimOp) -> bool {
    op.is_indexed()
        || unary(op).is_some()
        || binary(op).is_some()
        || ternary(op).is_some()
}
