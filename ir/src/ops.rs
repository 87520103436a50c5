// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The closed vocabulary of primitive operators.
//!
//! An operator's arity is not part of its identity here; the solver
//! layer resolves arity through its per-arity dispatch tables. What is
//! part of the identity is the number of construction-time integer
//! indices an operator carries (see [`PrimOp::index_arity`]).

use serde::Serialize;
use std::fmt;

/// A primitive operator drawn from the closed vocabulary.
#[allow(missing_docs)]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, PartialOrd, Ord)]
pub enum PrimOp {
    // boolean connectives
    Not,
    And,
    Or,
    Xor,
    Implies,
    Iff,
    Ite,
    // core
    Equal,
    Distinct,
    // bit-vector arithmetic
    BvNeg,
    BvAdd,
    BvSub,
    BvMul,
    BvUdiv,
    BvUrem,
    // bit-vector bitwise and shifts
    BvNot,
    BvAnd,
    BvOr,
    BvXor,
    BvShl,
    BvLshr,
    BvAshr,
    // bit-vector comparisons
    BvUlt,
    BvUle,
    BvUgt,
    BvUge,
    BvSlt,
    BvSle,
    BvSgt,
    BvSge,
    // bit-vector structure
    Concat,
    Extract,
    Repeat,
    ZeroExtend,
    SignExtend,
    // arrays
    Select,
    Store,
}

impl PrimOp {
    /// The number of construction-time integer indices this operator
    /// structurally requires: 2 for `Extract` (upper and lower bit
    /// bounds), 1 for the repeat/extend family, 0 for everything else.
    pub fn index_arity(&self) -> usize {
        match self {
            PrimOp::Extract => 2,
            PrimOp::Repeat | PrimOp::ZeroExtend | PrimOp::SignExtend => 1,
            _ => 0,
        }
    }

    /// Whether this operator is applied with construction-time indices
    /// rather than directly by name.
    pub fn is_indexed(&self) -> bool {
        self.index_arity() > 0
    }
}

impl fmt::Display for PrimOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimOp::Not => "not",
            PrimOp::And => "and",
            PrimOp::Or => "or",
            PrimOp::Xor => "xor",
            PrimOp::Implies => "=>",
            PrimOp::Iff => "<=>",
            PrimOp::Ite => "ite",
            PrimOp::Equal => "=",
            PrimOp::Distinct => "distinct",
            PrimOp::BvNeg => "bvneg",
            PrimOp::BvAdd => "bvadd",
            PrimOp::BvSub => "bvsub",
            PrimOp::BvMul => "bvmul",
            PrimOp::BvUdiv => "bvudiv",
            PrimOp::BvUrem => "bvurem",
            PrimOp::BvNot => "bvnot",
            PrimOp::BvAnd => "bvand",
            PrimOp::BvOr => "bvor",
            PrimOp::BvXor => "bvxor",
            PrimOp::BvShl => "bvshl",
            PrimOp::BvLshr => "bvlshr",
            PrimOp::BvAshr => "bvashr",
            PrimOp::BvUlt => "bvult",
            PrimOp::BvUle => "bvule",
            PrimOp::BvUgt => "bvugt",
            PrimOp::BvUge => "bvuge",
            PrimOp::BvSlt => "bvslt",
            PrimOp::BvSle => "bvsle",
            PrimOp::BvSgt => "bvsgt",
            PrimOp::BvSge => "bvsge",
            PrimOp::Concat => "concat",
            PrimOp::Extract => "extract",
            PrimOp::Repeat => "repeat",
            PrimOp::ZeroExtend => "zero_extend",
            PrimOp::SignExtend => "sign_extend",
            PrimOp::Select => "select",
            PrimOp::Store => "store",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_arity_matches_operator_shape() {
        assert_eq!(PrimOp::Extract.index_arity(), 2);
        assert_eq!(PrimOp::Repeat.index_arity(), 1);
        assert_eq!(PrimOp::ZeroExtend.index_arity(), 1);
        assert_eq!(PrimOp::SignExtend.index_arity(), 1);
        assert_eq!(PrimOp::BvAdd.index_arity(), 0);
        assert_eq!(PrimOp::Select.index_arity(), 0);
    }

    #[test]
    fn indexed_predicate() {
        assert!(PrimOp::Extract.is_indexed());
        assert!(!PrimOp::And.is_indexed());
    }
}
