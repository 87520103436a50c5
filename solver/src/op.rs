// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The operator model: the tagged union clients apply to terms.

use std::fmt;
use std::sync::Arc;

use engine::NodeId;
use ir::PrimOp;

use crate::sort::Sort;

/// An operator, in one of three shapes: a bare primitive, a primitive
/// carrying construction-time integer indices, or a declared function
/// symbol applied n-ary.
#[derive(Debug, Clone)]
pub enum Op {
    /// A fixed, named operator from the closed vocabulary.
    Prim(PrimOp),
    /// A primitive plus one or two integer parameters.
    Indexed(IndexedOp),
    /// A user-declared function symbol.
    Func(FuncDecl),
}

/// A primitive operator with its integer parameters fixed at
/// construction time. Only constructible through the facade's
/// `construct_op` operations, which validate the parameter count
/// against [`PrimOp::index_arity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedOp {
    prim: PrimOp,
    idx0: u32,
    idx1: Option<u32>,
}

impl IndexedOp {
    pub(crate) fn new(prim: PrimOp, idx0: u32, idx1: Option<u32>) -> Self {
        debug_assert_eq!(prim.index_arity(), 1 + idx1.is_some() as usize);
        IndexedOp { prim, idx0, idx1 }
    }

    /// The underlying primitive.
    pub fn prim(&self) -> PrimOp {
        self.prim
    }

    /// The first integer parameter (extract's upper bound, or the
    /// repeat/extend count).
    pub fn idx0(&self) -> u32 {
        self.idx0
    }

    /// The second integer parameter (extract's lower bound).
    pub fn idx1(&self) -> Option<u32> {
        self.idx1
    }
}

/// A declared function symbol: name, signature, and the backend handle
/// it was declared under. Shared immutably like sorts and terms.
#[derive(Debug, Clone)]
pub struct FuncDecl(Arc<FuncInner>);

#[derive(Debug)]
struct FuncInner {
    name: String,
    domain: Vec<Sort>,
    range: Sort,
    node: NodeId,
}

impl FuncDecl {
    pub(crate) fn new(name: String, domain: Vec<Sort>, range: Sort, node: NodeId) -> Self {
        FuncDecl(Arc::new(FuncInner {
            name,
            domain,
            range,
            node,
        }))
    }

    pub(crate) fn node(&self) -> NodeId {
        self.0.node
    }

    /// The declared name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Argument sorts, in application order.
    pub fn domain(&self) -> &[Sort] {
        &self.0.domain
    }

    /// Result sort.
    pub fn range(&self) -> &Sort {
        &self.0.range
    }

    /// Number of arguments an application must supply.
    pub fn arity(&self) -> usize {
        self.0.domain.len()
    }
}

impl PartialEq for FuncDecl {
    fn eq(&self, other: &Self) -> bool {
        self.0.node == other.0.node
    }
}

impl Eq for FuncDecl {}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Prim(p) => write!(f, "{p}"),
            Op::Indexed(ix) => match ix.idx1 {
                Some(idx1) => write!(f, "({} {} {})", ix.prim, ix.idx0, idx1),
                None => write!(f, "({} {})", ix.prim, ix.idx0),
            },
            Op::Func(func) => write!(f, "{}", func.name()),
        }
    }
}
