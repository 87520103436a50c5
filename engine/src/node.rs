// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Arena data types for sorts and nodes.
//!
//! Both arenas are append-only and hash-consed: a [`SortId`] or
//! [`NodeId`] is an index into its arena, and structurally identical
//! entries are interned to the same id. Free variables and function
//! declarations carry a serial number so every declaration stays
//! distinct regardless of its display label.

use std::fmt;

/// Handle to an interned sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SortId(pub(crate) u32);

/// Handle to an interned node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl fmt::Display for SortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The structure of an interned sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SortData {
    /// Boolean sort.
    Bool,
    /// Bit-vector sort of the given width (1..=64).
    BitVec(u32),
    /// Array sort from an index sort to an element sort.
    Array {
        /// Sort of array indices.
        index: SortId,
        /// Sort of array elements.
        element: SortId,
    },
    /// Function signature sort.
    Fun {
        /// Domain sorts, in application order.
        domain: Vec<SortId>,
        /// Range sort.
        range: SortId,
    },
}

/// The engine's native primitive catalogue, keyed by identity and
/// (implicitly) arity. Indexed primitives carry their integer
/// parameters here, fixed at node-construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Prim {
    // booleans
    Not,
    And,
    Or,
    Xor,
    Implies,
    Iff,
    Ite,
    // core
    Eq,
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
    // structure
    Concat,
    Slice(u32, u32),
    Repeat(u32),
    ZeroExt(u32),
    SignExt(u32),
    // arrays
    Select,
    Store,
}

/// The structure of an interned node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum NodeKind {
    /// A free variable. The serial keeps every declaration distinct.
    Var { label: String, serial: u64 },
    /// A literal constant (bool as 0/1, bit-vector as its value).
    Lit(u64),
    /// A primitive application.
    App(Prim, Vec<NodeId>),
    /// A declared function symbol.
    FunDecl { name: String, serial: u64 },
    /// An n-ary application of a declared function to arguments.
    FunApp(NodeId, Vec<NodeId>),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) sort: SortId,
}
