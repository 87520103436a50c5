// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! A solver-agnostic term-construction and operator-application
//! boundary layer.
//!
//! Clients build sorts, constants, and operator applications through
//! one uniform interface, the [`SmtSolver`] trait, while an
//! interchangeable backend performs the actual satisfiability
//! checking. The models are deliberately backend-neutral:
//!
//! - [`Sort`]: the semantic type of a term, introspectable without
//!   consulting the backend;
//! - [`Term`]: a node in a shared immutable expression DAG, recording
//!   its children and the operator that produced it;
//! - [`Op`]: a tagged union of primitive, indexed-primitive, and
//!   declared-function operators;
//! - per-arity dispatch tables connecting the neutral operator
//!   vocabulary to backend node builders.
//!
//! [`WordSolver`] binds the facade to the in-tree word-level engine.
//! Errors fall into three observably different categories
//! ([`SolverError`]): capabilities the backend can never provide,
//! structurally invalid calls, and designed-for-but-unfinished
//! features.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::too_many_arguments)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

mod dispatch;
mod error;
mod imp;
mod op;
mod sort;
mod term;

pub use error::SolverError;
pub use imp::WordSolver;
pub use op::{FuncDecl, IndexedOp, Op};
pub use sort::Sort;
pub use term::{Origin, Term};

use ir::{Kind, PrimOp};

/// The uniform client interface of a solver session.
///
/// All operations are synchronous and run on the caller's thread. A
/// failed call leaves the session usable; no operation partially rolls
/// back. Sorts and terms handed out by one session must not be used
/// with another.
pub trait SmtSolver {
    /// Declare a free uninterpreted sort. Backends without an
    /// uninterpreted-sort universe must refuse, never silently ignore.
    fn declare_sort(&mut self, name: &str, arity: u32) -> Result<Sort, SolverError>;

    /// Construct a parameterless sort (`Bool`).
    fn construct_sort(&mut self, kind: Kind) -> Result<Sort, SolverError>;

    /// Construct a width-parameterised sort (`BitVec`, width >= 1).
    fn construct_sort_width(&mut self, kind: Kind, width: u32) -> Result<Sort, SolverError>;

    /// Construct a sort from two component sorts (`Array`).
    fn construct_sort_pair(
        &mut self,
        kind: Kind,
        index: &Sort,
        element: &Sort,
    ) -> Result<Sort, SolverError>;

    /// Construct a function-signature sort from domain and range
    /// (keyed by `Uninterpreted`, following SMT convention for
    /// declared symbols).
    fn construct_sort_fun(
        &mut self,
        kind: Kind,
        domain: &[Sort],
        range: &Sort,
    ) -> Result<Sort, SolverError>;

    /// Declare a fresh free variable of the given sort. The name is a
    /// display label and need not be unique at this layer.
    fn declare_const(&mut self, name: &str, sort: &Sort) -> Result<Term, SolverError>;

    /// Construct a literal constant of a numeric-valued sort.
    fn make_const(&mut self, value: u64, sort: &Sort) -> Result<Term, SolverError>;

    /// Declare a function symbol with the given signature.
    fn declare_fun(
        &mut self,
        name: &str,
        domain: &[Sort],
        range: &Sort,
    ) -> Result<FuncDecl, SolverError>;

    /// Build a one-index operator (repeat, zero-extend, sign-extend).
    fn construct_op(&self, prim: PrimOp, idx: u32) -> Result<Op, SolverError>;

    /// Build a two-index operator (extract, with upper and lower bit
    /// bounds).
    fn construct_op2(&self, prim: PrimOp, upper: u32, lower: u32) -> Result<Op, SolverError>;

    /// Apply an operator to one operand.
    fn apply_op1(&mut self, op: &Op, a: &Term) -> Result<Term, SolverError>;

    /// Apply an operator to two operands.
    fn apply_op2(&mut self, op: &Op, a: &Term, b: &Term) -> Result<Term, SolverError>;

    /// Apply an operator to three operands.
    fn apply_op3(&mut self, op: &Op, a: &Term, b: &Term, c: &Term) -> Result<Term, SolverError>;

    /// Apply an operator to any number of operands, dispatching on the
    /// operand count.
    fn apply_op(&mut self, op: &Op, args: &[Term]) -> Result<Term, SolverError>;

    /// Add a boolean term to the assertion set.
    fn assert_formula(&mut self, term: &Term) -> Result<(), SolverError>;

    /// Decide satisfiability of the current assertion set. Repeated
    /// calls with no intervening assertion return the same verdict.
    fn check_sat(&mut self) -> Result<bool, SolverError>;

    /// After a satisfiable check, produce a literal term of matching
    /// sort carrying the model's value for `term`.
    fn get_value(&mut self, term: &Term) -> Result<Term, SolverError>;
}
