// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The word-level binding of the facade: owns one engine session and
//! implements [`SmtSolver`] over it.

use std::collections::HashMap;

use engine::{Engine, NodeId, SortData, SortId};
use ir::{Kind, PrimOp};
use log::debug;

use crate::dispatch;
use crate::error::SolverError;
use crate::op::{FuncDecl, IndexedOp, Op};
use crate::sort::{Shape, Sort};
use crate::term::{Origin, Term};
use crate::SmtSolver;

type Result<T> = std::result::Result<T, SolverError>;

/// Session phases. A new assertion from `Checked` drops the cached
/// verdict and returns to `Asserting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Asserting,
    Checked(bool),
}

/// A solver session bound to the in-tree word-level engine.
///
/// Exclusively owns its engine; dropping the session releases every
/// sort and node built under it. Sorts and terms are arena handles, so
/// using one under a different session is a precondition violation.
pub struct WordSolver {
    eng: Engine,
    /// Backend sort handle -> shared introspectable wrapper.
    sorts: HashMap<SortId, Sort>,
    state: State,
}

impl Default for WordSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl WordSolver {
    /// Open a fresh session.
    pub fn new() -> Self {
        WordSolver {
            eng: Engine::new(),
            sorts: HashMap::new(),
            state: State::Fresh,
        }
    }

    /// The shared wrapper for a backend sort, built on first sight.
    /// Applications can produce sorts the client never constructed
    /// directly (an extract's narrower width, for instance).
    fn sort_for(&mut self, id: SortId) -> Sort {
        if let Some(sort) = self.sorts.get(&id) {
            return sort.clone();
        }
        let shape = match self.eng.sort_data(id).clone() {
            SortData::Bool => Shape::Bool,
            SortData::BitVec(w) => Shape::BitVec(w),
            SortData::Array { index, element } => Shape::Array {
                index: self.sort_for(index),
                element: self.sort_for(element),
            },
            SortData::Fun { domain, range } => Shape::Function {
                domain: domain.iter().map(|&d| self.sort_for(d)).collect(),
                range: self.sort_for(range),
            },
        };
        let sort = Sort::new(id, shape);
        self.sorts.insert(id, sort.clone());
        sort
    }

    /// Wrap a backend result node as a term recording its operand list
    /// and producing operator.
    fn wrap(&mut self, node: NodeId, origin: Origin, children: Vec<Term>) -> Term {
        let sort = self.sort_for(self.eng.node_sort(node));
        Term::new(node, sort, children, origin)
    }

    fn apply_prim(&mut self, prim: PrimOp, args: &[Term]) -> Result<Term> {
        let node = match args {
            [a] => match dispatch::unary(prim) {
                Some(build) => build(&mut self.eng, a.id())?,
                None => return Err(self.arity_miss(prim, 1)),
            },
            [a, b] => match dispatch::binary(prim) {
                Some(build) => build(&mut self.eng, a.id(), b.id())?,
                None => return Err(self.arity_miss(prim, 2)),
            },
            [a, b, c] => match dispatch::ternary(prim) {
                Some(build) => build(&mut self.eng, a.id(), b.id(), c.id())?,
                None => return Err(self.arity_miss(prim, 3)),
            },
            _ => {
                return Err(SolverError::IncorrectUsage(format!(
                    "no primitive operator of arity {}",
                    args.len()
                )))
            }
        };
        Ok(self.wrap(node, Origin::Applied(Op::Prim(prim)), args.to_vec()))
    }

    /// Classify a table miss: an indexed primitive applied bare, an
    /// operator the backend knows at some other arity, or an operator
    /// the backend never implements.
    fn arity_miss(&self, prim: PrimOp, arity: usize) -> SolverError {
        if prim.is_indexed() {
            SolverError::IncorrectUsage(format!(
                "{prim} takes construction-time indices; build it with construct_op"
            ))
        } else if dispatch::known(prim) {
            SolverError::IncorrectUsage(format!(
                "{prim} is not an operator of arity {arity}"
            ))
        } else {
            SolverError::Unsupported(format!(
                "operator {prim} is not implemented by this backend"
            ))
        }
    }

    fn apply_indexed(&mut self, ix: IndexedOp, args: &[Term]) -> Result<Term> {
        let [a] = args else {
            return Err(SolverError::IncorrectUsage(format!(
                "indexed operator {} takes exactly one operand, got {}",
                ix.prim(),
                args.len()
            )));
        };
        let node = match (ix.prim(), ix.idx1()) {
            (PrimOp::Extract, Some(lower)) => self.eng.slice(a.id(), ix.idx0(), lower)?,
            (PrimOp::Repeat, None) => self.eng.repeat(a.id(), ix.idx0())?,
            (PrimOp::ZeroExtend, None) => self.eng.zero_extend(a.id(), ix.idx0())?,
            (PrimOp::SignExtend, None) => self.eng.sign_extend(a.id(), ix.idx0())?,
            _ => {
                return Err(SolverError::IncorrectUsage(format!(
                    "{} was built with the wrong index shape",
                    ix.prim()
                )))
            }
        };
        Ok(self.wrap(node, Origin::Applied(Op::Indexed(ix)), args.to_vec()))
    }

    fn apply_func(&mut self, func: &FuncDecl, args: &[Term]) -> Result<Term> {
        if args.len() != func.arity() {
            return Err(SolverError::IncorrectUsage(format!(
                "function {} expects {} arguments, got {}",
                func.name(),
                func.arity(),
                args.len()
            )));
        }
        let ids: Vec<NodeId> = args.iter().map(Term::id).collect();
        let node = self.eng.apply_fun(func.node(), &ids)?;
        Ok(self.wrap(
            node,
            Origin::Applied(Op::Func(func.clone())),
            args.to_vec(),
        ))
    }
}

impl SmtSolver for WordSolver {
    fn declare_sort(&mut self, name: &str, _arity: u32) -> Result<Sort> {
        // a word-level engine has no uninterpreted-sort universe to
        // draw from; refusing loudly beats pretending
        Err(SolverError::IncorrectUsage(format!(
            "this backend cannot declare the free sort {name}"
        )))
    }

    fn construct_sort(&mut self, kind: Kind) -> Result<Sort> {
        match kind {
            Kind::Bool => {
                let id = self.eng.bool_sort();
                Ok(self.sort_for(id))
            }
            _ => Err(SolverError::Unsupported(format!(
                "sort kind {kind} cannot be built without parameters"
            ))),
        }
    }

    fn construct_sort_width(&mut self, kind: Kind, width: u32) -> Result<Sort> {
        match kind {
            Kind::BitVec => {
                let id = self.eng.bv_sort(width)?;
                Ok(self.sort_for(id))
            }
            _ => Err(SolverError::IncorrectUsage(format!(
                "sort kind {kind} does not take a width"
            ))),
        }
    }

    fn construct_sort_pair(&mut self, kind: Kind, index: &Sort, element: &Sort) -> Result<Sort> {
        match kind {
            Kind::Array => {
                let id = self.eng.array_sort(index.id(), element.id());
                Ok(self.sort_for(id))
            }
            _ => Err(SolverError::IncorrectUsage(format!(
                "sort kind {kind} does not take index and element sorts"
            ))),
        }
    }

    fn construct_sort_fun(&mut self, kind: Kind, domain: &[Sort], range: &Sort) -> Result<Sort> {
        match kind {
            Kind::Uninterpreted => {
                let ids: Vec<SortId> = domain.iter().map(Sort::id).collect();
                let id = self.eng.fun_sort(&ids, range.id());
                Ok(self.sort_for(id))
            }
            _ => Err(SolverError::IncorrectUsage(format!(
                "sort kind {kind} does not take domain and range sorts"
            ))),
        }
    }

    fn declare_const(&mut self, name: &str, sort: &Sort) -> Result<Term> {
        let node = self.eng.fresh_var(name, sort.id())?;
        Ok(Term::new(
            node,
            sort.clone(),
            vec![],
            Origin::FreeVar {
                name: name.to_string(),
            },
        ))
    }

    fn make_const(&mut self, value: u64, sort: &Sort) -> Result<Term> {
        let node = self.eng.literal(value, sort.id())?;
        Ok(Term::new(
            node,
            sort.clone(),
            vec![],
            Origin::Literal { value },
        ))
    }

    fn declare_fun(&mut self, name: &str, domain: &[Sort], range: &Sort) -> Result<FuncDecl> {
        let ids: Vec<SortId> = domain.iter().map(Sort::id).collect();
        let fun_sort = self.eng.fun_sort(&ids, range.id());
        let node = self.eng.declare_fun(name, fun_sort)?;
        Ok(FuncDecl::new(
            name.to_string(),
            domain.to_vec(),
            range.clone(),
            node,
        ))
    }

    fn construct_op(&self, prim: PrimOp, idx: u32) -> Result<Op> {
        if prim.index_arity() != 1 {
            return Err(SolverError::IncorrectUsage(format!(
                "{prim} does not take exactly one index"
            )));
        }
        Ok(Op::Indexed(IndexedOp::new(prim, idx, None)))
    }

    fn construct_op2(&self, prim: PrimOp, upper: u32, lower: u32) -> Result<Op> {
        if prim.index_arity() != 2 {
            return Err(SolverError::IncorrectUsage(format!(
                "{prim} does not take two indices"
            )));
        }
        Ok(Op::Indexed(IndexedOp::new(prim, upper, Some(lower))))
    }

    fn apply_op1(&mut self, op: &Op, a: &Term) -> Result<Term> {
        self.apply_op(op, &[a.clone()])
    }

    fn apply_op2(&mut self, op: &Op, a: &Term, b: &Term) -> Result<Term> {
        self.apply_op(op, &[a.clone(), b.clone()])
    }

    fn apply_op3(&mut self, op: &Op, a: &Term, b: &Term, c: &Term) -> Result<Term> {
        self.apply_op(op, &[a.clone(), b.clone(), c.clone()])
    }

    fn apply_op(&mut self, op: &Op, args: &[Term]) -> Result<Term> {
        match op {
            Op::Prim(prim) => self.apply_prim(*prim, args),
            Op::Indexed(ix) => self.apply_indexed(*ix, args),
            Op::Func(func) => self.apply_func(func, args),
        }
    }

    fn assert_formula(&mut self, term: &Term) -> Result<()> {
        if term.sort().kind() != Kind::Bool {
            return Err(SolverError::IncorrectUsage(format!(
                "asserted term has sort {}, expected bool",
                term.sort()
            )));
        }
        self.eng.assert_node(term.id())?;
        self.state = State::Asserting;
        Ok(())
    }

    fn check_sat(&mut self) -> Result<bool> {
        if let State::Checked(verdict) = self.state {
            debug!("check_sat: no new assertions, returning cached verdict");
            return Ok(verdict);
        }
        debug!(
            "check_sat: deciding {} assertions",
            self.eng.num_assertions()
        );
        let verdict = self.eng.check_sat()?;
        self.state = State::Checked(verdict);
        Ok(verdict)
    }

    fn get_value(&mut self, term: &Term) -> Result<Term> {
        if self.state != State::Checked(true) {
            return Err(SolverError::IncorrectUsage(
                "get_value requires a satisfiable check_sat first".to_string(),
            ));
        }
        match term.sort().kind() {
            Kind::Bool | Kind::BitVec => {
                let value = self.eng.value_of(term.id())?;
                let node = self.eng.literal(value, term.sort().id())?;
                Ok(Term::new(
                    node,
                    term.sort().clone(),
                    vec![],
                    Origin::Literal { value },
                ))
            }
            Kind::Array => Err(SolverError::NotImplemented(
                "value extraction for array sorts".to_string(),
            )),
            Kind::Uninterpreted | Kind::Function => Err(SolverError::IncorrectUsage(format!(
                "terms of sort {} have no extractable value",
                term.sort()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn bv8(solver: &mut WordSolver) -> Sort {
        solver.construct_sort_width(Kind::BitVec, 8).unwrap()
    }

    #[test]
    fn sort_introspection_round_trips() {
        let mut solver = WordSolver::new();
        let b = solver.construct_sort(Kind::Bool).unwrap();
        assert_eq!(b.kind(), Kind::Bool);
        let bv = bv8(&mut solver);
        assert_eq!(bv.kind(), Kind::BitVec);
        assert_eq!(bv.width(), Some(8));
        let arr = solver.construct_sort_pair(Kind::Array, &bv, &b).unwrap();
        assert_eq!(arr.kind(), Kind::Array);
        assert_eq!(arr.index_sort(), Some(&bv));
        assert_eq!(arr.element_sort(), Some(&b));
        let sig = solver
            .construct_sort_fun(Kind::Uninterpreted, &[bv.clone(), bv.clone()], &b)
            .unwrap();
        assert_eq!(sig.kind(), Kind::Function);
        assert_eq!(sig.arity(), Some(2));
        assert_eq!(sig.range(), Some(&b));
    }

    #[test]
    fn unsupported_sort_overloads_fail() {
        let mut solver = WordSolver::new();
        assert!(matches!(
            solver.construct_sort(Kind::BitVec),
            Err(SolverError::Unsupported(_))
        ));
        assert!(matches!(
            solver.construct_sort_width(Kind::Bool, 8),
            Err(SolverError::IncorrectUsage(_))
        ));
        assert!(matches!(
            solver.construct_sort_width(Kind::BitVec, 0),
            Err(SolverError::IncorrectUsage(_))
        ));
        assert!(matches!(
            solver.declare_sort("S", 0),
            Err(SolverError::IncorrectUsage(_))
        ));
    }

    #[test]
    fn primitive_arity_misses_are_incorrect_usage() {
        let mut solver = WordSolver::new();
        let bv = bv8(&mut solver);
        let x = solver.declare_const("x", &bv).unwrap();
        let y = solver.declare_const("y", &bv).unwrap();
        // bvadd is binary, not unary or ternary
        let op = Op::Prim(PrimOp::BvAdd);
        assert!(matches!(
            solver.apply_op1(&op, &x),
            Err(SolverError::IncorrectUsage(_))
        ));
        assert!(matches!(
            solver.apply_op3(&op, &x, &y, &x),
            Err(SolverError::IncorrectUsage(_))
        ));
        assert!(matches!(
            solver.apply_op(&op, &[x.clone(), y.clone(), x.clone(), y.clone()]),
            Err(SolverError::IncorrectUsage(_))
        ));
    }

    #[test]
    fn bare_application_of_an_indexed_operator_fails() {
        let mut solver = WordSolver::new();
        let bv = bv8(&mut solver);
        let x = solver.declare_const("x", &bv).unwrap();
        assert!(matches!(
            solver.apply_op1(&Op::Prim(PrimOp::Extract), &x),
            Err(SolverError::IncorrectUsage(_))
        ));
    }

    #[test]
    fn applications_record_operator_and_children() {
        let mut solver = WordSolver::new();
        let bv = bv8(&mut solver);
        let x = solver.declare_const("x", &bv).unwrap();
        let y = solver.declare_const("y", &bv).unwrap();
        let sum = solver
            .apply_op2(&Op::Prim(PrimOp::BvAdd), &x, &y)
            .unwrap();
        assert_eq!(sum.children(), &[x.clone(), y.clone()]);
        assert!(matches!(sum.op(), Some(Op::Prim(PrimOp::BvAdd))));
        assert_eq!(sum.sort().width(), Some(8));
        let cmp = solver
            .apply_op2(&Op::Prim(PrimOp::BvUlt), &x, &y)
            .unwrap();
        assert_eq!(cmp.sort().kind(), Kind::Bool);
    }

    #[test]
    fn identical_applications_share_the_node() {
        let mut solver = WordSolver::new();
        let bv = bv8(&mut solver);
        let x = solver.declare_const("x", &bv).unwrap();
        let y = solver.declare_const("y", &bv).unwrap();
        let op = Op::Prim(PrimOp::BvMul);
        let p1 = solver.apply_op2(&op, &x, &y).unwrap();
        let p2 = solver.apply_op2(&op, &x, &y).unwrap();
        assert_eq!(p1, p2);
        assert_eq!(p1.children(), p2.children());
    }

    #[test]
    fn construct_op_validates_index_shape() {
        let solver = WordSolver::new();
        assert!(solver.construct_op2(PrimOp::Extract, 7, 4).is_ok());
        assert!(matches!(
            solver.construct_op(PrimOp::Extract, 7),
            Err(SolverError::IncorrectUsage(_))
        ));
        assert!(solver.construct_op(PrimOp::Repeat, 2).is_ok());
        assert!(matches!(
            solver.construct_op2(PrimOp::Repeat, 2, 0),
            Err(SolverError::IncorrectUsage(_))
        ));
        assert!(matches!(
            solver.construct_op(PrimOp::BvAdd, 1),
            Err(SolverError::IncorrectUsage(_))
        ));
    }

    #[test]
    fn extract_width_rule_and_bounds() {
        let mut solver = WordSolver::new();
        let bv = bv8(&mut solver);
        let x = solver.declare_const("x", &bv).unwrap();
        let ext = solver.construct_op2(PrimOp::Extract, 7, 4).unwrap();
        let nibble = solver.apply_op1(&ext, &x).unwrap();
        assert_eq!(nibble.sort().width(), Some(4));
        let bad = solver.construct_op2(PrimOp::Extract, 8, 0).unwrap();
        assert!(matches!(
            solver.apply_op1(&bad, &x),
            Err(SolverError::IncorrectUsage(_))
        ));
        let two = solver.declare_const("y", &bv).unwrap();
        assert!(matches!(
            solver.apply_op2(&ext, &x, &two),
            Err(SolverError::IncorrectUsage(_))
        ));
    }

    #[test]
    fn repeat_and_extend_width_rules() {
        let mut solver = WordSolver::new();
        let bv = bv8(&mut solver);
        let x = solver.declare_const("x", &bv).unwrap();
        let rep = solver.construct_op(PrimOp::Repeat, 3).unwrap();
        assert_eq!(solver.apply_op1(&rep, &x).unwrap().sort().width(), Some(24));
        let zext = solver.construct_op(PrimOp::ZeroExtend, 8).unwrap();
        assert_eq!(
            solver.apply_op1(&zext, &x).unwrap().sort().width(),
            Some(16)
        );
        let sext = solver.construct_op(PrimOp::SignExtend, 4).unwrap();
        assert_eq!(
            solver.apply_op1(&sext, &x).unwrap().sort().width(),
            Some(12)
        );
    }

    #[test]
    fn oversized_repeat_count_is_unsupported() {
        let mut solver = WordSolver::new();
        let bv = bv8(&mut solver);
        let x = solver.declare_const("x", &bv).unwrap();
        let rep = solver.construct_op(PrimOp::Repeat, 2_147_483_649).unwrap();
        assert!(matches!(
            solver.apply_op1(&rep, &x),
            Err(SolverError::Unsupported(_))
        ));
        let zext = solver.construct_op(PrimOp::ZeroExtend, u32::MAX).unwrap();
        assert!(matches!(
            solver.apply_op1(&zext, &x),
            Err(SolverError::Unsupported(_))
        ));
    }

    #[test]
    fn function_application_checks_arity() {
        let mut solver = WordSolver::new();
        let bv = bv8(&mut solver);
        let b = solver.construct_sort(Kind::Bool).unwrap();
        let f = solver
            .declare_fun("f", &[bv.clone(), bv.clone()], &b)
            .unwrap();
        let x = solver.declare_const("x", &bv).unwrap();
        let op = Op::Func(f.clone());
        assert!(solver.apply_op2(&op, &x, &x).is_ok());
        assert!(matches!(
            solver.apply_op1(&op, &x),
            Err(SolverError::IncorrectUsage(_))
        ));
    }

    #[test]
    fn assert_rejects_non_bool() {
        let mut solver = WordSolver::new();
        let bv = bv8(&mut solver);
        let x = solver.declare_const("x", &bv).unwrap();
        assert!(matches!(
            solver.assert_formula(&x),
            Err(SolverError::IncorrectUsage(_))
        ));
    }

    #[test]
    fn check_sat_is_idempotent() {
        let mut solver = WordSolver::new();
        let b = solver.construct_sort(Kind::Bool).unwrap();
        let a = solver.declare_const("a", &b).unwrap();
        solver.assert_formula(&a).unwrap();
        let first = solver.check_sat().unwrap();
        let second = solver.check_sat().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn get_value_before_check_fails() {
        let mut solver = WordSolver::new();
        let b = solver.construct_sort(Kind::Bool).unwrap();
        let a = solver.declare_const("a", &b).unwrap();
        assert!(matches!(
            solver.get_value(&a),
            Err(SolverError::IncorrectUsage(_))
        ));
    }
}
