// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The engine session: arenas, node builders, and the solve loop.

use std::collections::HashMap;
use std::time::Instant;

use log::debug;

use crate::blast::Blaster;
use crate::error::EngineError;
use crate::node::{NodeData, NodeKind, NodeId, Prim, SortData, SortId};
use crate::{eval, reduce};

type Result<T> = std::result::Result<T, EngineError>;

/// One select/application instance introduced while rewriting arrays
/// and uninterpreted functions away: `parent` is the base array
/// variable or function declaration, `keys` the (rewritten) index or
/// argument nodes, and `result` the fresh variable standing in for the
/// instance's value.
#[derive(Debug, Clone)]
pub(crate) struct Instance {
    pub(crate) parent: NodeId,
    pub(crate) keys: Vec<NodeId>,
    pub(crate) result: NodeId,
}

/// Outcome of the last `check_sat`, kept for value extraction.
#[derive(Debug, Clone)]
pub(crate) struct Solved {
    pub(crate) sat: bool,
    /// Assignment for every free-variable node the blaster saw.
    pub(crate) assignment: HashMap<NodeId, u64>,
    /// Original node -> rewritten node, from the reduction pass.
    pub(crate) rewrites: HashMap<NodeId, NodeId>,
    pub(crate) selects: Vec<Instance>,
    pub(crate) apps: Vec<Instance>,
}

/// A word-level solving session.
///
/// Owns the sort and node arenas, the current assertion set, and the
/// result of the most recent satisfiability check. Dropping the engine
/// releases everything; handles from one engine are meaningless in
/// another.
pub struct Engine {
    sorts: Vec<SortData>,
    sort_ids: HashMap<SortData, SortId>,
    nodes: Vec<NodeData>,
    node_ids: HashMap<NodeKind, NodeId>,
    serial: u64,
    assertions: Vec<NodeId>,
    solved: Option<Solved>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create a fresh session with empty arenas and no assertions.
    pub fn new() -> Self {
        Self {
            sorts: Vec::new(),
            sort_ids: HashMap::new(),
            nodes: Vec::new(),
            node_ids: HashMap::new(),
            serial: 0,
            assertions: Vec::new(),
            solved: None,
        }
    }

    // =============================
    // Sorts
    // =============================

    fn intern_sort(&mut self, data: SortData) -> SortId {
        if let Some(&id) = self.sort_ids.get(&data) {
            return id;
        }
        let id = SortId(self.sorts.len() as u32);
        self.sorts.push(data.clone());
        self.sort_ids.insert(data, id);
        id
    }

    /// The boolean sort.
    pub fn bool_sort(&mut self) -> SortId {
        self.intern_sort(SortData::Bool)
    }

    /// A bit-vector sort of the given width. Widths are limited to 64
    /// bits so literal and model values fit in a `u64`.
    pub fn bv_sort(&mut self, width: u32) -> Result<SortId> {
        if width == 0 {
            return Err(EngineError::ZeroWidth);
        }
        if width > 64 {
            return Err(EngineError::WidthLimit(width as u64));
        }
        Ok(self.intern_sort(SortData::BitVec(width)))
    }

    /// An array sort from `index` to `element`.
    pub fn array_sort(&mut self, index: SortId, element: SortId) -> SortId {
        self.intern_sort(SortData::Array { index, element })
    }

    /// A function signature sort.
    pub fn fun_sort(&mut self, domain: &[SortId], range: SortId) -> SortId {
        self.intern_sort(SortData::Fun {
            domain: domain.to_vec(),
            range,
        })
    }

    /// Structural data of an interned sort.
    pub fn sort_data(&self, sort: SortId) -> &SortData {
        &self.sorts[sort.0 as usize]
    }

    /// The sort of a node.
    pub fn node_sort(&self, node: NodeId) -> SortId {
        self.nodes[node.0 as usize].sort
    }

    pub(crate) fn node(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0 as usize]
    }

    /// Width in bits of a Bool or BitVec sort.
    pub(crate) fn width(&self, sort: SortId) -> Result<u32> {
        match self.sort_data(sort) {
            SortData::Bool => Ok(1),
            SortData::BitVec(w) => Ok(*w),
            other => Err(EngineError::SortMismatch(format!(
                "expected a boolean or bit-vector sort, got {other:?}"
            ))),
        }
    }

    fn is_bv(&self, sort: SortId) -> bool {
        matches!(self.sort_data(sort), SortData::BitVec(_))
    }

    fn is_bool(&self, sort: SortId) -> bool {
        matches!(self.sort_data(sort), SortData::Bool)
    }

    fn is_first_order(&self, sort: SortId) -> bool {
        matches!(self.sort_data(sort), SortData::Bool | SortData::BitVec(_))
    }

    // =============================
    // Leaves
    // =============================

    fn intern_node(&mut self, kind: NodeKind, sort: SortId) -> NodeId {
        if let Some(&id) = self.node_ids.get(&kind) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind: kind.clone(),
            sort,
        });
        self.node_ids.insert(kind, id);
        id
    }

    /// A fresh free variable. Every call returns a distinct node; the
    /// label is for display only and need not be unique.
    pub fn fresh_var(&mut self, label: &str, sort: SortId) -> Result<NodeId> {
        if matches!(self.sort_data(sort), SortData::Fun { .. }) {
            return Err(EngineError::SortMismatch(
                "variables cannot have a function sort; use declare_fun".to_string(),
            ));
        }
        self.serial += 1;
        let kind = NodeKind::Var {
            label: label.to_string(),
            serial: self.serial,
        };
        Ok(self.intern_node(kind, sort))
    }

    /// A literal constant of a Bool or BitVec sort. The value must fit
    /// the sort's width.
    pub fn literal(&mut self, value: u64, sort: SortId) -> Result<NodeId> {
        let w = match self.sort_data(sort) {
            SortData::Bool => 1,
            SortData::BitVec(w) => *w,
            other => {
                return Err(EngineError::InvalidLiteral {
                    value,
                    sort: format!("{other:?}"),
                })
            }
        };
        if w < 64 && value >> w != 0 {
            return Err(EngineError::InvalidLiteral {
                value,
                sort: format!("{:?}", self.sort_data(sort)),
            });
        }
        Ok(self.intern_node(NodeKind::Lit(value), sort))
    }

    /// Declare a function symbol of the given signature sort.
    pub fn declare_fun(&mut self, name: &str, sort: SortId) -> Result<NodeId> {
        match self.sort_data(sort) {
            SortData::Fun { domain, range } => {
                if !self.is_first_order(*range) || !domain.iter().all(|&d| self.is_first_order(d)) {
                    return Err(EngineError::Unsupported(
                        "higher-order or array-valued function signatures".to_string(),
                    ));
                }
            }
            other => {
                return Err(EngineError::SortMismatch(format!(
                    "declare_fun needs a function signature sort, got {other:?}"
                )))
            }
        }
        self.serial += 1;
        let kind = NodeKind::FunDecl {
            name: name.to_string(),
            serial: self.serial,
        };
        Ok(self.intern_node(kind, sort))
    }

    /// Apply a declared function to arguments. Argument count and
    /// sorts must match the declared signature exactly.
    pub fn apply_fun(&mut self, fun: NodeId, args: &[NodeId]) -> Result<NodeId> {
        let (domain, range) = match self.sort_data(self.node_sort(fun)) {
            SortData::Fun { domain, range } => (domain.clone(), *range),
            other => {
                return Err(EngineError::SortMismatch(format!(
                    "apply_fun needs a function symbol, got a node of sort {other:?}"
                )))
            }
        };
        if !matches!(self.node(fun).kind, NodeKind::FunDecl { .. }) {
            return Err(EngineError::SortMismatch(
                "apply_fun needs a declared function symbol".to_string(),
            ));
        }
        if args.len() != domain.len() {
            return Err(EngineError::SortMismatch(format!(
                "function expects {} arguments, got {}",
                domain.len(),
                args.len()
            )));
        }
        for (i, (&a, &d)) in args.iter().zip(domain.iter()).enumerate() {
            if self.node_sort(a) != d {
                return Err(EngineError::SortMismatch(format!(
                    "function argument {i} has the wrong sort"
                )));
            }
        }
        Ok(self.intern_node(NodeKind::FunApp(fun, args.to_vec()), range))
    }

    // =============================
    // Primitive applications
    // =============================

    /// Intern a primitive application after sort inference. Also used
    /// by the reduction pass to rebuild rewritten nodes.
    pub(crate) fn app(&mut self, prim: Prim, args: &[NodeId]) -> Result<NodeId> {
        let sort = self.infer_sort(prim, args)?;
        Ok(self.intern_node(NodeKind::App(prim, args.to_vec()), sort))
    }

    fn infer_sort(&mut self, prim: Prim, args: &[NodeId]) -> Result<SortId> {
        let sort_of = |e: &Self, i: usize| e.node_sort(args[i]);
        match prim {
            Prim::Not => {
                self.want_bool(args[0], "not")?;
                Ok(self.bool_sort())
            }
            Prim::And | Prim::Or | Prim::Xor | Prim::Implies | Prim::Iff => {
                self.want_bool(args[0], "boolean connective")?;
                self.want_bool(args[1], "boolean connective")?;
                Ok(self.bool_sort())
            }
            Prim::Eq | Prim::Distinct => {
                let (s0, s1) = (sort_of(self, 0), sort_of(self, 1));
                if s0 != s1 {
                    return Err(EngineError::SortMismatch(
                        "equality needs operands of one sort".to_string(),
                    ));
                }
                if !self.is_first_order(s0) {
                    return Err(EngineError::Unsupported(
                        "equality over array or function sorts".to_string(),
                    ));
                }
                Ok(self.bool_sort())
            }
            Prim::Ite => {
                self.want_bool(args[0], "ite condition")?;
                let (s1, s2) = (sort_of(self, 1), sort_of(self, 2));
                if s1 != s2 {
                    return Err(EngineError::SortMismatch(
                        "ite branches must share a sort".to_string(),
                    ));
                }
                if matches!(self.sort_data(s1), SortData::Fun { .. }) {
                    return Err(EngineError::Unsupported(
                        "ite over function sorts".to_string(),
                    ));
                }
                Ok(s1)
            }
            Prim::BvNeg | Prim::BvNot => {
                let s = sort_of(self, 0);
                self.want_bv(args[0], "bit-vector op")?;
                Ok(s)
            }
            Prim::BvAdd
            | Prim::BvSub
            | Prim::BvMul
            | Prim::BvUdiv
            | Prim::BvUrem
            | Prim::BvAnd
            | Prim::BvOr
            | Prim::BvXor
            | Prim::BvShl
            | Prim::BvLshr
            | Prim::BvAshr => {
                let s = self.want_same_bv(args[0], args[1])?;
                Ok(s)
            }
            Prim::BvUlt
            | Prim::BvUle
            | Prim::BvUgt
            | Prim::BvUge
            | Prim::BvSlt
            | Prim::BvSle
            | Prim::BvSgt
            | Prim::BvSge => {
                self.want_same_bv(args[0], args[1])?;
                Ok(self.bool_sort())
            }
            Prim::Concat => {
                self.want_bv(args[0], "concat")?;
                self.want_bv(args[1], "concat")?;
                let w = self.width(sort_of(self, 0))? + self.width(sort_of(self, 1))?;
                self.bv_sort(w)
            }
            Prim::Slice(upper, lower) => {
                self.want_bv(args[0], "extract")?;
                let w = self.width(sort_of(self, 0))?;
                if upper < lower || upper >= w {
                    return Err(EngineError::SliceBounds {
                        upper,
                        lower,
                        width: w,
                    });
                }
                self.bv_sort(upper - lower + 1)
            }
            Prim::Repeat(n) => {
                self.want_bv(args[0], "repeat")?;
                if n == 0 {
                    return Err(EngineError::ZeroRepeat);
                }
                // widen before multiplying so a large count cannot
                // wrap around the 64-bit cap
                let total = self.width(sort_of(self, 0))? as u64 * n as u64;
                if total > 64 {
                    return Err(EngineError::WidthLimit(total));
                }
                self.bv_sort(total as u32)
            }
            Prim::ZeroExt(n) | Prim::SignExt(n) => {
                self.want_bv(args[0], "extend")?;
                let total = self.width(sort_of(self, 0))? as u64 + n as u64;
                if total > 64 {
                    return Err(EngineError::WidthLimit(total));
                }
                self.bv_sort(total as u32)
            }
            Prim::Select => {
                let (index, element) = self.want_array(args[0], "select")?;
                if sort_of(self, 1) != index {
                    return Err(EngineError::SortMismatch(
                        "select index has the wrong sort".to_string(),
                    ));
                }
                Ok(element)
            }
            Prim::Store => {
                let arr = sort_of(self, 0);
                let (index, element) = self.want_array(args[0], "store")?;
                if sort_of(self, 1) != index || sort_of(self, 2) != element {
                    return Err(EngineError::SortMismatch(
                        "store index or value has the wrong sort".to_string(),
                    ));
                }
                Ok(arr)
            }
        }
    }

    fn want_bool(&self, n: NodeId, what: &str) -> Result<()> {
        if self.is_bool(self.node_sort(n)) {
            Ok(())
        } else {
            Err(EngineError::SortMismatch(format!(
                "{what} needs a boolean operand"
            )))
        }
    }

    fn want_bv(&self, n: NodeId, what: &str) -> Result<()> {
        if self.is_bv(self.node_sort(n)) {
            Ok(())
        } else {
            Err(EngineError::SortMismatch(format!(
                "{what} needs a bit-vector operand"
            )))
        }
    }

    fn want_same_bv(&self, a: NodeId, b: NodeId) -> Result<SortId> {
        let (sa, sb) = (self.node_sort(a), self.node_sort(b));
        if !self.is_bv(sa) || !self.is_bv(sb) {
            return Err(EngineError::SortMismatch(
                "bit-vector op needs bit-vector operands".to_string(),
            ));
        }
        if sa != sb {
            return Err(EngineError::SortMismatch(
                "bit-vector operands must share a width".to_string(),
            ));
        }
        Ok(sa)
    }

    fn want_array(&self, n: NodeId, what: &str) -> Result<(SortId, SortId)> {
        match self.sort_data(self.node_sort(n)) {
            SortData::Array { index, element } => Ok((*index, *element)),
            _ => Err(EngineError::SortMismatch(format!(
                "{what} needs an array operand"
            ))),
        }
    }

    // The native builder catalogue. Each method is one primitive at
    // one arity; the solver layer's dispatch tables hold these as
    // plain function pointers.

    /// Boolean negation.
    pub fn not(&mut self, a: NodeId) -> Result<NodeId> {
        self.app(Prim::Not, &[a])
    }
    /// Boolean conjunction.
    pub fn and(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::And, &[a, b])
    }
    /// Boolean disjunction.
    pub fn or(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::Or, &[a, b])
    }
    /// Boolean exclusive or.
    pub fn xor(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::Xor, &[a, b])
    }
    /// Boolean implication.
    pub fn implies(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::Implies, &[a, b])
    }
    /// Boolean equivalence.
    pub fn iff(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::Iff, &[a, b])
    }
    /// If-then-else over a boolean condition.
    pub fn ite(&mut self, c: NodeId, t: NodeId, e: NodeId) -> Result<NodeId> {
        self.app(Prim::Ite, &[c, t, e])
    }
    /// Equality over booleans or bit-vectors.
    pub fn eq(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::Eq, &[a, b])
    }
    /// Disequality over booleans or bit-vectors.
    pub fn distinct(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::Distinct, &[a, b])
    }
    /// Two's-complement negation.
    pub fn bvneg(&mut self, a: NodeId) -> Result<NodeId> {
        self.app(Prim::BvNeg, &[a])
    }
    /// Bitwise complement.
    pub fn bvnot(&mut self, a: NodeId) -> Result<NodeId> {
        self.app(Prim::BvNot, &[a])
    }
    /// Modular addition.
    pub fn bvadd(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvAdd, &[a, b])
    }
    /// Modular subtraction.
    pub fn bvsub(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvSub, &[a, b])
    }
    /// Modular multiplication.
    pub fn bvmul(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvMul, &[a, b])
    }
    /// Unsigned division (division by zero yields all ones).
    pub fn bvudiv(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvUdiv, &[a, b])
    }
    /// Unsigned remainder (remainder by zero yields the dividend).
    pub fn bvurem(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvUrem, &[a, b])
    }
    /// Bitwise and.
    pub fn bvand(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvAnd, &[a, b])
    }
    /// Bitwise or.
    pub fn bvor(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvOr, &[a, b])
    }
    /// Bitwise exclusive or.
    pub fn bvxor(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvXor, &[a, b])
    }
    /// Shift left; amounts at or above the width give zero.
    pub fn bvshl(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvShl, &[a, b])
    }
    /// Logical shift right.
    pub fn bvlshr(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvLshr, &[a, b])
    }
    /// Arithmetic shift right.
    pub fn bvashr(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvAshr, &[a, b])
    }
    /// Unsigned less-than.
    pub fn bvult(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvUlt, &[a, b])
    }
    /// Unsigned at-most.
    pub fn bvule(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvUle, &[a, b])
    }
    /// Unsigned greater-than.
    pub fn bvugt(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvUgt, &[a, b])
    }
    /// Unsigned at-least.
    pub fn bvuge(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvUge, &[a, b])
    }
    /// Signed less-than.
    pub fn bvslt(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvSlt, &[a, b])
    }
    /// Signed at-most.
    pub fn bvsle(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvSle, &[a, b])
    }
    /// Signed greater-than.
    pub fn bvsgt(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvSgt, &[a, b])
    }
    /// Signed at-least.
    pub fn bvsge(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::BvSge, &[a, b])
    }
    /// Concatenation; the first operand becomes the high bits.
    pub fn concat(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.app(Prim::Concat, &[a, b])
    }
    /// Array read.
    pub fn select(&mut self, a: NodeId, i: NodeId) -> Result<NodeId> {
        self.app(Prim::Select, &[a, i])
    }
    /// Array write.
    pub fn store(&mut self, a: NodeId, i: NodeId, v: NodeId) -> Result<NodeId> {
        self.app(Prim::Store, &[a, i, v])
    }

    /// Bit extraction: bits `lower..=upper` of the operand, requiring
    /// `lower <= upper < width`.
    pub fn slice(&mut self, a: NodeId, upper: u32, lower: u32) -> Result<NodeId> {
        self.app(Prim::Slice(upper, lower), &[a])
    }

    /// Repeat the operand `n >= 1` times.
    pub fn repeat(&mut self, a: NodeId, n: u32) -> Result<NodeId> {
        self.app(Prim::Repeat(n), &[a])
    }

    /// Widen by `n` zero bits.
    pub fn zero_extend(&mut self, a: NodeId, n: u32) -> Result<NodeId> {
        self.app(Prim::ZeroExt(n), &[a])
    }

    /// Widen by `n` copies of the sign bit.
    pub fn sign_extend(&mut self, a: NodeId, n: u32) -> Result<NodeId> {
        self.app(Prim::SignExt(n), &[a])
    }

    // =============================
    // Solving
    // =============================

    /// Add a boolean node to the assertion set. Invalidates any cached
    /// verdict.
    pub fn assert_node(&mut self, n: NodeId) -> Result<()> {
        self.want_bool(n, "assert")?;
        self.assertions.push(n);
        self.solved = None;
        Ok(())
    }

    /// Number of assertions made so far.
    pub fn num_assertions(&self) -> usize {
        self.assertions.len()
    }

    /// Decide satisfiability of the current assertion set.
    ///
    /// Rewrites arrays and uninterpreted functions away, bit-blasts to
    /// CNF, and runs CaDiCaL. On a satisfiable answer the assignment is
    /// retained for [`Engine::value_of`].
    pub fn check_sat(&mut self) -> Result<bool> {
        let start = Instant::now();
        let asserts = self.assertions.clone();
        let red = reduce::run(self, &asserts)?;
        let (sat, assignment) = {
            let mut blaster = Blaster::new(self);
            for &a in &red.assertions {
                blaster.assert_root(a)?;
            }
            let sat = blaster.solve().ok_or(EngineError::SolverFailed)?;
            let assignment = if sat {
                blaster.var_assignment()
            } else {
                HashMap::new()
            };
            (sat, assignment)
        };
        debug!(
            "check_sat: {} over {} assertions in {:?}",
            if sat { "sat" } else { "unsat" },
            asserts.len(),
            start.elapsed()
        );
        self.solved = Some(Solved {
            sat,
            assignment,
            rewrites: red.rewrites,
            selects: red.selects,
            apps: red.apps,
        });
        Ok(sat)
    }

    /// Evaluate a Bool or BitVec node under the assignment of the last
    /// satisfiable check.
    pub fn value_of(&self, n: NodeId) -> Result<u64> {
        let solved = match &self.solved {
            Some(s) if s.sat => s,
            _ => return Err(EngineError::NoModel),
        };
        if !self.is_first_order(self.node_sort(n)) {
            return Err(EngineError::Unimplemented(
                "value extraction for array or function sorts".to_string(),
            ));
        }
        eval::eval(self, solved, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn sorts_are_interned() {
        let mut eng = Engine::new();
        let b1 = eng.bool_sort();
        let b2 = eng.bool_sort();
        assert_eq!(b1, b2);
        let v8 = eng.bv_sort(8).unwrap();
        let v8b = eng.bv_sort(8).unwrap();
        assert_eq!(v8, v8b);
        assert_ne!(v8, eng.bv_sort(16).unwrap());
    }

    #[test]
    fn zero_and_oversized_widths_fail() {
        let mut eng = Engine::new();
        assert_eq!(eng.bv_sort(0), Err(EngineError::ZeroWidth));
        assert_eq!(eng.bv_sort(65), Err(EngineError::WidthLimit(65)));
    }

    #[test]
    fn identical_applications_share_a_node() {
        let mut eng = Engine::new();
        let bv = eng.bv_sort(8).unwrap();
        let x = eng.fresh_var("x", bv).unwrap();
        let y = eng.fresh_var("y", bv).unwrap();
        let s1 = eng.bvadd(x, y).unwrap();
        let s2 = eng.bvadd(x, y).unwrap();
        assert_eq!(s1, s2);
        let s3 = eng.bvadd(y, x).unwrap();
        assert_ne!(s1, s3);
    }

    #[test]
    fn fresh_vars_are_distinct_despite_label() {
        let mut eng = Engine::new();
        let b = eng.bool_sort();
        let v1 = eng.fresh_var("a", b).unwrap();
        let v2 = eng.fresh_var("a", b).unwrap();
        assert_ne!(v1, v2);
    }

    #[test]
    fn literal_must_fit_width() {
        let mut eng = Engine::new();
        let bv4 = eng.bv_sort(4).unwrap();
        assert!(eng.literal(15, bv4).is_ok());
        assert!(matches!(
            eng.literal(16, bv4),
            Err(EngineError::InvalidLiteral { .. })
        ));
        let b = eng.bool_sort();
        assert!(eng.literal(1, b).is_ok());
        assert!(eng.literal(2, b).is_err());
    }

    #[test]
    fn slice_bounds_are_validated() {
        let mut eng = Engine::new();
        let bv8 = eng.bv_sort(8).unwrap();
        let x = eng.fresh_var("x", bv8).unwrap();
        let s = eng.slice(x, 7, 4).unwrap();
        assert_eq!(eng.sort_data(eng.node_sort(s)), &SortData::BitVec(4));
        assert!(matches!(
            eng.slice(x, 8, 0),
            Err(EngineError::SliceBounds { .. })
        ));
        assert!(matches!(
            eng.slice(x, 2, 5),
            Err(EngineError::SliceBounds { .. })
        ));
    }

    #[test]
    fn width_rules_for_structure_ops() {
        let mut eng = Engine::new();
        let bv3 = eng.bv_sort(3).unwrap();
        let bv5 = eng.bv_sort(5).unwrap();
        let a = eng.fresh_var("a", bv3).unwrap();
        let b = eng.fresh_var("b", bv5).unwrap();
        let c = eng.concat(a, b).unwrap();
        assert_eq!(eng.sort_data(eng.node_sort(c)), &SortData::BitVec(8));
        let r = eng.repeat(a, 3).unwrap();
        assert_eq!(eng.sort_data(eng.node_sort(r)), &SortData::BitVec(9));
        let z = eng.zero_extend(a, 4).unwrap();
        assert_eq!(eng.sort_data(eng.node_sort(z)), &SortData::BitVec(7));
    }

    #[test]
    fn oversized_repeat_and_extend_counts_are_rejected() {
        let mut eng = Engine::new();
        let bv2 = eng.bv_sort(2).unwrap();
        let x = eng.fresh_var("x", bv2).unwrap();
        // counts whose resulting width wraps a u32 must fail, not
        // intern a narrow sort
        assert!(matches!(
            eng.repeat(x, 2_147_483_649),
            Err(EngineError::WidthLimit(_))
        ));
        assert!(matches!(
            eng.zero_extend(x, u32::MAX),
            Err(EngineError::WidthLimit(_))
        ));
        assert!(matches!(
            eng.sign_extend(x, 63),
            Err(EngineError::WidthLimit(_))
        ));
        assert!(matches!(eng.repeat(x, 33), Err(EngineError::WidthLimit(_))));
        // the cap itself is still reachable
        let r = eng.repeat(x, 32).unwrap();
        assert_eq!(eng.sort_data(eng.node_sort(r)), &SortData::BitVec(64));
    }

    #[test]
    fn mismatched_widths_are_rejected() {
        let mut eng = Engine::new();
        let bv4 = eng.bv_sort(4).unwrap();
        let bv8 = eng.bv_sort(8).unwrap();
        let a = eng.fresh_var("a", bv4).unwrap();
        let b = eng.fresh_var("b", bv8).unwrap();
        assert!(matches!(
            eng.bvadd(a, b),
            Err(EngineError::SortMismatch(_))
        ));
    }

    #[test]
    fn array_equality_is_unsupported() {
        let mut eng = Engine::new();
        let bv4 = eng.bv_sort(4).unwrap();
        let arr = eng.array_sort(bv4, bv4);
        let a = eng.fresh_var("a", arr).unwrap();
        let b = eng.fresh_var("b", arr).unwrap();
        assert!(matches!(eng.eq(a, b), Err(EngineError::Unsupported(_))));
    }

    #[test]
    fn assert_requires_bool() {
        let mut eng = Engine::new();
        let bv4 = eng.bv_sort(4).unwrap();
        let x = eng.fresh_var("x", bv4).unwrap();
        assert!(matches!(
            eng.assert_node(x),
            Err(EngineError::SortMismatch(_))
        ));
    }

    #[test]
    fn empty_assertion_set_is_sat() {
        let mut eng = Engine::new();
        assert!(eng.check_sat().unwrap());
    }

    #[test]
    fn value_before_check_is_an_error() {
        let mut eng = Engine::new();
        let b = eng.bool_sort();
        let x = eng.fresh_var("x", b).unwrap();
        assert_eq!(eng.value_of(x), Err(EngineError::NoModel));
    }
}
