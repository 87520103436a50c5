// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Bit-blasting of the reduced word-level graph into CNF for CaDiCaL.
//!
//! Every node becomes a vector of SAT literals, least significant bit
//! first (booleans are width-1 vectors). Gates use the Tseitin
//! encoding; arithmetic uses ripple-carry adders, a shift-add
//! multiplier, restoring long division, and barrel shifters. The
//! restoring divider gives division by zero the all-ones quotient and
//! the dividend as remainder without special casing.

use std::collections::HashMap;

use cadical::Solver;
use log::debug;

use crate::engine::Engine;
use crate::error::EngineError;
use crate::node::{NodeId, NodeKind, Prim};

type Lit = i32;
type Word = Vec<Lit>;

pub(crate) struct Blaster<'a> {
    eng: &'a Engine,
    sat: Solver,
    next: Lit,
    bits: HashMap<NodeId, Word>,
    /// A literal constrained to be true, for constant bits.
    top: Lit,
}

impl<'a> Blaster<'a> {
    pub(crate) fn new(eng: &'a Engine) -> Self {
        let mut sat: Solver = Default::default();
        let top = 1;
        sat.add_clause([top]);
        Blaster {
            eng,
            sat,
            next: 2,
            bits: HashMap::new(),
            top,
        }
    }

    fn fresh(&mut self) -> Lit {
        let v = self.next;
        self.next += 1;
        v
    }

    fn clause(&mut self, lits: impl IntoIterator<Item = Lit>) {
        self.sat.add_clause(lits);
    }

    // =============================
    // Gates
    // =============================

    fn and_gate(&mut self, a: Lit, b: Lit) -> Lit {
        let o = self.fresh();
        self.clause([-o, a]);
        self.clause([-o, b]);
        self.clause([o, -a, -b]);
        o
    }

    fn or_gate(&mut self, a: Lit, b: Lit) -> Lit {
        -self.and_gate(-a, -b)
    }

    fn xor_gate(&mut self, a: Lit, b: Lit) -> Lit {
        let o = self.fresh();
        self.clause([-o, a, b]);
        self.clause([-o, -a, -b]);
        self.clause([o, -a, b]);
        self.clause([o, a, -b]);
        o
    }

    fn iff_gate(&mut self, a: Lit, b: Lit) -> Lit {
        -self.xor_gate(a, b)
    }

    fn mux_gate(&mut self, c: Lit, t: Lit, e: Lit) -> Lit {
        let o = self.fresh();
        self.clause([-c, -t, o]);
        self.clause([-c, t, -o]);
        self.clause([c, -e, o]);
        self.clause([c, e, -o]);
        o
    }

    // =============================
    // Word circuits
    // =============================

    fn constant(&self, value: u64, width: u32) -> Word {
        (0..width)
            .map(|i| if value >> i & 1 == 1 { self.top } else { -self.top })
            .collect()
    }

    fn mux_word(&mut self, c: Lit, t: &Word, e: &Word) -> Word {
        t.iter()
            .zip(e)
            .map(|(&t, &e)| self.mux_gate(c, t, e))
            .collect()
    }

    fn eq_word(&mut self, a: &Word, b: &Word) -> Lit {
        let mut acc = self.top;
        for (&x, &y) in a.iter().zip(b) {
            let same = self.iff_gate(x, y);
            acc = self.and_gate(acc, same);
        }
        acc
    }

    /// Ripple-carry addition, returning the sum truncated to the input
    /// width (the carry out is discarded).
    fn add_word(&mut self, a: &Word, b: &Word, mut carry: Lit) -> Word {
        let mut sum = Vec::with_capacity(a.len());
        for (&x, &y) in a.iter().zip(b) {
            let xy = self.xor_gate(x, y);
            sum.push(self.xor_gate(xy, carry));
            let gen = self.and_gate(x, y);
            let prop = self.and_gate(xy, carry);
            carry = self.or_gate(gen, prop);
        }
        sum
    }

    fn neg_word(&mut self, a: &Word) -> Word {
        let not: Word = a.iter().map(|&x| -x).collect();
        let zero = self.constant(0, a.len() as u32);
        self.add_word(&not, &zero, self.top)
    }

    fn sub_word(&mut self, a: &Word, b: &Word) -> Word {
        let not_b: Word = b.iter().map(|&x| -x).collect();
        self.add_word(a, &not_b, self.top)
    }

    fn mul_word(&mut self, a: &Word, b: &Word) -> Word {
        let w = a.len();
        let mut acc = self.constant(0, w as u32);
        for i in 0..w {
            // partial product of a shifted left by i, gated on b[i]
            let partial: Word = (0..w)
                .map(|j| {
                    if j < i {
                        -self.top
                    } else {
                        self.and_gate(b[i], a[j - i])
                    }
                })
                .collect();
            acc = self.add_word(&acc, &partial, -self.top);
        }
        acc
    }

    /// Unsigned comparison a < b, scanning from the most significant
    /// bit down.
    fn ult_word(&mut self, a: &Word, b: &Word) -> Lit {
        let mut lt = -self.top;
        let mut eq_so_far = self.top;
        for (&x, &y) in a.iter().zip(b).rev() {
            let here = self.and_gate(-x, y);
            let decided = self.and_gate(eq_so_far, here);
            lt = self.or_gate(lt, decided);
            let same = self.iff_gate(x, y);
            eq_so_far = self.and_gate(eq_so_far, same);
        }
        lt
    }

    /// Signed comparison by flipping the sign bits and comparing
    /// unsigned.
    fn slt_word(&mut self, a: &Word, b: &Word) -> Lit {
        let mut a = a.clone();
        let mut b = b.clone();
        let msb = a.len() - 1;
        a[msb] = -a[msb];
        b[msb] = -b[msb];
        self.ult_word(&a, &b)
    }

    /// Restoring long division: quotient and remainder in one pass.
    /// The remainder register carries one extra bit so the shifted
    /// value never overflows the comparison.
    fn divmod_word(&mut self, a: &Word, b: &Word) -> (Word, Word) {
        let w = a.len();
        let mut rem: Word = self.constant(0, w as u32 + 1);
        let mut b_ext = b.clone();
        b_ext.push(-self.top);
        let mut quot = vec![-self.top; w];
        for i in (0..w).rev() {
            rem.pop();
            rem.insert(0, a[i]);
            let lt = self.ult_word(&rem, &b_ext);
            let fits = -lt;
            let reduced = self.sub_word(&rem, &b_ext);
            rem = self.mux_word(fits, &reduced, &rem);
            quot[i] = fits;
        }
        rem.pop();
        (quot, rem)
    }

    /// Barrel shifter. `fill` supplies the bits shifted in; amounts at
    /// or above the width produce a word of `fill` bits.
    fn shift_word(&mut self, a: &Word, amount: &Word, left: bool, fill: Lit) -> Word {
        let w = a.len();
        let mut out = a.clone();
        for (i, &bit) in amount.iter().enumerate() {
            if (1u128 << i) >= w as u128 {
                break;
            }
            let step = 1usize << i;
            let shifted: Word = (0..w)
                .map(|j| {
                    let src = if left {
                        j.checked_sub(step)
                    } else {
                        (j + step < w).then_some(j + step)
                    };
                    src.map_or(fill, |s| out[s])
                })
                .collect();
            out = self.mux_word(bit, &shifted, &out);
        }
        let width_lits = self.constant(w as u64, w as u32);
        let overflow = {
            let lt = self.ult_word(amount, &width_lits);
            -lt
        };
        let filled = vec![fill; w];
        self.mux_word(overflow, &filled, &out)
    }

    // =============================
    // Nodes
    // =============================

    fn blast(&mut self, n: NodeId) -> Result<Word, EngineError> {
        if let Some(w) = self.bits.get(&n) {
            return Ok(w.clone());
        }
        let width = self.eng.width(self.eng.node_sort(n))?;
        let word = match self.eng.node(n).kind.clone() {
            NodeKind::Var { .. } => (0..width).map(|_| self.fresh()).collect(),
            NodeKind::Lit(v) => self.constant(v, width),
            NodeKind::App(prim, args) => self.blast_app(prim, &args)?,
            NodeKind::FunDecl { .. } | NodeKind::FunApp(..) => {
                return Err(EngineError::Unsupported(
                    "function application reached the bit-blaster".to_string(),
                ))
            }
        };
        debug_assert_eq!(word.len(), width as usize);
        self.bits.insert(n, word.clone());
        Ok(word)
    }

    fn blast_app(&mut self, prim: Prim, args: &[NodeId]) -> Result<Word, EngineError> {
        let words = args
            .iter()
            .map(|&a| self.blast(a))
            .collect::<Result<Vec<_>, _>>()?;
        let word = match prim {
            Prim::Not => vec![-words[0][0]],
            Prim::And => vec![self.and_gate(words[0][0], words[1][0])],
            Prim::Or => vec![self.or_gate(words[0][0], words[1][0])],
            Prim::Xor => vec![self.xor_gate(words[0][0], words[1][0])],
            Prim::Implies => vec![self.or_gate(-words[0][0], words[1][0])],
            Prim::Iff => vec![self.iff_gate(words[0][0], words[1][0])],
            Prim::Ite => self.mux_word(words[0][0], &words[1], &words[2]),
            Prim::Eq => vec![self.eq_word(&words[0], &words[1])],
            Prim::Distinct => vec![-self.eq_word(&words[0], &words[1])],
            Prim::BvNot => words[0].iter().map(|&x| -x).collect(),
            Prim::BvNeg => self.neg_word(&words[0]),
            Prim::BvAnd => self.zip_gate(&words[0], &words[1], Self::and_gate),
            Prim::BvOr => self.zip_gate(&words[0], &words[1], Self::or_gate),
            Prim::BvXor => self.zip_gate(&words[0], &words[1], Self::xor_gate),
            Prim::BvAdd => self.add_word(&words[0], &words[1], -self.top),
            Prim::BvSub => self.sub_word(&words[0], &words[1]),
            Prim::BvMul => self.mul_word(&words[0], &words[1]),
            Prim::BvUdiv => self.divmod_word(&words[0], &words[1]).0,
            Prim::BvUrem => self.divmod_word(&words[0], &words[1]).1,
            Prim::BvShl => self.shift_word(&words[0], &words[1], true, -self.top),
            Prim::BvLshr => self.shift_word(&words[0], &words[1], false, -self.top),
            Prim::BvAshr => {
                let sign = *words[0].last().unwrap();
                self.shift_word(&words[0], &words[1], false, sign)
            }
            Prim::BvUlt => vec![self.ult_word(&words[0], &words[1])],
            Prim::BvUle => vec![-self.ult_word(&words[1], &words[0])],
            Prim::BvUgt => vec![self.ult_word(&words[1], &words[0])],
            Prim::BvUge => vec![-self.ult_word(&words[0], &words[1])],
            Prim::BvSlt => vec![self.slt_word(&words[0], &words[1])],
            Prim::BvSle => vec![-self.slt_word(&words[1], &words[0])],
            Prim::BvSgt => vec![self.slt_word(&words[1], &words[0])],
            Prim::BvSge => vec![-self.slt_word(&words[0], &words[1])],
            Prim::Concat => {
                // the second operand supplies the low bits
                let mut w = words[1].clone();
                w.extend_from_slice(&words[0]);
                w
            }
            Prim::Slice(upper, lower) => {
                words[0][lower as usize..=upper as usize].to_vec()
            }
            Prim::Repeat(n) => {
                let mut w = Vec::with_capacity(words[0].len() * n as usize);
                for _ in 0..n {
                    w.extend_from_slice(&words[0]);
                }
                w
            }
            Prim::ZeroExt(n) => {
                let mut w = words[0].clone();
                w.extend((0..n).map(|_| -self.top));
                w
            }
            Prim::SignExt(n) => {
                let sign = *words[0].last().unwrap();
                let mut w = words[0].clone();
                w.extend((0..n).map(|_| sign));
                w
            }
            Prim::Select | Prim::Store => {
                return Err(EngineError::Unsupported(
                    "array operation reached the bit-blaster".to_string(),
                ))
            }
        };
        Ok(word)
    }

    fn zip_gate(&mut self, a: &Word, b: &Word, gate: fn(&mut Self, Lit, Lit) -> Lit) -> Word {
        a.iter().zip(b).map(|(&x, &y)| gate(self, x, y)).collect()
    }

    // =============================
    // Driving the SAT solver
    // =============================

    /// Blast a boolean root and constrain it to hold.
    pub(crate) fn assert_root(&mut self, n: NodeId) -> Result<(), EngineError> {
        let word = self.blast(n)?;
        self.clause([word[0]]);
        Ok(())
    }

    pub(crate) fn solve(&mut self) -> Option<bool> {
        debug!(
            "blasted to {} variables, solving",
            self.next - 1
        );
        self.sat.solve()
    }

    /// Read back the values of every free variable the blaster saw.
    /// Bits the solver left unconstrained default to zero.
    pub(crate) fn var_assignment(&self) -> HashMap<NodeId, u64> {
        self.bits
            .iter()
            .filter(|(&n, _)| matches!(self.eng.node(n).kind, NodeKind::Var { .. }))
            .map(|(&n, word)| {
                let mut value = 0u64;
                for (i, &lit) in word.iter().enumerate() {
                    if self.sat.value(lit) == Some(true) {
                        value |= 1 << i;
                    }
                }
                (n, value)
            })
            .collect()
    }
}
