// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Word-level evaluation of nodes under a satisfying assignment.
//!
//! Works on the original (un-rewritten) graph: a node that took part in
//! the last check is resolved through the reduction's rewrite map;
//! anything else is computed structurally. Array reads walk their store
//! chain and fall back to the Ackermann instances recorded at solve
//! time. Variables the SAT solver never saw evaluate to zero.

use std::collections::HashMap;

use crate::engine::{Engine, Instance, Solved};
use crate::error::EngineError;
use crate::node::{NodeId, NodeKind, Prim};

pub(crate) fn eval(eng: &Engine, solved: &Solved, n: NodeId) -> Result<u64, EngineError> {
    Evaluator {
        eng,
        solved,
        memo: HashMap::new(),
    }
    .eval(n)
}

struct Evaluator<'a> {
    eng: &'a Engine,
    solved: &'a Solved,
    memo: HashMap<NodeId, u64>,
}

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Sign-extend a `width`-bit value to an `i64`.
fn signed(value: u64, width: u32) -> i64 {
    let shift = 64 - width;
    ((value << shift) as i64) >> shift
}

impl Evaluator<'_> {
    fn eval(&mut self, n: NodeId) -> Result<u64, EngineError> {
        if let Some(&v) = self.memo.get(&n) {
            return Ok(v);
        }
        if let Some(&r) = self.solved.rewrites.get(&n) {
            if r != n {
                let v = self.eval(r)?;
                self.memo.insert(n, v);
                return Ok(v);
            }
        }
        let v = match self.eng.node(n).kind.clone() {
            NodeKind::Var { .. } => self.solved.assignment.get(&n).copied().unwrap_or(0),
            NodeKind::Lit(v) => v,
            NodeKind::App(Prim::Select, args) => {
                let key = self.eval(args[1])?;
                self.read(args[0], key)?
            }
            NodeKind::App(prim, args) => self.eval_app(prim, &args)?,
            NodeKind::FunApp(fun, args) => {
                let keys = args
                    .iter()
                    .map(|&a| self.eval(a))
                    .collect::<Result<Vec<_>, _>>()?;
                let solved = self.solved;
                self.lookup_instance(&solved.apps, fun, &keys)?
            }
            NodeKind::FunDecl { .. } => {
                return Err(EngineError::SortMismatch(
                    "a bare function symbol has no value".to_string(),
                ))
            }
        };
        self.memo.insert(n, v);
        Ok(v)
    }

    /// Evaluate a read of `key` from an array expression by walking
    /// its store chain.
    fn read(&mut self, array: NodeId, key: u64) -> Result<u64, EngineError> {
        match self.eng.node(array).kind.clone() {
            NodeKind::App(Prim::Store, args) => {
                if self.eval(args[1])? == key {
                    self.eval(args[2])
                } else {
                    self.read(args[0], key)
                }
            }
            NodeKind::App(Prim::Ite, args) => {
                if self.eval(args[0])? != 0 {
                    self.read(args[1], key)
                } else {
                    self.read(args[2], key)
                }
            }
            NodeKind::Var { .. } => {
                let solved = self.solved;
                self.lookup_instance(&solved.selects, array, &[key])
            }
            _ => Err(EngineError::Unsupported(
                "array term not built from variables, stores, and ites".to_string(),
            )),
        }
    }

    /// Match an Ackermann instance of `parent` whose keys evaluate to
    /// the given values; an unconstrained point defaults to zero.
    fn lookup_instance(
        &mut self,
        pool: &[Instance],
        parent: NodeId,
        keys: &[u64],
    ) -> Result<u64, EngineError> {
        for inst in pool {
            if inst.parent != parent || inst.keys.len() != keys.len() {
                continue;
            }
            let mut all = true;
            for (&k, &want) in inst.keys.iter().zip(keys) {
                if self.eval(k)? != want {
                    all = false;
                    break;
                }
            }
            if all {
                return self.eval(inst.result);
            }
        }
        Ok(0)
    }

    fn eval_app(&mut self, prim: Prim, args: &[NodeId]) -> Result<u64, EngineError> {
        let vals = args
            .iter()
            .map(|&a| self.eval(a))
            .collect::<Result<Vec<_>, _>>()?;
        let arg_width = self.eng.width(self.eng.node_sort(args[0]))?;
        let m = mask(arg_width);
        let v = match prim {
            Prim::Not => 1 - vals[0],
            Prim::And => vals[0] & vals[1],
            Prim::Or => vals[0] | vals[1],
            Prim::Xor => vals[0] ^ vals[1],
            Prim::Implies => (1 - vals[0]) | vals[1],
            Prim::Iff => (vals[0] == vals[1]) as u64,
            Prim::Ite => {
                if vals[0] != 0 {
                    vals[1]
                } else {
                    vals[2]
                }
            }
            Prim::Eq => (vals[0] == vals[1]) as u64,
            Prim::Distinct => (vals[0] != vals[1]) as u64,
            Prim::BvNeg => vals[0].wrapping_neg() & m,
            Prim::BvNot => !vals[0] & m,
            Prim::BvAdd => vals[0].wrapping_add(vals[1]) & m,
            Prim::BvSub => vals[0].wrapping_sub(vals[1]) & m,
            Prim::BvMul => vals[0].wrapping_mul(vals[1]) & m,
            Prim::BvUdiv => {
                if vals[1] == 0 {
                    m
                } else {
                    vals[0] / vals[1]
                }
            }
            Prim::BvUrem => {
                if vals[1] == 0 {
                    vals[0]
                } else {
                    vals[0] % vals[1]
                }
            }
            Prim::BvAnd => vals[0] & vals[1],
            Prim::BvOr => vals[0] | vals[1],
            Prim::BvXor => vals[0] ^ vals[1],
            Prim::BvShl => {
                if vals[1] >= arg_width as u64 {
                    0
                } else {
                    vals[0].wrapping_shl(vals[1] as u32) & m
                }
            }
            Prim::BvLshr => {
                if vals[1] >= arg_width as u64 {
                    0
                } else {
                    vals[0] >> vals[1]
                }
            }
            Prim::BvAshr => {
                let shift = vals[1].min(arg_width as u64 - 1);
                (signed(vals[0], arg_width) >> shift) as u64 & m
            }
            Prim::BvUlt => (vals[0] < vals[1]) as u64,
            Prim::BvUle => (vals[0] <= vals[1]) as u64,
            Prim::BvUgt => (vals[0] > vals[1]) as u64,
            Prim::BvUge => (vals[0] >= vals[1]) as u64,
            Prim::BvSlt => (signed(vals[0], arg_width) < signed(vals[1], arg_width)) as u64,
            Prim::BvSle => (signed(vals[0], arg_width) <= signed(vals[1], arg_width)) as u64,
            Prim::BvSgt => (signed(vals[0], arg_width) > signed(vals[1], arg_width)) as u64,
            Prim::BvSge => (signed(vals[0], arg_width) >= signed(vals[1], arg_width)) as u64,
            Prim::Concat => {
                let low_width = self.eng.width(self.eng.node_sort(args[1]))?;
                (vals[0] << low_width) | vals[1]
            }
            Prim::Slice(upper, lower) => (vals[0] >> lower) & mask(upper - lower + 1),
            Prim::Repeat(n) => {
                let mut v = 0u64;
                for i in 0..n {
                    v |= vals[0] << (i * arg_width);
                }
                v
            }
            Prim::ZeroExt(_) => vals[0],
            Prim::SignExt(n) => signed(vals[0], arg_width) as u64 & mask(arg_width + n),
            Prim::Select | Prim::Store => {
                unreachable!("select is handled by the caller and store has no word value")
            }
        };
        Ok(v)
    }
}
