// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Rewriting pass that eliminates arrays and uninterpreted functions.
//!
//! Array reads are pushed through writes (`select` over `store` becomes
//! an if-then-else on the indices) until they reach a base array
//! variable, where each distinct read becomes a fresh element variable.
//! Uninterpreted function applications likewise become fresh range
//! variables. Ackermann congruence constraints tie the fresh variables
//! together: whenever two instances of the same base agree on their
//! keys, they must agree on their values.

use std::collections::HashMap;

use itertools::Itertools;

use crate::engine::{Engine, Instance};
use crate::error::EngineError;
use crate::node::{NodeId, NodeKind, Prim, SortData, SortId};

/// Result of reducing an assertion set: the rewritten (array- and
/// function-free) assertions plus the bookkeeping value extraction
/// needs to interpret the fresh variables.
pub(crate) struct Reduction {
    pub(crate) assertions: Vec<NodeId>,
    pub(crate) rewrites: HashMap<NodeId, NodeId>,
    pub(crate) selects: Vec<Instance>,
    pub(crate) apps: Vec<Instance>,
}

struct Reducer<'a> {
    eng: &'a mut Engine,
    cache: HashMap<NodeId, NodeId>,
    selects: Vec<Instance>,
    apps: Vec<Instance>,
}

/// Rewrite the given assertions into pure bool/bit-vector form.
pub(crate) fn run(eng: &mut Engine, asserts: &[NodeId]) -> Result<Reduction, EngineError> {
    let mut red = Reducer {
        eng,
        cache: HashMap::new(),
        selects: Vec::new(),
        apps: Vec::new(),
    };
    let mut rewritten = asserts
        .iter()
        .map(|&a| red.rewrite(a))
        .collect::<Result<Vec<_>, _>>()?;
    let selects = red.selects.clone();
    let apps = red.apps.clone();
    rewritten.extend(red.congruence_for(&selects)?);
    rewritten.extend(red.congruence_for(&apps)?);
    Ok(Reduction {
        assertions: rewritten,
        rewrites: red.cache,
        selects: red.selects,
        apps: red.apps,
    })
}

impl Reducer<'_> {
    fn rewrite(&mut self, n: NodeId) -> Result<NodeId, EngineError> {
        if let Some(&r) = self.cache.get(&n) {
            return Ok(r);
        }
        let r = match self.eng.node(n).kind.clone() {
            NodeKind::Var { .. } | NodeKind::Lit(_) => n,
            NodeKind::App(Prim::Select, args) => {
                let key = self.rewrite(args[1])?;
                self.read(args[0], key)?
            }
            NodeKind::App(prim, args) => {
                let args = args
                    .iter()
                    .map(|&a| self.rewrite(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.eng.app(prim, &args)?
            }
            NodeKind::FunApp(fun, args) => {
                let keys = args
                    .iter()
                    .map(|&a| self.rewrite(a))
                    .collect::<Result<Vec<_>, _>>()?;
                let range = match self.eng.sort_data(self.eng.node_sort(fun)) {
                    SortData::Fun { range, .. } => *range,
                    _ => unreachable!("apply_fun checked the symbol's sort"),
                };
                self.instance_of(true, fun, keys, range)?
            }
            NodeKind::FunDecl { .. } => {
                return Err(EngineError::SortMismatch(
                    "a bare function symbol cannot appear as a term".to_string(),
                ))
            }
        };
        self.cache.insert(n, r);
        Ok(r)
    }

    /// Rewrite a read of `key` (already rewritten) from the original
    /// array-sorted node `array`, distributing over writes and
    /// if-then-elses until a base variable is reached.
    fn read(&mut self, array: NodeId, key: NodeId) -> Result<NodeId, EngineError> {
        match self.eng.node(array).kind.clone() {
            NodeKind::App(Prim::Store, args) => {
                let index = self.rewrite(args[1])?;
                let value = self.rewrite(args[2])?;
                let hit = self.eng.eq(key, index)?;
                let miss = self.read(args[0], key)?;
                self.eng.ite(hit, value, miss)
            }
            NodeKind::App(Prim::Ite, args) => {
                let cond = self.rewrite(args[0])?;
                let then = self.read(args[1], key)?;
                let els = self.read(args[2], key)?;
                self.eng.ite(cond, then, els)
            }
            NodeKind::Var { .. } => {
                let element = match self.eng.sort_data(self.eng.node_sort(array)) {
                    SortData::Array { element, .. } => *element,
                    _ => unreachable!("select checked the operand's sort"),
                };
                self.instance_of(false, array, vec![key], element)
            }
            _ => Err(EngineError::Unsupported(
                "array term not built from variables, stores, and ites".to_string(),
            )),
        }
    }

    /// Find or mint the fresh variable standing for one instance of a
    /// base array or function symbol applied to the given keys.
    /// Reusing the variable when the key nodes are identical keeps the
    /// congruence constraint set small.
    fn instance_of(
        &mut self,
        is_app: bool,
        parent: NodeId,
        keys: Vec<NodeId>,
        sort: SortId,
    ) -> Result<NodeId, EngineError> {
        let pool = if is_app { &self.apps } else { &self.selects };
        if let Some(inst) = pool
            .iter()
            .find(|i| i.parent == parent && i.keys == keys)
        {
            return Ok(inst.result);
        }
        let label = if is_app { "app" } else { "sel" };
        let result = self.eng.fresh_var(label, sort)?;
        let inst = Instance {
            parent,
            keys,
            result,
        };
        if is_app {
            self.apps.push(inst);
        } else {
            self.selects.push(inst);
        }
        Ok(result)
    }

    /// Pairwise congruence over instances of each shared base: equal
    /// keys force equal results.
    fn congruence_for(&mut self, pool: &[Instance]) -> Result<Vec<NodeId>, EngineError> {
        let mut out = Vec::new();
        for (a, b) in pool.iter().tuple_combinations() {
            if a.parent != b.parent {
                continue;
            }
            let (a, b) = (a.clone(), b.clone());
            let mut agree = None;
            for (&ka, &kb) in a.keys.iter().zip(&b.keys) {
                let eq = self.eng.eq(ka, kb)?;
                agree = Some(match agree {
                    None => eq,
                    Some(prev) => self.eng.and(prev, eq)?,
                });
            }
            let same = self.eng.eq(a.result, b.result)?;
            out.push(match agree {
                None => same,
                Some(cond) => self.eng.implies(cond, same)?,
            });
        }
        Ok(out)
    }
}
