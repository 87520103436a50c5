// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! A small word-level satisfiability engine over booleans, fixed-width
//! bit-vectors, arrays, and uninterpreted functions.
//!
//! This crate is the *wrapped* side of the solver boundary: it exposes
//! the capability set a backend binding needs (session creation,
//! native sort construction, leaf nodes, a fixed catalogue of primitive
//! node builders, satisfiability checking, and value extraction) and
//! nothing else. The `solver` crate's facade talks to [`Engine`]
//! exclusively through that surface.
//!
//! Internally, nodes and sorts live in hash-consed arenas behind `Copy`
//! id handles, so structurally identical requests share a handle.
//! `check_sat` rewrites arrays and uninterpreted functions away
//! (read-over-write elimination plus Ackermann constraints), bit-blasts
//! the remaining word-level graph to CNF, and hands the clauses to the
//! [CaDiCaL][cadical] SAT solver.
//!
//! [cadical]: https://fmv.jku.at/cadical/

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::should_implement_trait)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::broken_intra_doc_links)]

mod blast;
mod engine;
mod error;
mod eval;
mod node;
mod reduce;

pub use crate::engine::Engine;
pub use error::EngineError;
pub use node::{NodeId, SortData, SortId};
