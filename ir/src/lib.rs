// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The solver-neutral vocabulary shared by clients and backends: sort
//! kinds and the closed set of primitive operators.
//!
//! Nothing in this crate references a backend; it is the language in
//! which sort and operator requests are phrased, while the `solver`
//! crate decides what a particular backend can do with them.

// configure clippy
#![allow(clippy::needless_return)]
// documentation-related lints (only checked when running rustdoc)
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod kind;
pub mod ops;

pub use kind::Kind;
pub use ops::PrimOp;
