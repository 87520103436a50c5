// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Semantic sort kinds, used to key sort-construction requests.

use serde::Serialize;
use std::fmt;

/// The semantic kind of a sort. A backend is free to support only a
/// subset of these; requesting an unsupported kind is an error, never
/// a silent approximation.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Serialize, PartialOrd, Ord)]
pub enum Kind {
    /// Boolean sort
    Bool,
    /// Fixed-width bit-vector sort
    BitVec,
    /// Array sort with an index sort and an element sort
    Array,
    /// Uninterpreted sort (also keys function-signature construction,
    /// following SMT convention for declared symbols)
    Uninterpreted,
    /// Function signature sort (domain sorts and a range sort)
    Function,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Bool => "bool",
            Kind::BitVec => "bitvec",
            Kind::Array => "array",
            Kind::Uninterpreted => "uninterpreted",
            Kind::Function => "function",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_are_stable() {
        assert_eq!(Kind::Bool.to_string(), "bool");
        assert_eq!(Kind::BitVec.to_string(), "bitvec");
        assert_eq!(Kind::Array.to_string(), "array");
        assert_eq!(Kind::Uninterpreted.to_string(), "uninterpreted");
        assert_eq!(Kind::Function.to_string(), "function");
    }
}
