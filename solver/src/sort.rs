// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Shared, immutable sort handles with structural introspection.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use engine::SortId;
use ir::Kind;
use itertools::Itertools;

/// The semantic type of a term: a shared immutable handle pairing the
/// backend's native sort with enough structure to answer introspection
/// queries without consulting the backend.
///
/// Sorts are cheap to clone and compare; the backend hash-conses its
/// sorts, so structural equality coincides with handle equality within
/// one session.
#[derive(Debug, Clone)]
pub struct Sort(Arc<SortInner>);

#[derive(Debug)]
struct SortInner {
    id: SortId,
    shape: Shape,
}

#[derive(Debug)]
pub(crate) enum Shape {
    Bool,
    BitVec(u32),
    Array { index: Sort, element: Sort },
    Function { domain: Vec<Sort>, range: Sort },
}

impl PartialEq for Sort {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Sort {}

impl Hash for Sort {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl Sort {
    pub(crate) fn new(id: SortId, shape: Shape) -> Self {
        Sort(Arc::new(SortInner { id, shape }))
    }

    pub(crate) fn id(&self) -> SortId {
        self.0.id
    }

    /// The semantic kind of this sort.
    pub fn kind(&self) -> Kind {
        match &self.0.shape {
            Shape::Bool => Kind::Bool,
            Shape::BitVec(_) => Kind::BitVec,
            Shape::Array { .. } => Kind::Array,
            Shape::Function { .. } => Kind::Function,
        }
    }

    /// Width in bits, for bit-vector sorts.
    pub fn width(&self) -> Option<u32> {
        match &self.0.shape {
            Shape::BitVec(w) => Some(*w),
            _ => None,
        }
    }

    /// Index sort, for array sorts.
    pub fn index_sort(&self) -> Option<&Sort> {
        match &self.0.shape {
            Shape::Array { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Element sort, for array sorts.
    pub fn element_sort(&self) -> Option<&Sort> {
        match &self.0.shape {
            Shape::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Domain sorts, for function-signature sorts.
    pub fn domain(&self) -> Option<&[Sort]> {
        match &self.0.shape {
            Shape::Function { domain, .. } => Some(domain),
            _ => None,
        }
    }

    /// Range sort, for function-signature sorts.
    pub fn range(&self) -> Option<&Sort> {
        match &self.0.shape {
            Shape::Function { range, .. } => Some(range),
            _ => None,
        }
    }

    /// Number of arguments a function of this signature takes.
    pub fn arity(&self) -> Option<usize> {
        self.domain().map(<[Sort]>::len)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.shape {
            Shape::Bool => write!(f, "bool"),
            Shape::BitVec(w) => write!(f, "bitvec[{w}]"),
            Shape::Array { index, element } => write!(f, "array[{index} -> {element}]"),
            Shape::Function { domain, range } => {
                let domain = domain.iter().map(Sort::to_string).join(", ");
                write!(f, "fun[({domain}) -> {range}]")
            }
        }
    }
}
