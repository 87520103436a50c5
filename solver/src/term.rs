// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Shared, immutable term nodes in the expression DAG.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use engine::NodeId;

use crate::op::Op;
use crate::sort::Sort;

/// A node in the expression DAG: a leaf (declared variable or literal)
/// or the result of applying an operator to operand terms.
///
/// A term records the backend's result handle, its ordered children,
/// and the operator (or leaf marker) that produced it, so later passes
/// can reconstruct the expression tree without re-querying the backend.
/// Terms are immutable once built; building a new expression only
/// creates new nodes referencing existing ones. Structural equality
/// coincides with handle equality because the backend hash-conses its
/// nodes.
#[derive(Debug, Clone)]
pub struct Term(Arc<TermInner>);

#[derive(Debug)]
struct TermInner {
    id: NodeId,
    sort: Sort,
    children: Vec<Term>,
    origin: Origin,
}

/// What produced a term.
#[derive(Debug, Clone)]
pub enum Origin {
    /// A declared free variable.
    FreeVar {
        /// Display label given at declaration; not necessarily unique.
        name: String,
    },
    /// A literal constant.
    Literal {
        /// The constant's value (booleans as 0/1).
        value: u64,
    },
    /// An operator application.
    Applied(Op),
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl Term {
    pub(crate) fn new(id: NodeId, sort: Sort, children: Vec<Term>, origin: Origin) -> Self {
        Term(Arc::new(TermInner {
            id,
            sort,
            children,
            origin,
        }))
    }

    pub(crate) fn id(&self) -> NodeId {
        self.0.id
    }

    /// The sort of this term.
    pub fn sort(&self) -> &Sort {
        &self.0.sort
    }

    /// Operand children in application order; empty for leaves.
    pub fn children(&self) -> &[Term] {
        &self.0.children
    }

    /// What produced this term.
    pub fn origin(&self) -> &Origin {
        &self.0.origin
    }

    /// The operator that produced this term, if it is an application.
    pub fn op(&self) -> Option<&Op> {
        match &self.0.origin {
            Origin::Applied(op) => Some(op),
            _ => None,
        }
    }

    /// Whether this term is a leaf (variable or literal).
    pub fn is_leaf(&self) -> bool {
        self.0.children.is_empty()
    }

    /// The constant's value, if this term is a literal leaf.
    pub fn as_literal(&self) -> Option<u64> {
        match &self.0.origin {
            Origin::Literal { value } => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.origin {
            Origin::FreeVar { name } => write!(f, "{name}"),
            Origin::Literal { value } => write!(f, "{value}"),
            Origin::Applied(op) => {
                write!(f, "({op}")?;
                for child in &self.0.children {
                    write!(f, " {child}")?;
                }
                write!(f, ")")
            }
        }
    }
}
