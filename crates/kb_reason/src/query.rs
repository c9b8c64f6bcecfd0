//! The goal language the reasoner evaluates. Separate from
//! [`kb_store::Expr`] (what gets stored) because a query additionally
//! needs existential quantification over fresh variables, which is never a
//! shape a committed fact takes.

use kb_store::{SymbolId, Triple};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Atom(Triple),
    And(Vec<Query>),
    Or(Vec<Query>),
    Not(Box<Query>),
    /// `exists ?x. body` — `var` must classify as [`kb_store::SymbolKind::Variable`].
    Exists(SymbolId, Box<Query>),
}

impl Query {
    pub fn atom(triple: Triple) -> Self {
        Query::Atom(triple)
    }

    pub fn not(inner: Query) -> Self {
        Query::Not(Box::new(inner))
    }

    pub fn exists(var: SymbolId, inner: Query) -> Self {
        Query::Exists(var, Box::new(inner))
    }
}
