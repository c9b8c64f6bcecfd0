//! The trace a successful [`crate::Reasoner::solve`] call leaves behind.
//! `kb-proof` walks a [`Derivation`] to build its step DAG; nothing in this
//! crate renders it for humans.

use kb_store::{FactId, SymbolId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derivation {
    /// The goal matched a fact already in the store, exactly.
    Fact(FactId),
    /// The goal followed from a chain of facts over a transitively-tagged
    /// relation (e.g. `partOf`, `ancestorOf`), or over `isA` itself.
    Transitive(Vec<FactId>),
    /// The goal matched a fact over a symmetrically-tagged relation, read
    /// in reverse.
    Symmetric(FactId),
    /// The goal followed by inheritance: `subject isA* category` (the
    /// chain recorded here) plus `category <op> object` already known of
    /// the category.
    Inherited { isa_chain: Vec<FactId>, property: Box<Derivation> },
    /// The goal was the consequent of an `Implies` fact whose antecedent
    /// was itself proven.
    ModusPonens { implication: FactId, antecedent: Box<Derivation> },
    /// `Not(P)` succeeded because `P` could not be proven under the
    /// closed-world assumption.
    ClosedWorldFailure,
    /// `Not(P)` succeeded because an explicit negative fact for `P` exists.
    ExplicitNegation(FactId),
    And(Vec<Derivation>),
    Or(Box<Derivation>),
    Exists { binding: SymbolId, witness: Box<Derivation> },
}
