//! # kb-reason
//!
//! Forward-chaining goal resolution over a [`kb_store::FactStore`]:
//! unification, exact/transitive/symmetric/inherited lookup, modus ponens
//! over asserted `Implies` facts, and `And`/`Or`/`Not`/`Exists` combinators.
//!
//! This crate never mutates the store's facts — only its lazily-cached HDC
//! vectors, when [`config::ReasoningPriority::Holographic`] asks for a
//! similarity-ranked tiebreak. Soundness never depends on that ranking:
//! it only orders which of several already-valid derivations is returned
//! first.

pub mod config;
pub mod derivation;
pub mod error;
pub mod query;
pub mod reasoner;
pub mod unify;

pub use config::{ReasonerConfig, ReasoningPriority};
pub use derivation::Derivation;
pub use error::{Budget, ReasonError, ReasonerStats};
pub use query::Query;
pub use reasoner::Reasoner;
pub use unify::Bindings;
