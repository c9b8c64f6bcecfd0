//! # kb-store
//!
//! The canonical fact store: [`Vocabulary`] (symbol interning plus the HDC
//! vector cache), [`FactStore`] (triples, compounds, aliases, transactional
//! writes), and the [`ContradictionDetector`] the store consults on every
//! `assert`.
//!
//! This crate has no knowledge of the DSL surface syntax (that's
//! `kb-parser`) or of rule-driven derivation (that's `kb-reason`) — it only
//! knows how to store, index, canonicalize, and dedup facts a caller hands
//! it, and to reject ones that contradict what's already there.

pub mod symbol;
pub mod alias;
pub mod expr;
pub mod contradiction;
pub mod store;

pub use symbol::{classify_name, SymbolId, SymbolKind, Vocabulary};
pub use alias::{AliasError, AliasKind, AliasTable};
pub use expr::{fingerprint, Arg, Compound, CompoundId, Expr, Fact, FactId, Polarity, Triple};
pub use contradiction::{ContradictionDetector, ContradictionReason, TheoryRules};
pub use store::{CandidateFact, Checkpoint, CommitSummary, FactStore, StoreError, Stats, Tx};

pub use rustc_hash::{FxHashMap, FxHashSet};
