//! # kb-proof
//!
//! Turns a [`kb_reason::Derivation`] into a human-renderable step DAG: a
//! [`ProofBuilder`] walks the derivation tree into [`Proof`]/[`Step`]
//! nodes, enforcing a maximum nesting depth and rejecting a path that
//! revisits the same fact twice, and can later re-validate a built proof
//! against a store whose facts may have moved on since.

pub mod builder;
pub mod error;
pub mod step;

pub use builder::{timeout_proof, ProofBuilder};
pub use error::ProofError;
pub use step::{Proof, Step, StepId, StepKind};
