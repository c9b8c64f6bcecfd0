//! # kb-hdc
//!
//! Pluggable hyperdimensional computing (HDC) vector algebra.
//!
//! The reasoner never treats an [`HdcVector`] as ground truth — unification
//! and rule firing close exclusively through symbolic facts. HDC similarity
//! is used only to *rank* candidate symbols when more than one unifies, and
//! only when `holographicPriority` asks for it (see `kb-reason`). This crate
//! has no knowledge of triples, the DSL, or the fact store.
//!
//! Three strategies share one [`HdcStrategy`] contract:
//!
//! - [`DenseBinaryStrategy`] — dense bipolar `{-1, +1}` vectors, binding by
//!   elementwise multiplication (self-inverse, so `bind == unbind`).
//! - [`SparsePolynomialStrategy`] — short integer-coefficient vectors over a
//!   fixed ring, binding by modular convolution.
//! - [`MetricAffineStrategy`] — dense real vectors, binding by circular
//!   (Hadamard) rotation, similarity by cosine.
//!
//! None of these reproduce a specific production bit layout; they exist to
//! satisfy the algebraic contract (`bind`/`unbind` approximately invert,
//! `bundle` is commutative and preserves similarity to its inputs,
//! `similarity` is symmetric, bounded, and scales with structural overlap).

mod dense;
mod sparse;
mod affine;
mod strategy;

pub use dense::DenseBinaryStrategy;
pub use sparse::SparsePolynomialStrategy;
pub use affine::MetricAffineStrategy;
pub use strategy::{HdcStrategy, HdcStrategyKind, HdcVector};
