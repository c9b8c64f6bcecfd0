//! # kb-base
//!
//! Pure structural atoms shared by every crate in the reasoning engine:
//!
//! - [`Interner`]/[`Symbol`] — string interning for O(1) equality; the
//!   `Vocabulary` in `kb-store` is built directly on top of this.
//! - [`Span`] — source location tracking for parse errors and fact
//!   provenance.
//! - [`SpannedError`]/[`Result`] — errors with source positions.
//!
//! # Design Principles
//!
//! This crate has **no knowledge of the DSL grammar, the fact store, or
//! reasoning**. It provides only generic, reusable infrastructure that
//! higher-level crates build upon.
//!
//! # Example
//!
//! ```
//! use kb_base::{Interner, Span};
//!
//! let mut interner = Interner::new();
//! let hello = interner.intern("hello");
//! let span = Span::new(0, 5);
//!
//! assert_eq!(interner.resolve(hello), "hello");
//! assert_eq!(span.len(), 5);
//! ```

pub mod intern;
pub mod span;
pub mod error;

pub use intern::{Interner, Symbol, SymbolEq};
pub use span::Span;
pub use error::{SpannedError, Result};
