//! Top-level `learn`/`prove`/`query` orchestration over the lower
//! reasoning crates.
//!
//! Everything below this crate — parsing, storage, reasoning, proof
//! rendering, planning — is stateless or structure-only. [`Session`] is
//! the one thing here that owns state across calls: a [`kb_store::FactStore`]
//! and its vocabulary, the `@name`/`$name` binding environment, and the
//! cumulative reasoning counters a caller can read back via `stats()`.
//!
//! ## Module Structure
//!
//! - [`config`] - `SessionConfig`, the knobs fixed at construction time
//! - [`env`] - the `@name`/`$name` binding environment
//! - [`error`] - `SessionError`, aggregating every lower crate's error type
//! - [`theory`] - theory file discovery (`.sys2`/`.sys2dsl`)
//! - [`session`] - `Session` itself
//!
//! ## Example
//!
//! ```
//! use kb_session::{Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default());
//! session.learn("isA Fido Dog\nisA Dog Mammal");
//! let proven = session.prove("isA Fido Mammal");
//! assert_eq!(proven.verdict, kb_session::Verdict::Proven);
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod session;
pub mod theory;

pub use config::SessionConfig;
pub use env::BindingEnv;
pub use error::SessionError;
pub use session::{LearnReport, ProveReport, QueryMatch, QueryOptions, Session, SessionStats, Verdict};
pub use theory::TheoryFileReport;
