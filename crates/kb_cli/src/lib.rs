//! kb CLI
//!
//! Command-line interface for the kb reasoning engine: a thin one-shot
//! driver over [`kb_session::Session`].
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `kb learn` | Assert DSL statements from stdin or a file |
//! | `kb prove` | Prove a single goal statement |
//! | `kb query` | Find every binding that satisfies a pattern |
//!
//! # Module Structure
//!
//! - [`cli`] - Command-line argument parsing and dispatch
//! - [`config`] - `--config` file loading (TOML or JSON)

pub mod cli;
pub mod config;

/// Entry point for the CLI. Parses arguments and dispatches to the
/// appropriate command. See [`cli::run_cli`] for details.
pub use cli::run_cli;
