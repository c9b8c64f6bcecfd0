//! Tokenizes and parses the strict-triple DSL into a stream of
//! [`ParsedStatement`]s, interning every symbol it meets into a caller-
//! supplied [`kb_store::Vocabulary`].
//!
//! This crate knows the surface syntax only. It has no notion of a fact
//! store transaction, a reasoner, or a session — those are `kb-store`,
//! `kb-reason`, and `kb-session` respectively. A parsed statement carries
//! everything a caller needs to hand a triple or compound straight to
//! [`kb_store::store::CandidateFact`].

mod error;
mod parser;
mod statement;
mod token;

pub use error::ParseError;
pub use parser::parse;
pub use statement::{
    MatchArg, ParamValue, ParsedStatement, RetractTarget, SolveBlock, SolveKind, SolveParam,
    StatementKind,
};
pub use token::{strip_comment, tokenize_line, Token};
