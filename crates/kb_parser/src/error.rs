//! Parse errors. Every variant carries the 1-based source line it was
//! raised on, so a caller can point a user at the offending text the same
//! way [`kb_base::SpannedError`] points at a byte range.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Token stream doesn't match any statement grammar rule.
    SyntaxInvalid { message: String, line: usize },
    /// `$name` was used but no earlier `@name` (in this parse, or in the
    /// caller's carried-over binding set) introduced it.
    UnresolvedReference { name: String, line: usize },
    /// `@name` binds a statement that itself references `$name`.
    CyclicReference { name: String, line: usize },
    /// `@name` collides with a connective keyword, directive keyword, or a
    /// reserved `__`-prefixed operator name.
    ReservedName { name: String, line: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::SyntaxInvalid { message, line } => {
                write!(f, "line {line}: {message}")
            }
            ParseError::UnresolvedReference { name, line } => {
                write!(f, "line {line}: unresolved reference '${name}'")
            }
            ParseError::CyclicReference { name, line } => {
                write!(f, "line {line}: '@{name}' cyclically refers to '${name}'")
            }
            ParseError::ReservedName { name, line } => {
                write!(f, "line {line}: '{name}' is a reserved name")
            }
        }
    }
}

impl std::error::Error for ParseError {}
