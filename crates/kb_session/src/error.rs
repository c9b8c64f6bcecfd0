//! The error kinds a [`crate::Session`] call can return.
//!
//! None of these are fatal to the session itself — a rejected `learn`
//! rolls its transaction back and leaves the store exactly as it was; a
//! `prove`/`query` error is just another shape of "couldn't conclude
//! that". The variants below mirror the error-kind table surfaced through
//! `learn`'s `errors[]`/`warnings[]` lists.

use std::fmt;

use kb_parser::ParseError;
use kb_plan::{CspError, PlanError};
use kb_proof::ProofError;
use kb_reason::ReasonError;
use kb_store::StoreError;

#[derive(Debug, Clone)]
pub enum SessionError {
    /// The DSL source didn't parse.
    Parse(ParseError),
    /// A `$name`/`@name` reference didn't resolve to a known binding.
    UnresolvedReference(String),
    /// `learn` would have produced a fact the store's contradiction
    /// detector rejects; the whole transaction was rolled back.
    ContradictionRejected(String),
    /// The reasoner ran out of its `timeoutMs` budget.
    TimeoutExceeded,
    /// `proofValidationEnabled` found a step that doesn't revalidate
    /// against the current store, overriding a "proven" verdict.
    ProofInvalid,
    /// A `solve { planning ... }` block had no solution within `maxDepth`.
    PlanUnsolvable,
    /// A `solve { csp ... }` block had no satisfying assignment.
    CspUnsolvable,
    /// A triple's operator position named a symbol the vocabulary never
    /// marked as an operator.
    UnknownOperator(String),
    /// A `solve` block was missing a required parameter, or one of its
    /// parameters had the wrong shape (e.g. `maxDepth` given a symbol
    /// instead of an integer).
    InvalidSolveBlock(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Parse(e) => write!(f, "{e}"),
            SessionError::UnresolvedReference(name) => write!(f, "unresolved reference: {name}"),
            SessionError::ContradictionRejected(detail) => {
                write!(f, "contradiction rejected: {detail}")
            }
            SessionError::TimeoutExceeded => write!(f, "reasoning timed out"),
            SessionError::ProofInvalid => write!(f, "proof failed revalidation"),
            SessionError::PlanUnsolvable => write!(f, "no plan satisfies the goal"),
            SessionError::CspUnsolvable => write!(f, "no assignment satisfies every constraint"),
            SessionError::UnknownOperator(name) => write!(f, "unknown operator: {name}"),
            SessionError::InvalidSolveBlock(detail) => write!(f, "invalid solve block: {detail}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ParseError> for SessionError {
    fn from(e: ParseError) -> Self {
        SessionError::Parse(e)
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Contradiction(reason) => {
                SessionError::ContradictionRejected(format!("{reason:?}"))
            }
            other => SessionError::ContradictionRejected(other.to_string()),
        }
    }
}

impl From<ReasonError> for SessionError {
    fn from(e: ReasonError) -> Self {
        match e {
            ReasonError::IterationBudgetExceeded => SessionError::TimeoutExceeded,
            ReasonError::Timeout => SessionError::TimeoutExceeded,
        }
    }
}

impl From<ProofError> for SessionError {
    fn from(_: ProofError) -> Self {
        SessionError::ProofInvalid
    }
}

impl From<PlanError> for SessionError {
    fn from(_: PlanError) -> Self {
        SessionError::PlanUnsolvable
    }
}

impl From<CspError> for SessionError {
    fn from(_: CspError) -> Self {
        SessionError::CspUnsolvable
    }
}
