//! Error types for the planner and the CSP solver.

use kb_store::SymbolId;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A `start`/`goal`/`requires`/`causes`/`prevents` literal reference
    /// didn't resolve to a known fact.
    UnresolvedLiteral(SymbolId),
    /// Forward search exhausted its depth bound without reaching a state
    /// that subsumes the goal literals.
    Unsolvable { depth_tried: usize },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::UnresolvedLiteral(sym) => write!(f, "unresolved plan literal: symbol {}", sym.index()),
            PlanError::Unsolvable { depth_tried } => {
                write!(f, "no plan found within {depth_tried} steps")
            }
        }
    }
}

impl std::error::Error for PlanError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CspError {
    /// AC-3 emptied some variable's domain before search even started.
    DomainWipeout(SymbolId),
    /// Backtracking search explored every assignment with no solution.
    Unsolvable,
}

impl fmt::Display for CspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CspError::DomainWipeout(var) => write!(f, "domain of variable {} emptied by arc consistency", var.index()),
            CspError::Unsolvable => write!(f, "no assignment satisfies every constraint"),
        }
    }
}

impl std::error::Error for CspError {}
