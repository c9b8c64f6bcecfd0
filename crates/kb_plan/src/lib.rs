//! # kb-plan
//!
//! Two independent search procedures over a [`kb_store::FactStore`]: a
//! forward-search STRIPS-like [`Planner`] over `requires`/`causes`/
//! `prevents` actions, and a backtracking [`CspSolver`] over `domain`/
//! `constraint` facts. Neither mutates the store or touches `kb-reason`'s
//! goal resolution — they read facts the theory already asserted and
//! return a plan or a set of assignments for a caller (`kb-session`) to
//! turn into `plan`/`planStep`/`cspSolution` facts of its own.

pub mod action;
pub mod csp;
pub mod error;
pub mod planner;
pub mod request;
pub mod state;

pub use action::{extract_actions, resolve_literals, Action};
pub use csp::{Assignment, CspSolver};
pub use error::{CspError, PlanError};
pub use planner::{Plan, Planner};
pub use request::{PlanRequest, DEFAULT_MAX_DEPTH};
pub use state::State;
