//! Extracts STRIPS-like actions from `requires`/`causes`/`prevents` facts.
//!
//! Each literal in an action's requires/causes/prevents list is named by a
//! reference symbol (`$literalName`) rather than written inline — the
//! strict-triple grammar only has two argument slots, so a multi-field state
//! literal is asserted once as its own ground fact and bound to a name, and
//! the action triples just point at that name. `bindings` is the
//! reference-name-to-fact table a caller (normally a session) built while
//! loading the theory.

use kb_store::{Arg, FactId, FactStore, SymbolId, Triple};
use rustc_hash::FxHashMap;

use crate::error::PlanError;

#[derive(Debug, Clone)]
pub struct Action {
    pub name: SymbolId,
    pub requires: Vec<Triple>,
    pub causes: Vec<Triple>,
    pub prevents: Vec<Triple>,
}

impl Action {
    fn new(name: SymbolId) -> Self {
        Self { name, requires: Vec::new(), causes: Vec::new(), prevents: Vec::new() }
    }
}

fn resolve_literal(
    store: &FactStore,
    bindings: &FxHashMap<SymbolId, FactId>,
    literal_ref: SymbolId,
) -> Result<Triple, PlanError> {
    let fact_id = *bindings.get(&literal_ref).ok_or(PlanError::UnresolvedLiteral(literal_ref))?;
    let fact = store.fact(fact_id).ok_or(PlanError::UnresolvedLiteral(literal_ref))?;
    Ok(fact.triple)
}

/// Collects every distinct action named as the subject of a `requires`,
/// `causes`, or `prevents` fact, in the order each action name was first
/// seen (ascending fact-id order, since [`FactStore::by_operator`] iterates
/// in insertion order) — the order the planner later breaks lexicographic
/// ties within, after re-sorting by name.
pub fn extract_actions(
    store: &FactStore,
    bindings: &FxHashMap<SymbolId, FactId>,
    requires_op: SymbolId,
    causes_op: SymbolId,
    prevents_op: SymbolId,
) -> Result<Vec<Action>, PlanError> {
    let mut by_name: FxHashMap<SymbolId, Action> = FxHashMap::default();
    let mut order: Vec<SymbolId> = Vec::new();

    for fact in store.by_operator(requires_op) {
        let (name, literal_ref) = match (fact.triple.arg1, fact.triple.arg2) {
            (Arg::Symbol(n), Arg::Symbol(l)) => (n, l),
            _ => continue,
        };
        let literal = resolve_literal(store, bindings, literal_ref)?;
        by_name.entry(name).or_insert_with(|| {
            order.push(name);
            Action::new(name)
        });
        by_name.get_mut(&name).unwrap().requires.push(literal);
    }

    for fact in store.by_operator(causes_op) {
        let (name, literal_ref) = match (fact.triple.arg1, fact.triple.arg2) {
            (Arg::Symbol(n), Arg::Symbol(l)) => (n, l),
            _ => continue,
        };
        let literal = resolve_literal(store, bindings, literal_ref)?;
        by_name.entry(name).or_insert_with(|| {
            order.push(name);
            Action::new(name)
        });
        by_name.get_mut(&name).unwrap().causes.push(literal);
    }

    for fact in store.by_operator(prevents_op) {
        let (name, literal_ref) = match (fact.triple.arg1, fact.triple.arg2) {
            (Arg::Symbol(n), Arg::Symbol(l)) => (n, l),
            _ => continue,
        };
        let literal = resolve_literal(store, bindings, literal_ref)?;
        by_name.entry(name).or_insert_with(|| {
            order.push(name);
            Action::new(name)
        });
        by_name.get_mut(&name).unwrap().prevents.push(literal);
    }

    Ok(order.into_iter().map(|name| by_name.remove(&name).unwrap()).collect())
}

/// Resolves a `start`/`goal` reference list into ground literals.
pub fn resolve_literals(
    store: &FactStore,
    bindings: &FxHashMap<SymbolId, FactId>,
    refs: &[SymbolId],
) -> Result<Vec<Triple>, PlanError> {
    refs.iter().map(|r| resolve_literal(store, bindings, *r)).collect()
}
