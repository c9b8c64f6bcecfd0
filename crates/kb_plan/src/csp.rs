//! Binary-constraint CSP solving: `domain` facts declare each variable's
//! candidate values, `constraint` facts declare that two variables must be
//! assigned different values (the graph-coloring/map-coloring baseline).
//! AC-3 prunes obviously-dead values before a backtracking search
//! enumerates every remaining satisfying assignment.

use std::collections::VecDeque;

use kb_store::{Arg, FactStore, SymbolId};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::CspError;

pub type Assignment = FxHashMap<SymbolId, SymbolId>;

struct Problem {
    variables: Vec<SymbolId>,
    domains: FxHashMap<SymbolId, Vec<SymbolId>>,
    neighbors: FxHashMap<SymbolId, Vec<SymbolId>>,
}

fn build_problem(store: &FactStore, domain_op: SymbolId, constraint_op: SymbolId) -> Problem {
    let mut variables = Vec::new();
    let mut seen_vars = FxHashSet::default();
    let mut domains: FxHashMap<SymbolId, Vec<SymbolId>> = FxHashMap::default();

    for fact in store.by_operator(domain_op) {
        let (var, value) = match (fact.triple.arg1, fact.triple.arg2) {
            (Arg::Symbol(v), Arg::Symbol(val)) => (v, val),
            _ => continue,
        };
        if seen_vars.insert(var) {
            variables.push(var);
        }
        domains.entry(var).or_default().push(value);
    }

    let mut neighbors: FxHashMap<SymbolId, Vec<SymbolId>> = FxHashMap::default();
    for fact in store.by_operator(constraint_op) {
        let (a, b) = match (fact.triple.arg1, fact.triple.arg2) {
            (Arg::Symbol(a), Arg::Symbol(b)) => (a, b),
            _ => continue,
        };
        neighbors.entry(a).or_default().push(b);
        neighbors.entry(b).or_default().push(a);
    }

    Problem { variables, domains, neighbors }
}

/// Removes values from `domains[xi]` that have no supporting value left in
/// `domains[xj]` under inequality. Returns whether anything was removed.
fn revise(domains: &mut FxHashMap<SymbolId, Vec<SymbolId>>, xi: SymbolId, xj: SymbolId) -> bool {
    let xj_values = domains.get(&xj).cloned().unwrap_or_default();
    let before = domains.get(&xi).map(|d| d.len()).unwrap_or(0);
    if let Some(values) = domains.get_mut(&xi) {
        values.retain(|vi| xj_values.iter().any(|vj| vj != vi));
    }
    domains.get(&xi).map(|d| d.len()).unwrap_or(0) != before
}

fn ac3(problem: &mut Problem) -> Result<(), CspError> {
    let mut queue: VecDeque<(SymbolId, SymbolId)> = VecDeque::new();
    for (&xi, js) in &problem.neighbors {
        for &xj in js {
            queue.push_back((xi, xj));
        }
    }

    while let Some((xi, xj)) = queue.pop_front() {
        if revise(&mut problem.domains, xi, xj) {
            if problem.domains.get(&xi).map_or(true, |d| d.is_empty()) {
                return Err(CspError::DomainWipeout(xi));
            }
            for &xk in problem.neighbors.get(&xi).into_iter().flatten() {
                if xk != xj {
                    queue.push_back((xk, xi));
                }
            }
        }
    }
    Ok(())
}

fn consistent(assignment: &Assignment, problem: &Problem, var: SymbolId, value: SymbolId) -> bool {
    problem
        .neighbors
        .get(&var)
        .into_iter()
        .flatten()
        .all(|other| assignment.get(other).map_or(true, |assigned| *assigned != value))
}

fn backtrack(problem: &Problem, index: usize, assignment: &mut Assignment, solutions: &mut Vec<Assignment>) {
    if index == problem.variables.len() {
        solutions.push(assignment.clone());
        return;
    }
    let var = problem.variables[index];
    let values = problem.domains.get(&var).cloned().unwrap_or_default();
    for value in values {
        if consistent(assignment, problem, var, value) {
            assignment.insert(var, value);
            backtrack(problem, index + 1, assignment, solutions);
            assignment.remove(&var);
        }
    }
}

pub struct CspSolver;

impl CspSolver {
    pub fn new() -> Self {
        Self
    }

    /// Finds every assignment satisfying all inequality constraints. Order
    /// of `Vec` entries is deterministic: variables and their domain values
    /// are enumerated in ascending fact-id (insertion) order throughout.
    pub fn solve_all(&self, store: &FactStore, domain_op: SymbolId, constraint_op: SymbolId) -> Result<Vec<Assignment>, CspError> {
        let mut problem = build_problem(store, domain_op, constraint_op);
        ac3(&mut problem)?;

        let mut solutions = Vec::new();
        let mut assignment = Assignment::default();
        backtrack(&problem, 0, &mut assignment, &mut solutions);

        if solutions.is_empty() {
            return Err(CspError::Unsolvable);
        }
        Ok(solutions)
    }
}

impl Default for CspSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_hdc::HdcStrategyKind;
    use kb_store::{CandidateFact, Polarity, Vocabulary};

    fn triple(store: &mut FactStore, op: &str, a: &str, b: &str) {
        let op_id = store.vocabulary_mut().get_or_create(op);
        store.vocabulary_mut().mark_operator(op_id);
        let a_id = store.vocabulary_mut().get_or_create(a);
        let b_id = store.vocabulary_mut().get_or_create(b);
        let mut tx = store.begin();
        tx.assert(CandidateFact::triple(op_id, Arg::Symbol(a_id), Arg::Symbol(b_id), Polarity::Positive)).unwrap();
        tx.commit();
    }

    /// Three regions forming a triangle (all mutually adjacent) with only
    /// two colors available — unsatisfiable, proving AC-3 wipes a domain.
    #[test]
    fn unsatisfiable_triangle_is_rejected_by_arc_consistency() {
        let mut store = FactStore::new(Vocabulary::new(HdcStrategyKind::DenseBinary, 64), 8);
        for v in ["RegionA", "RegionB", "RegionC"] {
            triple(&mut store, "domain", v, "Red");
            triple(&mut store, "domain", v, "Blue");
        }
        triple(&mut store, "constraint", "RegionA", "RegionB");
        triple(&mut store, "constraint", "RegionB", "RegionC");
        triple(&mut store, "constraint", "RegionA", "RegionC");

        let domain_op = store.vocabulary().lookup("domain").unwrap();
        let constraint_op = store.vocabulary().lookup("constraint").unwrap();
        let err = CspSolver::new().solve_all(&store, domain_op, constraint_op).unwrap_err();
        assert!(matches!(err, CspError::DomainWipeout(_) | CspError::Unsolvable));
    }

    #[test]
    fn three_color_triangle_has_solutions() {
        let mut store = FactStore::new(Vocabulary::new(HdcStrategyKind::DenseBinary, 64), 8);
        for v in ["RegionA", "RegionB", "RegionC"] {
            for c in ["Red", "Green", "Blue"] {
                triple(&mut store, "domain", v, c);
            }
        }
        triple(&mut store, "constraint", "RegionA", "RegionB");
        triple(&mut store, "constraint", "RegionB", "RegionC");
        triple(&mut store, "constraint", "RegionA", "RegionC");

        let domain_op = store.vocabulary().lookup("domain").unwrap();
        let constraint_op = store.vocabulary().lookup("constraint").unwrap();
        let solutions = CspSolver::new().solve_all(&store, domain_op, constraint_op).unwrap();

        assert!(!solutions.is_empty());
        let a = store.vocabulary().lookup("RegionA").unwrap();
        let b = store.vocabulary().lookup("RegionB").unwrap();
        let c = store.vocabulary().lookup("RegionC").unwrap();
        for solution in &solutions {
            assert_ne!(solution[&a], solution[&b]);
            assert_ne!(solution[&b], solution[&c]);
            assert_ne!(solution[&a], solution[&c]);
        }
    }
}
