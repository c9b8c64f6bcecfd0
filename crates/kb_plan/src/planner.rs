//! Forward-search STRIPS-like planning over ground literal states.
//!
//! Search is breadth-first over state sets, so the first goal-subsuming
//! state found is reached by a shortest plan; actions are tried at each
//! expansion in lexicographic name order, so among equal-length plans the
//! one found first is also the lexicographically smallest action sequence.
//! Visited states are deduplicated by [`state::canonical_hash`], not by
//! identity, so two different action sequences that land on the same set
//! of true literals only ever get explored once.

use std::collections::VecDeque;

use kb_store::{Arg, FactStore, SymbolId};
use rustc_hash::FxHashMap;

use crate::action::{extract_actions, resolve_literals, Action};
use crate::error::PlanError;
use crate::request::PlanRequest;
use crate::state::{canonical_hash, location_of, subsumes, State};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub steps: Vec<SymbolId>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn collect_conflicts(store: &FactStore, conflict_op: Option<SymbolId>) -> Vec<(SymbolId, SymbolId)> {
    let Some(op) = conflict_op else { return Vec::new() };
    store
        .by_operator(op)
        .filter_map(|f| match (f.triple.arg1, f.triple.arg2) {
            (Arg::Symbol(a), Arg::Symbol(b)) => Some((a, b)),
            _ => None,
        })
        .collect()
}

/// `false` once some declared conflicting pair shares a location in `state`
/// with no guard present there. `true` unconditionally when no safety
/// check was requested (`location_op` unset).
fn is_safe(
    state: &State,
    conflicts: &[(SymbolId, SymbolId)],
    location_op: Option<SymbolId>,
    guard: Option<SymbolId>,
) -> bool {
    let Some(location_op) = location_op else { return true };
    for &(x, y) in conflicts {
        let (Some(lx), Some(ly)) = (location_of(state, location_op, x), location_of(state, location_op, y)) else {
            continue;
        };
        if lx != ly {
            continue;
        }
        let guard_present = guard
            .and_then(|g| location_of(state, location_op, g))
            .is_some_and(|gl| gl == lx);
        if !guard_present {
            return false;
        }
    }
    true
}

pub struct Planner;

impl Planner {
    pub fn new() -> Self {
        Self
    }

    pub fn solve(
        &self,
        store: &FactStore,
        bindings: &FxHashMap<SymbolId, kb_store::FactId>,
        request: &PlanRequest,
    ) -> Result<Plan, PlanError> {
        let mut actions = extract_actions(store, bindings, request.requires_op, request.causes_op, request.prevents_op)?;
        actions.sort_by(|a, b| store.vocabulary().name_of(a.name).cmp(store.vocabulary().name_of(b.name)));
        let conflicts = collect_conflicts(store, request.conflict_op);

        let start_literals = resolve_literals(store, bindings, &request.start)?;
        let goal_literals = resolve_literals(store, bindings, &request.goal)?;

        let mut start_state: State = State::default();
        start_state.extend(start_literals);

        if subsumes(&start_state, &goal_literals) {
            return Ok(Plan { steps: Vec::new() });
        }

        let mut frontier: VecDeque<(State, Vec<SymbolId>)> = VecDeque::new();
        let mut visited: rustc_hash::FxHashSet<u64> = rustc_hash::FxHashSet::default();
        visited.insert(canonical_hash(&start_state));
        frontier.push_back((start_state, Vec::new()));

        while let Some((state, path)) = frontier.pop_front() {
            if path.len() >= request.max_depth {
                continue;
            }
            for action in &actions {
                if let Some(next_path) = self.try_action(
                    action,
                    &state,
                    &path,
                    &conflicts,
                    request.location_op,
                    request.guard,
                    &goal_literals,
                    &mut visited,
                    &mut frontier,
                ) {
                    return Ok(Plan { steps: next_path });
                }
            }
        }

        Err(PlanError::Unsolvable { depth_tried: request.max_depth })
    }

    #[allow(clippy::too_many_arguments)]
    fn try_action(
        &self,
        action: &Action,
        state: &State,
        path: &[SymbolId],
        conflicts: &[(SymbolId, SymbolId)],
        location_op: Option<SymbolId>,
        guard: Option<SymbolId>,
        goal_literals: &[kb_store::Triple],
        visited: &mut rustc_hash::FxHashSet<u64>,
        frontier: &mut VecDeque<(State, Vec<SymbolId>)>,
    ) -> Option<Vec<SymbolId>> {
        if !subsumes(state, &action.requires) {
            return None;
        }
        let mut next = state.clone();
        for prevented in &action.prevents {
            next.remove(prevented);
        }
        for caused in &action.causes {
            next.insert(*caused);
        }
        if !is_safe(&next, conflicts, location_op, guard) {
            return None;
        }
        let hash = canonical_hash(&next);
        if visited.contains(&hash) {
            return None;
        }
        let mut next_path = path.to_vec();
        next_path.push(action.name);
        if subsumes(&next, goal_literals) {
            return Some(next_path);
        }
        visited.insert(hash);
        frontier.push_back((next, next_path));
        None
    }

    /// Re-simulates a plan from the request's start state, checking that
    /// every action's requirements and the safety invariant hold at each
    /// step, and that the final state subsumes the goal.
    pub fn verify(
        &self,
        store: &FactStore,
        bindings: &FxHashMap<SymbolId, kb_store::FactId>,
        request: &PlanRequest,
        plan: &Plan,
    ) -> Result<bool, PlanError> {
        let actions = extract_actions(store, bindings, request.requires_op, request.causes_op, request.prevents_op)?;
        let by_name: FxHashMap<SymbolId, Action> = actions.into_iter().map(|a| (a.name, a)).collect();
        let conflicts = collect_conflicts(store, request.conflict_op);

        let mut state: State = State::default();
        state.extend(resolve_literals(store, bindings, &request.start)?);

        for step in &plan.steps {
            let Some(action) = by_name.get(step) else { return Ok(false) };
            if !subsumes(&state, &action.requires) {
                return Ok(false);
            }
            for prevented in &action.prevents {
                state.remove(prevented);
            }
            for caused in &action.causes {
                state.insert(*caused);
            }
            if !is_safe(&state, &conflicts, request.location_op, request.guard) {
                return Ok(false);
            }
        }

        let goal = resolve_literals(store, bindings, &request.goal)?;
        Ok(subsumes(&state, &goal))
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_hdc::HdcStrategyKind;
    use kb_store::{Arg, CandidateFact, FactId, Polarity, Triple, Vocabulary};

    struct World {
        store: FactStore,
        bindings: FxHashMap<SymbolId, FactId>,
    }

    /// Binds `name` (a `$`-prefixed reference) to the fact id of the ground
    /// literal `isAt entity bank`, asserting it along the way.
    fn bind_literal(world: &mut World, name: &str, entity: &str, bank: &str) -> SymbolId {
        let isat = world.store.vocabulary_mut().get_or_create("isAt");
        world.store.vocabulary_mut().mark_operator(isat);
        let e = world.store.vocabulary_mut().get_or_create(entity);
        let b = world.store.vocabulary_mut().get_or_create(bank);
        let mut tx = world.store.begin();
        let id = tx.assert(CandidateFact::triple(isat, Arg::Symbol(e), Arg::Symbol(b), Polarity::Positive)).unwrap();
        tx.commit();
        let reference = world.store.vocabulary_mut().get_or_create(name);
        world.bindings.insert(reference, id);
        reference
    }

    fn declare_action(
        world: &mut World,
        name: &str,
        requires: &[SymbolId],
        causes: &[SymbolId],
        prevents: &[SymbolId],
    ) {
        let requires_op = world.store.vocabulary_mut().get_or_create("requires");
        let causes_op = world.store.vocabulary_mut().get_or_create("causes");
        let prevents_op = world.store.vocabulary_mut().get_or_create("prevents");
        for op in [requires_op, causes_op, prevents_op] {
            world.store.vocabulary_mut().mark_operator(op);
        }
        let action_name = world.store.vocabulary_mut().get_or_create(name);
        let mut tx = world.store.begin();
        for r in requires {
            tx.assert(CandidateFact::triple(requires_op, Arg::Symbol(action_name), Arg::Symbol(*r), Polarity::Positive)).unwrap();
        }
        for c in causes {
            tx.assert(CandidateFact::triple(causes_op, Arg::Symbol(action_name), Arg::Symbol(*c), Polarity::Positive)).unwrap();
        }
        for p in prevents {
            tx.assert(CandidateFact::triple(prevents_op, Arg::Symbol(action_name), Arg::Symbol(*p), Polarity::Positive)).unwrap();
        }
        tx.commit();
    }

    /// Two-item river crossing: a farmer ferries a goat and a cabbage
    /// across one at a time; the goat and cabbage can't be left alone
    /// together without the farmer present.
    fn river_world() -> (World, PlanRequest) {
        let store = FactStore::new(Vocabulary::new(HdcStrategyKind::DenseBinary, 64), 8);
        let mut world = World { store, bindings: FxHashMap::default() };

        let farmer1 = bind_literal(&mut world, "$farmer1", "Farmer", "Bank1");
        let farmer2 = bind_literal(&mut world, "$farmer2", "Farmer", "Bank2");
        let goat1 = bind_literal(&mut world, "$goat1", "Goat", "Bank1");
        let goat2 = bind_literal(&mut world, "$goat2", "Goat", "Bank2");
        let cabbage1 = bind_literal(&mut world, "$cabbage1", "Cabbage", "Bank1");
        let cabbage2 = bind_literal(&mut world, "$cabbage2", "Cabbage", "Bank2");

        declare_action(&mut world, "MoveFarmerAlone1to2", &[farmer1], &[farmer2], &[farmer1]);
        declare_action(&mut world, "MoveFarmerAlone2to1", &[farmer2], &[farmer1], &[farmer2]);
        declare_action(&mut world, "MoveFarmerGoat1to2", &[farmer1, goat1], &[farmer2, goat2], &[farmer1, goat1]);
        declare_action(&mut world, "MoveFarmerGoat2to1", &[farmer2, goat2], &[farmer1, goat1], &[farmer2, goat2]);
        declare_action(&mut world, "MoveFarmerCabbage1to2", &[farmer1, cabbage1], &[farmer2, cabbage2], &[farmer1, cabbage1]);
        declare_action(&mut world, "MoveFarmerCabbage2to1", &[farmer2, cabbage2], &[farmer1, cabbage1], &[farmer2, cabbage2]);

        let conflict_op = world.store.vocabulary_mut().get_or_create("conflicts");
        world.store.vocabulary_mut().mark_operator(conflict_op);
        let goat_sym = world.store.vocabulary().lookup("Goat").unwrap();
        let cabbage_sym = world.store.vocabulary().lookup("Cabbage").unwrap();
        let mut tx = world.store.begin();
        tx.assert(CandidateFact::triple(conflict_op, Arg::Symbol(goat_sym), Arg::Symbol(cabbage_sym), Polarity::Positive)).unwrap();
        tx.commit();

        let farmer_sym = world.store.vocabulary().lookup("Farmer").unwrap();
        let request = PlanRequest {
            start: vec![farmer1, goat1, cabbage1],
            goal: vec![farmer2, goat2, cabbage2],
            guard: Some(farmer_sym),
            conflict_op: Some(conflict_op),
            location_op: Some(world.store.vocabulary().lookup("isAt").unwrap()),
            max_depth: 10,
            requires_op: world.store.vocabulary().lookup("requires").unwrap(),
            causes_op: world.store.vocabulary().lookup("causes").unwrap(),
            prevents_op: world.store.vocabulary().lookup("prevents").unwrap(),
        };

        (world, request)
    }

    #[test]
    fn finds_the_shortest_safe_crossing_plan() {
        let (world, request) = river_world();
        let plan = Planner::new().solve(&world.store, &world.bindings, &request).unwrap();
        assert_eq!(plan.len(), 3);

        let names: Vec<&str> = plan.steps.iter().map(|s| world.store.vocabulary().name_of(*s)).collect();
        assert_eq!(names, vec!["MoveFarmerGoat1to2", "MoveFarmerAlone2to1", "MoveFarmerCabbage1to2"]);
    }

    #[test]
    fn verify_confirms_a_correct_plan_and_rejects_a_tampered_one() {
        let (world, request) = river_world();
        let plan = Planner::new().solve(&world.store, &world.bindings, &request).unwrap();
        assert!(Planner::new().verify(&world.store, &world.bindings, &request, &plan).unwrap());

        let mut bad = plan.clone();
        bad.steps.reverse();
        assert!(!Planner::new().verify(&world.store, &world.bindings, &request, &bad).unwrap());
    }

    #[test]
    fn depth_bound_makes_an_otherwise_solvable_goal_unsolvable() {
        let (world, mut request) = river_world();
        request.max_depth = 1;
        let err = Planner::new().solve(&world.store, &world.bindings, &request).unwrap_err();
        assert_eq!(err, PlanError::Unsolvable { depth_tried: 1 });
    }
}
