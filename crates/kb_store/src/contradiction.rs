//! Contradiction detection. Pure decision logic over data
//! the caller (`FactStore::assert`) gathers from its own indices — this
//! module never touches the store directly, so it stays testable in
//! isolation and reusable from a transaction's staging area before commit.
//!
//! Four kinds of contradiction are recognized:
//! - direct negation — the same triple already asserted with the opposite
//!   polarity;
//! - mutual exclusion — a `mutuallyExclusive R V1 V2` rule, where the
//!   subject already holds `R(subject, V1)` and the candidate adds
//!   `R(subject, V2)`;
//! - same-args opposition — a `contradictsSameArgs R S` rule, where `R(a,
//!   b)` and `S(a, b)` are declared unable to coexist regardless of
//!   polarity (e.g. `before`/`after`);
//! - inherited contradiction — the candidate's negation is reachable from
//!   already-asserted facts through a bounded chain of `Implies` hops;
//! - the exception escape hatch suppresses all of the above for one exact
//!   triple fingerprint.

use crate::expr::{fingerprint, Fact, FactId, Polarity, Triple};
use crate::symbol::SymbolId;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContradictionReason {
    /// The same triple is already asserted with the opposite polarity.
    DirectNegation { existing: FactId },
    /// Subject already holds `relation(x, category_a)`; the new fact adds
    /// `relation(x, category_b)`, and a `mutuallyExclusive` rule forbids
    /// holding both under the same relation.
    MutualExclusion {
        existing: FactId,
        relation: SymbolId,
        category_a: SymbolId,
        category_b: SymbolId,
    },
    /// `other_relation(a, b)` is already asserted and a `contradictsSameArgs`
    /// rule forbids it from coexisting with the candidate's relation over
    /// the same arguments.
    SameArgsOpposition { existing: FactId, other_relation: SymbolId },
    /// The candidate's negation follows from already-asserted facts through
    /// a chain of `Implies` rules no longer than the configured bound.
    InheritedImplication { existing: FactId, hops: usize },
}

fn ordered_pair(a: SymbolId, b: SymbolId) -> (SymbolId, SymbolId) {
    if a.index() <= b.index() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Theory-level rules that parameterize contradiction checking:
/// `mutuallyExclusive` value pairs (scoped per relation), `contradictsSameArgs`
/// relation pairs, and `exception` escape hatches.
#[derive(Debug, Default, Clone)]
pub struct TheoryRules {
    mutually_exclusive: FxHashMap<SymbolId, FxHashSet<(SymbolId, SymbolId)>>,
    contradicts_same_args: FxHashSet<(SymbolId, SymbolId)>,
    exceptions: FxHashSet<u64>,
}

impl TheoryRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// `mutuallyExclusive relation a b` — `relation(x, a)` and
    /// `relation(x, b)` can never coexist for the same `x`.
    pub fn add_mutually_exclusive(&mut self, relation: SymbolId, a: SymbolId, b: SymbolId) {
        self.mutually_exclusive.entry(relation).or_default().insert(ordered_pair(a, b));
    }

    pub fn is_mutually_exclusive(&self, relation: SymbolId, a: SymbolId, b: SymbolId) -> bool {
        self.mutually_exclusive
            .get(&relation)
            .is_some_and(|pairs| pairs.contains(&ordered_pair(a, b)))
    }

    /// `contradictsSameArgs r s` — `r(a, b)` and `s(a, b)` can never
    /// coexist, for any `a`, `b`. Symmetric: declaring `r`/`s` also covers
    /// `s`/`r`.
    pub fn add_contradicts_same_args(&mut self, r: SymbolId, s: SymbolId) {
        self.contradicts_same_args.insert(ordered_pair(r, s));
    }

    pub fn is_contradicts_same_args(&self, r: SymbolId, s: SymbolId) -> bool {
        self.contradicts_same_args.contains(&ordered_pair(r, s))
    }

    /// Registers `fingerprint` as exempt from all contradiction checks —
    /// the `exception` directive's escape hatch.
    pub fn add_exception(&mut self, fingerprint: u64) {
        self.exceptions.insert(fingerprint);
    }

    pub fn is_exception(&self, fingerprint: u64) -> bool {
        self.exceptions.contains(&fingerprint)
    }
}

fn opposite(p: Polarity) -> Polarity {
    match p {
        Polarity::Positive => Polarity::Negative,
        Polarity::Negative => Polarity::Positive,
    }
}

/// Stateless contradiction checker, parameterized only by the bounded
/// search depth used for inherited-contradiction closure — the `Implies`
/// walk must not run unbounded.
#[derive(Debug, Clone, Copy)]
pub struct ContradictionDetector {
    max_implies_depth: usize,
}

impl ContradictionDetector {
    pub fn new(max_implies_depth: usize) -> Self {
        Self { max_implies_depth }
    }

    /// `true` if `existing` asserts the same triple as a candidate with
    /// `candidate_polarity` would, but with the opposite polarity.
    pub fn opposes(&self, candidate_polarity: Polarity, existing: &Fact) -> bool {
        existing.polarity == opposite(candidate_polarity)
    }

    pub fn mutual_exclusion(
        &self,
        relation: SymbolId,
        new_category: SymbolId,
        existing_categories: &[(SymbolId, FactId)],
        rules: &TheoryRules,
    ) -> Option<ContradictionReason> {
        existing_categories
            .iter()
            .find(|(existing_cat, _)| rules.is_mutually_exclusive(relation, new_category, *existing_cat))
            .map(|(existing_cat, fact_id)| ContradictionReason::MutualExclusion {
                existing: *fact_id,
                relation,
                category_a: *existing_cat,
                category_b: new_category,
            })
    }

    /// `existing_same_args` is every other-operator fact sharing the
    /// candidate's exact `(arg1, arg2)` pair. Returns a reason if any of
    /// them is declared `contradictsSameArgs` with the candidate's
    /// relation.
    pub fn same_args_opposition(
        &self,
        relation: SymbolId,
        existing_same_args: &[(SymbolId, FactId)],
        rules: &TheoryRules,
    ) -> Option<ContradictionReason> {
        existing_same_args
            .iter()
            .find(|(other_relation, _)| rules.is_contradicts_same_args(relation, *other_relation))
            .map(|(other_relation, fact_id)| ContradictionReason::SameArgsOpposition {
                existing: *fact_id,
                other_relation: *other_relation,
            })
    }

    /// BFS over `Implies` edges (antecedent fingerprint -> `[(consequent
    /// fingerprint, Implies fact id)]`), starting from every already
    /// asserted fingerprint, bounded to `max_implies_depth` hops. Returns a
    /// reason if `negated_fingerprint` is reachable.
    pub fn inherited_contradiction(
        &self,
        negated_fingerprint: u64,
        implies_edges: &FxHashMap<u64, Vec<(u64, FactId)>>,
        asserted_fingerprints: &FxHashSet<u64>,
    ) -> Option<ContradictionReason> {
        let mut visited: FxHashSet<u64> = asserted_fingerprints.clone();
        let mut frontier: VecDeque<(u64, usize)> =
            asserted_fingerprints.iter().map(|fp| (*fp, 0)).collect();

        while let Some((fp, depth)) = frontier.pop_front() {
            if depth >= self.max_implies_depth {
                continue;
            }
            let Some(edges) = implies_edges.get(&fp) else {
                continue;
            };
            for (consequent, fact_id) in edges {
                if *consequent == negated_fingerprint {
                    return Some(ContradictionReason::InheritedImplication {
                        existing: *fact_id,
                        hops: depth + 1,
                    });
                }
                if visited.insert(*consequent) {
                    frontier.push_back((*consequent, depth + 1));
                }
            }
        }
        None
    }

    /// Orchestrates the full check for one candidate fact, in priority
    /// order: exception escape hatch, then direct negation, then mutual
    /// exclusion, then same-args opposition, then inherited contradiction.
    #[allow(clippy::too_many_arguments)]
    pub fn check(
        &self,
        candidate: &Fact,
        same_args_opposite: Option<&Fact>,
        new_category: Option<SymbolId>,
        existing_categories: &[(SymbolId, FactId)],
        existing_same_args: &[(SymbolId, FactId)],
        implies_edges: &FxHashMap<u64, Vec<(u64, FactId)>>,
        asserted_fingerprints: &FxHashSet<u64>,
        rules: &TheoryRules,
    ) -> Result<(), ContradictionReason> {
        if rules.is_exception(candidate.fingerprint) {
            return Ok(());
        }
        if let Some(existing) = same_args_opposite {
            if self.opposes(candidate.polarity, existing) {
                return Err(ContradictionReason::DirectNegation { existing: existing.id });
            }
        }
        let relation = candidate.triple.operator;
        if let Some(category) = new_category {
            if let Some(reason) = self.mutual_exclusion(relation, category, existing_categories, rules) {
                return Err(reason);
            }
        }
        if let Some(reason) = self.same_args_opposition(relation, existing_same_args, rules) {
            return Err(reason);
        }
        let Triple { operator, arg1, arg2 } = candidate.triple;
        let negated_fp = fingerprint(operator, arg1, arg2, opposite(candidate.polarity));
        if let Some(reason) =
            self.inherited_contradiction(negated_fp, implies_edges, asserted_fingerprints)
        {
            return Err(reason);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Arg, Polarity, Triple};
    use kb_base::Interner;

    fn sym(i: &mut Interner, name: &str) -> SymbolId {
        i.intern(name)
    }

    fn fact(id: u32, operator: SymbolId, a1: SymbolId, a2: SymbolId, polarity: Polarity) -> Fact {
        let triple = Triple::new(operator, Arg::Symbol(a1), Arg::Symbol(a2));
        let fp = fingerprint(operator, triple.arg1, triple.arg2, polarity);
        Fact { id: FactId(id), triple, polarity, fingerprint: fp }
    }

    #[test]
    fn direct_negation_detected() {
        let mut i = Interner::new();
        let isa = sym(&mut i, "isA");
        let fido = sym(&mut i, "Fido");
        let cat = sym(&mut i, "Cat");
        let existing = fact(0, isa, fido, cat, Polarity::Positive);
        let candidate = fact(1, isa, fido, cat, Polarity::Negative);
        let detector = ContradictionDetector::new(4);
        let rules = TheoryRules::new();
        let result = detector.check(
            &candidate,
            Some(&existing),
            None,
            &[],
            &[],
            &FxHashMap::default(),
            &FxHashSet::default(),
            &rules,
        );
        assert_eq!(result, Err(ContradictionReason::DirectNegation { existing: FactId(0) }));
    }

    #[test]
    fn same_polarity_is_not_a_contradiction() {
        let mut i = Interner::new();
        let isa = sym(&mut i, "isA");
        let fido = sym(&mut i, "Fido");
        let dog = sym(&mut i, "Dog");
        let existing = fact(0, isa, fido, dog, Polarity::Positive);
        let candidate = fact(1, isa, fido, dog, Polarity::Positive);
        let detector = ContradictionDetector::new(4);
        let rules = TheoryRules::new();
        let result = detector.check(
            &candidate,
            Some(&existing),
            None,
            &[],
            &[],
            &FxHashMap::default(),
            &FxHashSet::default(),
            &rules,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn mutual_exclusion_detected() {
        let mut i = Interner::new();
        let isa = sym(&mut i, "isA");
        let fido = sym(&mut i, "Fido");
        let dog = sym(&mut i, "Dog");
        let cat = sym(&mut i, "Cat");
        let mut rules = TheoryRules::new();
        rules.add_mutually_exclusive(isa, dog, cat);
        let candidate = fact(1, isa, fido, cat, Polarity::Positive);
        let detector = ContradictionDetector::new(4);
        let result = detector.check(
            &candidate,
            None,
            Some(cat),
            &[(dog, FactId(0))],
            &[],
            &FxHashMap::default(),
            &FxHashSet::default(),
            &rules,
        );
        assert_eq!(
            result,
            Err(ContradictionReason::MutualExclusion { existing: FactId(0), relation: isa, category_a: dog, category_b: cat })
        );
    }

    #[test]
    fn mutual_exclusion_is_scoped_to_its_relation() {
        let mut i = Interner::new();
        let has_state = sym(&mut i, "hasState");
        let is_a = sym(&mut i, "isA");
        let door = sym(&mut i, "Door");
        let open = sym(&mut i, "Open");
        let closed = sym(&mut i, "Closed");
        let mut rules = TheoryRules::new();
        rules.add_mutually_exclusive(has_state, open, closed);
        // Same value pair, but declared only for `hasState` — `isA` never
        // triggers the rule even with identical category symbols.
        let candidate = fact(1, is_a, door, closed, Polarity::Positive);
        let detector = ContradictionDetector::new(4);
        let result = detector.check(
            &candidate,
            None,
            Some(closed),
            &[(open, FactId(0))],
            &[],
            &FxHashMap::default(),
            &FxHashSet::default(),
            &rules,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn same_args_opposition_detected() {
        let mut i = Interner::new();
        let before = sym(&mut i, "before");
        let after = sym(&mut i, "after");
        let a = sym(&mut i, "EventA");
        let b = sym(&mut i, "EventB");
        let mut rules = TheoryRules::new();
        rules.add_contradicts_same_args(before, after);
        let candidate = fact(1, after, a, b, Polarity::Positive);
        let detector = ContradictionDetector::new(4);
        let result = detector.check(
            &candidate,
            None,
            None,
            &[],
            &[(before, FactId(0))],
            &FxHashMap::default(),
            &FxHashSet::default(),
            &rules,
        );
        assert_eq!(
            result,
            Err(ContradictionReason::SameArgsOpposition { existing: FactId(0), other_relation: before })
        );
    }

    #[test]
    fn exception_suppresses_all_checks() {
        let mut i = Interner::new();
        let isa = sym(&mut i, "isA");
        let fido = sym(&mut i, "Fido");
        let cat = sym(&mut i, "Cat");
        let existing = fact(0, isa, fido, cat, Polarity::Positive);
        let candidate = fact(1, isa, fido, cat, Polarity::Negative);
        let mut rules = TheoryRules::new();
        rules.add_exception(candidate.fingerprint);
        let detector = ContradictionDetector::new(4);
        let result = detector.check(
            &candidate,
            Some(&existing),
            None,
            &[],
            &[],
            &FxHashMap::default(),
            &FxHashSet::default(),
            &rules,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn inherited_contradiction_through_implies_chain() {
        let mut i = Interner::new();
        let isa = sym(&mut i, "isA");
        let fido = sym(&mut i, "Fido");
        let dog = sym(&mut i, "Dog");
        let mammal = sym(&mut i, "Mammal");
        let not_mammal_fp = fingerprint(isa, Arg::Symbol(fido), Arg::Symbol(mammal), Polarity::Negative);

        let dog_fp = fingerprint(isa, Arg::Symbol(fido), Arg::Symbol(dog), Polarity::Positive);
        let mut edges: FxHashMap<u64, Vec<(u64, FactId)>> = FxHashMap::default();
        edges.insert(dog_fp, vec![(not_mammal_fp, FactId(7))]);

        let mut asserted = FxHashSet::default();
        asserted.insert(dog_fp);

        let candidate = fact(1, isa, fido, mammal, Polarity::Positive);
        let detector = ContradictionDetector::new(4);
        let rules = TheoryRules::new();
        let result = detector.check(&candidate, None, None, &[], &[], &edges, &asserted, &rules);
        assert_eq!(
            result,
            Err(ContradictionReason::InheritedImplication { existing: FactId(7), hops: 1 })
        );
    }

    #[test]
    fn inherited_contradiction_respects_depth_bound() {
        let mut i = Interner::new();
        let isa = sym(&mut i, "isA");
        let fido = sym(&mut i, "Fido");
        let a = sym(&mut i, "A");
        let b = sym(&mut i, "B");
        let not_target_fp = fingerprint(isa, Arg::Symbol(fido), Arg::Symbol(b), Polarity::Negative);
        let a_fp = fingerprint(isa, Arg::Symbol(fido), Arg::Symbol(a), Polarity::Positive);

        let mut edges: FxHashMap<u64, Vec<(u64, FactId)>> = FxHashMap::default();
        edges.insert(a_fp, vec![(not_target_fp, FactId(9))]);
        let mut asserted = FxHashSet::default();
        asserted.insert(a_fp);

        let candidate = fact(1, isa, fido, b, Polarity::Positive);
        let detector = ContradictionDetector::new(0); // zero hops allowed
        let rules = TheoryRules::new();
        let result = detector.check(&candidate, None, None, &[], &[], &edges, &asserted, &rules);
        assert!(result.is_ok());
    }
}
