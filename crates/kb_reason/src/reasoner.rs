//! Forward-chaining goal resolution over a [`FactStore`]: exact match,
//! transitive closure, symmetric lookup, `isA` inheritance, and modus
//! ponens over committed `Implies` facts — in that priority order, per
//! goal. Modus ponens matches a goal against any leaf of the consequent,
//! so rules concluding `And`/`Or` compounds fire for each leaf in turn.

use crate::config::{ReasonerConfig, ReasoningPriority};
use crate::derivation::Derivation;
use crate::error::{Budget, ReasonError, ReasonerStats};
use crate::query::Query;
use crate::unify::Bindings;
use kb_store::{Arg, Compound, CompoundId, Expr, FactId, FactStore, Polarity, SymbolId, SymbolKind, Triple, Vocabulary};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

fn remaining(limit: Option<usize>, out_len: usize) -> bool {
    match limit {
        Some(l) => out_len < l,
        None => true,
    }
}

fn search_key(bindings: &mut Bindings, arg: Arg, vocabulary: &Vocabulary) -> Option<SymbolId> {
    match arg {
        Arg::Symbol(s) => {
            let resolved = bindings.find(s);
            if vocabulary.classify(resolved) == SymbolKind::Variable {
                None
            } else {
                Some(resolved)
            }
        }
        Arg::Compound(_) => None,
    }
}

fn unify_arg(bindings: &mut Bindings, query_arg: Arg, fact_arg: Arg, vocabulary: &Vocabulary, budget: &mut Budget) -> bool {
    budget.note_unification_attempt();
    match (query_arg, fact_arg) {
        (Arg::Symbol(q), Arg::Symbol(f)) => bindings.unify(q, f, vocabulary),
        (Arg::Compound(q), Arg::Compound(f)) => q == f,
        _ => false,
    }
}

fn select_candidates<'s>(
    store: &'s FactStore,
    operator: SymbolId,
    key1: Option<SymbolId>,
    key2: Option<SymbolId>,
) -> Box<dyn Iterator<Item = &'s kb_store::Fact> + 's> {
    if let Some(a1) = key1 {
        Box::new(store.by_operator_arg1(operator, a1))
    } else if let Some(a2) = key2 {
        Box::new(store.by_operator_arg2(operator, a2))
    } else {
        Box::new(store.by_operator(operator))
    }
}

/// Pulls `(triple, polarity)` out of a plain atom or a single negation of
/// one — mirrors `kb_store`'s own extraction for the fast contradiction
/// path, since both need the same "signed atom" notion.
fn as_signed_atom(expr: &Expr) -> Option<(Triple, Polarity)> {
    match expr {
        Expr::Atom(t) => Some((*t, Polarity::Positive)),
        Expr::Not(inner) => match inner.as_ref() {
            Expr::Atom(t) => Some((*t, Polarity::Negative)),
            _ => None,
        },
        _ => None,
    }
}

/// Collects every signed-atom leaf reachable by descending through
/// `And`/`Or` wrappers of an `Implies`'s consequent — the "compound
/// conclusion" rule: a goal matching any leaf, not just a bare top-level
/// atom, is something the rule proves once its antecedent holds. Doesn't
/// descend into a nested `Implies`; that reads as its own conditional, not
/// a further conclusion of the outer rule.
fn collect_signed_leaves(expr: &Expr, out: &mut Vec<(Triple, Polarity)>) {
    match expr {
        Expr::And(xs) | Expr::Or(xs) => {
            for x in xs {
                collect_signed_leaves(x, out);
            }
        }
        _ => {
            if let Some(signed) = as_signed_atom(expr) {
                out.push(signed);
            }
        }
    }
}

fn expr_to_query(expr: &Expr) -> Query {
    match expr {
        Expr::Atom(t) => Query::Atom(*t),
        Expr::Not(inner) => Query::Not(Box::new(expr_to_query(inner))),
        Expr::And(xs) => Query::And(xs.iter().map(expr_to_query).collect()),
        Expr::Or(xs) => Query::Or(xs.iter().map(expr_to_query).collect()),
        Expr::Implies(ante, cons) => {
            // An Implies nested inside another Implies's antecedent reads
            // as its material-conditional equivalent: not(ante) or cons.
            Query::Or(vec![
                Query::Not(Box::new(expr_to_query(ante))),
                expr_to_query(cons),
            ])
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Reasoner;

impl Reasoner {
    pub fn new() -> Self {
        Self
    }

    /// Finds the first satisfying assignment for `goal`, if any.
    pub fn prove(
        &self,
        store: &mut FactStore,
        goal: &Query,
        config: &ReasonerConfig,
    ) -> Result<Option<(Bindings, Derivation)>, ReasonError> {
        let mut budget = Budget::new(config.max_iterations, config.timeout_ms);
        let mut out = Vec::new();
        self.solve(store, goal, Bindings::new(), &mut budget, Some(1), config, &mut out)?;
        Ok(out.into_iter().next())
    }

    /// Enumerates up to `config.max_solutions` satisfying assignments.
    pub fn query(
        &self,
        store: &mut FactStore,
        goal: &Query,
        config: &ReasonerConfig,
    ) -> Result<Vec<(Bindings, Derivation)>, ReasonError> {
        let mut budget = Budget::new(config.max_iterations, config.timeout_ms);
        let mut out = Vec::new();
        self.solve(store, goal, Bindings::new(), &mut budget, Some(config.max_solutions), config, &mut out)?;
        Ok(out)
    }

    /// Same as [`Reasoner::prove`], but also returns the counters a session
    /// accumulates into its own `stats()` call.
    pub fn prove_with_stats(
        &self,
        store: &mut FactStore,
        goal: &Query,
        config: &ReasonerConfig,
    ) -> Result<(Option<(Bindings, Derivation)>, ReasonerStats), ReasonError> {
        let mut budget = Budget::new(config.max_iterations, config.timeout_ms);
        let mut out = Vec::new();
        self.solve(store, goal, Bindings::new(), &mut budget, Some(1), config, &mut out)?;
        Ok((out.into_iter().next(), budget.stats()))
    }

    /// Same as [`Reasoner::query`], but also returns the counters a session
    /// accumulates into its own `stats()` call.
    pub fn query_with_stats(
        &self,
        store: &mut FactStore,
        goal: &Query,
        config: &ReasonerConfig,
    ) -> Result<(Vec<(Bindings, Derivation)>, ReasonerStats), ReasonError> {
        let mut budget = Budget::new(config.max_iterations, config.timeout_ms);
        let mut out = Vec::new();
        self.solve(store, goal, Bindings::new(), &mut budget, Some(config.max_solutions), config, &mut out)?;
        Ok((out, budget.stats()))
    }

    fn solve(
        &self,
        store: &mut FactStore,
        goal: &Query,
        bindings: Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        config: &ReasonerConfig,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        budget.tick()?;
        if !remaining(limit, out.len()) {
            return Ok(());
        }
        match goal {
            Query::Atom(triple) => self.solve_atom(store, *triple, &bindings, budget, limit, config, out),
            Query::Not(inner) => self.solve_not(store, inner, &bindings, budget, limit, config, out),
            Query::And(qs) => self.solve_and(store, qs, 0, bindings, budget, limit, config, out),
            Query::Or(qs) => self.solve_or(store, qs, &bindings, budget, limit, config, out),
            Query::Exists(var, inner) => self.solve_exists(store, *var, inner, &bindings, budget, limit, config, out),
        }
    }

    fn solve_atom(
        &self,
        store: &mut FactStore,
        triple: Triple,
        bindings: &Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        config: &ReasonerConfig,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        self.match_direct(store, triple, bindings, budget, limit, out)?;
        if !remaining(limit, out.len()) {
            return Ok(());
        }

        if self.is_transitive(store, triple.operator) {
            self.match_transitive(store, triple, bindings, budget, limit, out)?;
            if !remaining(limit, out.len()) {
                return Ok(());
            }
        }

        if self.is_symmetric(store, triple.operator) {
            self.match_symmetric(store, triple, bindings, budget, limit, out)?;
            if !remaining(limit, out.len()) {
                return Ok(());
            }
        }

        if triple.operator != store.isa_operator() && self.is_inheritable(store, triple.operator) {
            self.match_inherited(store, triple, bindings, budget, limit, config, out)?;
            if !remaining(limit, out.len()) {
                return Ok(());
            }
        }

        self.match_modus_ponens(store, triple, bindings, budget, limit, config, out)
    }

    fn match_direct(
        &self,
        store: &FactStore,
        triple: Triple,
        bindings: &Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        let vocab = store.vocabulary();
        let mut key_lookup = bindings.clone();
        let key1 = search_key(&mut key_lookup, triple.arg1, vocab);
        let key2 = search_key(&mut key_lookup, triple.arg2, vocab);

        for fact in select_candidates(store, triple.operator, key1, key2) {
            budget.tick()?;
            if fact.polarity != Polarity::Positive {
                continue;
            }
            let mut trial = bindings.clone();
            if unify_arg(&mut trial, triple.arg1, fact.triple.arg1, vocab, budget)
                && unify_arg(&mut trial, triple.arg2, fact.triple.arg2, vocab, budget)
            {
                out.push((trial, Derivation::Fact(fact.id)));
                if !remaining(limit, out.len()) {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn is_tagged(&self, store: &FactStore, tag_name: &str, operator: SymbolId) -> bool {
        match store.vocabulary().lookup(tag_name) {
            Some(tag_op) => store.by_operator_arg1(tag_op, operator).next().is_some(),
            None => false,
        }
    }

    fn is_transitive(&self, store: &FactStore, operator: SymbolId) -> bool {
        operator == store.isa_operator() || self.is_tagged(store, "__TransitiveRelation", operator)
    }

    fn is_symmetric(&self, store: &FactStore, operator: SymbolId) -> bool {
        self.is_tagged(store, "__SymmetricRelation", operator)
    }

    fn is_inheritable(&self, store: &FactStore, operator: SymbolId) -> bool {
        self.is_tagged(store, "__InheritableProperty", operator)
    }

    fn match_transitive(
        &self,
        store: &FactStore,
        triple: Triple,
        bindings: &Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        let vocab = store.vocabulary();
        let ground1 = match triple.arg1 {
            Arg::Symbol(s) if vocab.classify(s) != SymbolKind::Variable => Some(s),
            _ => None,
        };
        let ground2 = match triple.arg2 {
            Arg::Symbol(s) if vocab.classify(s) != SymbolKind::Variable => Some(s),
            _ => None,
        };

        if let Some(start) = ground1 {
            self.bfs_forward(store, triple.operator, start, triple.arg2, bindings, budget, limit, out)
        } else if let Some(end) = ground2 {
            self.bfs_backward(store, triple.operator, end, triple.arg1, bindings, budget, limit, out)
        } else {
            // Neither end is ground: an unconstrained transitive walk over
            // every symbol in the vocabulary isn't worth the search budget.
            Ok(())
        }
    }

    fn bfs_forward(
        &self,
        store: &FactStore,
        operator: SymbolId,
        start: SymbolId,
        target_arg: Arg,
        bindings: &Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        let vocab = store.vocabulary();
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        visited.insert(start);
        let mut frontier: VecDeque<(SymbolId, Vec<FactId>)> = VecDeque::new();
        frontier.push_back((start, Vec::new()));

        while let Some((current, path)) = frontier.pop_front() {
            budget.tick()?;
            for fact in store.by_operator_arg1(operator, current) {
                if fact.polarity != Polarity::Positive {
                    continue;
                }
                let Arg::Symbol(next) = fact.triple.arg2 else { continue };
                let mut next_path = path.clone();
                next_path.push(fact.id);

                let mut trial = bindings.clone();
                if unify_arg(&mut trial, target_arg, Arg::Symbol(next), vocab, budget) {
                    out.push((trial, Derivation::Transitive(next_path.clone())));
                    if !remaining(limit, out.len()) {
                        return Ok(());
                    }
                }
                if visited.insert(next) {
                    frontier.push_back((next, next_path));
                }
            }
        }
        Ok(())
    }

    fn bfs_backward(
        &self,
        store: &FactStore,
        operator: SymbolId,
        end: SymbolId,
        source_arg: Arg,
        bindings: &Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        let vocab = store.vocabulary();
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        visited.insert(end);
        let mut frontier: VecDeque<(SymbolId, Vec<FactId>)> = VecDeque::new();
        frontier.push_back((end, Vec::new()));

        while let Some((current, path)) = frontier.pop_front() {
            budget.tick()?;
            for fact in store.by_operator_arg2(operator, current) {
                if fact.polarity != Polarity::Positive {
                    continue;
                }
                let Arg::Symbol(prev) = fact.triple.arg1 else { continue };
                let mut next_path = path.clone();
                next_path.push(fact.id);

                let mut trial = bindings.clone();
                if unify_arg(&mut trial, source_arg, Arg::Symbol(prev), vocab, budget) {
                    let mut ordered = next_path.clone();
                    ordered.reverse();
                    out.push((trial, Derivation::Transitive(ordered)));
                    if !remaining(limit, out.len()) {
                        return Ok(());
                    }
                }
                if visited.insert(prev) {
                    frontier.push_back((prev, next_path));
                }
            }
        }
        Ok(())
    }

    fn match_symmetric(
        &self,
        store: &FactStore,
        triple: Triple,
        bindings: &Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        let vocab = store.vocabulary();
        let reversed = Triple::new(triple.operator, triple.arg2, triple.arg1);
        let mut key_lookup = bindings.clone();
        let key1 = search_key(&mut key_lookup, reversed.arg1, vocab);
        let key2 = search_key(&mut key_lookup, reversed.arg2, vocab);

        for fact in select_candidates(store, reversed.operator, key1, key2) {
            budget.tick()?;
            if fact.polarity != Polarity::Positive {
                continue;
            }
            let mut trial = bindings.clone();
            if unify_arg(&mut trial, reversed.arg1, fact.triple.arg1, vocab, budget)
                && unify_arg(&mut trial, reversed.arg2, fact.triple.arg2, vocab, budget)
            {
                out.push((trial, Derivation::Symmetric(fact.id)));
                if !remaining(limit, out.len()) {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn isa_closure(
        &self,
        store: &FactStore,
        subject: SymbolId,
        budget: &mut Budget,
    ) -> Result<Vec<(SymbolId, Vec<FactId>)>, ReasonError> {
        let isa_op = store.isa_operator();
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        visited.insert(subject);
        let mut frontier: VecDeque<(SymbolId, Vec<FactId>)> = VecDeque::new();
        frontier.push_back((subject, Vec::new()));
        let mut results = Vec::new();

        while let Some((current, path)) = frontier.pop_front() {
            budget.tick()?;
            for fact in store.by_operator_arg1(isa_op, current) {
                if fact.polarity != Polarity::Positive {
                    continue;
                }
                let Arg::Symbol(category) = fact.triple.arg2 else { continue };
                let mut next_path = path.clone();
                next_path.push(fact.id);
                results.push((category, next_path.clone()));
                if visited.insert(category) {
                    frontier.push_back((category, next_path));
                }
            }
        }
        Ok(results)
    }

    fn match_inherited(
        &self,
        store: &mut FactStore,
        triple: Triple,
        bindings: &Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        config: &ReasonerConfig,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        let Arg::Symbol(subject_arg) = triple.arg1 else { return Ok(()) };
        let mut subject_lookup = bindings.clone();
        let subject = subject_lookup.find(subject_arg);
        if store.vocabulary().classify(subject) == SymbolKind::Variable {
            return Ok(());
        }

        let mut categories = self.isa_closure(store, subject, budget)?;
        match config.reasoning_priority {
            ReasoningPriority::Symbolic => categories.sort_by_key(|(cat, _)| cat.index()),
            ReasoningPriority::Holographic => {
                let mut scored: Vec<(f64, SymbolId, Vec<FactId>)> = categories
                    .into_iter()
                    .map(|(cat, chain)| {
                        budget.note_similarity_check();
                        (store.vocabulary_mut().similarity(subject, cat), cat, chain)
                    })
                    .collect();
                scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
                categories = scored.into_iter().map(|(_, cat, chain)| (cat, chain)).collect();
            }
        }

        for (category, isa_chain) in categories {
            budget.tick()?;
            let vocab = store.vocabulary();
            for fact in store.by_operator_arg1(triple.operator, category) {
                if fact.polarity != Polarity::Positive {
                    continue;
                }
                let mut trial = bindings.clone();
                if unify_arg(&mut trial, triple.arg2, fact.triple.arg2, vocab, budget) {
                    out.push((
                        trial,
                        Derivation::Inherited { isa_chain: isa_chain.clone(), property: Box::new(Derivation::Fact(fact.id)) },
                    ));
                    if !remaining(limit, out.len()) {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    fn match_modus_ponens(
        &self,
        store: &mut FactStore,
        triple: Triple,
        bindings: &Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        config: &ReasonerConfig,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        let Some(implies_op) = store.vocabulary().lookup("__Implies") else { return Ok(()) };

        let candidates: Vec<(FactId, CompoundId)> = store
            .by_operator(implies_op)
            .filter(|f| f.polarity == Polarity::Positive)
            .filter_map(|f| match f.triple.arg1 {
                Arg::Compound(cid) => Some((f.id, cid)),
                _ => None,
            })
            .collect();

        for (fact_id, compound_id) in candidates {
            budget.tick()?;
            let (antecedent_expr, consequent_expr) = {
                let Compound { expr } = store.compound(compound_id);
                let Expr::Implies(ante, cons) = expr else { continue };
                (ante.as_ref().clone(), cons.as_ref().clone())
            };
            let mut leaves = Vec::new();
            collect_signed_leaves(&consequent_expr, &mut leaves);

            for (cons_triple, cons_polarity) in leaves {
                budget.tick()?;
                if cons_polarity != Polarity::Positive || cons_triple.operator != triple.operator {
                    continue;
                }

                let vocab = store.vocabulary();
                let mut trial = bindings.clone();
                if !(unify_arg(&mut trial, triple.arg1, cons_triple.arg1, vocab, budget)
                    && unify_arg(&mut trial, triple.arg2, cons_triple.arg2, vocab, budget))
                {
                    continue;
                }

                let antecedent_query = expr_to_query(&antecedent_expr);
                let mut sub_out = Vec::new();
                self.solve(store, &antecedent_query, trial, budget, Some(1), config, &mut sub_out)?;
                if let Some((solved, antecedent_derivation)) = sub_out.into_iter().next() {
                    budget.note_rule_firing();
                    out.push((
                        solved,
                        Derivation::ModusPonens { implication: fact_id, antecedent: Box::new(antecedent_derivation) },
                    ));
                    if !remaining(limit, out.len()) {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    fn solve_not(
        &self,
        store: &mut FactStore,
        inner: &Query,
        bindings: &Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        config: &ReasonerConfig,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        if config.closed_world_assumption {
            let mut probe = Vec::new();
            self.solve(store, inner, bindings.clone(), budget, Some(1), config, &mut probe)?;
            if probe.is_empty() {
                out.push((bindings.clone(), Derivation::ClosedWorldFailure));
            }
            return Ok(());
        }

        // Open-world: Not(P) only succeeds against an explicit negative fact.
        let Query::Atom(triple) = inner else { return Ok(()) };
        let vocab = store.vocabulary();
        let mut key_lookup = bindings.clone();
        let key1 = search_key(&mut key_lookup, triple.arg1, vocab);
        let key2 = search_key(&mut key_lookup, triple.arg2, vocab);
        for fact in select_candidates(store, triple.operator, key1, key2) {
            budget.tick()?;
            if fact.polarity != Polarity::Negative {
                continue;
            }
            let mut trial = bindings.clone();
            if unify_arg(&mut trial, triple.arg1, fact.triple.arg1, vocab, budget)
                && unify_arg(&mut trial, triple.arg2, fact.triple.arg2, vocab, budget)
            {
                out.push((trial, Derivation::ExplicitNegation(fact.id)));
                if !remaining(limit, out.len()) {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn solve_and(
        &self,
        store: &mut FactStore,
        conjuncts: &[Query],
        index: usize,
        bindings: Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        config: &ReasonerConfig,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        if index >= conjuncts.len() {
            out.push((bindings, Derivation::And(Vec::new())));
            return Ok(());
        }
        let mut head_out = Vec::new();
        self.solve(store, &conjuncts[index], bindings, budget, None, config, &mut head_out)?;

        for (head_bindings, head_derivation) in head_out {
            let mut tail_out = Vec::new();
            self.solve_and(store, conjuncts, index + 1, head_bindings, budget, limit, config, &mut tail_out)?;
            for (final_bindings, tail_derivation) in tail_out {
                let mut steps = vec![head_derivation.clone()];
                if let Derivation::And(mut rest) = tail_derivation {
                    steps.append(&mut rest);
                } else {
                    steps.push(tail_derivation);
                }
                out.push((final_bindings, Derivation::And(steps)));
                if !remaining(limit, out.len()) {
                    return Ok(());
                }
            }
            if !remaining(limit, out.len()) {
                return Ok(());
            }
        }
        Ok(())
    }

    fn solve_or(
        &self,
        store: &mut FactStore,
        disjuncts: &[Query],
        bindings: &Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        config: &ReasonerConfig,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        for disjunct in disjuncts {
            let remaining_budget = limit.map(|l| l.saturating_sub(out.len()));
            let mut branch_out = Vec::new();
            self.solve(store, disjunct, bindings.clone(), budget, remaining_budget, config, &mut branch_out)?;
            for (branch_bindings, branch_derivation) in branch_out {
                out.push((branch_bindings, Derivation::Or(Box::new(branch_derivation))));
                if !remaining(limit, out.len()) {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn solve_exists(
        &self,
        store: &mut FactStore,
        var: SymbolId,
        inner: &Query,
        bindings: &Bindings,
        budget: &mut Budget,
        limit: Option<usize>,
        config: &ReasonerConfig,
        out: &mut Vec<(Bindings, Derivation)>,
    ) -> Result<(), ReasonError> {
        let mut inner_out = Vec::new();
        self.solve(store, inner, bindings.clone(), budget, limit, config, &mut inner_out)?;
        for (b, derivation) in inner_out {
            let resolved = b.find_readonly(var);
            out.push((b, Derivation::Exists { binding: resolved, witness: Box::new(derivation) }));
        }
        Ok(())
    }
}
