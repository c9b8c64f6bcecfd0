//! The `Session`: owns the vocabulary, fact store, and binding
//! environment for one reasoning session, and exposes the `learn`/
//! `prove`/`query` surface every other caller drives.
//!
//! A session never holds more than one open transaction at a time and
//! never runs concurrently with itself. `learn`
//! gives its statements atomic all-or-nothing semantics by tracking every
//! fact it asserts and issuing a compensating retraction if a later
//! statement in the same call fails, rather than by holding one
//! `kb_store::Tx` open for the whole call: a `solve` block needs ordinary
//! read access to the store to run the planner/CSP solver, which a still-
//! open `Tx` (it borrows the store exclusively) would rule out.

use std::collections::VecDeque;
use std::path::Path;

use kb_parser::{MatchArg, ParamValue, ParsedStatement, RetractTarget, SolveBlock, SolveKind, StatementKind};
use kb_plan::{CspSolver, Planner, PlanRequest, DEFAULT_MAX_DEPTH};
use kb_proof::{timeout_proof, Proof, ProofBuilder};
use kb_reason::{Query, ReasonError, Reasoner, ReasonerStats};
use kb_store::{Arg, CandidateFact, Expr, Fact, FactId, FactStore, Polarity, SymbolId, SymbolKind, Vocabulary};
use rustc_hash::FxHashSet;

use crate::config::SessionConfig;
use crate::env::BindingEnv;
use crate::error::SessionError;
use crate::theory::{self, TheoryFileReport};

/// What a `learn` call did: how many facts landed, and whether anything
/// went wrong badly enough to roll the whole call back.
#[derive(Debug, Clone, Default)]
pub struct LearnReport {
    pub success: bool,
    pub facts_added: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Whether `prove` reached a conclusive answer, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Proven,
    NotProven,
    /// The goal didn't parse, or parsed to something `prove` can't
    /// evaluate (e.g. an empty statement list).
    Unknown,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct ProveReport {
    pub verdict: Verdict,
    /// The rendered proof, present whenever a derivation (successful or
    /// not) produced a step DAG.
    pub proof: Option<String>,
    pub failure_trace: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub max_results: Option<usize>,
    pub timeout_ms: Option<u64>,
}

/// One satisfying assignment of a `query` pattern: the bound variables,
/// by bare name, and the rendered proof of that particular match.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    pub bindings: Vec<(String, String)>,
    pub proof: String,
}

/// Counters accumulated across every `prove`/`query` this session has
/// run, surfaced through `Session::stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub kb_scans: usize,
    pub similarity_checks: usize,
    pub rule_firings: usize,
    pub unification_attempts: usize,
}

pub struct Session {
    store: FactStore,
    config: SessionConfig,
    bindings: BindingEnv,
    known_names: FxHashSet<String>,
    reasoner: Reasoner,
    stats: SessionStats,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let vocabulary = Vocabulary::new(config.hdc_strategy, config.geometry());
        let store = FactStore::new(vocabulary, config.max_implies_depth());
        Self {
            store,
            config,
            bindings: BindingEnv::new(),
            known_names: FxHashSet::default(),
            reasoner: Reasoner::new(),
            stats: SessionStats::default(),
        }
    }

    /// Builds a session and loads every theory file in `dir` in
    /// lexicographic order. Only a failure to read the directory itself
    /// is returned as an error; a file that fails to parse is reported in
    /// the returned list but doesn't stop the rest from loading.
    pub fn with_theory_dir(config: SessionConfig, dir: &Path) -> std::io::Result<(Self, Vec<TheoryFileReport>)> {
        let mut session = Self::new(config);
        let reports = session.load_theory_dir(dir)?;
        Ok((session, reports))
    }

    pub fn load_theory_dir(&mut self, dir: &Path) -> std::io::Result<Vec<TheoryFileReport>> {
        let paths = theory::discover(dir)?;
        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            match std::fs::read_to_string(&path) {
                Ok(source) => {
                    let learned = self.learn(&source);
                    reports.push(TheoryFileReport { path, facts_added: learned.facts_added, errors: learned.errors });
                }
                Err(e) => reports.push(TheoryFileReport { path, facts_added: 0, errors: vec![e.to_string()] }),
            }
        }
        Ok(reports)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Parses `text` into statements and applies every one of them as a
    /// single atomic unit: either they all take effect, or none do.
    pub fn learn(&mut self, text: &str) -> LearnReport {
        let statements = match kb_parser::parse(text, self.store.vocabulary_mut(), &mut self.known_names) {
            Ok(s) => s,
            Err(e) => return LearnReport { success: false, facts_added: 0, errors: vec![e.to_string()], warnings: Vec::new() },
        };

        // A batch may mix fact asserts/retracts (already transactional, one
        // `Tx` per statement) with alias/synonym installs and rule
        // declarations (not `Tx`-scoped at all). Checkpointing the whole
        // store before the batch and restoring it wholesale on any failure
        // is what makes the *batch* atomic, not just its individual facts.
        let checkpoint = self.store.checkpoint();
        let mut asserted = Vec::new();
        let mut pending_bindings = Vec::new();
        let mut queue: VecDeque<ParsedStatement> = statements.into();

        match self.apply_queue(&mut queue, &mut asserted, &mut pending_bindings) {
            Ok(()) => {
                for (name, id) in pending_bindings {
                    self.bindings.bind(&name, id);
                }
                self.bindings.clear_ephemeral();
                LearnReport { success: true, facts_added: asserted.len(), errors: Vec::new(), warnings: Vec::new() }
            }
            Err(e) => {
                self.store.restore(checkpoint);
                LearnReport { success: false, facts_added: 0, errors: vec![e.to_string()], warnings: Vec::new() }
            }
        }
    }

    fn apply_queue(
        &mut self,
        queue: &mut VecDeque<ParsedStatement>,
        asserted: &mut Vec<FactId>,
        pending_bindings: &mut Vec<(String, FactId)>,
    ) -> Result<(), SessionError> {
        while let Some(stmt) = queue.pop_front() {
            let ParsedStatement { binding, line: _, kind } = stmt;
            match kind {
                StatementKind::Fact(expr, polarity) => {
                    let mut tx = self.store.begin();
                    let id = tx.assert(CandidateFact { expr, polarity })?;
                    tx.commit();
                    asserted.push(id);
                    if let Some(name) = binding {
                        pending_bindings.push((name, id));
                    }
                }
                StatementKind::Alias(a, b) => {
                    self.store.declare_alias(a, b)?;
                }
                StatementKind::Synonym(a, b) => {
                    self.store.declare_synonym(a, b)?;
                }
                StatementKind::Retract(target) => {
                    let ids = self.resolve_retract_target(&target)?;
                    let mut tx = self.store.begin();
                    for id in ids {
                        tx.retract(id)?;
                    }
                    tx.commit();
                }
                StatementKind::Load(path) => {
                    let source = std::fs::read_to_string(&path)
                        .map_err(|e| SessionError::UnresolvedReference(format!("Load {path}: {e}")))?;
                    let loaded = kb_parser::parse(&source, self.store.vocabulary_mut(), &mut self.known_names)?;
                    for s in loaded.into_iter().rev() {
                        queue.push_front(s);
                    }
                }
                StatementKind::Solve(block) => {
                    let dest = binding
                        .clone()
                        .ok_or_else(|| SessionError::InvalidSolveBlock("solve block must bind a destination name with @name".to_string()))?;
                    let (headline, new_ids) = match block.kind {
                        SolveKind::Planning => self.apply_planning_solve(&dest, &block)?,
                        SolveKind::Csp => self.apply_csp_solve(&dest, &block)?,
                    };
                    asserted.extend(new_ids);
                    if let Some(id) = headline {
                        pending_bindings.push((dest, id));
                    }
                }
                StatementKind::MutuallyExclusive(relation, a, b) => {
                    self.store.rules_mut().add_mutually_exclusive(relation, a, b);
                }
                StatementKind::ContradictsSameArgs(r, s) => {
                    self.store.rules_mut().add_contradicts_same_args(r, s);
                }
                StatementKind::Exception(expr, polarity) => {
                    let Expr::Atom(triple) = expr else {
                        return Err(SessionError::InvalidSolveBlock("'exception' only applies to a plain triple".to_string()));
                    };
                    let canonical = self.store.canonicalize_triple(triple);
                    let fp = kb_store::fingerprint(canonical.operator, canonical.arg1, canonical.arg2, polarity);
                    self.store.rules_mut().add_exception(fp);
                }
            }
        }
        Ok(())
    }

    fn resolve_retract_target(&mut self, target: &RetractTarget) -> Result<Vec<FactId>, SessionError> {
        match target {
            RetractTarget::Reference(sym) => {
                let raw = self.store.vocabulary().name_of(*sym).to_string();
                let bare = raw.strip_prefix('$').unwrap_or(&raw);
                let id = self.bindings.get(bare).ok_or_else(|| SessionError::UnresolvedReference(raw.clone()))?;
                Ok(vec![id])
            }
            RetractTarget::Pattern { operator, arg1, arg2 } => Ok(self
                .store
                .by_operator(*operator)
                .filter(|f| matches_arg(f.triple.arg1, *arg1) && matches_arg(f.triple.arg2, *arg2))
                .map(|f| f.id)
                .collect()),
        }
    }

    /// Promotes `name` to an operator symbol, creating it if necessary.
    /// Used both for fixed DSL keywords (`requires`, `domain`, ...) and
    /// for a `solutionRelation` a theory names explicitly.
    fn operator_symbol(&mut self, name: &str) -> SymbolId {
        let sym = self.store.vocabulary_mut().get_or_create(name);
        self.store.vocabulary_mut().mark_operator(sym);
        sym
    }

    fn int_symbol(&mut self, n: usize) -> SymbolId {
        self.store.vocabulary_mut().get_or_create(&n.to_string())
    }

    /// Runs a `solve { planning ... }` block and asserts its plan as
    /// ordinary facts. The grammar only gives a triple two argument
    /// positions, so a plan's three logical fields — destination name,
    /// step index, and action — are folded into one synthesized symbol
    /// per step, named `"{dest}#{n}"`, which a later retrieval such as
    /// `planStep PLAN#1 ?action` can match against directly.
    fn apply_planning_solve(&mut self, dest: &str, block: &SolveBlock) -> Result<(Option<FactId>, Vec<FactId>), SessionError> {
        let dest_symbol = self.store.vocabulary_mut().get_or_create(dest);

        let start = collect_symbols(block, "start")?;
        let goal = collect_symbols(block, "goal")?;
        if start.is_empty() || goal.is_empty() {
            return Err(SessionError::InvalidSolveBlock(
                "a planning solve block needs at least one `start` and one `goal`".to_string(),
            ));
        }
        let guard = single_symbol(block, "guard")?;
        let conflict_op = single_symbol(block, "conflictOp")?;
        let location_op = single_symbol(block, "locationOp")?;
        let max_depth = single_int(block, "maxDepth")?.map(|n| n.max(0) as usize).unwrap_or(DEFAULT_MAX_DEPTH);

        let requires_op = self.operator_symbol("requires");
        let causes_op = self.operator_symbol("causes");
        let prevents_op = self.operator_symbol("prevents");

        let request = PlanRequest { start, goal, guard, conflict_op, location_op, max_depth, requires_op, causes_op, prevents_op };

        let bindings_map = self.bindings.reference_map(self.store.vocabulary_mut());
        let planner = Planner::new();
        let plan = planner.solve(&self.store, &bindings_map, &request)?;
        let verified = planner.verify(&self.store, &bindings_map, &request, &plan)?;

        let plan_op = self.operator_symbol("plan");
        let plan_step_op = self.operator_symbol("planStep");
        let verify_plan_op = self.operator_symbol("verifyPlan");
        let true_sym = self.store.vocabulary_mut().get_or_create("true");
        let false_sym = self.store.vocabulary_mut().get_or_create("false");
        let length_sym = self.int_symbol(plan.len());
        let step_symbols: Vec<SymbolId> = (0..plan.len())
            .map(|i| self.store.vocabulary_mut().get_or_create(&format!("{dest}#{}", i + 1)))
            .collect();

        let mut ids = Vec::with_capacity(plan.len() + 2);
        let mut tx = self.store.begin();

        let length_id = tx.assert(CandidateFact::triple(plan_op, Arg::Symbol(dest_symbol), Arg::Symbol(length_sym), Polarity::Positive))?;
        ids.push(length_id);

        for (step_symbol, action) in step_symbols.iter().zip(plan.steps.iter()) {
            let id = tx.assert(CandidateFact::triple(plan_step_op, Arg::Symbol(*step_symbol), Arg::Symbol(*action), Polarity::Positive))?;
            ids.push(id);
        }

        let verify_value = if verified { true_sym } else { false_sym };
        let verify_id = tx.assert(CandidateFact::triple(verify_plan_op, Arg::Symbol(dest_symbol), Arg::Symbol(verify_value), Polarity::Positive))?;
        ids.push(verify_id);

        tx.commit();
        Ok((Some(length_id), ids))
    }

    /// Runs a `solve { csp ... }` block and asserts every solution as
    /// ordinary facts. Same folding trick as the planner: a solution's
    /// three logical fields — destination, solution index, variable — are
    /// folded into one synthesized symbol per (solution, variable) pair,
    /// named `"{dest}#{solution}#{var}"`.
    fn apply_csp_solve(&mut self, dest: &str, block: &SolveBlock) -> Result<(Option<FactId>, Vec<FactId>), SessionError> {
        let dest_symbol = self.store.vocabulary_mut().get_or_create(dest);
        let domain_op = self.operator_symbol("domain");
        let constraint_op = self.operator_symbol("constraint");
        let solution_relation = match single_symbol(block, "solutionRelation")? {
            Some(s) => {
                self.store.vocabulary_mut().mark_operator(s);
                s
            }
            None => self.operator_symbol("cspSolution"),
        };

        let solver = CspSolver::new();
        let solutions = solver.solve_all(&self.store, domain_op, constraint_op)?;
        if solutions.is_empty() {
            return Err(SessionError::CspUnsolvable);
        }

        let count_op = self.operator_symbol("cspSolutionCount");
        let count_sym = self.int_symbol(solutions.len());

        let mut prepared: Vec<Vec<(SymbolId, SymbolId)>> = Vec::with_capacity(solutions.len());
        for (i, assignment) in solutions.iter().enumerate() {
            let mut facts = Vec::with_capacity(assignment.len());
            for (var, value) in assignment {
                let var_name = self.store.vocabulary().name_of(*var).to_string();
                let key_symbol = self.store.vocabulary_mut().get_or_create(&format!("{dest}#{}#{var_name}", i + 1));
                facts.push((key_symbol, *value));
            }
            prepared.push(facts);
        }

        let mut ids = Vec::new();
        let mut tx = self.store.begin();
        let count_id = tx.assert(CandidateFact::triple(count_op, Arg::Symbol(dest_symbol), Arg::Symbol(count_sym), Polarity::Positive))?;
        ids.push(count_id);
        for facts in prepared {
            for (key_symbol, value) in facts {
                let id = tx.assert(CandidateFact::triple(solution_relation, Arg::Symbol(key_symbol), Arg::Symbol(value), Polarity::Positive))?;
                ids.push(id);
            }
        }
        tx.commit();
        Ok((Some(count_id), ids))
    }

    /// Proves the goal named by the *first* fact statement in `text`,
    /// ignoring anything after it. Documented contract, not a bug: a
    /// caller wanting to prove a negation writes it inline
    /// (`Not (isA Fido Cat)`) rather than via a second statement.
    pub fn prove(&mut self, text: &str) -> ProveReport {
        let statements = match kb_parser::parse(text, self.store.vocabulary_mut(), &mut self.known_names) {
            Ok(s) => s,
            Err(e) => return ProveReport { verdict: Verdict::Unknown, proof: None, failure_trace: Some(e.to_string()) },
        };
        let Some(first) = statements.into_iter().find(|s| matches!(s.kind, StatementKind::Fact(_, _))) else {
            return ProveReport {
                verdict: Verdict::Unknown,
                proof: None,
                failure_trace: Some("no goal statement found".to_string()),
            };
        };
        let StatementKind::Fact(expr, polarity) = first.kind else { unreachable!("filtered above") };
        let goal_expr = match polarity {
            Polarity::Positive => expr,
            Polarity::Negative => Expr::Not(Box::new(expr)),
        };
        let query = expr_to_query(&goal_expr);
        let reasoner_config = self.config.reasoner_config();

        match self.reasoner.prove_with_stats(&mut self.store, &query, &reasoner_config) {
            Ok((Some((_bindings, derivation)), delta)) => {
                self.accumulate(delta);
                self.render_derivation(&derivation)
            }
            Ok((None, delta)) => {
                self.accumulate(delta);
                ProveReport { verdict: Verdict::NotProven, proof: None, failure_trace: Some("no derivation satisfies the goal".to_string()) }
            }
            Err(err) => self.timed_out_report(err),
        }
    }

    fn render_derivation(&self, derivation: &kb_reason::Derivation) -> ProveReport {
        let builder = ProofBuilder::new(self.config.proof_max_depth);
        match builder.build(derivation) {
            Ok(built) => {
                let proof = if self.config.proof_validation_enabled { builder.validate(&built, &self.store) } else { built };
                if !proof.validator_ok {
                    return ProveReport {
                        verdict: Verdict::Unknown,
                        proof: Some(proof.render(&self.store)),
                        failure_trace: Some("proof failed revalidation against the current store".to_string()),
                    };
                }
                ProveReport { verdict: Verdict::Proven, proof: Some(proof.render(&self.store)), failure_trace: None }
            }
            Err(e) => ProveReport { verdict: Verdict::Unknown, proof: None, failure_trace: Some(e.to_string()) },
        }
    }

    fn timed_out_report(&self, err: ReasonError) -> ProveReport {
        let proof = timeout_proof();
        ProveReport { verdict: Verdict::TimedOut, proof: Some(proof.render(&self.store)), failure_trace: Some(err.to_string()) }
    }

    /// Evaluates a single query pattern, returning every satisfying
    /// binding up to `opts.max_results` (or the session's configured
    /// `maxReasonerIterations`/`maxSolutions` default).
    pub fn query(&mut self, pattern: &str, opts: QueryOptions) -> Result<Vec<QueryMatch>, SessionError> {
        let statements = kb_parser::parse(pattern, self.store.vocabulary_mut(), &mut self.known_names)?;
        let stmt = statements
            .into_iter()
            .next()
            .ok_or_else(|| SessionError::InvalidSolveBlock("query pattern is empty".to_string()))?;
        let StatementKind::Fact(expr, polarity) = stmt.kind else {
            return Err(SessionError::InvalidSolveBlock("query pattern must be a plain fact".to_string()));
        };
        let goal_expr = match polarity {
            Polarity::Positive => expr,
            Polarity::Negative => Expr::Not(Box::new(expr)),
        };
        let query = expr_to_query(&goal_expr);
        let variables = collect_variables(&query, self.store.vocabulary());

        let mut reasoner_config = self.config.reasoner_config();
        if let Some(ms) = opts.timeout_ms {
            reasoner_config.timeout_ms = Some(ms);
        }
        if let Some(max) = opts.max_results {
            reasoner_config.max_solutions = max;
        }

        let (results, delta) = self.reasoner.query_with_stats(&mut self.store, &query, &reasoner_config)?;
        self.accumulate(delta);

        let builder = ProofBuilder::new(self.config.proof_max_depth);
        let mut matches = Vec::with_capacity(results.len());
        for (mut solved, derivation) in results {
            let bound = variables
                .iter()
                .map(|v| {
                    let resolved = solved.find(*v);
                    (self.store.vocabulary().name_of(*v).to_string(), self.store.vocabulary().name_of(resolved).to_string())
                })
                .collect();
            let proof_text = match builder.build(&derivation) {
                Ok(proof) => proof.render(&self.store),
                Err(_) => String::new(),
            };
            matches.push(QueryMatch { bindings: bound, proof: proof_text });
        }
        Ok(matches)
    }

    pub fn describe_result(&self, report: &ProveReport) -> String {
        match report.verdict {
            Verdict::Proven => report.proof.clone().unwrap_or_else(|| "Proven.".to_string()),
            Verdict::NotProven => "Not proven: no derivation satisfies the goal.".to_string(),
            Verdict::Unknown => report.failure_trace.clone().unwrap_or_else(|| "Unknown.".to_string()),
            Verdict::TimedOut => "Reasoning timed out before reaching a verdict.".to_string(),
        }
    }

    /// A bounded, human-readable snapshot of the store's facts, oldest
    /// first. Not meant for reconstructing the store — just for
    /// inspection.
    pub fn dump(&self, limit: usize) -> Vec<String> {
        self.store.facts().take(limit).map(|f| render_fact(&self.store, f)).collect()
    }

    fn accumulate(&mut self, delta: ReasonerStats) {
        self.stats.kb_scans += delta.kb_scans;
        self.stats.similarity_checks += delta.similarity_checks;
        self.stats.rule_firings += delta.rule_firings;
        self.stats.unification_attempts += delta.unification_attempts;
    }
}

fn matches_arg(actual: Arg, pattern: MatchArg) -> bool {
    match pattern {
        MatchArg::Any => true,
        MatchArg::Exact(sym) => matches!(actual, Arg::Symbol(s) if s == sym),
    }
}

fn collect_symbols(block: &SolveBlock, key: &str) -> Result<Vec<SymbolId>, SessionError> {
    block
        .values(key)
        .map(|v| match v {
            ParamValue::Symbol(s) => Ok(*s),
            ParamValue::Int(_) => Err(SessionError::InvalidSolveBlock(format!("`{key}` must be a symbol, not an integer"))),
        })
        .collect()
}

fn single_symbol(block: &SolveBlock, key: &str) -> Result<Option<SymbolId>, SessionError> {
    match block.value(key) {
        None => Ok(None),
        Some(ParamValue::Symbol(s)) => Ok(Some(*s)),
        Some(ParamValue::Int(_)) => Err(SessionError::InvalidSolveBlock(format!("`{key}` must be a symbol, not an integer"))),
    }
}

fn single_int(block: &SolveBlock, key: &str) -> Result<Option<i64>, SessionError> {
    match block.value(key) {
        None => Ok(None),
        Some(ParamValue::Int(n)) => Ok(Some(*n)),
        Some(ParamValue::Symbol(_)) => Err(SessionError::InvalidSolveBlock(format!("`{key}` must be an integer, not a symbol"))),
    }
}

/// Mirrors `kb_reason::reasoner`'s private `expr_to_query`: a committed
/// `Implies` reads as its material-conditional equivalent when used as a
/// goal, since `Query` has no `Implies` shape of its own.
fn expr_to_query(expr: &Expr) -> Query {
    match expr {
        Expr::Atom(t) => Query::Atom(*t),
        Expr::Not(inner) => Query::Not(Box::new(expr_to_query(inner))),
        Expr::And(xs) => Query::And(xs.iter().map(expr_to_query).collect()),
        Expr::Or(xs) => Query::Or(xs.iter().map(expr_to_query).collect()),
        Expr::Implies(ante, cons) => Query::Or(vec![Query::Not(Box::new(expr_to_query(ante))), expr_to_query(cons)]),
    }
}

fn collect_variables(query: &Query, vocabulary: &Vocabulary) -> Vec<SymbolId> {
    let mut out = Vec::new();
    collect_variables_inner(query, vocabulary, &mut out);
    out
}

fn collect_variables_inner(query: &Query, vocabulary: &Vocabulary, out: &mut Vec<SymbolId>) {
    match query {
        Query::Atom(triple) => {
            for arg in [triple.arg1, triple.arg2] {
                if let Arg::Symbol(s) = arg {
                    if vocabulary.classify(s) == SymbolKind::Variable && !out.contains(&s) {
                        out.push(s);
                    }
                }
            }
        }
        Query::Not(inner) => collect_variables_inner(inner, vocabulary, out),
        Query::And(xs) | Query::Or(xs) => {
            for x in xs {
                collect_variables_inner(x, vocabulary, out);
            }
        }
        Query::Exists(_, inner) => collect_variables_inner(inner, vocabulary, out),
    }
}

fn render_fact(store: &FactStore, fact: &Fact) -> String {
    let op = store.vocabulary().name_of(fact.triple.operator);
    let a1 = render_arg(store, fact.triple.arg1);
    let a2 = render_arg(store, fact.triple.arg2);
    match fact.polarity {
        Polarity::Positive => format!("{op} {a1} {a2}"),
        Polarity::Negative => format!("not {op} {a1} {a2}"),
    }
}

fn render_arg(store: &FactStore, arg: Arg) -> String {
    match arg {
        Arg::Symbol(s) => store.vocabulary().name_of(s).to_string(),
        Arg::Compound(id) => format!("compound#{}", id.index()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(SessionConfig::default())
    }

    #[test]
    fn learn_then_prove_direct_fact() {
        let mut s = session();
        let report = s.learn("isA Fido Dog");
        assert!(report.success);
        assert_eq!(report.facts_added, 1);

        let proven = s.prove("isA Fido Dog");
        assert_eq!(proven.verdict, Verdict::Proven);
    }

    #[test]
    fn prove_follows_transitive_isa_chain() {
        let mut s = session();
        s.learn("isA Fido Dog\nisA Dog Mammal");
        let proven = s.prove("isA Fido Mammal");
        assert_eq!(proven.verdict, Verdict::Proven);
    }

    #[test]
    fn modus_ponens_fires_across_implication() {
        let mut s = session();
        s.learn("isA Fido Dog");
        s.learn("Implies (isA ?x Dog) (hasTail ?x True)");
        let proven = s.prove("hasTail Fido True");
        assert_eq!(proven.verdict, Verdict::Proven);
    }

    #[test]
    fn mutually_exclusive_rejection_is_atomic() {
        let mut s = session();
        s.learn("mutuallyExclusive status Alive Dead");
        let before = s.dump(100).len();
        s.learn("status Rex Alive");

        let report = s.learn("status Rex Alive\nstatus Rex Dead");
        assert!(!report.success);
        assert_eq!(s.dump(100).len(), before + 1);
    }

    #[test]
    fn closed_world_assumption_off_leaves_negation_unproven() {
        let mut s = session();
        s.learn("isA Fido Dog");
        let proven = s.prove("Not (isA Fido Cat)");
        assert_ne!(proven.verdict, Verdict::Proven);
    }

    #[test]
    fn closed_world_assumption_on_proves_negation_by_absence() {
        let mut config = SessionConfig::default();
        config.closed_world_assumption = true;
        let mut s = Session::new(config);
        s.learn("isA Fido Dog");
        let proven = s.prove("Not (isA Fido Cat)");
        assert_eq!(proven.verdict, Verdict::Proven);
    }

    #[test]
    fn query_pattern_binds_variable_to_matching_constant() {
        let mut s = session();
        s.learn("isA Fido Dog");
        let matches = s.query("isA Fido ?what", QueryOptions::default()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].bindings, vec![("?what".to_string(), "Dog".to_string())]);
    }

    #[test]
    fn exception_exempts_one_fact_from_mutual_exclusion() {
        let mut s = session();
        s.learn("mutuallyExclusive status Alive Dead");
        s.learn("status Schrodinger Alive");
        s.learn("exception status Schrodinger Dead");

        let report = s.learn("status Schrodinger Dead");
        assert!(report.success);
    }

    #[test]
    fn binding_reference_round_trips_through_retract() {
        let mut s = session();
        let learned = s.learn("@fido isA Fido Dog");
        assert!(learned.success);

        let retracted = s.learn("retract $fido");
        assert!(retracted.success);

        let proven = s.prove("isA Fido Dog");
        assert_ne!(proven.verdict, Verdict::Proven);
    }
}
