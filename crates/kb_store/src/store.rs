//! The canonical fact store: ground triples indexed by
//! `(operator, arg1)` / `(operator, arg2)` / `operator`, a compound
//! side-table, and transactional `begin`/`assert`/`retract`/`commit`/
//! `abort` semantics giving `learn` its atomic all-or-nothing guarantee.

use crate::alias::{AliasError, AliasTable};
use crate::contradiction::{ContradictionDetector, ContradictionReason, TheoryRules};
use crate::expr::{fingerprint, Arg, Compound, CompoundId, Expr, Fact, FactId, Polarity, Triple};
use crate::symbol::{SymbolId, Vocabulary};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Contradiction(ContradictionReason),
    UnknownFact(FactId),
    AlreadyRetracted(FactId),
    Alias(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Contradiction(reason) => write!(f, "contradiction: {reason:?}"),
            StoreError::UnknownFact(id) => write!(f, "no such fact: {}", id.index()),
            StoreError::AlreadyRetracted(id) => write!(f, "fact {} already retracted", id.index()),
            StoreError::Alias(msg) => write!(f, "alias error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<AliasError> for StoreError {
    fn from(e: AliasError) -> Self {
        StoreError::Alias(e.to_string())
    }
}

/// What a caller hands to [`Tx::assert`]: either a ground triple
/// (`Expr::Atom`) or a compound (`And`/`Or`/`Not`/`Implies`) to be filed in
/// the side table.
#[derive(Debug, Clone)]
pub struct CandidateFact {
    pub expr: Expr,
    pub polarity: Polarity,
}

impl CandidateFact {
    pub fn triple(operator: SymbolId, arg1: Arg, arg2: Arg, polarity: Polarity) -> Self {
        Self { expr: Expr::Atom(Triple::new(operator, arg1, arg2)), polarity }
    }

    pub fn compound(expr: Expr, polarity: Polarity) -> Self {
        debug_assert!(!matches!(expr, Expr::Atom(_)), "use CandidateFact::triple for atoms");
        Self { expr, polarity }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    pub facts_asserted: u64,
    pub facts_retracted: u64,
    pub duplicates_skipped: u64,
    pub contradictions_rejected: u64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CommitSummary {
    pub asserted: usize,
    pub retracted: usize,
    pub deduplicated: usize,
}

#[derive(Debug, Clone, Copy)]
struct FactSlot {
    fact: Fact,
    retracted: bool,
}

/// Connective symbols used as the synthetic operator for a compound's
/// wrapper fact — interned once, on demand. Keeping these as ordinary,
/// reserved-name facts (rather than a separate compound-kind enum row)
/// means the same index machinery that handles triples handles compounds
/// too.
struct ConnectiveSymbols {
    and: SymbolId,
    or: SymbolId,
    not: SymbolId,
    implies: SymbolId,
}

pub struct FactStore {
    vocabulary: Vocabulary,
    aliases: AliasTable,
    rules: TheoryRules,
    contradiction: ContradictionDetector,
    connectives: ConnectiveSymbols,
    isa_operator: SymbolId,
    empty_symbol: SymbolId,

    facts: Vec<FactSlot>,
    compounds: Vec<Compound>,

    by_fingerprint: FxHashMap<u64, FactId>,
    by_op: FxHashMap<SymbolId, Vec<FactId>>,
    by_op_arg1: FxHashMap<(SymbolId, SymbolId), Vec<FactId>>,
    by_op_arg2: FxHashMap<(SymbolId, SymbolId), Vec<FactId>>,
    isa_categories: FxHashMap<SymbolId, Vec<(SymbolId, FactId)>>,
    /// `(arg1, arg2) -> [(operator, FactId)]` across every relation, kept
    /// only to answer "what else holds between exactly these two symbols"
    /// for `contradictsSameArgs` — a cross-operator question the
    /// per-operator indices above can't answer.
    by_args: FxHashMap<(SymbolId, SymbolId), Vec<(SymbolId, FactId)>>,
    implies_edges: FxHashMap<u64, Vec<(u64, FactId)>>,
    asserted_fingerprints: FxHashSet<u64>,

    stats: Stats,
}

impl FactStore {
    pub fn new(mut vocabulary: Vocabulary, max_implies_depth: usize) -> Self {
        let and = vocabulary.get_or_create("__And");
        let or = vocabulary.get_or_create("__Or");
        let not = vocabulary.get_or_create("__Not");
        let implies = vocabulary.get_or_create("__Implies");
        let isa_operator = vocabulary.get_or_create("isA");
        let empty_symbol = vocabulary.get_or_create("");
        for op in [and, or, not, implies, isa_operator] {
            vocabulary.mark_operator(op);
        }
        Self {
            vocabulary,
            aliases: AliasTable::new(),
            rules: TheoryRules::new(),
            contradiction: ContradictionDetector::new(max_implies_depth),
            connectives: ConnectiveSymbols { and, or, not, implies },
            isa_operator,
            empty_symbol,
            facts: Vec::new(),
            compounds: Vec::new(),
            by_fingerprint: FxHashMap::default(),
            by_op: FxHashMap::default(),
            by_op_arg1: FxHashMap::default(),
            by_op_arg2: FxHashMap::default(),
            isa_categories: FxHashMap::default(),
            by_args: FxHashMap::default(),
            implies_edges: FxHashMap::default(),
            asserted_fingerprints: FxHashSet::default(),
            stats: Stats::default(),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn vocabulary_mut(&mut self) -> &mut Vocabulary {
        &mut self.vocabulary
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn aliases_mut(&mut self) -> &mut AliasTable {
        &mut self.aliases
    }

    pub fn rules(&self) -> &TheoryRules {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut TheoryRules {
        &mut self.rules
    }

    pub fn isa_operator(&self) -> SymbolId {
        self.isa_operator
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn compound(&self, id: CompoundId) -> &Compound {
        &self.compounds[id.index()]
    }

    /// Live (non-retracted) facts in ascending id order — the store's only
    /// iteration order, which is what keeps repeated queries deterministic.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter().filter(|slot| !slot.retracted).map(|slot| &slot.fact)
    }

    pub fn fact(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(id.index()).filter(|slot| !slot.retracted).map(|slot| &slot.fact)
    }

    pub fn by_operator(&self, operator: SymbolId) -> impl Iterator<Item = &Fact> {
        self.by_op
            .get(&operator)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.fact(*id))
    }

    pub fn by_operator_arg1(&self, operator: SymbolId, arg1: SymbolId) -> impl Iterator<Item = &Fact> {
        self.by_op_arg1
            .get(&(operator, arg1))
            .into_iter()
            .flatten()
            .filter_map(move |id| self.fact(*id))
    }

    pub fn by_operator_arg2(&self, operator: SymbolId, arg2: SymbolId) -> impl Iterator<Item = &Fact> {
        self.by_op_arg2
            .get(&(operator, arg2))
            .into_iter()
            .flatten()
            .filter_map(move |id| self.fact(*id))
    }

    pub fn categories_of(&self, subject: SymbolId) -> &[(SymbolId, FactId)] {
        self.isa_categories.get(&subject).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Every `(operator, FactId)` pair already asserted over exactly
    /// `(arg1, arg2)`, across all relations — the raw material for the
    /// `contradictsSameArgs` check.
    pub fn facts_with_args(&self, arg1: SymbolId, arg2: SymbolId) -> &[(SymbolId, FactId)] {
        self.by_args.get(&(arg1, arg2)).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Resolves `id` through the alias/synonym table, falling back to `id`
    /// itself if the table reports a cycle (should never happen — cycles
    /// are rejected at the point an alias is installed).
    fn canonical_symbol(&self, id: SymbolId) -> SymbolId {
        self.aliases.canonicalize(id).unwrap_or(id)
    }

    fn canonical_arg(&self, arg: Arg) -> Arg {
        match arg {
            Arg::Symbol(s) => Arg::Symbol(self.canonical_symbol(s)),
            other => other,
        }
    }

    fn canonical_triple(&self, triple: Triple) -> Triple {
        Triple::new(
            self.canonical_symbol(triple.operator),
            self.canonical_arg(triple.arg1),
            self.canonical_arg(triple.arg2),
        )
    }

    /// Alias/synonym-closes `triple`, matching exactly what [`Tx::assert`]
    /// would canonicalize it to. Exposed so a caller filing an `exception`
    /// against a fingerprint sees the same canonical form the store itself
    /// checks contradictions against.
    pub fn canonicalize_triple(&self, triple: Triple) -> Triple {
        self.canonical_triple(triple)
    }

    /// Installs `alias x y` (`x` always canonicalizes to `y`) and
    /// retroactively rewrites every live ground-triple fact through the
    /// updated table. Not part of any `Tx` — it touches the alias table and
    /// several fact indices at once, not a single fact — but still undone by
    /// [`Self::restore`] if a caller checkpointed beforehand, which is how a
    /// whole `learn` batch gets its atomicity (see DESIGN.md).
    pub fn declare_alias(&mut self, x: SymbolId, y: SymbolId) -> Result<(), StoreError> {
        self.aliases.alias(x, y)?;
        self.rewrite_facts_for_alias();
        Ok(())
    }

    /// Installs `synonym x y` (bidirectional) with the same retroactive
    /// rewrite as [`Self::declare_alias`].
    pub fn declare_synonym(&mut self, x: SymbolId, y: SymbolId) -> Result<(), StoreError> {
        self.aliases.synonym(x, y)?;
        self.rewrite_facts_for_alias();
        Ok(())
    }

    /// Re-canonicalizes every live fact's triple through the current alias
    /// table and rebuilds every index that keys off symbol ids. A fact
    /// whose canonicalized triple collides with another (lower-id) live
    /// fact's fingerprint is retracted as a now-duplicate, preserving the
    /// "no two live facts share a fingerprint" invariant.
    ///
    /// Compound side-table entries (`And`/`Or`/`Not`/`Implies`) are left
    /// untouched — a symbol used only inside a compound's nested `Expr`,
    /// never at a triple's own slot, is not retroactively rewritten. This
    /// is a deliberate scope limit: aliasing a name already used inside a
    /// standing rule is rare enough, and re-deriving `implies_edges` from
    /// scratch expensive enough, that it is not worth the complexity here
    /// (see DESIGN.md).
    fn rewrite_facts_for_alias(&mut self) {
        self.by_fingerprint.clear();
        self.by_op.clear();
        self.by_op_arg1.clear();
        self.by_op_arg2.clear();
        self.isa_categories.clear();
        self.by_args.clear();
        self.asserted_fingerprints.clear();

        let slots = std::mem::take(&mut self.facts);
        let mut rebuilt = Vec::with_capacity(slots.len());
        for mut slot in slots {
            if slot.retracted {
                rebuilt.push(slot);
                continue;
            }
            let triple = self.canonical_triple(slot.fact.triple);
            let fp = fingerprint(triple.operator, triple.arg1, triple.arg2, slot.fact.polarity);

            if self.by_fingerprint.contains_key(&fp) {
                slot.retracted = true;
                rebuilt.push(slot);
                continue;
            }

            slot.fact.triple = triple;
            slot.fact.fingerprint = fp;
            let id = slot.fact.id;
            self.by_fingerprint.insert(fp, id);
            self.asserted_fingerprints.insert(fp);
            self.by_op.entry(triple.operator).or_default().push(id);
            if let (Arg::Symbol(a1), Arg::Symbol(a2)) = (triple.arg1, triple.arg2) {
                self.by_op_arg1.entry((triple.operator, a1)).or_default().push(id);
                self.by_op_arg2.entry((triple.operator, a2)).or_default().push(id);
                self.by_args.entry((a1, a2)).or_default().push((triple.operator, id));
            } else {
                if let Arg::Symbol(a1) = triple.arg1 {
                    self.by_op_arg1.entry((triple.operator, a1)).or_default().push(id);
                }
                if let Arg::Symbol(a2) = triple.arg2 {
                    self.by_op_arg2.entry((triple.operator, a2)).or_default().push(id);
                }
            }
            if triple.operator == self.isa_operator && slot.fact.polarity == Polarity::Positive {
                if let (Arg::Symbol(subject), Arg::Symbol(category)) = (triple.arg1, triple.arg2) {
                    self.isa_categories.entry(subject).or_default().push((category, id));
                }
            }
            rebuilt.push(slot);
        }
        self.facts = rebuilt;
    }

    fn find_triple(&self, triple: &Triple) -> Option<&Fact> {
        if let Arg::Symbol(a1) = triple.arg1 {
            return self
                .by_operator_arg1(triple.operator, a1)
                .find(|f| f.triple == *triple);
        }
        if let Arg::Symbol(a2) = triple.arg2 {
            return self
                .by_operator_arg2(triple.operator, a2)
                .find(|f| f.triple == *triple);
        }
        self.by_operator(triple.operator).find(|f| f.triple == *triple)
    }

    fn find_opposite(&self, triple: &Triple, polarity: Polarity) -> Option<&Fact> {
        let opposite = match polarity {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        };
        if let Arg::Symbol(a1) = triple.arg1 {
            return self
                .by_operator_arg1(triple.operator, a1)
                .find(|f| f.triple == *triple && f.polarity == opposite);
        }
        self.by_operator(triple.operator).find(|f| f.triple == *triple && f.polarity == opposite)
    }

    /// Extracts `(triple, effective polarity)` from a plain atom or a
    /// single negation of one — the only shapes the `Implies` fast-path
    /// graph understands. Deeper compounds on either side of an `Implies`
    /// are still stored and available to `kb-reason` via the compound
    /// table; they just don't get a fingerprint-graph shortcut here.
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

    fn connective_operator(&self, expr: &Expr) -> SymbolId {
        match expr {
            Expr::And(_) => self.connectives.and,
            Expr::Or(_) => self.connectives.or,
            Expr::Not(_) => self.connectives.not,
            Expr::Implies(_, _) => self.connectives.implies,
            Expr::Atom(_) => unreachable!("atoms never go through connective_operator"),
        }
    }

    /// Opens a transaction. Every `assert`/`retract` on it applies
    /// immediately so later statements in the same transaction observe
    /// earlier ones, but everything rolls back unless [`Tx::commit`] is
    /// called — including via an early `?` return that just drops the `Tx`.
    pub fn begin(&mut self) -> Tx<'_> {
        Tx { store: self, applied: Vec::new(), committed: false }
    }

    /// Snapshots every piece of mutable instance state — facts, compounds,
    /// every index, the alias table, and the theory rule set — so a caller
    /// spanning several `Tx`s and `declare_alias`/`rules_mut` calls (a whole
    /// `learn` batch, say) can undo all of them at once with [`Self::restore`]
    /// if a later statement in the batch fails. `vocabulary` is deliberately
    /// excluded: symbol interning is append-only for the life of the store
    /// (see spec §3), so a restored checkpoint simply leaves a few harmless
    /// unused symbols behind rather than unwinding them too.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            facts: self.facts.clone(),
            compounds: self.compounds.clone(),
            by_fingerprint: self.by_fingerprint.clone(),
            by_op: self.by_op.clone(),
            by_op_arg1: self.by_op_arg1.clone(),
            by_op_arg2: self.by_op_arg2.clone(),
            isa_categories: self.isa_categories.clone(),
            by_args: self.by_args.clone(),
            implies_edges: self.implies_edges.clone(),
            asserted_fingerprints: self.asserted_fingerprints.clone(),
            aliases: self.aliases.clone(),
            rules: self.rules.clone(),
            stats: self.stats,
        }
    }

    /// Restores every field [`Self::checkpoint`] captured, discarding
    /// whatever asserts, retracts, alias/synonym installs, and rule
    /// declarations happened since it was taken.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.facts = checkpoint.facts;
        self.compounds = checkpoint.compounds;
        self.by_fingerprint = checkpoint.by_fingerprint;
        self.by_op = checkpoint.by_op;
        self.by_op_arg1 = checkpoint.by_op_arg1;
        self.by_op_arg2 = checkpoint.by_op_arg2;
        self.isa_categories = checkpoint.isa_categories;
        self.by_args = checkpoint.by_args;
        self.implies_edges = checkpoint.implies_edges;
        self.asserted_fingerprints = checkpoint.asserted_fingerprints;
        self.aliases = checkpoint.aliases;
        self.rules = checkpoint.rules;
        self.stats = checkpoint.stats;
    }
}

/// A point-in-time snapshot of a [`FactStore`]'s instance data, taken by
/// [`FactStore::checkpoint`] and restored wholesale by [`FactStore::restore`].
/// Opaque to callers outside this crate other than as a token to hand back.
#[derive(Clone)]
pub struct Checkpoint {
    facts: Vec<FactSlot>,
    compounds: Vec<Compound>,
    by_fingerprint: FxHashMap<u64, FactId>,
    by_op: FxHashMap<SymbolId, Vec<FactId>>,
    by_op_arg1: FxHashMap<(SymbolId, SymbolId), Vec<FactId>>,
    by_op_arg2: FxHashMap<(SymbolId, SymbolId), Vec<FactId>>,
    isa_categories: FxHashMap<SymbolId, Vec<(SymbolId, FactId)>>,
    by_args: FxHashMap<(SymbolId, SymbolId), Vec<(SymbolId, FactId)>>,
    implies_edges: FxHashMap<u64, Vec<(u64, FactId)>>,
    asserted_fingerprints: FxHashSet<u64>,
    aliases: AliasTable,
    rules: TheoryRules,
    stats: Stats,
}

enum AppliedOp {
    Assert(FactId),
    Retract(FactId),
}

/// A staged sequence of asserts/retracts applied to the store immediately
/// (so later statements in the same transaction see earlier ones), but
/// undone on [`Tx::abort`] or on drop without [`Tx::commit`] — giving
/// `learn` its atomic all-or-nothing semantics without a separate shadow
/// copy of every index.
pub struct Tx<'a> {
    store: &'a mut FactStore,
    applied: Vec<AppliedOp>,
    committed: bool,
}

impl<'a> Tx<'a> {
    pub fn assert(&mut self, candidate: CandidateFact) -> Result<FactId, StoreError> {
        match candidate.expr {
            Expr::Atom(triple) => self.assert_triple(triple, candidate.polarity),
            compound_expr => self.assert_compound(compound_expr, candidate.polarity),
        }
    }

    fn assert_triple(&mut self, triple: Triple, polarity: Polarity) -> Result<FactId, StoreError> {
        let triple = self.store.canonical_triple(triple);
        let fp = fingerprint(triple.operator, triple.arg1, triple.arg2, polarity);

        if let Some(&existing_id) = self.store.by_fingerprint.get(&fp) {
            if self.store.fact(existing_id).is_some() {
                self.store.stats.duplicates_skipped += 1;
                return Ok(existing_id);
            }
        }

        let candidate_fact = Fact {
            id: FactId(self.store.facts.len() as u32),
            triple,
            polarity,
            fingerprint: fp,
        };

        let same_args_opposite = self.store.find_opposite(&triple, polarity).copied();

        // Mutual exclusion generalizes to any relation `R`: whatever values
        // `subject` already holds under `triple.operator` are candidates for
        // a `mutuallyExclusive` clash with the new value.
        let (new_category, existing_categories): (Option<SymbolId>, Vec<(SymbolId, FactId)>) =
            match (triple.arg1, triple.arg2) {
                (Arg::Symbol(subject), Arg::Symbol(value)) => {
                    let existing = self
                        .store
                        .by_operator_arg1(triple.operator, subject)
                        .filter_map(|f| match f.triple.arg2 {
                            Arg::Symbol(other_value) => Some((other_value, f.id)),
                            Arg::Compound(_) => None,
                        })
                        .collect();
                    (Some(value), existing)
                }
                _ => (None, Vec::new()),
            };

        let existing_same_args: Vec<(SymbolId, FactId)> = match (triple.arg1, triple.arg2) {
            (Arg::Symbol(a1), Arg::Symbol(a2)) => self
                .store
                .facts_with_args(a1, a2)
                .iter()
                .filter(|(op, _)| *op != triple.operator)
                .copied()
                .collect(),
            _ => Vec::new(),
        };

        self.store
            .contradiction
            .check(
                &candidate_fact,
                same_args_opposite.as_ref(),
                new_category,
                &existing_categories,
                &existing_same_args,
                &self.store.implies_edges,
                &self.store.asserted_fingerprints,
                &self.store.rules,
            )
            .map_err(StoreError::Contradiction)?;

        let id = self.apply_assert(candidate_fact);
        Ok(id)
    }

    fn assert_compound(&mut self, expr: Expr, polarity: Polarity) -> Result<FactId, StoreError> {
        let operator = self.store.connective_operator(&expr);
        let signed_children = if let Expr::Implies(ante, cons) = &expr {
            let ante_signed = FactStore::as_signed_atom(ante);
            let cons_signed = FactStore::as_signed_atom(cons);
            Some((ante_signed, cons_signed))
        } else {
            None
        };

        let compound_id = CompoundId(self.store.compounds.len() as u32);
        self.store.compounds.push(Compound { expr });

        let triple = Triple::new(operator, Arg::Compound(compound_id), Arg::Symbol(self.store.empty_symbol));
        let id = self.assert_triple(triple, polarity)?;

        if polarity == Polarity::Positive {
            if let Some((Some((at, ap)), Some((ct, cp)))) = signed_children {
                let ante_fp = fingerprint(at.operator, at.arg1, at.arg2, ap);
                let cons_fp = fingerprint(ct.operator, ct.arg1, ct.arg2, cp);
                self.store.implies_edges.entry(ante_fp).or_default().push((cons_fp, id));
            }
        }

        Ok(id)
    }

    fn apply_assert(&mut self, fact: Fact) -> FactId {
        let id = fact.id;
        let Triple { operator, arg1, arg2 } = fact.triple;

        self.store.facts.push(FactSlot { fact, retracted: false });
        self.store.by_fingerprint.insert(fact.fingerprint, id);
        self.store.asserted_fingerprints.insert(fact.fingerprint);
        self.store.by_op.entry(operator).or_default().push(id);
        if let Arg::Symbol(a1) = arg1 {
            self.store.by_op_arg1.entry((operator, a1)).or_default().push(id);
        }
        if let Arg::Symbol(a2) = arg2 {
            self.store.by_op_arg2.entry((operator, a2)).or_default().push(id);
        }
        if let (Arg::Symbol(a1), Arg::Symbol(a2)) = (arg1, arg2) {
            self.store.by_args.entry((a1, a2)).or_default().push((operator, id));
        }
        if operator == self.store.isa_operator && fact.polarity == Polarity::Positive {
            if let (Arg::Symbol(subject), Arg::Symbol(category)) = (arg1, arg2) {
                self.store.isa_categories.entry(subject).or_default().push((category, id));
            }
        }

        self.store.stats.facts_asserted += 1;
        self.applied.push(AppliedOp::Assert(id));
        id
    }

    pub fn retract(&mut self, id: FactId) -> Result<(), StoreError> {
        let slot = self.store.facts.get_mut(id.index()).ok_or(StoreError::UnknownFact(id))?;
        if slot.retracted {
            return Err(StoreError::AlreadyRetracted(id));
        }
        slot.retracted = true;
        let fp = slot.fact.fingerprint;
        self.store.asserted_fingerprints.remove(&fp);
        self.store.stats.facts_retracted += 1;
        self.applied.push(AppliedOp::Retract(id));
        Ok(())
    }

    /// Finalizes the transaction; everything staged so far stays applied.
    pub fn commit(mut self) -> CommitSummary {
        self.committed = true;
        let mut summary = CommitSummary::default();
        for op in &self.applied {
            match op {
                AppliedOp::Assert(_) => summary.asserted += 1,
                AppliedOp::Retract(_) => summary.retracted += 1,
            }
        }
        summary.deduplicated = 0;
        summary
    }

    /// Undoes every assert/retract staged so far, in reverse order.
    pub fn abort(mut self) {
        self.unwind();
        self.committed = true; // suppress the Drop-triggered second unwind
    }

    fn unwind(&mut self) {
        while let Some(op) = self.applied.pop() {
            match op {
                AppliedOp::Assert(id) => {
                    debug_assert_eq!(id.index(), self.store.facts.len() - 1, "asserts must unwind LIFO");
                    let slot = self.store.facts.pop().expect("asserted fact must exist");
                    let fp = slot.fact.fingerprint;
                    self.store.by_fingerprint.remove(&fp);
                    self.store.asserted_fingerprints.remove(&fp);
                    let Triple { operator, arg1, arg2 } = slot.fact.triple;
                    pop_if_last(&mut self.store.by_op, operator, id);
                    if let Arg::Symbol(a1) = arg1 {
                        pop_if_last(&mut self.store.by_op_arg1, (operator, a1), id);
                    }
                    if let Arg::Symbol(a2) = arg2 {
                        pop_if_last(&mut self.store.by_op_arg2, (operator, a2), id);
                    }
                    if let (Arg::Symbol(a1), Arg::Symbol(a2)) = (arg1, arg2) {
                        if let Some(v) = self.store.by_args.get_mut(&(a1, a2)) {
                            if v.last().map(|(_, last_id)| *last_id) == Some(id) {
                                v.pop();
                            }
                        }
                    }
                    if operator == self.store.isa_operator && slot.fact.polarity == Polarity::Positive {
                        if let (Arg::Symbol(subject), Arg::Symbol(_)) = (arg1, arg2) {
                            if let Some(cats) = self.store.isa_categories.get_mut(&subject) {
                                cats.pop();
                            }
                        }
                    }
                    self.store.stats.facts_asserted -= 1;
                }
                AppliedOp::Retract(id) => {
                    let fp = self.store.facts.get_mut(id.index()).map(|slot| {
                        slot.retracted = false;
                        slot.fact.fingerprint
                    });
                    if let Some(fp) = fp {
                        self.store.asserted_fingerprints.insert(fp);
                    }
                    self.store.stats.facts_retracted -= 1;
                }
            }
        }
    }
}

fn pop_if_last<K: std::hash::Hash + Eq>(map: &mut FxHashMap<K, Vec<FactId>>, key: K, id: FactId) {
    if let Some(v) = map.get_mut(&key) {
        if v.last() == Some(&id) {
            v.pop();
        }
    }
}

impl<'a> Drop for Tx<'a> {
    fn drop(&mut self) {
        if !self.committed {
            self.unwind();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_hdc::HdcStrategyKind;

    fn store() -> FactStore {
        FactStore::new(Vocabulary::new(HdcStrategyKind::DenseBinary, 64), 4)
    }

    fn triple_fact(store: &mut FactStore, operator: &str, arg1: &str, arg2: &str) -> CandidateFact {
        let op = store.vocabulary_mut().get_or_create(operator);
        store.vocabulary_mut().mark_operator(op);
        let a1 = store.vocabulary_mut().get_or_create(arg1);
        let a2 = store.vocabulary_mut().get_or_create(arg2);
        CandidateFact::triple(op, Arg::Symbol(a1), Arg::Symbol(a2), Polarity::Positive)
    }

    #[test]
    fn assert_and_commit_is_visible() {
        let mut s = store();
        let candidate = triple_fact(&mut s, "isA", "Fido", "Dog");
        let mut tx = s.begin();
        let id = tx.assert(candidate).unwrap();
        tx.commit();
        assert!(s.fact(id).is_some());
        assert_eq!(s.stats().facts_asserted, 1);
    }

    #[test]
    fn duplicate_assert_is_idempotent() {
        let mut s = store();
        let c1 = triple_fact(&mut s, "isA", "Fido", "Dog");
        let c2 = triple_fact(&mut s, "isA", "Fido", "Dog");
        let mut tx = s.begin();
        let id1 = tx.assert(c1).unwrap();
        let id2 = tx.assert(c2).unwrap();
        tx.commit();
        assert_eq!(id1, id2);
        assert_eq!(s.stats().facts_asserted, 1);
    }

    #[test]
    fn direct_negation_is_rejected_and_atomic() {
        let mut s = store();
        let positive = triple_fact(&mut s, "isA", "Fido", "Dog");
        let op = s.vocabulary().lookup("isA").unwrap();
        let fido = s.vocabulary().lookup("Fido").unwrap();
        let dog = s.vocabulary().lookup("Dog").unwrap();
        let negated = CandidateFact::triple(op, Arg::Symbol(fido), Arg::Symbol(dog), Polarity::Negative);

        let mut tx = s.begin();
        tx.assert(positive).unwrap();
        let result = tx.assert(negated);
        assert!(result.is_err());
        tx.abort();
        // Nothing committed at all, including the first (valid) statement.
        assert_eq!(s.stats().facts_asserted, 0);
        assert_eq!(s.facts().count(), 0);
    }

    #[test]
    fn retract_then_reassert_is_allowed() {
        let mut s = store();
        let c1 = triple_fact(&mut s, "isA", "Fido", "Dog");
        let mut tx = s.begin();
        let id = tx.assert(c1).unwrap();
        tx.commit();

        let mut tx2 = s.begin();
        tx2.retract(id).unwrap();
        tx2.commit();
        assert!(s.fact(id).is_none());

        let c2 = triple_fact(&mut s, "isA", "Fido", "Dog");
        let mut tx3 = s.begin();
        let id2 = tx3.assert(c2).unwrap();
        tx3.commit();
        assert!(s.fact(id2).is_some());
    }

    #[test]
    fn mutual_exclusion_rejects_and_rolls_back_whole_tx() {
        let mut s = store();
        let dog = s.vocabulary_mut().get_or_create("Dog");
        let cat = s.vocabulary_mut().get_or_create("Cat");
        let isa = s.vocabulary_mut().get_or_create("isA");
        s.vocabulary_mut().mark_operator(isa);
        s.rules_mut().add_mutually_exclusive(isa, dog, cat);
        let c1 = triple_fact(&mut s, "isA", "Fido", "Dog");
        let c2 = triple_fact(&mut s, "isA", "Fido", "Cat");

        let mut tx = s.begin();
        tx.assert(c1).unwrap();
        let result = tx.assert(c2);
        assert!(result.is_err());
        tx.abort();
        assert_eq!(s.facts().count(), 0);
    }

    #[test]
    fn implies_wires_fast_path_edge_for_inherited_contradiction() {
        let mut s = store();
        let isa = s.vocabulary_mut().get_or_create("isA");
        s.vocabulary_mut().mark_operator(isa);
        let fido = s.vocabulary_mut().get_or_create("Fido");
        let dog = s.vocabulary_mut().get_or_create("Dog");
        let mammal = s.vocabulary_mut().get_or_create("Mammal");

        let antecedent = Expr::Atom(Triple::new(isa, Arg::Symbol(fido), Arg::Symbol(dog)));
        let consequent = Expr::Not(Box::new(Expr::Atom(Triple::new(isa, Arg::Symbol(fido), Arg::Symbol(mammal)))));
        let rule = Expr::Implies(Box::new(antecedent), Box::new(consequent));

        let mut tx = s.begin();
        tx.assert(CandidateFact::triple(isa, Arg::Symbol(fido), Arg::Symbol(dog), Polarity::Positive)).unwrap();
        tx.assert(CandidateFact::compound(rule, Polarity::Positive)).unwrap();
        let contradiction = tx.assert(CandidateFact::triple(isa, Arg::Symbol(fido), Arg::Symbol(mammal), Polarity::Positive));
        assert!(contradiction.is_err());
        tx.abort();
        assert_eq!(s.facts().count(), 0);
    }

    #[test]
    fn dropping_an_uncommitted_tx_rolls_back() {
        let mut s = store();
        let c1 = triple_fact(&mut s, "isA", "Fido", "Dog");
        {
            let mut tx = s.begin();
            tx.assert(c1).unwrap();
            // tx dropped here without commit/abort
        }
        assert_eq!(s.facts().count(), 0);
    }

    #[test]
    fn restore_undoes_facts_aliases_and_rules_together() {
        let mut s = store();
        let c1 = triple_fact(&mut s, "isA", "Fido", "Dog");
        let mut tx = s.begin();
        tx.assert(c1).unwrap();
        tx.commit();

        let checkpoint = s.checkpoint();

        let rex = s.vocabulary_mut().get_or_create("Rex");
        let doggo = s.vocabulary_mut().get_or_create("Doggo");
        let cat = s.vocabulary_mut().get_or_create("Cat");
        let dog = s.vocabulary().lookup("Dog").unwrap();
        s.declare_alias(doggo, dog).unwrap();
        let isa = s.vocabulary().lookup("isA").unwrap();
        s.rules_mut().add_mutually_exclusive(isa, dog, cat);
        let mut tx2 = s.begin();
        tx2.assert(CandidateFact::triple(isa, Arg::Symbol(rex), Arg::Symbol(doggo), Polarity::Positive)).unwrap();
        tx2.commit();
        assert_eq!(s.facts().count(), 2);

        s.restore(checkpoint);

        assert_eq!(s.facts().count(), 1);
        assert_eq!(s.stats().facts_asserted, 1);
        // The alias is gone: `Doggo` no longer canonicalizes to `Dog`, so a
        // fresh `isA Rex Doggo` fact is distinct from `isA Rex Dog`.
        assert_eq!(s.canonicalize_triple(Triple::new(isa, Arg::Symbol(rex), Arg::Symbol(doggo))).arg2, Arg::Symbol(doggo));
        // The mutuallyExclusive rule is gone too: asserting both `Dog` and
        // `Cat` for Rex under `isA` no longer conflicts.
        let mut tx3 = s.begin();
        tx3.assert(CandidateFact::triple(isa, Arg::Symbol(rex), Arg::Symbol(dog), Polarity::Positive)).unwrap();
        let result = tx3.assert(CandidateFact::triple(isa, Arg::Symbol(rex), Arg::Symbol(cat), Polarity::Positive));
        assert!(result.is_ok());
        tx3.commit();
    }
}
