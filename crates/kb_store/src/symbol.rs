//! Symbol interning and classification.
//!
//! Each symbol owns a stable non-zero id, a [`SymbolKind`] tag, and one HDC
//! vector allocated lazily on first request. All other
//! components hold [`SymbolId`]s, never the [`Vocabulary`] itself.

use kb_base::Interner;
use kb_hdc::{HdcStrategy, HdcStrategyKind, HdcVector};

/// A stable handle to an interned symbol. Reuses [`kb_base::Symbol`]
/// directly — it's already exactly the kind of `Copy`, O(1)-comparable
/// integer handle the `Vocabulary` needs.
pub type SymbolId = kb_base::Symbol;

/// How a symbol is used. Determined lexically at first intern (`?` →
/// `Variable`, `$` → `Reference`), except `Operator`, which is a promotion
/// applied once a symbol is observed in a triple's operator position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Constant,
    Variable,
    Reference,
    Operator,
}

/// Classifies a name by lexical rule alone: `?` prefix is
/// always a variable, `$` prefix is always a reference. Anything else
/// starts out a constant; callers promote specific ids to `Operator` via
/// [`Vocabulary::mark_operator`] once they're seen in operator position.
pub fn classify_name(name: &str) -> SymbolKind {
    match name.as_bytes().first() {
        Some(b'?') => SymbolKind::Variable,
        Some(b'$') => SymbolKind::Reference,
        _ => SymbolKind::Constant,
    }
}

/// Interns symbol names, maps them to stable ids, and owns one HDC vector
/// per symbol, created lazily and cached forever (the vocabulary is
/// append-only during a session).
pub struct Vocabulary {
    interner: Interner,
    kinds: Vec<SymbolKind>,
    strategy: Box<dyn HdcStrategy>,
    vectors: Vec<Option<HdcVector>>,
}

impl Vocabulary {
    pub fn new(strategy_kind: HdcStrategyKind, geometry: usize) -> Self {
        let interner = Interner::new();
        // Interner reserves index 0 for the empty string; give it a kind slot too.
        Self {
            kinds: vec![SymbolKind::Constant; interner.len()],
            vectors: (0..interner.len()).map(|_| None).collect(),
            interner,
            strategy: strategy_kind.build(geometry),
        }
    }

    /// Interns `name`, creating a fresh symbol (classified lexically) if
    /// it hasn't been seen before. Repeated calls with the same name return
    /// the same id.
    pub fn get_or_create(&mut self, name: &str) -> SymbolId {
        if let Some(id) = self.interner.lookup(name) {
            return id;
        }
        let id = self.interner.intern(name);
        let kind = classify_name(name);
        debug_assert_eq!(id.index(), self.kinds.len());
        self.kinds.push(kind);
        self.vectors.push(None);
        id
    }

    /// Looks up an already-interned symbol without creating one.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.interner.lookup(name)
    }

    /// Resolves a symbol id back to its name.
    pub fn name_of(&self, id: SymbolId) -> &str {
        self.interner.resolve(id)
    }

    /// Returns the current classification of `id`.
    pub fn classify(&self, id: SymbolId) -> SymbolKind {
        self.kinds[id.index()]
    }

    /// Promotes a constant to `Operator` the first time it is used as a
    /// triple's operator. No-op if already an operator.
    ///
    /// # Panics
    ///
    /// Panics if `id` classifies as `Variable` or `Reference` — the DSL
    /// grammar never allows `?x`/`$x` in operator position, so observing
    /// one there is an internal logic error, not a data error.
    pub fn mark_operator(&mut self, id: SymbolId) {
        match self.kinds[id.index()] {
            SymbolKind::Operator | SymbolKind::Constant => {
                self.kinds[id.index()] = SymbolKind::Operator;
            }
            other => panic!("cannot mark {:?} symbol '{}' as an operator", other, self.name_of(id)),
        }
    }

    /// Returns `true` if `id` has been tagged as an operator.
    pub fn is_operator(&self, id: SymbolId) -> bool {
        matches!(self.kinds[id.index()], SymbolKind::Operator)
    }

    /// Returns (creating if necessary) the HDC vector for `id`.
    pub fn vector_of(&mut self, id: SymbolId) -> &HdcVector {
        let idx = id.index();
        if self.vectors[idx].is_none() {
            self.vectors[idx] = Some(self.strategy.symbol_vector(idx as u64));
        }
        self.vectors[idx].as_ref().unwrap()
    }

    /// Similarity between two symbols' HDC vectors, creating either vector
    /// lazily if needed. Used only for ranking ambiguous candidates — never
    /// for proof soundness.
    pub fn similarity(&mut self, a: SymbolId, b: SymbolId) -> f64 {
        // Vectors must be created before borrowing the strategy immutably
        // alongside them, so fetch both up front.
        let _ = self.vector_of(a);
        let _ = self.vector_of(b);
        let va = self.vectors[a.index()].clone().unwrap();
        let vb = self.vectors[b.index()].clone().unwrap();
        self.strategy.similarity(&va, &vb)
    }

    /// Total number of interned symbols (including the reserved empty
    /// string at index 0).
    pub fn len(&self) -> usize {
        self.interner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::new(HdcStrategyKind::DenseBinary, 64)
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let mut v = vocab();
        let a = v.get_or_create("Dog");
        let b = v.get_or_create("Dog");
        assert_eq!(a, b);
    }

    #[test]
    fn lexical_classification() {
        let mut v = vocab();
        let var = v.get_or_create("?x");
        let reference = v.get_or_create("$fido");
        let constant = v.get_or_create("Dog");
        assert_eq!(v.classify(var), SymbolKind::Variable);
        assert_eq!(v.classify(reference), SymbolKind::Reference);
        assert_eq!(v.classify(constant), SymbolKind::Constant);
    }

    #[test]
    fn mark_operator_promotes_constant() {
        let mut v = vocab();
        let op = v.get_or_create("isA");
        assert!(!v.is_operator(op));
        v.mark_operator(op);
        assert!(v.is_operator(op));
        // idempotent
        v.mark_operator(op);
        assert!(v.is_operator(op));
    }

    #[test]
    #[should_panic(expected = "cannot mark")]
    fn mark_operator_rejects_variable() {
        let mut v = vocab();
        let var = v.get_or_create("?x");
        v.mark_operator(var);
    }

    #[test]
    fn vector_of_is_stable_and_cached() {
        let mut v = vocab();
        let id = v.get_or_create("Dog");
        let first = v.vector_of(id).clone();
        let second = v.vector_of(id).clone();
        assert_eq!(first, second);
    }

    #[test]
    fn distinct_symbols_have_bounded_similarity() {
        let mut v = vocab();
        let a = v.get_or_create("Dog");
        let b = v.get_or_create("Cat");
        let sim = v.similarity(a, b);
        assert!((-1.0..=1.0).contains(&sim));
    }

    #[test]
    fn self_similarity_is_maximal() {
        let mut v = vocab();
        let a = v.get_or_create("Dog");
        assert!((v.similarity(a, a) - 1.0).abs() < 1e-9);
    }
}
