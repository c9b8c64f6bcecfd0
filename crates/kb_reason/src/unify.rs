//! Rank-and-point union-find over symbols, used to unify query variables
//! with the constants (or other variables) they're matched against.
//! Occurs-check is disabled: the reasoner only ever unifies flat
//! `(operator, arg1, arg2)` shapes, never nested terms, so a variable can
//! never occur inside its own binding in the first place.

use kb_store::{SymbolId, SymbolKind, Vocabulary};
use rustc_hash::FxHashMap;

#[derive(Debug, Default, Clone)]
pub struct Bindings {
    parent: FxHashMap<SymbolId, SymbolId>,
    rank: FxHashMap<SymbolId, u32>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the representative of `x`'s equivalence class, compressing
    /// the path as it goes.
    pub fn find(&mut self, x: SymbolId) -> SymbolId {
        let parent = match self.parent.get(&x) {
            Some(&p) if p != x => p,
            _ => return x,
        };
        let root = self.find(parent);
        self.parent.insert(x, root);
        root
    }

    /// Reads the representative without mutating (for use through a
    /// shared reference, e.g. when reporting a finished binding set).
    pub fn find_readonly(&self, x: SymbolId) -> SymbolId {
        let mut current = x;
        loop {
            match self.parent.get(&current) {
                Some(&p) if p != current => current = p,
                _ => return current,
            }
        }
    }

    /// Unifies `a` and `b`. Returns `false` if both resolve to distinct
    /// non-variable symbols (two different constants can never unify).
    /// A variable root always yields to a non-variable root so bindings
    /// resolve to ground values whenever possible.
    pub fn unify(&mut self, a: SymbolId, b: SymbolId, vocabulary: &Vocabulary) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return true;
        }
        let a_is_var = vocabulary.classify(ra) == SymbolKind::Variable;
        let b_is_var = vocabulary.classify(rb) == SymbolKind::Variable;

        match (a_is_var, b_is_var) {
            (false, false) => false,
            (false, true) => {
                self.parent.insert(rb, ra);
                true
            }
            (true, false) => {
                self.parent.insert(ra, rb);
                true
            }
            (true, true) => {
                let rank_a = *self.rank.get(&ra).unwrap_or(&0);
                let rank_b = *self.rank.get(&rb).unwrap_or(&0);
                if rank_a < rank_b {
                    self.parent.insert(ra, rb);
                } else if rank_a > rank_b {
                    self.parent.insert(rb, ra);
                } else {
                    self.parent.insert(rb, ra);
                    self.rank.insert(ra, rank_a + 1);
                }
                true
            }
        }
    }
}
