//! `alias`/`synonym` canonicalizing rewrites.
//!
//! Both directives install a rewrite from one symbol onto another; the
//! `FactStore` looks symbols up through [`AliasTable::canonicalize`] before
//! every index operation. Internally this is a union-find over symbol ids:
//! inserting always points a fully-resolved root at another fully-resolved
//! root, so the table can never contain a cycle by construction — we still
//! guard against one explicitly (bounded resolution) so a bug elsewhere
//! fails loudly instead of looping.

use crate::symbol::SymbolId;
use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    /// `alias X Y` — `X` always canonicalizes to `Y`.
    Alias,
    /// `synonym X Y` — bidirectional; the lower-indexed symbol wins as the
    /// canonical representative, deterministically.
    Synonym,
}

#[derive(Debug, Clone)]
pub enum AliasError {
    /// Resolving `symbol` required more hops than there are symbols in the
    /// vocabulary — the table must contain a cycle.
    Cyclic { symbol: SymbolId },
}

impl fmt::Display for AliasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasError::Cyclic { symbol } => {
                write!(f, "alias cycle detected resolving symbol id {}", symbol.index())
            }
        }
    }
}

impl std::error::Error for AliasError {}

/// Union-find of canonicalizing rewrites.
#[derive(Debug, Default, Clone)]
pub struct AliasTable {
    parent: FxHashMap<SymbolId, SymbolId>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follows the rewrite chain from `id` to its canonical representative.
    /// Idempotent: `canonicalize(canonicalize(x)) == canonicalize(x)`.
    pub fn canonicalize(&self, id: SymbolId) -> Result<SymbolId, AliasError> {
        let mut current = id;
        let bound = self.parent.len() + 1;
        for _ in 0..bound {
            match self.parent.get(&current) {
                Some(&next) if next == current => return Ok(current),
                Some(&next) => current = next,
                None => return Ok(current),
            }
        }
        Err(AliasError::Cyclic { symbol: id })
    }

    /// Installs `alias x y`: `x` canonicalizes to `y` (and transitively,
    /// anything that already canonicalized to `x` now canonicalizes to
    /// `y`'s root).
    pub fn alias(&mut self, x: SymbolId, y: SymbolId) -> Result<(), AliasError> {
        self.install(x, y, AliasKind::Alias)
    }

    /// Installs `synonym x y`: bidirectional. The lower symbol id of the
    /// two resolved roots becomes the canonical representative.
    pub fn synonym(&mut self, x: SymbolId, y: SymbolId) -> Result<(), AliasError> {
        self.install(x, y, AliasKind::Synonym)
    }

    fn install(&mut self, x: SymbolId, y: SymbolId, kind: AliasKind) -> Result<(), AliasError> {
        let root_x = self.canonicalize(x)?;
        let root_y = self.canonicalize(y)?;
        if root_x == root_y {
            return Ok(());
        }
        let (from, to) = match kind {
            AliasKind::Alias => (root_x, root_y),
            AliasKind::Synonym => {
                if root_x.index() <= root_y.index() {
                    (root_y, root_x)
                } else {
                    (root_x, root_y)
                }
            }
        };
        self.parent.insert(from, to);
        // Defensive re-check: confirm the edge we just added didn't somehow
        // close a cycle (it can't, by construction, but fail loudly if it did).
        self.canonicalize(from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_base::Interner;

    fn ids(n: u32) -> Vec<SymbolId> {
        let mut interner = Interner::new();
        (0..n).map(|i| interner.intern(&format!("s{i}"))).collect()
    }

    #[test]
    fn unaliased_symbol_canonicalizes_to_itself() {
        let t = AliasTable::new();
        let s = ids(1);
        assert_eq!(t.canonicalize(s[0]).unwrap(), s[0]);
    }

    #[test]
    fn alias_rewrites_to_target() {
        let s = ids(2);
        let mut t = AliasTable::new();
        t.alias(s[0], s[1]).unwrap();
        assert_eq!(t.canonicalize(s[0]).unwrap(), s[1]);
    }

    #[test]
    fn alias_is_transitive() {
        let s = ids(3);
        let mut t = AliasTable::new();
        t.alias(s[0], s[1]).unwrap();
        t.alias(s[1], s[2]).unwrap();
        assert_eq!(t.canonicalize(s[0]).unwrap(), s[2]);
    }

    #[test]
    fn synonym_is_bidirectional() {
        let s = ids(2);
        let mut t = AliasTable::new();
        t.synonym(s[0], s[1]).unwrap();
        assert_eq!(t.canonicalize(s[0]).unwrap(), t.canonicalize(s[1]).unwrap());
    }

    #[test]
    fn reinstalling_the_same_alias_is_a_no_op() {
        let s = ids(2);
        let mut t = AliasTable::new();
        t.alias(s[0], s[1]).unwrap();
        t.alias(s[0], s[1]).unwrap();
        assert_eq!(t.canonicalize(s[0]).unwrap(), s[1]);
    }

    #[test]
    fn closing_a_cycle_through_synonym_merges_without_error() {
        let s = ids(2);
        let mut t = AliasTable::new();
        t.alias(s[0], s[1]).unwrap();
        // s[1] -> s[0] would cycle as a plain alias; as a synonym it just
        // confirms the merge (both already resolve to the same root).
        t.synonym(s[1], s[0]).unwrap();
        assert_eq!(t.canonicalize(s[0]).unwrap(), t.canonicalize(s[1]).unwrap());
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let s = ids(3);
        let mut t = AliasTable::new();
        t.alias(s[0], s[1]).unwrap();
        t.alias(s[1], s[2]).unwrap();
        let once = t.canonicalize(s[0]).unwrap();
        let twice = t.canonicalize(once).unwrap();
        assert_eq!(once, twice);
    }
}
