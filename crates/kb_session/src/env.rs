//! The `@name`/`$name` binding environment.
//!
//! Binding an `@name` to a statement records its `FactId` here. Later
//! statements — in the same `learn` call or a later one — can refer back
//! to it via `$name`. Names starting with a lowercase letter persist for
//! the lifetime of the session; names starting with anything else
//! (uppercase, digit, underscore) are ephemeral and cleared at the end of
//! the `learn` call that created them.

use kb_store::{FactId, SymbolId, Vocabulary};
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct BindingEnv {
    persistent: FxHashMap<String, FactId>,
    ephemeral: FxHashMap<String, FactId>,
}

impl BindingEnv {
    pub fn new() -> Self {
        Self::default()
    }

    fn persists(name: &str) -> bool {
        name.chars().next().is_some_and(|c| c.is_lowercase())
    }

    /// Records `name -> fact`, routing it to the persistent or ephemeral
    /// table per the lowercase/uppercase rule.
    pub fn bind(&mut self, name: &str, fact: FactId) {
        if Self::persists(name) {
            self.ephemeral.remove(name);
            self.persistent.insert(name.to_string(), fact);
        } else {
            self.persistent.remove(name);
            self.ephemeral.insert(name.to_string(), fact);
        }
    }

    /// Looks up a binding by its bare name (no `@`/`$` prefix).
    pub fn get(&self, name: &str) -> Option<FactId> {
        self.persistent.get(name).or_else(|| self.ephemeral.get(name)).copied()
    }

    /// Drops every ephemeral binding. Called once per `learn` call, after
    /// its transaction commits.
    pub fn clear_ephemeral(&mut self) {
        self.ephemeral.clear();
    }

    pub fn len(&self) -> usize {
        self.persistent.len() + self.ephemeral.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the `$name -> FactId` table that `kb_plan`'s action and
    /// literal resolution expect: one entry per currently-known binding,
    /// keyed by the `$`-prefixed reference symbol rather than the bare
    /// name. The parser interns `$name` tokens whole, so the reference
    /// symbol has to be interned the same way here to land on the same
    /// `SymbolId`.
    pub fn reference_map(&self, vocabulary: &mut Vocabulary) -> FxHashMap<SymbolId, FactId> {
        let mut map = FxHashMap::default();
        for (name, fact) in self.persistent.iter().chain(self.ephemeral.iter()) {
            let reference = vocabulary.get_or_create(&format!("${name}"));
            map.insert(reference, *fact);
        }
        map
    }
}
