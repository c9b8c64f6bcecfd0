//! A planner state is just the set of literals currently true. States are
//! deduplicated during search by a canonical hash over their sorted
//! fingerprints, so two states built in a different order but containing
//! the same literals collapse to one BFS node.

use kb_store::{fingerprint, Polarity, Triple};
use rustc_hash::FxHashSet;

pub type State = FxHashSet<Triple>;

/// Folds the sorted per-literal fingerprints of a state into one hash.
/// Sorting first makes the result independent of the set's iteration
/// order, which `FxHashSet` doesn't otherwise guarantee.
pub fn canonical_hash(state: &State) -> u64 {
    let mut prints: Vec<u64> = state
        .iter()
        .map(|t| fingerprint(t.operator, t.arg1, t.arg2, Polarity::Positive))
        .collect();
    prints.sort_unstable();

    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut h = OFFSET;
    for p in prints {
        for b in p.to_le_bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(PRIME);
        }
    }
    h
}

pub fn subsumes(state: &State, literals: &[Triple]) -> bool {
    literals.iter().all(|l| state.contains(l))
}

pub fn location_of(state: &State, location_op: kb_store::SymbolId, actor: kb_store::SymbolId) -> Option<kb_store::SymbolId> {
    use kb_store::Arg;
    state.iter().find_map(|t| {
        if t.operator == location_op {
            if let (Arg::Symbol(a), Arg::Symbol(loc)) = (t.arg1, t.arg2) {
                if a == actor {
                    return Some(loc);
                }
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_base::Interner;
    use kb_store::Arg;

    #[test]
    fn canonical_hash_is_order_independent() {
        let mut i = Interner::new();
        let op = i.intern("isAt");
        let a = i.intern("Farmer");
        let b = i.intern("Bank1");
        let c = i.intern("Wolf");
        let d = i.intern("Bank2");
        let t1 = Triple::new(op, Arg::Symbol(a), Arg::Symbol(b));
        let t2 = Triple::new(op, Arg::Symbol(c), Arg::Symbol(d));

        let mut s1: State = FxHashSet::default();
        s1.insert(t1);
        s1.insert(t2);
        let mut s2: State = FxHashSet::default();
        s2.insert(t2);
        s2.insert(t1);

        assert_eq!(canonical_hash(&s1), canonical_hash(&s2));
    }
}
