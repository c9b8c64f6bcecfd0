//! The output shape of parsing: a stream of [`ParsedStatement`] values,
//! each carrying its compiled triple/compound, an optional binding name,
//! source-line metadata, and — for `solve` blocks — the parsed parameter
//! map.

use kb_store::{Expr, Polarity, SymbolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveKind {
    Planning,
    Csp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue {
    Symbol(SymbolId),
    Int(i64),
}

#[derive(Debug, Clone)]
pub struct SolveParam {
    pub key: String,
    pub value: ParamValue,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct SolveBlock {
    pub kind: SolveKind,
    pub params: Vec<SolveParam>,
}

impl SolveBlock {
    /// All values recorded under `key`, in source order — `start`/`goal`
    /// may repeat.
    pub fn values(&self, key: &str) -> impl Iterator<Item = &ParamValue> {
        self.params.iter().filter(move |p| p.key == key).map(|p| &p.value)
    }

    /// The single value recorded under `key`, if any (last one wins if the
    /// key repeats — matches `key from value` being an assignment, not an
    /// accumulation, for singular parameters).
    pub fn value(&self, key: &str) -> Option<&ParamValue> {
        self.params.iter().rev().find(|p| p.key == key).map(|p| &p.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchArg {
    /// A bare variable in retract position: matches anything.
    Any,
    Exact(SymbolId),
}

#[derive(Debug, Clone)]
pub enum RetractTarget {
    Pattern { operator: SymbolId, arg1: MatchArg, arg2: MatchArg },
    /// `retract $name` — resolved to a fact id by the caller's binding
    /// environment, since the parser never sees fact ids.
    Reference(SymbolId),
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    Fact(Expr, Polarity),
    Alias(SymbolId, SymbolId),
    Synonym(SymbolId, SymbolId),
    Retract(RetractTarget),
    Load(String),
    Solve(SolveBlock),
    /// `mutuallyExclusive relation a b` — `relation(x, a)` and
    /// `relation(x, b)` can never coexist for the same `x`.
    MutuallyExclusive(SymbolId, SymbolId, SymbolId),
    /// `contradictsSameArgs r s` — `r(a, b)` and `s(a, b)` can never
    /// coexist, for any `a`, `b`.
    ContradictsSameArgs(SymbolId, SymbolId),
    /// `exception OP S O` (or `exception Not OP S O`) — exempts this exact
    /// signed triple's fingerprint from every contradiction check, an escape
    /// hatch for a fact a theory author knows is a deliberate exception to
    /// an otherwise-sound rule.
    Exception(Expr, Polarity),
}

#[derive(Debug, Clone)]
pub struct ParsedStatement {
    /// The `@name` this statement binds, without the leading `@`.
    pub binding: Option<String>,
    /// 1-based source line the statement started on.
    pub line: usize,
    pub kind: StatementKind,
}
