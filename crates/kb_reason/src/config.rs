//! Reasoner tuning knobs, normally set from a session's configuration
//! rather than constructed directly.

/// When two rule paths tie on an inheritance or disambiguation decision,
/// which tiebreak wins: the deterministic symbolic order, or the
/// HDC-ranked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ReasoningPriority {
    /// Ties break on ascending fact id — fully deterministic, ignores HDC.
    #[serde(rename = "symbolicPriority")]
    Symbolic,
    /// Ties break on HDC similarity between the query subject and each
    /// candidate category/object, highest similarity first.
    #[serde(rename = "holographicPriority")]
    Holographic,
}

#[derive(Debug, Clone)]
pub struct ReasonerConfig {
    pub max_iterations: usize,
    pub reasoning_priority: ReasoningPriority,
    pub closed_world_assumption: bool,
    pub timeout_ms: Option<u64>,
    /// Upper bound on how many distinct solutions `query` enumerates.
    /// `usize::MAX` reads as "unbounded" — spec.md's documented default —
    /// with enumeration still practically bounded by `max_iterations`.
    pub max_solutions: usize,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1_000,
            reasoning_priority: ReasoningPriority::Symbolic,
            closed_world_assumption: true,
            timeout_ms: None,
            max_solutions: usize::MAX,
        }
    }
}
