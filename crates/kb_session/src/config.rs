//! Session configuration: the knobs a caller sets once at construction
//! time and that every subsequent `learn`/`prove`/`query` call reads.

use kb_hdc::HdcStrategyKind;
use kb_reason::ReasoningPriority;
use serde::{Deserialize, Serialize};

/// How deep the `Implies` fast-path graph is walked when checking for
/// inherited contradictions, and how far `isA`/`Implies` chains are
/// followed for ordinary inference. Not itself a documented config key,
/// but shared between the store and the proof builder.
const DEFAULT_MAX_IMPLIES_DEPTH: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Vector width passed to whichever HDC strategy is configured.
    /// Defaults to that strategy's own documented width when absent.
    pub geometry: Option<usize>,
    pub hdc_strategy: HdcStrategyKind,
    pub reasoning_priority: ReasoningPriority,
    pub max_reasoner_iterations: usize,
    pub proof_max_depth: usize,
    pub proof_validation_enabled: bool,
    /// Off by default: unproven ground atoms are "unknown", not "false".
    /// Diverges from `kb_reason::ReasonerConfig::default`'s `true` — that
    /// default suits a reasoner used standalone in its own tests, but a
    /// session speaks for the DSL's documented default.
    pub closed_world_assumption: bool,
    pub timeout_ms: Option<u64>,
    /// `usize::MAX` means unbounded, matching spec.md §6's documented
    /// `maxResults` default; a caller sets `QueryOptions::max_results` to
    /// cap an individual call instead.
    pub max_solutions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            geometry: None,
            hdc_strategy: HdcStrategyKind::DenseBinary,
            reasoning_priority: ReasoningPriority::Symbolic,
            max_reasoner_iterations: 1_000,
            proof_max_depth: 64,
            proof_validation_enabled: cfg!(test),
            closed_world_assumption: false,
            timeout_ms: None,
            max_solutions: usize::MAX,
        }
    }
}

impl SessionConfig {
    pub fn geometry(&self) -> usize {
        self.geometry.unwrap_or_else(|| self.hdc_strategy.default_geometry())
    }

    pub fn max_implies_depth(&self) -> usize {
        DEFAULT_MAX_IMPLIES_DEPTH
    }

    pub(crate) fn reasoner_config(&self) -> kb_reason::ReasonerConfig {
        kb_reason::ReasonerConfig {
            max_iterations: self.max_reasoner_iterations,
            reasoning_priority: self.reasoning_priority,
            closed_world_assumption: self.closed_world_assumption,
            timeout_ms: self.timeout_ms,
            max_solutions: self.max_solutions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_disables_closed_world_assumption() {
        let cfg = SessionConfig::default();
        assert!(!cfg.closed_world_assumption);
    }

    #[test]
    fn default_geometry_follows_strategy() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.geometry(), HdcStrategyKind::DenseBinary.default_geometry());
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = SessionConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.closed_world_assumption, cfg.closed_world_assumption);
        assert_eq!(back.hdc_strategy, cfg.hdc_strategy);
    }
}
