use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonError {
    /// The search explored more steps than `maxReasonerIterations` allows.
    IterationBudgetExceeded,
    /// The search ran longer than the configured `timeoutMs`.
    Timeout,
}

impl fmt::Display for ReasonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasonError::IterationBudgetExceeded => write!(f, "reasoner iteration budget exceeded"),
            ReasonError::Timeout => write!(f, "reasoner timed out"),
        }
    }
}

impl std::error::Error for ReasonError {}

/// Counters a session surfaces through its own `stats()` call, accumulated
/// across every `prove`/`query` the reasoner has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReasonerStats {
    /// One per `tick()` — every candidate-fact or search-frontier step the
    /// reasoner examined.
    pub kb_scans: usize,
    /// One per `Vocabulary::similarity` call made to rank tied `isA`
    /// categories under holographic-priority reasoning.
    pub similarity_checks: usize,
    /// One per antecedent that fully resolved under modus ponens.
    pub rule_firings: usize,
    /// One per `unify_arg` call, successful or not.
    pub unification_attempts: usize,
}

/// Tracks how much search the reasoner has spent on one `prove`/`query`
/// call: a hard cap on recursive steps, and an optional wall-clock
/// deadline.
#[derive(Debug)]
pub struct Budget {
    used: usize,
    max: usize,
    deadline: Option<std::time::Instant>,
    stats: ReasonerStats,
}

impl Budget {
    pub fn new(max_iterations: usize, timeout_ms: Option<u64>) -> Self {
        Self {
            used: 0,
            max: max_iterations,
            deadline: timeout_ms.map(|ms| std::time::Instant::now() + std::time::Duration::from_millis(ms)),
            stats: ReasonerStats::default(),
        }
    }

    /// Charges one unit of search to the budget. Call this at the top of
    /// every recursive step in the reasoner.
    pub fn tick(&mut self) -> Result<(), ReasonError> {
        self.used += 1;
        self.stats.kb_scans += 1;
        if self.used > self.max {
            return Err(ReasonError::IterationBudgetExceeded);
        }
        if let Some(deadline) = self.deadline {
            if std::time::Instant::now() >= deadline {
                return Err(ReasonError::Timeout);
            }
        }
        Ok(())
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub(crate) fn note_unification_attempt(&mut self) {
        self.stats.unification_attempts += 1;
    }

    pub(crate) fn note_rule_firing(&mut self) {
        self.stats.rule_firings += 1;
    }

    pub(crate) fn note_similarity_check(&mut self) {
        self.stats.similarity_checks += 1;
    }

    pub fn stats(&self) -> ReasonerStats {
        self.stats
    }
}
