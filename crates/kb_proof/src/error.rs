use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofError {
    /// The derivation nests deeper than `proofMaxDepth` allows.
    DepthExceeded,
    /// The same fact appears twice along one derivation path.
    CycleDetected,
}

impl fmt::Display for ProofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofError::DepthExceeded => write!(f, "proof exceeds the configured maximum depth"),
            ProofError::CycleDetected => write!(f, "proof contains a cyclic step"),
        }
    }
}

impl std::error::Error for ProofError {}
