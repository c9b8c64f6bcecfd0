//! The [`HdcStrategy`] contract shared by all three vector algebras.

use std::fmt;

/// A vector produced by one of the three HDC strategies.
///
/// Each strategy only ever reads/writes its own variant. Passing a
/// [`HdcVector`] produced by one strategy to a different strategy's
/// `bind`/`unbind`/`bundle`/`similarity` is a programmer error (the
/// `Vocabulary` in `kb-store` owns exactly one strategy for the lifetime of
/// a session and never mixes variants) and panics rather than silently
/// producing nonsense.
#[derive(Debug, Clone, PartialEq)]
pub enum HdcVector {
    /// Dense bipolar vector, one `i8` per dimension, values in `{-1, 1}`.
    Dense(Vec<i8>),
    /// Sparse polynomial coefficients over a fixed modulus.
    Sparse(Vec<i64>),
    /// Dense real-valued vector.
    Affine(Vec<f32>),
}

impl HdcVector {
    fn kind_name(&self) -> &'static str {
        match self {
            HdcVector::Dense(_) => "dense-binary",
            HdcVector::Sparse(_) => "sparse-polynomial",
            HdcVector::Affine(_) => "metric-affine",
        }
    }
}

/// Which strategy a session is configured to use — the `hdcStrategy`
/// configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HdcStrategyKind {
    DenseBinary,
    SparsePolynomial,
    MetricAffine,
}

impl HdcStrategyKind {
    /// The documented default vector width for this strategy.
    pub fn default_geometry(self) -> usize {
        match self {
            HdcStrategyKind::DenseBinary => 2048,
            HdcStrategyKind::SparsePolynomial => 4,
            HdcStrategyKind::MetricAffine => 32,
        }
    }

    /// Constructs the corresponding strategy at the given geometry.
    pub fn build(self, geometry: usize) -> Box<dyn HdcStrategy> {
        match self {
            HdcStrategyKind::DenseBinary => Box::new(super::DenseBinaryStrategy::new(geometry)),
            HdcStrategyKind::SparsePolynomial => {
                Box::new(super::SparsePolynomialStrategy::new(geometry))
            }
            HdcStrategyKind::MetricAffine => Box::new(super::MetricAffineStrategy::new(geometry)),
        }
    }
}

/// Panics with a message naming both the expected and actual variant.
pub(crate) fn expect_kind<'a>(v: &'a HdcVector, expected: &'static str) -> &'a HdcVector {
    if v.kind_name() != expected {
        panic!(
            "HdcStrategy mismatch: expected a {} vector, got {}",
            expected,
            v.kind_name()
        );
    }
    v
}

/// Pluggable vector algebra over [`HdcVector`]s.
///
/// Implementations must satisfy, within a strategy-specific similarity
/// band:
///
/// - `unbind(bind(a, b), a) ≈ b`
/// - `bundle` is commutative and each input stays highly similar to the
///   bundle.
/// - `similarity` is symmetric and returns a value in `[-1, 1]`, never
///   `NaN`.
/// - `symbol_vector` is a pure deterministic function of `id` — same `id`,
///   same strategy, same vector, on every run and every platform.
pub trait HdcStrategy: fmt::Debug {
    /// Vector width in this strategy's native unit (bits, coefficients, or
    /// reals).
    fn dim(&self) -> usize;

    /// Deterministically derives the vector for a symbol id.
    fn symbol_vector(&self, id: u64) -> HdcVector;

    /// Binds two vectors into a composite that is dissimilar to either
    /// input (role/filler binding).
    fn bind(&self, a: &HdcVector, b: &HdcVector) -> HdcVector;

    /// Approximately inverts `bind`: `unbind(bind(a, b), a) ≈ b`.
    fn unbind(&self, a: &HdcVector, b: &HdcVector) -> HdcVector;

    /// Commutatively bundles a set of vectors; similar to each input.
    fn bundle(&self, vs: &[HdcVector]) -> HdcVector;

    /// Symmetric similarity in `[-1, 1]`. Never `NaN`.
    fn similarity(&self, a: &HdcVector, b: &HdcVector) -> f64;
}
