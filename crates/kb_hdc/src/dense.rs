//! Dense bipolar binary-spatter-code strategy.

use crate::strategy::{expect_kind, HdcStrategy, HdcVector};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

/// Dense bipolar `{-1, +1}` vectors, bound by elementwise multiplication.
///
/// Because every component is its own multiplicative inverse
/// (`(-1)*(-1) == 1`, `1*1 == 1`), binding is self-inverse:
/// `unbind(bind(a, b), a) == b` exactly, not just approximately.
#[derive(Debug, Clone)]
pub struct DenseBinaryStrategy {
    dim: usize,
}

impl DenseBinaryStrategy {
    /// Default width is 2048 bits for the `dense-binary` geometry.
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl Default for DenseBinaryStrategy {
    fn default() -> Self {
        Self::new(2048)
    }
}

fn as_dense(v: &HdcVector) -> &[i8] {
    match expect_kind(v, "dense-binary") {
        HdcVector::Dense(bits) => bits,
        _ => unreachable!(),
    }
}

impl HdcStrategy for DenseBinaryStrategy {
    fn dim(&self) -> usize {
        self.dim
    }

    fn symbol_vector(&self, id: u64) -> HdcVector {
        let mut rng = StdRng::seed_from_u64(id);
        let bits = (0..self.dim)
            .map(|_| if rng.gen_bool(0.5) { 1i8 } else { -1i8 })
            .collect();
        HdcVector::Dense(bits)
    }

    fn bind(&self, a: &HdcVector, b: &HdcVector) -> HdcVector {
        let (a, b) = (as_dense(a), as_dense(b));
        HdcVector::Dense(a.iter().zip(b).map(|(x, y)| x * y).collect())
    }

    fn unbind(&self, a: &HdcVector, b: &HdcVector) -> HdcVector {
        // Self-inverse: unbind is the same operation as bind.
        self.bind(a, b)
    }

    fn bundle(&self, vs: &[HdcVector]) -> HdcVector {
        if vs.is_empty() {
            return HdcVector::Dense(vec![1i8; self.dim]);
        }
        let vecs: Vec<&[i8]> = vs.iter().map(as_dense).collect();
        let bits = (0..self.dim)
            .map(|i| {
                let sum: i32 = vecs.iter().map(|v| v[i] as i32).sum();
                // Ties (sum == 0) resolve to +1, a fixed deterministic choice.
                if sum >= 0 {
                    1i8
                } else {
                    -1i8
                }
            })
            .collect();
        HdcVector::Dense(bits)
    }

    fn similarity(&self, a: &HdcVector, b: &HdcVector) -> f64 {
        let (a, b) = (as_dense(a), as_dense(b));
        if a.is_empty() {
            return 0.0;
        }
        let dot: i64 = a.iter().zip(b).map(|(x, y)| (*x as i64) * (*y as i64)).sum();
        (dot as f64 / a.len() as f64).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_vector_is_deterministic() {
        let s = DenseBinaryStrategy::new(256);
        assert_eq!(s.symbol_vector(7), s.symbol_vector(7));
    }

    #[test]
    fn different_ids_usually_differ() {
        let s = DenseBinaryStrategy::new(256);
        assert_ne!(s.symbol_vector(1), s.symbol_vector(2));
    }

    #[test]
    fn self_similarity_is_one() {
        let s = DenseBinaryStrategy::new(256);
        let v = s.symbol_vector(42);
        assert!((s.similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bind_then_unbind_recovers_operand() {
        let s = DenseBinaryStrategy::new(512);
        let a = s.symbol_vector(1);
        let b = s.symbol_vector(2);
        let bound = s.bind(&a, &b);
        let recovered = s.unbind(&bound, &a);
        assert_eq!(recovered, b);
    }

    #[test]
    fn similarity_is_symmetric() {
        let s = DenseBinaryStrategy::new(256);
        let a = s.symbol_vector(3);
        let b = s.symbol_vector(4);
        assert_eq!(s.similarity(&a, &b), s.similarity(&b, &a));
    }

    #[test]
    fn bundle_is_commutative() {
        let s = DenseBinaryStrategy::new(256);
        let a = s.symbol_vector(10);
        let b = s.symbol_vector(20);
        assert_eq!(s.bundle(&[a.clone(), b.clone()]), s.bundle(&[b, a]));
    }

    #[test]
    fn bundle_stays_similar_to_inputs() {
        let s = DenseBinaryStrategy::new(1024);
        let a = s.symbol_vector(1);
        let b = s.symbol_vector(2);
        let bundled = s.bundle(&[a.clone(), b.clone()]);
        assert!(s.similarity(&bundled, &a) > 0.3);
        assert!(s.similarity(&bundled, &b) > 0.3);
    }

    #[test]
    #[should_panic(expected = "expected a dense-binary vector")]
    fn wrong_variant_panics() {
        let s = DenseBinaryStrategy::new(8);
        let bad = HdcVector::Sparse(vec![1, 2, 3]);
        let _ = s.similarity(&bad, &bad);
    }
}
