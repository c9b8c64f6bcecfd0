//! Sparse polynomial-coefficient strategy.
//!
//! A toy integer-ring HDC algebra: each symbol is a handful of coefficients
//! in `Z_M`. Binding is modular addition (exactly invertible by modular
//! subtraction); bundling is a rounded modular average; similarity is
//! cosine over the coefficients' signed (centered) representation.

use crate::strategy::{expect_kind, HdcStrategy, HdcVector};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

/// Prime modulus for the coefficient ring. Close to `i32::MAX` so signed
/// centering (`[-M/2, M/2)`) has ample headroom.
const MODULUS: i64 = 2_147_483_629;

/// Sparse polynomial-coefficient strategy. Default width is 4 coefficients
/// for the `sparse-polynomial` geometry.
#[derive(Debug, Clone)]
pub struct SparsePolynomialStrategy {
    dim: usize,
}

impl SparsePolynomialStrategy {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl Default for SparsePolynomialStrategy {
    fn default() -> Self {
        Self::new(4)
    }
}

fn as_sparse(v: &HdcVector) -> &[i64] {
    match expect_kind(v, "sparse-polynomial") {
        HdcVector::Sparse(coeffs) => coeffs,
        _ => unreachable!(),
    }
}

fn reduce(x: i64) -> i64 {
    x.rem_euclid(MODULUS)
}

/// Centers a coefficient in `[0, M)` onto `(-M/2, M/2]` for similarity math.
fn centered(x: i64) -> i64 {
    if x > MODULUS / 2 {
        x - MODULUS
    } else {
        x
    }
}

impl HdcStrategy for SparsePolynomialStrategy {
    fn dim(&self) -> usize {
        self.dim
    }

    fn symbol_vector(&self, id: u64) -> HdcVector {
        let mut rng = StdRng::seed_from_u64(id ^ 0x5350_4152_5345); // "SPARSE"-ish salt
        let coeffs = (0..self.dim).map(|_| rng.gen_range(0..MODULUS)).collect();
        HdcVector::Sparse(coeffs)
    }

    fn bind(&self, a: &HdcVector, b: &HdcVector) -> HdcVector {
        let (a, b) = (as_sparse(a), as_sparse(b));
        HdcVector::Sparse(a.iter().zip(b).map(|(x, y)| reduce(x + y)).collect())
    }

    fn unbind(&self, a: &HdcVector, b: &HdcVector) -> HdcVector {
        let (a, b) = (as_sparse(a), as_sparse(b));
        HdcVector::Sparse(a.iter().zip(b).map(|(x, y)| reduce(x - y)).collect())
    }

    fn bundle(&self, vs: &[HdcVector]) -> HdcVector {
        if vs.is_empty() {
            return HdcVector::Sparse(vec![0; self.dim]);
        }
        let vecs: Vec<&[i64]> = vs.iter().map(as_sparse).collect();
        let n = vecs.len() as i64;
        let coeffs = (0..self.dim)
            .map(|i| {
                let sum: i64 = vecs.iter().map(|v| centered(v[i])).sum();
                reduce(sum / n)
            })
            .collect();
        HdcVector::Sparse(coeffs)
    }

    fn similarity(&self, a: &HdcVector, b: &HdcVector) -> f64 {
        let (a, b) = (as_sparse(a), as_sparse(b));
        if a.is_empty() {
            return 0.0;
        }
        let (mut dot, mut na, mut nb) = (0f64, 0f64, 0f64);
        for (x, y) in a.iter().zip(b) {
            let (cx, cy) = (centered(*x) as f64, centered(*y) as f64);
            dot += cx * cy;
            na += cx * cx;
            nb += cy * cy;
        }
        if na == 0.0 || nb == 0.0 {
            return 0.0;
        }
        (dot / (na.sqrt() * nb.sqrt())).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_vector_is_deterministic() {
        let s = SparsePolynomialStrategy::new(4);
        assert_eq!(s.symbol_vector(99), s.symbol_vector(99));
    }

    #[test]
    fn bind_then_unbind_recovers_operand_exactly() {
        let s = SparsePolynomialStrategy::new(4);
        let a = s.symbol_vector(1);
        let b = s.symbol_vector(2);
        let bound = s.bind(&a, &b);
        assert_eq!(s.unbind(&bound, &a), b);
    }

    #[test]
    fn self_similarity_is_one() {
        let s = SparsePolynomialStrategy::new(4);
        let v = s.symbol_vector(5);
        assert!((s.similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn similarity_is_symmetric_and_bounded() {
        let s = SparsePolynomialStrategy::new(4);
        let a = s.symbol_vector(1);
        let b = s.symbol_vector(2);
        let sim = s.similarity(&a, &b);
        assert_eq!(sim, s.similarity(&b, &a));
        assert!((-1.0..=1.0).contains(&sim));
        assert!(!sim.is_nan());
    }

    #[test]
    fn zero_vector_similarity_is_nan_safe() {
        let s = SparsePolynomialStrategy::new(3);
        let zero = HdcVector::Sparse(vec![0, 0, 0]);
        assert_eq!(s.similarity(&zero, &zero), 0.0);
    }
}
