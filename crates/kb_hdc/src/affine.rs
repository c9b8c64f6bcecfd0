//! Dense real-valued strategy with cosine similarity.

use crate::strategy::{expect_kind, HdcStrategy, HdcVector};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

/// Dense unit vectors over `f32`, bound by elementwise (Hadamard) product
/// and renormalization. Default width is 32 for the `metric-affine`
/// geometry.
#[derive(Debug, Clone)]
pub struct MetricAffineStrategy {
    dim: usize,
}

impl MetricAffineStrategy {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl Default for MetricAffineStrategy {
    fn default() -> Self {
        Self::new(32)
    }
}

fn as_affine(v: &HdcVector) -> &[f32] {
    match expect_kind(v, "metric-affine") {
        HdcVector::Affine(xs) => xs,
        _ => unreachable!(),
    }
}

fn normalize(mut xs: Vec<f32>) -> Vec<f32> {
    let norm: f32 = xs.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-12 {
        for x in xs.iter_mut() {
            *x /= norm;
        }
    }
    xs
}

impl HdcStrategy for MetricAffineStrategy {
    fn dim(&self) -> usize {
        self.dim
    }

    fn symbol_vector(&self, id: u64) -> HdcVector {
        let mut rng = StdRng::seed_from_u64(id ^ 0x4146_4649_4E45); // "AFFINE"-ish salt
        let raw: Vec<f32> = (0..self.dim).map(|_| rng.gen_range(-1.0f32..1.0f32)).collect();
        HdcVector::Affine(normalize(raw))
    }

    fn bind(&self, a: &HdcVector, b: &HdcVector) -> HdcVector {
        let (a, b) = (as_affine(a), as_affine(b));
        let product: Vec<f32> = a.iter().zip(b).map(|(x, y)| x * y).collect();
        HdcVector::Affine(normalize(product))
    }

    fn unbind(&self, bound: &HdcVector, a: &HdcVector) -> HdcVector {
        let (bound, a) = (as_affine(bound), as_affine(a));
        let quotient: Vec<f32> = bound
            .iter()
            .zip(a)
            .map(|(x, y)| if y.abs() > 1e-9 { x / y } else { 0.0 })
            .collect();
        HdcVector::Affine(normalize(quotient))
    }

    fn bundle(&self, vs: &[HdcVector]) -> HdcVector {
        if vs.is_empty() {
            return HdcVector::Affine(vec![0.0; self.dim]);
        }
        let vecs: Vec<&[f32]> = vs.iter().map(as_affine).collect();
        let n = vecs.len() as f32;
        let avg: Vec<f32> = (0..self.dim)
            .map(|i| vecs.iter().map(|v| v[i]).sum::<f32>() / n)
            .collect();
        HdcVector::Affine(normalize(avg))
    }

    fn similarity(&self, a: &HdcVector, b: &HdcVector) -> f64 {
        let (a, b) = (as_affine(a), as_affine(b));
        if a.is_empty() {
            return 0.0;
        }
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if na < 1e-9 || nb < 1e-9 {
            return 0.0;
        }
        let sim = (dot / (na * nb)) as f64;
        if sim.is_nan() {
            0.0
        } else {
            sim.clamp(-1.0, 1.0)
        }
    }
}
