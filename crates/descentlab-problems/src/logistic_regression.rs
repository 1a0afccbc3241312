//! L2-regularised logistic regression on a 2-D dataset with a bias term.
//!
//! Parameters w = (w0, w1, w2), where w2 multiplies the constant feature.
//!
//! ```text
//! f(w) = −(1/n) Σ [ yᵢ ln σ(zᵢ) + (1 − yᵢ) ln(1 − σ(zᵢ)) ] + (λ/2)(w0² + w1²)
//! ∇f   = Xᵀ(σ − y)/n + λ (w0, w1, 0)
//! ∇²f  = Xᵀ D X / n + λ diag(1, 1, 0),     D = diag(σᵢ(1 − σᵢ))
//! ```
//!
//! with zᵢ = xᵢᵀw. The bias is not regularised. σ is evaluated on z clipped
//! to ±500 and probabilities are clipped to [1e-10, 1 − 1e-10] inside the
//! logarithms.

use crate::dataset::Dataset;
use descentlab_core::core::{
    error::{ProblemError, ProblemResult},
    problem::{Domain, Problem},
    types::{DMatrix, DVector},
};

const LOGIT_CLIP: f64 = 500.0;
const PROBABILITY_CLIP: f64 = 1e-10;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z.clamp(-LOGIT_CLIP, LOGIT_CLIP)).exp())
}

/// Logistic regression objective over a fixed dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    features: DMatrix,
    labels: DVector,
    lambda: f64,
}

impl LogisticRegression {
    /// Builds the objective for `dataset` with regularisation strength `lambda`.
    ///
    /// # Errors
    /// Fails if `lambda` is negative or not finite.
    pub fn new(dataset: &Dataset, lambda: f64) -> ProblemResult<Self> {
        if !(lambda >= 0.0 && lambda.is_finite()) {
            return Err(ProblemError::invalid_definition(format!(
                "regularisation must be non-negative, got {lambda}"
            )));
        }
        Ok(Self {
            features: dataset.design_matrix(),
            labels: dataset.binary_labels(),
            lambda,
        })
    }

    /// Regularisation strength.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    fn probabilities(&self, w: &DVector) -> DVector {
        (&self.features * w).map(sigmoid)
    }

    fn sample_count(&self) -> f64 {
        self.labels.len() as f64
    }
}

impl Problem for LogisticRegression {
    fn name(&self) -> &str {
        "logistic-regression"
    }

    fn dimension(&self) -> usize {
        3
    }

    fn objective(&self, w: &DVector) -> f64 {
        let sigma = self.probabilities(w);
        let cross_entropy: f64 = sigma
            .iter()
            .zip(self.labels.iter())
            .map(|(s, y)| {
                let s = s.clamp(PROBABILITY_CLIP, 1.0 - PROBABILITY_CLIP);
                y * s.ln() + (1.0 - y) * (1.0 - s).ln()
            })
            .sum();

        -cross_entropy / self.sample_count() + 0.5 * self.lambda * (w[0] * w[0] + w[1] * w[1])
    }

    fn gradient(&self, w: &DVector) -> DVector {
        let error = self.probabilities(w) - &self.labels;
        let mut grad = self.features.tr_mul(&error) / self.sample_count();
        grad[0] += self.lambda * w[0];
        grad[1] += self.lambda * w[1];
        grad
    }

    fn hessian(&self, w: &DVector) -> Option<DMatrix> {
        let weights = self.probabilities(w).map(|s| s * (1.0 - s));
        let weighted = DMatrix::from_fn(self.features.nrows(), 3, |i, j| {
            weights[i] * self.features[(i, j)]
        });
        let mut hess = self.features.tr_mul(&weighted) / self.sample_count();
        hess[(0, 0)] += self.lambda;
        hess[(1, 1)] += self.lambda;
        Some(hess)
    }

    fn has_hessian(&self) -> bool {
        true
    }

    fn domain(&self) -> Domain {
        Domain::cube(-3.0, 3.0, 3)
    }
}
