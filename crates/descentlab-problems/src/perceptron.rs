//! Regularized perceptron criterion.
//!
//! ```text
//! f(w) = Σ max(0, −yᵢ zᵢ) + (λ/2)(w0² + w1²),     zᵢ = xᵢᵀw, yᵢ ∈ {−1, +1}
//! ```
//!
//! Only misclassified samples (yᵢ zᵢ < 0) enter the subgradient:
//!
//! ```text
//! g = λ(w0, w1, 0) − Σ_{yᵢ zᵢ < 0} yᵢ xᵢ
//! ```
//!
//! At w = 0 every score is zero and nothing counts as misclassified, so the
//! origin is a stationary point for any λ.

use crate::dataset::Dataset;
use descentlab_core::core::{
    error::{ProblemError, ProblemResult},
    problem::{Domain, Problem},
    types::{DMatrix, DVector},
};

/// Perceptron objective over a fixed dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptronSvm {
    features: DMatrix,
    labels: DVector,
    lambda: f64,
}

impl PerceptronSvm {
    /// Builds the objective for `dataset` with regularization weight `lambda`.
    ///
    /// # Errors
    /// Fails if `lambda` is negative or not finite.
    pub fn new(dataset: &Dataset, lambda: f64) -> ProblemResult<Self> {
        if !(lambda >= 0.0 && lambda.is_finite()) {
            return Err(ProblemError::invalid_definition(format!(
                "regularization weight must be non-negative, got {lambda}"
            )));
        }
        Ok(Self {
            features: dataset.design_matrix(),
            labels: dataset.signed_labels(),
            lambda,
        })
    }

    /// Signed scores yᵢ xᵢᵀw.
    fn scores(&self, w: &DVector) -> DVector {
        let z = &self.features * w;
        z.component_mul(&self.labels)
    }

    /// Number of misclassified samples.
    pub fn misclassified_count(&self, w: &DVector) -> usize {
        self.scores(w).iter().filter(|s| **s < 0.0).count()
    }
}

impl Problem for PerceptronSvm {
    fn name(&self) -> &str {
        "perceptron-svm"
    }

    fn dimension(&self) -> usize {
        3
    }

    fn objective(&self, w: &DVector) -> f64 {
        let loss: f64 = self.scores(w).iter().map(|s| (-s).max(0.0)).sum();
        loss + 0.5 * self.lambda * (w[0] * w[0] + w[1] * w[1])
    }

    fn gradient(&self, w: &DVector) -> DVector {
        let mut grad = DVector::from_vec(vec![self.lambda * w[0], self.lambda * w[1], 0.0]);
        for (i, s) in self.scores(w).iter().enumerate() {
            if *s < 0.0 {
                grad -= self.features.row(i).transpose() * self.labels[i];
            }
        }
        grad
    }

    fn domain(&self) -> Domain {
        Domain::cube(-3.0, 3.0, 3)
    }
}
