//! Soft-margin linear SVM with the plain hinge penalty.
//!
//! ```text
//! f(w) = ½(w0² + w1²) + λ Σ max(0, 1 − yᵢ zᵢ),     zᵢ = xᵢᵀw, yᵢ ∈ {−1, +1}
//! ```
//!
//! The hinge is not differentiable where a sample sits exactly on its
//! margin. [`Problem::gradient`] returns the subgradient that counts only
//! strict violations:
//!
//! ```text
//! g = (w0, w1, 0) − λ Σ_{mᵢ > 0} yᵢ xᵢ,     mᵢ = 1 − yᵢ zᵢ
//! ```
//!
//! There is no Hessian, so only first-order runners accept this problem.

use crate::dataset::Dataset;
use descentlab_core::core::{
    error::{ProblemError, ProblemResult},
    problem::{Domain, Problem},
    types::{DMatrix, DVector},
};

/// Hinge-loss SVM objective over a fixed dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftMarginSvm {
    features: DMatrix,
    labels: DVector,
    lambda: f64,
}

impl SoftMarginSvm {
    /// Builds the objective for `dataset` with penalty weight `lambda`.
    ///
    /// # Errors
    /// Fails if `lambda` is negative or not finite.
    pub fn new(dataset: &Dataset, lambda: f64) -> ProblemResult<Self> {
        if !(lambda >= 0.0 && lambda.is_finite()) {
            return Err(ProblemError::invalid_definition(format!(
                "penalty weight must be non-negative, got {lambda}"
            )));
        }
        Ok(Self {
            features: dataset.design_matrix(),
            labels: dataset.signed_labels(),
            lambda,
        })
    }

    fn margins(&self, w: &DVector) -> DVector {
        let z = &self.features * w;
        DVector::from_iterator(
            z.len(),
            z.iter().zip(self.labels.iter()).map(|(z, y)| 1.0 - y * z),
        )
    }

    /// Number of samples strictly inside or beyond their margin.
    pub fn active_count(&self, w: &DVector) -> usize {
        self.margins(w).iter().filter(|m| **m > 0.0).count()
    }
}

impl Problem for SoftMarginSvm {
    fn name(&self) -> &str {
        "soft-margin-svm"
    }

    fn dimension(&self) -> usize {
        3
    }

    fn objective(&self, w: &DVector) -> f64 {
        let penalty: f64 = self.margins(w).iter().map(|m| m.max(0.0)).sum();
        0.5 * (w[0] * w[0] + w[1] * w[1]) + self.lambda * penalty
    }

    fn gradient(&self, w: &DVector) -> DVector {
        let mut grad = DVector::from_vec(vec![w[0], w[1], 0.0]);
        for (i, m) in self.margins(w).iter().enumerate() {
            if *m > 0.0 {
                grad -= self.features.row(i).transpose() * (self.lambda * self.labels[i]);
            }
        }
        grad
    }

    fn domain(&self) -> Domain {
        Domain::cube(-3.0, 3.0, 3)
    }
}
