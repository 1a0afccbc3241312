//! Soft-margin linear SVM with a squared hinge penalty.
//!
//! ```text
//! f(w) = ½(w0² + w1²) + λ Σ max(0, 1 − yᵢ zᵢ)²,     zᵢ = xᵢᵀw, yᵢ ∈ {−1, +1}
//! ```
//!
//! The squared hinge is C¹ but its Hessian jumps whenever a sample crosses
//! its margin:
//!
//! ```text
//! ∇²f = diag(1, 1, 0) + 2λ Σ_{mᵢ > 0} xᵢ xᵢᵀ,     mᵢ = 1 − yᵢ zᵢ
//! ```
//!
//! When no sample violates its margin the bias direction has zero curvature
//! and undamped Newton systems become singular.

use crate::dataset::Dataset;
use descentlab_core::core::{
    error::{ProblemError, ProblemResult},
    problem::{Domain, Problem},
    types::{DMatrix, DVector},
};

/// Squared-hinge SVM objective over a fixed dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SquaredHingeSvm {
    features: DMatrix,
    labels: DVector,
    lambda: f64,
}

impl SquaredHingeSvm {
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

    /// Margin violations mᵢ = 1 − yᵢ xᵢᵀw.
    fn margins(&self, w: &DVector) -> DVector {
        let z = &self.features * w;
        DVector::from_iterator(
            z.len(),
            z.iter().zip(self.labels.iter()).map(|(z, y)| 1.0 - y * z),
        )
    }

    /// Number of samples currently violating their margin.
    pub fn active_count(&self, w: &DVector) -> usize {
        self.margins(w).iter().filter(|m| **m > 0.0).count()
    }
}

impl Problem for SquaredHingeSvm {
    fn name(&self) -> &str {
        "squared-hinge-svm"
    }

    fn dimension(&self) -> usize {
        3
    }

    fn objective(&self, w: &DVector) -> f64 {
        let penalty: f64 = self.margins(w).iter().map(|m| m.max(0.0).powi(2)).sum();
        0.5 * (w[0] * w[0] + w[1] * w[1]) + self.lambda * penalty
    }

    fn gradient(&self, w: &DVector) -> DVector {
        let mut grad = DVector::from_vec(vec![w[0], w[1], 0.0]);
        for (i, m) in self.margins(w).iter().enumerate() {
            if *m > 0.0 {
                let scale = 2.0 * self.lambda * m * self.labels[i];
                grad -= self.features.row(i).transpose() * scale;
            }
        }
        grad
    }

    fn hessian(&self, w: &DVector) -> Option<DMatrix> {
        let mut hess = DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 1.0, 0.0]));
        for (i, m) in self.margins(w).iter().enumerate() {
            if *m > 0.0 {
                let x = self.features.row(i).transpose();
                hess += &x * x.transpose() * (2.0 * self.lambda);
            }
        }
        Some(hess)
    }

    fn has_hessian(&self) -> bool {
        true
    }

    fn domain(&self) -> Domain {
        Domain::cube(-3.0, 3.0, 3)
    }
}
