//! Shared problems and assertions for tests and benchmarks.

#![cfg(any(test, feature = "test-utils"))]

use crate::core::problem::{CriticalPoint, Domain, ProblemFunctions};
use crate::core::types::{DMatrix, DVector};
use crate::optimization::trace::{IterationRecord, OptimizationTrace};

/// Separable quadratic f(w) = ½ (a w0² + b w1²) with its exact Hessian.
pub fn diagonal_quadratic(a: f64, b: f64) -> ProblemFunctions {
    ProblemFunctions::new(
        format!("diagonal quadratic ({a}, {b})"),
        2,
        move |w: &DVector| 0.5 * (a * w[0] * w[0] + b * w[1] * w[1]),
        move |w: &DVector| DVector::from_vec(vec![a * w[0], b * w[1]]),
        Domain::cube(-3.0, 3.0, 2),
    )
    .expect("two-dimensional quadratic is always valid")
    .with_hessian(move |_w: &DVector| DMatrix::from_row_slice(2, 2, &[a, 0.0, 0.0, b]))
    .with_global_minimum(&[0.0, 0.0])
    .with_critical_point(CriticalPoint::minimum(&[0.0, 0.0]))
}

/// Pure saddle f(w) = w0² − w1².
pub fn pure_saddle() -> ProblemFunctions {
    ProblemFunctions::new(
        "pure saddle",
        2,
        |w: &DVector| w[0] * w[0] - w[1] * w[1],
        |w: &DVector| DVector::from_vec(vec![2.0 * w[0], -2.0 * w[1]]),
        Domain::cube(-2.0, 2.0, 2),
    )
    .expect("two-dimensional saddle is always valid")
    .with_hessian(|_w: &DVector| DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, -2.0]))
    .with_critical_point(CriticalPoint::saddle(&[0.0, 0.0]))
}

/// Asserts f(w_new) ≤ f(w_old) on every non-degenerate descent step.
pub fn assert_monotone_descent<R: IterationRecord>(trace: &OptimizationTrace<R>) {
    for record in &trace.records {
        let base = record.base();
        if base.is_degenerate() || !base.is_descent_direction() {
            continue;
        }
        assert!(
            base.new_loss <= base.loss,
            "iteration {} increased the loss: {} -> {}",
            base.iteration,
            base.loss,
            base.new_loss
        );
    }
}

/// Returns the index of the first candidate within `tol` of `point`.
pub fn nearest_within(point: &DVector, candidates: &[DVector], tol: f64) -> Option<usize> {
    candidates.iter().position(|c| (c - point).norm() < tol)
}
