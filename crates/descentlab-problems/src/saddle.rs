//! Non-convex saddle f(w) = w0² − w1².
//!
//! Unbounded below along the w1 axis. The origin is the only stationary
//! point and its Hessian diag(2, −2) is indefinite. Pure Newton jumps
//! straight onto it from anywhere; descent methods slide away along w1.

use descentlab_core::core::{
    problem::{CriticalPoint, Domain, Problem},
    types::{DMatrix, DVector},
};

/// The hyperbolic paraboloid w0² − w1².
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Saddle;

impl Saddle {
    /// Creates the saddle problem.
    pub fn new() -> Self {
        Self
    }
}

impl Problem for Saddle {
    fn name(&self) -> &str {
        "non-convex-saddle"
    }

    fn dimension(&self) -> usize {
        2
    }

    fn objective(&self, w: &DVector) -> f64 {
        w[0] * w[0] - w[1] * w[1]
    }

    fn gradient(&self, w: &DVector) -> DVector {
        DVector::from_vec(vec![2.0 * w[0], -2.0 * w[1]])
    }

    fn hessian(&self, _w: &DVector) -> Option<DMatrix> {
        Some(DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, -2.0]))
    }

    fn has_hessian(&self) -> bool {
        true
    }

    fn domain(&self) -> Domain {
        Domain::cube(-3.0, 3.0, 2)
    }

    fn critical_points(&self) -> Vec<CriticalPoint> {
        vec![CriticalPoint::saddle(&[0.0, 0.0])]
    }
}
