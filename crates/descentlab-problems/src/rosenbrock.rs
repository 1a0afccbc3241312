//! Rosenbrock's banana function.
//!
//! f(w) = (a − w0)² + b (w1 − w0²)²
//!
//! The unique minimum (a, a²) sits at the bottom of a long curved valley.
//! Finding the valley is easy, following it is not.

use descentlab_core::core::{
    problem::{CriticalPoint, Domain, Problem},
    types::{DMatrix, DVector},
};

/// Rosenbrock function with parameters `a` and `b` (classically 1 and 100).
#[derive(Debug, Clone, PartialEq)]
pub struct Rosenbrock {
    a: f64,
    b: f64,
}

impl Default for Rosenbrock {
    fn default() -> Self {
        Self { a: 1.0, b: 100.0 }
    }
}

impl Rosenbrock {
    /// Creates the classic (1, 100) instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an instance with custom parameters.
    pub fn with_parameters(a: f64, b: f64) -> Self {
        Self { a, b }
    }
}

impl Problem for Rosenbrock {
    fn name(&self) -> &str {
        "rosenbrock"
    }

    fn dimension(&self) -> usize {
        2
    }

    fn objective(&self, w: &DVector) -> f64 {
        let (x, y) = (w[0], w[1]);
        (self.a - x).powi(2) + self.b * (y - x * x).powi(2)
    }

    fn gradient(&self, w: &DVector) -> DVector {
        let (x, y) = (w[0], w[1]);
        let valley = y - x * x;
        DVector::from_vec(vec![
            -2.0 * (self.a - x) - 4.0 * self.b * x * valley,
            2.0 * self.b * valley,
        ])
    }

    fn hessian(&self, w: &DVector) -> Option<DMatrix> {
        let (x, y) = (w[0], w[1]);
        let h00 = 2.0 - 4.0 * self.b * (y - x * x) + 8.0 * self.b * x * x;
        let h01 = -4.0 * self.b * x;
        Some(DMatrix::from_row_slice(2, 2, &[h00, h01, h01, 2.0 * self.b]))
    }

    fn has_hessian(&self) -> bool {
        true
    }

    fn domain(&self) -> Domain {
        Domain::new(vec![(-2.0, 2.0), (-1.0, 3.0)])
    }

    fn global_minimum(&self) -> Option<DVector> {
        Some(DVector::from_vec(vec![self.a, self.a * self.a]))
    }

    fn critical_points(&self) -> Vec<CriticalPoint> {
        vec![CriticalPoint::minimum(&[self.a, self.a * self.a])]
    }
}
