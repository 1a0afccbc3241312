//! Separable quadratic bowls f(w) = a w0² + b w1².
//!
//! With a = b the level sets are circles and every method behaves well. With
//! b ≫ a the bowl becomes a narrow valley of condition number b/a, which is
//! where fixed-step gradient descent zig-zags and Newton shines.

use descentlab_core::core::{
    error::{ProblemError, ProblemResult},
    problem::{CriticalPoint, Domain, Problem},
    types::{DMatrix, DVector},
};

/// Axis-aligned quadratic bowl with positive curvatures.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadratic {
    name: String,
    a: f64,
    b: f64,
}

impl Quadratic {
    /// Creates f(w) = a w0² + b w1².
    ///
    /// # Errors
    /// Returns an error unless both coefficients are positive and finite.
    pub fn new(a: f64, b: f64) -> ProblemResult<Self> {
        if !(a > 0.0 && b > 0.0 && a.is_finite() && b.is_finite()) {
            return Err(ProblemError::invalid_definition(format!(
                "quadratic coefficients must be positive, got ({a}, {b})"
            )));
        }
        Ok(Self {
            name: format!("quadratic({a}, {b})"),
            a,
            b,
        })
    }

    /// The round bowl w0² + w1².
    pub fn well_conditioned() -> Self {
        Self {
            name: "quadratic".to_string(),
            a: 1.0,
            b: 1.0,
        }
    }

    /// The elongated bowl w0² + 100 w1² (condition number 100).
    pub fn ill_conditioned() -> Self {
        Self {
            name: "ill-conditioned-quadratic".to_string(),
            a: 1.0,
            b: 100.0,
        }
    }

    /// Ratio of the largest to the smallest curvature.
    pub fn condition_number(&self) -> f64 {
        self.a.max(self.b) / self.a.min(self.b)
    }
}

impl Problem for Quadratic {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        2
    }

    fn objective(&self, w: &DVector) -> f64 {
        self.a * w[0] * w[0] + self.b * w[1] * w[1]
    }

    fn gradient(&self, w: &DVector) -> DVector {
        DVector::from_vec(vec![2.0 * self.a * w[0], 2.0 * self.b * w[1]])
    }

    fn hessian(&self, _w: &DVector) -> Option<DMatrix> {
        Some(DMatrix::from_row_slice(
            2,
            2,
            &[2.0 * self.a, 0.0, 0.0, 2.0 * self.b],
        ))
    }

    fn has_hessian(&self) -> bool {
        true
    }

    fn domain(&self) -> Domain {
        Domain::cube(-3.0, 3.0, 2)
    }

    fn global_minimum(&self) -> Option<DVector> {
        Some(DVector::zeros(2))
    }

    fn critical_points(&self) -> Vec<CriticalPoint> {
        vec![CriticalPoint::minimum(&[0.0, 0.0])]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_presets() {
        let q = Quadratic::ill_conditioned();
        assert_eq!(q.name(), "ill-conditioned-quadratic");
        assert_relative_eq!(q.condition_number(), 100.0);

        let w = DVector::from_vec(vec![1.0, 1.0]);
        assert_relative_eq!(q.objective(&w), 101.0);
        assert_relative_eq!(q.gradient(&w), DVector::from_vec(vec![2.0, 200.0]));
    }

    #[test]
    fn test_rejects_non_positive_curvature() {
        assert!(Quadratic::new(1.0, 0.0).is_err());
        assert!(Quadratic::new(-1.0, 1.0).is_err());
        assert!(Quadratic::new(f64::NAN, 1.0).is_err());
        assert!(Quadratic::new(0.5, 2.0).is_ok());
    }
}
