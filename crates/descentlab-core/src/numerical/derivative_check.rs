//! Finite-difference verification of hand-coded derivatives.
//!
//! Every built-in problem ships analytic gradients and Hessians. The
//! checker compares them with the central-difference approximations
//! provided by [`Problem::gradient_fd`] and [`Problem::hessian_fd`].
//!
//! Errors are measured component-wise and scaled by `max(1, |analytic|)`, so
//! the tolerance behaves as an absolute bound near zero and a relative bound
//! for large entries (Rosenbrock's Hessian reaches the thousands inside its
//! display box).

use crate::core::problem::Problem;
use crate::core::types::{DMatrix, DVector};

fn scaled_error(analytic: f64, approx: f64) -> f64 {
    (analytic - approx).abs() / analytic.abs().max(1.0)
}

/// Utilities for checking analytic derivatives against finite differences.
#[derive(Debug, Clone, Copy)]
pub struct DerivativeChecker;

impl DerivativeChecker {
    /// Checks the gradient at `w`.
    ///
    /// # Returns
    ///
    /// A tuple of (passes, max_error) where `max_error` is the largest
    /// scaled component-wise error.
    pub fn check_gradient<P: Problem + ?Sized>(problem: &P, w: &DVector, tol: f64) -> (bool, f64) {
        let analytic = problem.gradient(w);
        let fd = problem.gradient_fd(w);

        let max_error = analytic
            .iter()
            .zip(fd.iter())
            .map(|(a, b)| scaled_error(*a, *b))
            .fold(0.0_f64, f64::max);

        (max_error < tol, max_error)
    }

    /// Checks the Hessian at `w`.
    ///
    /// Returns `None` if the problem has no Hessian.
    pub fn check_hessian<P: Problem + ?Sized>(
        problem: &P,
        w: &DVector,
        tol: f64,
    ) -> Option<(bool, f64)> {
        let analytic = problem.hessian(w)?;
        let fd = problem.hessian_fd(w);

        let max_error = max_scaled_matrix_error(&analytic, &fd);
        Some((max_error < tol, max_error))
    }

    /// Checks that the analytic Hessian is symmetric.
    ///
    /// Returns `None` if the problem has no Hessian.
    pub fn check_hessian_symmetry<P: Problem + ?Sized>(
        problem: &P,
        w: &DVector,
        tol: f64,
    ) -> Option<(bool, f64)> {
        let hessian = problem.hessian(w)?;
        let n = hessian.nrows();

        let mut max_asymmetry = 0.0_f64;
        for i in 0..n {
            for j in i + 1..n {
                max_asymmetry = max_asymmetry.max((hessian[(i, j)] - hessian[(j, i)]).abs());
            }
        }

        Some((max_asymmetry < tol, max_asymmetry))
    }

    /// Checks that the gradient vanishes at every declared critical point.
    ///
    /// Returns the largest gradient norm found (0 when none are declared).
    pub fn check_critical_points<P: Problem + ?Sized>(problem: &P, tol: f64) -> (bool, f64) {
        let worst = problem
            .critical_points()
            .iter()
            .map(|cp| problem.gradient(&cp.location).norm())
            .fold(0.0_f64, f64::max);

        (worst < tol, worst)
    }
}

fn max_scaled_matrix_error(analytic: &DMatrix, approx: &DMatrix) -> f64 {
    analytic
        .iter()
        .zip(approx.iter())
        .map(|(a, b)| scaled_error(*a, *b))
        .fold(0.0_f64, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::problem::{CriticalPoint, Domain, ProblemFunctions};

    fn saddle(wrong_gradient: bool) -> ProblemFunctions {
        ProblemFunctions::new(
            "saddle",
            2,
            |w: &DVector| w[0] * w[0] - w[1] * w[1],
            move |w: &DVector| {
                let scale = if wrong_gradient { 3.0 } else { 2.0 };
                DVector::from_vec(vec![scale * w[0], -2.0 * w[1]])
            },
            Domain::cube(-2.0, 2.0, 2),
        )
        .unwrap()
        .with_hessian(|_w: &DVector| DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, -2.0]))
        .with_critical_point(CriticalPoint::saddle(&[0.0, 0.0]))
    }

    #[test]
    fn test_correct_derivatives_pass() {
        let problem = saddle(false);
        let w = DVector::from_vec(vec![0.4, -1.1]);

        let (ok, err) = DerivativeChecker::check_gradient(&problem, &w, 1e-5);
        assert!(ok, "gradient error {err}");

        let (ok, err) = DerivativeChecker::check_hessian(&problem, &w, 1e-3).unwrap();
        assert!(ok, "hessian error {err}");

        let (ok, _) = DerivativeChecker::check_hessian_symmetry(&problem, &w, 1e-12).unwrap();
        assert!(ok);

        let (ok, worst) = DerivativeChecker::check_critical_points(&problem, 1e-12);
        assert!(ok);
        assert_eq!(worst, 0.0);
    }

    #[test]
    fn test_wrong_gradient_is_detected() {
        let problem = saddle(true);
        let w = DVector::from_vec(vec![1.0, 1.0]);

        let (ok, err) = DerivativeChecker::check_gradient(&problem, &w, 1e-5);
        assert!(!ok);
        assert!(err > 0.1);
    }

    #[test]
    fn test_missing_hessian() {
        let problem = ProblemFunctions::new(
            "bowl",
            2,
            |w: &DVector| w.norm_squared(),
            |w: &DVector| w * 2.0,
            Domain::cube(-1.0, 1.0, 2),
        )
        .unwrap();
        let w = DVector::zeros(2);
        assert!(DerivativeChecker::check_hessian(&problem, &w, 1e-3).is_none());
    }
}
