//! Type aliases and numerical constants.
//!
//! Every problem handled by the engine lives in ℝ² or ℝ³, so the whole
//! workspace is written against `f64` and nalgebra's dynamically sized
//! storage. The aliases below keep signatures short and give one place to
//! change if the scalar type ever needs to move.

/// Dynamically sized column vector of `f64`.
pub type DVector = nalgebra::DVector<f64>;

/// Dynamically sized matrix of `f64`.
pub type DMatrix = nalgebra::DMatrix<f64>;

/// Fixed two-component vector, used for grid coordinates and attractor locations.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Numerical constants shared by the solvers and checks.
pub mod constants {
    /// Machine epsilon for `f64`.
    pub const EPSILON: f64 = f64::EPSILON;

    /// Default gradient-norm tolerance (gtol).
    pub const GRADIENT_TOLERANCE: f64 = 1e-5;

    /// Default relative function-change tolerance (ftol), 10⁷ · ε.
    pub const FUNCTION_TOLERANCE: f64 = 2.220_446e-9;

    /// Default mean absolute step tolerance (xtol).
    pub const POINT_TOLERANCE: f64 = 1e-8;

    /// Magnitude beyond which a loss or position counts as diverged.
    pub const DIVERGENCE_THRESHOLD: f64 = 1e10;

    /// Relative pivot magnitude below which an LU factorization is treated as singular.
    pub const PIVOT_TOLERANCE: f64 = 1e-14;

    /// Default Armijo sufficient-decrease constant.
    pub const ARMIJO_C1: f64 = 1e-4;

    /// Default backtracking contraction factor.
    pub const BACKTRACKING_RHO: f64 = 0.5;

    /// Default number of line search trials before the step is forced.
    ///
    /// The count includes the initial step, so with α₀ = 1 and ρ = 0.5 the
    /// smallest step tried is 2⁻²⁹.
    pub const MAX_LINE_SEARCH_TRIALS: usize = 30;

    /// Default fixed step for gradient descent.
    pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

    /// Default number of curvature pairs kept by L-BFGS.
    pub const LBFGS_MEMORY_SIZE: usize = 10;
}

/// Supported problem dimensions.
pub const SUPPORTED_DIMENSIONS: [usize; 2] = [2, 3];

/// Returns `true` if every component of `v` is finite.
pub fn all_finite(v: &DVector) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_finite() {
        assert!(all_finite(&DVector::from_vec(vec![1.0, -2.0, 0.0])));
        assert!(!all_finite(&DVector::from_vec(vec![1.0, f64::NAN])));
        assert!(!all_finite(&DVector::from_vec(vec![f64::INFINITY, 0.0])));
    }

    #[test]
    fn test_constants_are_sane() {
        assert!(constants::ARMIJO_C1 > 0.0 && constants::ARMIJO_C1 < 1.0);
        assert!(constants::BACKTRACKING_RHO > 0.0 && constants::BACKTRACKING_RHO < 1.0);
        assert!(constants::FUNCTION_TOLERANCE > constants::EPSILON);
    }
}
