//! descentlab Problems - built-in objectives for the descentlab solvers.
//!
//! This crate provides the landscapes used to demonstrate the solvers:
//! analytic test functions of two variables and four dataset-backed
//! classification losses of three variables (two weights plus a bias).
//!
//! # Available Problems
//!
//! | name | dimension | stationary points |
//! |---|---|---|
//! | `quadratic` | 2 | one minimum |
//! | `ill-conditioned-quadratic` | 2 | one minimum, κ = 100 |
//! | `rosenbrock` | 2 | one minimum in a curved valley |
//! | `non-convex-saddle` | 2 | one saddle, unbounded below |
//! | `himmelblau` | 2 | four minima, one maximum, four saddles |
//! | `three-hump-camel` | 2 | three minima, two saddles |
//! | [`LogisticRegression`] | 3 | convex for λ > 0 |
//! | [`SquaredHingeSvm`] | 3 | convex, piecewise-smooth Hessian |
//! | [`SoftMarginSvm`] | 3 | convex, hinge subgradient, no Hessian |
//! | [`PerceptronSvm`] | 3 | flat at the origin, no Hessian |
//!
//! The analytic problems can be looked up by name with [`by_name`].

pub mod dataset;
pub mod himmelblau;
pub mod logistic_regression;
pub mod perceptron;
pub mod quadratic;
pub mod rosenbrock;
pub mod saddle;
pub mod soft_margin;
pub mod squared_hinge;
pub mod three_hump_camel;

// Re-export main problems for convenience
pub use dataset::{DataPoint, Dataset, DatasetGenerator};
pub use himmelblau::{Himmelblau, HIMMELBLAU_MINIMA};
pub use logistic_regression::LogisticRegression;
pub use perceptron::PerceptronSvm;
pub use quadratic::Quadratic;
pub use rosenbrock::Rosenbrock;
pub use saddle::Saddle;
pub use soft_margin::SoftMarginSvm;
pub use squared_hinge::SquaredHingeSvm;
pub use three_hump_camel::ThreeHumpCamel;

use descentlab_core::core::problem::Problem;

/// Names accepted by [`by_name`].
pub const BUILTIN_PROBLEMS: [&str; 6] = [
    "quadratic",
    "ill-conditioned-quadratic",
    "rosenbrock",
    "non-convex-saddle",
    "himmelblau",
    "three-hump-camel",
];

/// Looks up one of the analytic two-variable problems.
///
/// Returns `None` for unknown names.
///
/// # Example
///
/// ```
/// use descentlab_core::core::problem::Problem;
///
/// let problem = descentlab_problems::by_name("himmelblau").unwrap();
/// assert_eq!(problem.critical_points().len(), 9);
/// assert!(descentlab_problems::by_name("booth").is_none());
/// ```
pub fn by_name(name: &str) -> Option<Box<dyn Problem>> {
    let problem: Box<dyn Problem> = match name {
        "quadratic" => Box::new(Quadratic::well_conditioned()),
        "ill-conditioned-quadratic" => Box::new(Quadratic::ill_conditioned()),
        "rosenbrock" => Box::new(Rosenbrock::new()),
        "non-convex-saddle" => Box::new(Saddle::new()),
        "himmelblau" => Box::new(Himmelblau::new()),
        "three-hump-camel" => Box::new(ThreeHumpCamel::new()),
        _ => return None,
    };
    Some(problem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names_match_problems() {
        for name in BUILTIN_PROBLEMS {
            let problem = by_name(name).unwrap();
            assert_eq!(problem.name(), name);
            assert_eq!(problem.dimension(), 2);
            assert!(problem.has_hessian());
        }
    }
}
