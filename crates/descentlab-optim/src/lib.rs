//! descentlab Optimization - algorithm runners producing full traces.
//!
//! This crate provides the four minimizers compared by descentlab. Every
//! runner borrows an immutable [`Problem`](descentlab_core::core::problem::Problem),
//! owns its own state, and returns an append-only trace of every iteration.
//!
//! # Available Optimizers
//!
//! - **Gradient descent**: fixed step or Armijo backtracking
//! - **Newton**: damped Newton system solved by Cholesky or LU, optional Armijo
//! - **L-BFGS**: two-loop recursion over a bounded memory of curvature pairs
//!
//! # Examples
//!
//! ```rust
//! use descentlab_core::prelude::*;
//! use descentlab_optim::{Lbfgs, LbfgsConfig};
//!
//! let rosenbrock = ProblemFunctions::new(
//!     "rosenbrock",
//!     2,
//!     |w: &DVector| (1.0 - w[0]).powi(2) + 100.0 * (w[1] - w[0] * w[0]).powi(2),
//!     |w: &DVector| {
//!         DVector::from_vec(vec![
//!             -2.0 * (1.0 - w[0]) - 400.0 * w[0] * (w[1] - w[0] * w[0]),
//!             200.0 * (w[1] - w[0] * w[0]),
//!         ])
//!     },
//!     Domain::new(vec![(-2.0, 2.0), (-1.0, 3.0)]),
//! )
//! .unwrap();
//!
//! let optimizer = Lbfgs::new(
//!     LbfgsConfig::new()
//!         .with_memory_size(10)
//!         .with_stopping(StoppingCriterion::new().with_max_iterations(500)),
//! );
//! let trace = optimizer
//!     .optimize(&rosenbrock, &DVector::from_vec(vec![-1.2, 1.0]))
//!     .unwrap();
//! assert!(trace.converged());
//! ```

pub mod algorithm;
pub mod gradient_descent;
pub mod lbfgs;
pub mod newton;

// Re-export main optimizers for convenience
pub use algorithm::{run, AlgorithmConfig, AlgorithmKind, AlgorithmTrace};
pub use gradient_descent::{GradientDescent, GradientDescentConfig, GradientDescentIteration, StepRule};
pub use lbfgs::{CurvaturePair, Lbfgs, LbfgsConfig, LbfgsIteration, TwoLoopDiagnostics};
pub use newton::{Newton, NewtonConfig, NewtonIteration};

// Re-export commonly used items from core
pub use descentlab_core::optimization::{
    line_search::{LineSearchMode, LineSearchParams},
    optimizer::{Optimizer, StoppingCriterion, TerminationReason},
    trace::{IterationBase, IterationRecord, OptimizationTrace},
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exports() {
        let _config = GradientDescentConfig::new().with_fixed_step(0.01);
        let _newton = NewtonConfig::new().with_line_search_mode(LineSearchMode::None);
        assert_eq!(AlgorithmKind::Lbfgs.default_config().kind(), AlgorithmKind::Lbfgs);
    }
}
