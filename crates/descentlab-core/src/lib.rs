//! Core traits and types for small unconstrained optimization problems.
//!
//! This crate provides the building blocks shared by every solver in the
//! workspace: the problem interface, the error taxonomy, a small dense linear
//! algebra kernel, Armijo backtracking and the trace types runners emit.
//!
//! # Key Concepts
//!
//! - **Problems**: smooth objectives of two or three variables with
//!   hand-coded gradients and optional Hessians
//! - **Damped solves**: Newton directions from (H + λI) p = −g, by Cholesky
//!   with an LU fallback
//! - **Line search**: sufficient decrease along a direction, with forced
//!   steps flagged instead of failing
//! - **Traces**: append-only per-iteration records and a terminal state
//!
//! # Modules
//!
//! - [`core`]: problem trait, errors, type aliases
//! - [`numerical`]: eigenvalues, damped solve, derivative checks
//! - [`optimization`]: line search, stopping criteria, traces

pub mod core;
pub mod numerical;
pub mod optimization;
pub mod utils;

// Re-export commonly used items at the crate root
pub use crate::core::error::{
    LinalgError, LinalgResult, OptimizerError, OptimizerResult, ProblemError, ProblemResult,
};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use descentlab_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::error::{
        LinalgError, LinalgResult, OptimizerError, OptimizerResult, ProblemError, ProblemResult,
    };
    pub use crate::core::problem::{
        CountingProblem, CriticalPoint, CriticalPointKind, Domain, Problem, ProblemFunctions,
    };
    pub use crate::core::types::{constants, DMatrix, DVector, Vector2};
    pub use crate::numerical::derivative_check::DerivativeChecker;
    pub use crate::numerical::linalg::{
        condition_number, damped_solve, eigenvalues_2x2, is_positive_definite, mean_abs_step,
        symmetric_eigenvalues, DampedSolution, SolveMethod,
    };
    pub use crate::optimization::line_search::{
        ArmijoBacktracking, LineSearchMode, LineSearchParams, LineSearchResult, LineSearchTrace,
        LineSearchTrial,
    };
    pub use crate::optimization::optimizer::{
        validate_initial_point, Optimizer, StoppingCriterion, TerminationReason,
    };
    pub use crate::optimization::trace::{IterationBase, IterationRecord, OptimizationTrace};
}
