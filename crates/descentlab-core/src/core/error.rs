//! Error types for the optimization engine.
//!
//! Two families are defined here:
//!
//! - [`LinalgError`]: failures of the small dense linear algebra kernel
//!   (a damped Newton system that neither Cholesky nor LU can solve).
//! - [`OptimizerError`]: configuration and setup failures that abort a run
//!   before its first iteration, plus propagated linear algebra failures.
//!
//! Numerical non-convergence, divergence and forced line search steps are
//! *not* errors. They are recorded in the run's trace.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors raised by the linear algebra kernel.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LinalgError {
    /// The damped system (H + λI)p = −g could not be solved.
    ///
    /// Raised when the damped matrix is not positive definite and the LU
    /// fallback meets a zero (or relatively negligible) pivot, or produces a
    /// non-finite solution.
    #[error("Singular system: {dimension}x{dimension} matrix with damping {damping} is numerically singular")]
    SingularSystem {
        /// Order of the system
        dimension: usize,
        /// Damping that was added to the diagonal
        damping: f64,
    },

    /// A square matrix was required.
    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Operand shapes do not agree.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },
}

impl LinalgError {
    /// Create a SingularSystem error.
    pub fn singular_system(dimension: usize, damping: f64) -> Self {
        Self::SingularSystem { dimension, damping }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Errors raised while building a problem definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProblemError {
    /// The problem description is inconsistent (dimension, domain, parameters).
    #[error("Invalid problem definition: {reason}")]
    InvalidDefinition {
        /// Description of the inconsistency
        reason: String,
    },

    /// A dataset-backed problem received unusable data.
    #[error("Invalid dataset: {reason}")]
    InvalidDataset {
        /// Description of the issue
        reason: String,
    },
}

impl ProblemError {
    /// Create an InvalidDefinition error.
    pub fn invalid_definition<S: Into<String>>(reason: S) -> Self {
        Self::InvalidDefinition {
            reason: reason.into(),
        }
    }

    /// Create an InvalidDataset error.
    pub fn invalid_dataset<S: Into<String>>(reason: S) -> Self {
        Self::InvalidDataset {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while setting up or running an optimizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    /// Invalid optimizer configuration.
    ///
    /// This error occurs when the optimizer is configured with invalid
    /// parameters (e.g., zero iteration cap, negative damping, c1 outside (0, 1)).
    #[error("Invalid optimizer configuration: {reason} ({parameter} = {value})")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// Initial point does not match the problem dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Problem dimension
        expected: usize,
        /// Length of the supplied point
        actual: usize,
    },

    /// A second-order method was asked to run on a problem without a Hessian.
    #[error("Problem '{problem}' does not provide a Hessian")]
    MissingHessian {
        /// Name of the problem
        problem: String,
    },

    /// Propagated linear algebra error.
    #[error("Linear algebra failure: {0}")]
    Linalg(#[from] LinalgError),
}

impl OptimizerError {
    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create a MissingHessian error.
    pub fn missing_hessian<S: Into<String>>(problem: S) -> Self {
        Self::MissingHessian {
            problem: problem.into(),
        }
    }
}

/// Result type alias for linear algebra operations.
pub type LinalgResult<T> = std::result::Result<T, LinalgError>;

/// Result type alias for problem construction.
pub type ProblemResult<T> = std::result::Result<T, ProblemError>;

/// Result type alias for optimizer operations.
pub type OptimizerResult<T> = std::result::Result<T, OptimizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linalg_error_creation() {
        let err = LinalgError::singular_system(2, 0.0);
        assert!(matches!(err, LinalgError::SingularSystem { .. }));
        assert!(err.to_string().contains("numerically singular"));

        let err = LinalgError::dimension_mismatch("2x2", "3x3");
        assert_eq!(err.to_string(), "Dimension mismatch: expected 2x2, got 3x3");
    }

    #[test]
    fn test_optimizer_error_creation() {
        let err = OptimizerError::invalid_configuration("must be in (0, 1)", "c1", "1.5");
        assert!(matches!(err, OptimizerError::InvalidConfiguration { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid optimizer configuration: must be in (0, 1) (c1 = 1.5)"
        );

        let err = OptimizerError::dimension_mismatch(2, 3);
        assert_eq!(err.to_string(), "Dimension mismatch: expected 2, got 3");

        let err = OptimizerError::missing_hessian("saddle");
        assert!(err.to_string().contains("saddle"));
    }

    #[test]
    fn test_problem_error_creation() {
        let err = ProblemError::invalid_definition("dimension must be 2 or 3");
        assert_eq!(
            err.to_string(),
            "Invalid problem definition: dimension must be 2 or 3"
        );
        let err = ProblemError::invalid_dataset("no points");
        assert!(matches!(err, ProblemError::InvalidDataset { .. }));
    }

    #[test]
    fn test_optimizer_error_context() {
        let err = OptimizerError::invalid_configuration("must be positive", "memory_size", "0");

        if let OptimizerError::InvalidConfiguration {
            reason,
            parameter,
            value,
        } = err
        {
            assert_eq!(reason, "must be positive");
            assert_eq!(parameter, "memory_size");
            assert_eq!(value, "0");
        } else {
            panic!("Expected InvalidConfiguration variant");
        }
    }

    #[test]
    fn test_linalg_error_propagation() {
        let linalg_err = LinalgError::singular_system(3, 0.5);
        let optimizer_err: OptimizerError = linalg_err.clone().into();

        assert_eq!(optimizer_err, OptimizerError::Linalg(linalg_err));
        assert!(optimizer_err
            .to_string()
            .contains("Linear algebra failure"));
    }
}
