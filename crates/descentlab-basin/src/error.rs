//! Error types for basin sweeps.

use descentlab_core::core::error::OptimizerError;
use thiserror::Error;

/// Errors raised before a basin sweep starts.
///
/// Per-cell outcomes (divergence, stalls, singular systems) are never
/// errors; they are recorded in the [`BasinPoint`](crate::grid::BasinPoint)
/// of the cell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BasinError {
    /// The grid needs at least one cell per axis.
    #[error("Invalid grid resolution: {resolution} (must be at least 1)")]
    InvalidResolution {
        /// Requested resolution
        resolution: usize,
    },

    /// An axis range is empty, reversed or not finite.
    #[error("Invalid bounds on {axis} axis: [{min}, {max}]")]
    InvalidBounds {
        /// Axis name, "x" or "y"
        axis: String,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// A three-variable problem was swept without fixing the third coordinate.
    #[error("Problem '{problem}' has {dimension} variables; a fixed third coordinate is required")]
    MissingSlice {
        /// Problem name
        problem: String,
        /// Problem dimension
        dimension: usize,
    },

    /// The algorithm configuration or starting points were rejected.
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),
}

impl BasinError {
    /// Create an InvalidBounds error.
    pub fn invalid_bounds<S: Into<String>>(axis: S, min: f64, max: f64) -> Self {
        Self::InvalidBounds {
            axis: axis.into(),
            min,
            max,
        }
    }

    /// Create a MissingSlice error.
    pub fn missing_slice<S: Into<String>>(problem: S, dimension: usize) -> Self {
        Self::MissingSlice {
            problem: problem.into(),
            dimension,
        }
    }
}

/// Result type for basin operations.
pub type BasinResult<T> = Result<T, BasinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BasinError::invalid_bounds("x", 1.0, -1.0);
        assert_eq!(err.to_string(), "Invalid bounds on x axis: [1, -1]");

        let err = BasinError::missing_slice("logistic-regression", 3);
        assert!(err.to_string().contains("fixed third coordinate"));
    }

    #[test]
    fn test_optimizer_error_converts() {
        let err: BasinError = OptimizerError::missing_hessian("quadratic").into();
        assert!(matches!(err, BasinError::Optimizer(_)));
        assert_eq!(
            err.to_string(),
            OptimizerError::missing_hessian("quadratic").to_string()
        );
    }
}
