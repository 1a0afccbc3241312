//! Basin-of-convergence sweeps.
//!
//! Every grid cell is an independent run of the same algorithm from a
//! different starting point. With the `parallel` feature the cells are
//! spread over rayon's thread pool; each result lands in its own slot and
//! the grid is reassembled in row-major order, so the output does not depend
//! on scheduling.
//!
//! # Classification
//!
//! | outcome | condition |
//! |---|---|
//! | diverged | run ended `Diverged` or `SingularSystem` |
//! | converged | run ended in a convergence state and ‖∇f(final)‖ < gtol |
//! | stalled | anything else |
//!
//! A run that stops on the function-change or step test far from a
//! stationary point therefore counts as stalled, not converged.

use crate::error::{BasinError, BasinResult};
use crate::grid::{grid_point, initialize_basin_data, BasinBounds, BasinData, BasinPoint};
use descentlab_core::core::{
    problem::Problem,
    types::{DVector, Vector2},
};
use descentlab_optim::algorithm::{run, AlgorithmConfig, AlgorithmTrace};
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to sweep and with which algorithm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BasinRequest {
    /// Cells per axis
    pub resolution: usize,
    /// Swept rectangle over the first two variables
    pub bounds: BasinBounds,
    /// Algorithm run from every cell
    pub algorithm: AlgorithmConfig,
    /// Fixed third coordinate, required for three-variable problems
    pub slice: Option<f64>,
}

impl BasinRequest {
    /// Creates a request without a third coordinate.
    pub fn new(resolution: usize, bounds: BasinBounds, algorithm: AlgorithmConfig) -> Self {
        Self {
            resolution,
            bounds,
            algorithm,
            slice: None,
        }
    }

    /// Fixes the third coordinate (the bias of the classification problems).
    pub fn with_slice(mut self, value: f64) -> Self {
        self.slice = Some(value);
        self
    }
}

/// Classifies a finished run.
fn classify(trace: &AlgorithmTrace, gradient_tolerance: f64) -> BasinPoint {
    let termination = trace.termination();
    let diverged = termination.is_failure();
    let converged =
        !diverged && termination.is_converged() && trace.final_grad_norm() < gradient_tolerance;
    let final_point = trace.final_point();

    BasinPoint {
        converged,
        diverged,
        stalled: !converged && !diverged,
        convergence_loc: Vector2::new(final_point[0], final_point[1]),
        iterations_used: trace.iterations(),
        final_loss: trace.final_loss(),
        termination: Some(termination),
    }
}

/// Runs `algorithm` from `initial_point` and classifies the outcome.
///
/// # Errors
/// Returns the runner's configuration errors (invalid parameters, wrong
/// dimension, missing Hessian).
pub fn compute_basin_point<P: Problem + ?Sized>(
    initial_point: &DVector,
    problem: &P,
    algorithm: &AlgorithmConfig,
) -> BasinResult<BasinPoint> {
    let trace = run(problem, initial_point, algorithm)?;
    Ok(classify(&trace, algorithm.stopping().gradient_tolerance))
}

/// Starting point of a cell, extended by the slice for three-variable problems.
fn starting_point(start: Vector2, slice: Option<f64>) -> DVector {
    match slice {
        Some(z) => DVector::from_vec(vec![start.x, start.y, z]),
        None => DVector::from_vec(vec![start.x, start.y]),
    }
}

/// Sweeps every cell of the requested grid.
///
/// # Errors
/// Fails before any run on an invalid grid, a missing slice for a
/// three-variable problem, or an invalid algorithm configuration.
///
/// # Example
///
/// ```
/// use descentlab_basin::{compute_basin, BasinBounds, BasinRequest};
/// use descentlab_core::prelude::*;
/// use descentlab_optim::AlgorithmConfig;
///
/// let bowl = ProblemFunctions::new(
///     "bowl",
///     2,
///     |w: &DVector| 0.5 * w.norm_squared(),
///     |w: &DVector| w.clone(),
///     Domain::cube(-1.0, 1.0, 2),
/// )
/// .unwrap();
///
/// let request = BasinRequest::new(5, BasinBounds::square(-1.0, 1.0), AlgorithmConfig::lbfgs(5));
/// let data = compute_basin(&bowl, &request).unwrap();
/// assert_eq!(data.summary().converged, 25);
/// ```
pub fn compute_basin<P: Problem + ?Sized>(
    problem: &P,
    request: &BasinRequest,
) -> BasinResult<BasinData> {
    let mut data = initialize_basin_data(request.resolution, request.bounds)?;
    request.algorithm.validate()?;

    data.slice = match (problem.dimension(), request.slice) {
        (3, None) => return Err(BasinError::missing_slice(problem.name(), 3)),
        (3, slice) => slice,
        _ => None,
    };

    let resolution = data.resolution;
    let starts: Vec<DVector> = (0..resolution * resolution)
        .map(|index| {
            let start = grid_point(&data, index / resolution, index % resolution);
            starting_point(start, data.slice)
        })
        .collect();

    debug!(
        problem = problem.name(),
        algorithm = %request.algorithm.kind(),
        cells = starts.len(),
        "starting basin sweep"
    );

    #[cfg(feature = "parallel")]
    let cells: Vec<BasinPoint> = starts
        .par_iter()
        .map(|start| compute_basin_point(start, problem, &request.algorithm))
        .collect::<BasinResult<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let cells: Vec<BasinPoint> = starts
        .iter()
        .map(|start| compute_basin_point(start, problem, &request.algorithm))
        .collect::<BasinResult<_>>()?;

    data.points = cells
        .chunks(resolution)
        .map(<[BasinPoint]>::to_vec)
        .collect();

    let summary = data.summary();
    info!(
        problem = problem.name(),
        algorithm = %request.algorithm.kind(),
        resolution,
        converged = summary.converged,
        diverged = summary.diverged,
        stalled = summary.stalled,
        "basin sweep finished"
    );

    Ok(data)
}
