//! Armijo backtracking line search.
//!
//! # Mathematical Foundation
//!
//! Given a point w, a search direction p and the gradient g = ∇f(w), the
//! line search looks for a step α along p satisfying the Armijo
//! (sufficient decrease) condition
//!
//! ```text
//! f(w + α p) ≤ f(w) + c₁ α gᵀp,        0 < c₁ < 1
//! ```
//!
//! Trials start at α₀ (1 by default) and contract geometrically,
//! αₖ₊₁ = ρ αₖ (ρ = ½ halves the step). A trial whose objective is not
//! finite always fails.
//!
//! ## Forced steps
//!
//! If no trial satisfies the condition within `max_trials`, the smallest
//! tried step is accepted anyway and the result is flagged
//! [`degenerate`](LineSearchTrace::degenerate). Callers keep iterating and
//! skip the function-change and step-size tests for that step. This
//! happens when p is not a descent direction (gᵀp ≥ 0), typically a Newton
//! direction computed from an indefinite Hessian, and is what makes Newton
//! "crawl" through saddle regions instead of stopping.
//!
//! # Example
//!
//! ```
//! use descentlab_core::prelude::*;
//!
//! let bowl = ProblemFunctions::new(
//!     "bowl",
//!     2,
//!     |w: &DVector| w.norm_squared(),
//!     |w: &DVector| w * 2.0,
//!     Domain::cube(-2.0, 2.0, 2),
//! )
//! .unwrap();
//!
//! let w = DVector::from_vec(vec![1.0, 1.0]);
//! let g = bowl.gradient(&w);
//! let p = -&g;
//! let result = ArmijoBacktracking::new(LineSearchParams::default())
//!     .search(&bowl, &w, bowl.objective(&w), &g, &p);
//!
//! assert_eq!(result.step_size, 0.5);
//! assert!(!result.trace.degenerate);
//! ```

use crate::core::error::{OptimizerError, OptimizerResult};
use crate::core::problem::Problem;
use crate::core::types::{constants, DVector};
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the backtracking search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSearchParams {
    /// Sufficient decrease constant c₁ ∈ (0, 1).
    pub c1: f64,
    /// Contraction factor ρ ∈ (0, 1).
    pub rho: f64,
    /// First trial step α₀ > 0.
    pub initial_step_size: f64,
    /// Number of trials before the smallest step is forced (≥ 1).
    ///
    /// α₀ counts as the first trial, so the smallest step tried is
    /// α₀·ρ^(max_trials − 1).
    pub max_trials: usize,
}

impl Default for LineSearchParams {
    fn default() -> Self {
        Self {
            c1: constants::ARMIJO_C1,
            rho: constants::BACKTRACKING_RHO,
            initial_step_size: 1.0,
            max_trials: constants::MAX_LINE_SEARCH_TRIALS,
        }
    }
}

impl LineSearchParams {
    /// Creates parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sufficient decrease constant.
    pub fn with_c1(mut self, c1: f64) -> Self {
        self.c1 = c1;
        self
    }

    /// Sets the contraction factor.
    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    /// Sets the first trial step.
    pub fn with_initial_step_size(mut self, alpha: f64) -> Self {
        self.initial_step_size = alpha;
        self
    }

    /// Sets the trial cap.
    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials;
        self
    }

    /// Validates the parameters.
    pub fn validate(&self) -> OptimizerResult<()> {
        if !(self.c1 > 0.0 && self.c1 < 1.0) {
            return Err(OptimizerError::invalid_configuration(
                "Armijo constant must be in (0, 1)",
                "c1",
                self.c1.to_string(),
            ));
        }
        if !(self.rho > 0.0 && self.rho < 1.0) {
            return Err(OptimizerError::invalid_configuration(
                "contraction factor must be in (0, 1)",
                "rho",
                self.rho.to_string(),
            ));
        }
        if !(self.initial_step_size > 0.0 && self.initial_step_size.is_finite()) {
            return Err(OptimizerError::invalid_configuration(
                "initial step size must be positive and finite",
                "initial_step_size",
                self.initial_step_size.to_string(),
            ));
        }
        if self.max_trials == 0 {
            return Err(OptimizerError::invalid_configuration(
                "at least one trial is required",
                "max_trials",
                "0",
            ));
        }
        Ok(())
    }
}

/// Whether second-order runners search along their direction or take the full step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineSearchMode {
    /// Armijo backtracking.
    #[default]
    Armijo,
    /// Always take α = 1.
    None,
}

/// A single trial of the search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSearchTrial {
    /// Trial step.
    pub alpha: f64,
    /// f(w + α p).
    pub loss: f64,
}

/// Diagnostic record of one search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSearchTrace {
    /// Trials in the order they were evaluated.
    pub trials: Vec<LineSearchTrial>,
    /// Directional derivative gᵀp.
    pub directional_derivative: f64,
    /// Step that was finally taken.
    pub accepted_alpha: f64,
    /// The trial cap was reached and the smallest step was forced.
    pub degenerate: bool,
}

impl LineSearchTrace {
    /// Returns `true` if p was a descent direction (gᵀp < 0).
    pub fn is_descent_direction(&self) -> bool {
        self.directional_derivative < 0.0
    }
}

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSearchResult {
    /// Accepted step size.
    pub step_size: f64,
    /// w + α p.
    pub new_point: DVector,
    /// f(w + α p).
    pub new_value: f64,
    /// Trials and flags.
    pub trace: LineSearchTrace,
}

impl LineSearchResult {
    /// Number of objective evaluations spent.
    pub fn function_evals(&self) -> usize {
        self.trace.trials.len()
    }
}

/// Backtracking search enforcing the Armijo condition.
#[derive(Debug, Clone, Default)]
pub struct ArmijoBacktracking {
    params: LineSearchParams,
}

impl ArmijoBacktracking {
    /// Creates a search with the given parameters.
    pub fn new(params: LineSearchParams) -> Self {
        Self { params }
    }

    /// Parameters in use.
    pub fn params(&self) -> &LineSearchParams {
        &self.params
    }

    /// Searches along `direction` from `point`.
    ///
    /// `value` and `gradient` must be f and ∇f at `point`. The search never
    /// fails: when the cap is reached the last (smallest) trial is accepted
    /// and flagged as degenerate.
    pub fn search<P: Problem + ?Sized>(
        &self,
        problem: &P,
        point: &DVector,
        value: f64,
        gradient: &DVector,
        direction: &DVector,
    ) -> LineSearchResult {
        let directional_derivative = gradient.dot(direction);
        let mut trials = Vec::with_capacity(self.params.max_trials);
        let mut alpha = self.params.initial_step_size;

        for _ in 0..self.params.max_trials {
            let candidate = point + direction * alpha;
            let loss = problem.objective(&candidate);
            trials.push(LineSearchTrial { alpha, loss });

            if loss.is_finite() && loss <= value + self.params.c1 * alpha * directional_derivative
            {
                return LineSearchResult {
                    step_size: alpha,
                    new_point: candidate,
                    new_value: loss,
                    trace: LineSearchTrace {
                        trials,
                        directional_derivative,
                        accepted_alpha: alpha,
                        degenerate: false,
                    },
                };
            }

            alpha *= self.params.rho;
        }

        let (forced_alpha, forced_loss) = trials
            .last()
            .map_or((0.0, value), |trial| (trial.alpha, trial.loss));

        warn!(
            trials = trials.len(),
            alpha = forced_alpha,
            directional_derivative,
            "Armijo condition not met within trial cap, forcing smallest step"
        );

        LineSearchResult {
            step_size: forced_alpha,
            new_point: point + direction * forced_alpha,
            new_value: forced_loss,
            trace: LineSearchTrace {
                trials,
                directional_derivative,
                accepted_alpha: forced_alpha,
                degenerate: true,
            },
        }
    }
}
