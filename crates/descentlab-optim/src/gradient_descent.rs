//! Gradient descent with a fixed step or Armijo backtracking.
//!
//! # Algorithm
//!
//! ```text
//! g = ∇f(w)
//! while ‖g‖ > gtol and k < max_iterations:
//!     p = −g
//!     α = fixed step, or Armijo backtracking along p
//!     w ← w + α p
//!     g = ∇f(w)
//! ```
//!
//! A fixed step larger than 2/L (L the largest Hessian eigenvalue) makes the
//! iterates oscillate and eventually blow up; that run ends with
//! [`TerminationReason::Diverged`] and the offending step is not recorded.
//!
//! Only the gradient test, the iteration cap and the divergence guard apply
//! here. Function-change and step-size tests are reserved for the
//! second-order runners.

use descentlab_core::{
    core::{
        error::{OptimizerError, OptimizerResult},
        problem::{CountingProblem, Problem},
        types::{constants, DVector},
    },
    optimization::{
        line_search::{ArmijoBacktracking, LineSearchParams},
        optimizer::{validate_initial_point, Optimizer, StoppingCriterion, TerminationReason},
        trace::{IterationBase, IterationRecord, OptimizationTrace},
    },
};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the step length is chosen.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StepRule {
    /// Constant learning rate α.
    Fixed(f64),
    /// Armijo backtracking from the configured initial step.
    Armijo(LineSearchParams),
}

impl Default for StepRule {
    fn default() -> Self {
        Self::Fixed(constants::DEFAULT_LEARNING_RATE)
    }
}

/// Configuration for gradient descent.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GradientDescentConfig {
    /// Step length rule
    pub step_rule: StepRule,
    /// Stopping criterion
    pub stopping: StoppingCriterion,
}

impl GradientDescentConfig {
    /// Creates a configuration with a fixed step of 0.1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a constant step `alpha`.
    pub fn with_fixed_step(mut self, alpha: f64) -> Self {
        self.step_rule = StepRule::Fixed(alpha);
        self
    }

    /// Uses Armijo backtracking with the given parameters.
    pub fn with_line_search(mut self, params: LineSearchParams) -> Self {
        self.step_rule = StepRule::Armijo(params);
        self
    }

    /// Sets the stopping criterion.
    pub fn with_stopping(mut self, stopping: StoppingCriterion) -> Self {
        self.stopping = stopping;
        self
    }

    /// Returns `true` if the step is chosen by line search.
    pub fn uses_line_search(&self) -> bool {
        matches!(self.step_rule, StepRule::Armijo(_))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> OptimizerResult<()> {
        match &self.step_rule {
            StepRule::Fixed(alpha) if !(alpha.is_finite() && *alpha > 0.0) => {
                return Err(OptimizerError::invalid_configuration(
                    "fixed step must be positive and finite",
                    "alpha",
                    alpha.to_string(),
                ));
            }
            StepRule::Fixed(_) => {}
            StepRule::Armijo(params) => params.validate()?,
        }
        self.stopping.validate()
    }
}

/// A gradient descent iteration carries no diagnostics beyond the common fields.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GradientDescentIteration {
    /// Common fields
    pub base: IterationBase,
}

impl IterationRecord for GradientDescentIteration {
    fn base(&self) -> &IterationBase {
        &self.base
    }
}

/// Steepest descent runner.
///
/// # Examples
///
/// ```
/// use descentlab_core::prelude::*;
/// use descentlab_optim::{GradientDescent, GradientDescentConfig};
///
/// let bowl = ProblemFunctions::new(
///     "bowl",
///     2,
///     |w: &DVector| 0.5 * w.norm_squared(),
///     |w: &DVector| w.clone(),
///     Domain::cube(-2.0, 2.0, 2),
/// )
/// .unwrap();
///
/// let gd = GradientDescent::new(GradientDescentConfig::new().with_fixed_step(0.5));
/// let trace = gd.optimize(&bowl, &DVector::from_vec(vec![1.0, -1.0])).unwrap();
/// assert_eq!(trace.termination, TerminationReason::ConvergedGradient);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GradientDescent {
    config: GradientDescentConfig,
}

impl GradientDescent {
    /// Creates a runner with the given configuration.
    pub fn new(config: GradientDescentConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GradientDescentConfig {
        &self.config
    }
}

impl Optimizer for GradientDescent {
    type Record = GradientDescentIteration;

    fn name(&self) -> &str {
        if self.config.uses_line_search() {
            "GD (line search)"
        } else {
            "GD (fixed step)"
        }
    }

    fn optimize<P: Problem + ?Sized>(
        &self,
        problem: &P,
        initial_point: &DVector,
    ) -> OptimizerResult<OptimizationTrace<GradientDescentIteration>> {
        self.config.validate()?;
        validate_initial_point(problem, initial_point)?;

        let stopping = &self.config.stopping;
        let counting = CountingProblem::new(problem);

        let mut w = initial_point.clone();
        let mut loss = counting.objective(&w);
        let mut grad = counting.gradient(&w);
        let mut grad_norm = grad.norm();
        let mut records = Vec::new();

        let termination = loop {
            if grad_norm <= stopping.gradient_tolerance {
                break TerminationReason::ConvergedGradient;
            }
            if records.len() >= stopping.max_iterations {
                break TerminationReason::MaxIterations;
            }

            let direction = -&grad;
            let (alpha, w_new, new_loss, line_search) = match &self.config.step_rule {
                StepRule::Fixed(alpha) => {
                    let w_new = &w + &direction * *alpha;
                    let new_loss = counting.objective(&w_new);
                    (*alpha, w_new, new_loss, None)
                }
                StepRule::Armijo(params) => {
                    let result = ArmijoBacktracking::new(params.clone())
                        .search(&counting, &w, loss, &grad, &direction);
                    (
                        result.step_size,
                        result.new_point,
                        result.new_value,
                        Some(result.trace),
                    )
                }
            };

            if stopping.has_diverged(new_loss, &w_new) {
                break TerminationReason::Diverged;
            }

            let new_grad = counting.gradient(&w_new);
            let new_grad_norm = new_grad.norm();

            debug!(
                iteration = records.len(),
                loss = new_loss,
                grad_norm = new_grad_norm,
                alpha,
                "gradient descent step"
            );

            records.push(GradientDescentIteration {
                base: IterationBase {
                    iteration: records.len(),
                    w_old: w.clone(),
                    w_new: w_new.clone(),
                    loss,
                    grad,
                    grad_norm,
                    direction,
                    alpha,
                    new_loss,
                    new_grad_norm,
                    line_search,
                },
            });

            w = w_new;
            loss = new_loss;
            grad = new_grad;
            grad_norm = new_grad_norm;
        };

        info!(
            algorithm = self.name(),
            problem = problem.name(),
            iterations = records.len(),
            ?termination,
            final_loss = loss,
            "run finished"
        );

        Ok(
            OptimizationTrace::new(records, initial_point.clone(), w, loss, grad_norm, termination)
                .with_evaluations(counting.counts()),
        )
    }
}
