//! Damped Newton's method.
//!
//! # Mathematical Foundation
//!
//! Each iteration solves the damped Newton system
//!
//! ```text
//! (∇²f(w) + λI) p = −∇f(w)
//! ```
//!
//! by Cholesky factorization when the damped matrix is positive definite and
//! by LU with partial pivoting otherwise. The step w ← w + α p uses α from
//! Armijo backtracking or α = 1.
//!
//! ## Indefinite Hessians
//!
//! With an indefinite Hessian the Newton direction can point uphill and the
//! iteration is attracted to saddles and maxima just as readily as to
//! minima. This runner reproduces that behaviour rather than correcting it:
//! every record carries the Hessian spectrum so the caller can tell a
//! minimum from a saddle. Damping λ > 0 shifts the spectrum by λ, which
//! only restores definiteness once λ exceeds the most negative eigenvalue.
//!
//! A system that cannot be solved ends the run with
//! [`TerminationReason::SingularSystem`] and the trace keeps every
//! iteration completed so far.

use descentlab_core::{
    core::{
        error::{OptimizerError, OptimizerResult},
        problem::{CountingProblem, Problem},
        types::{DMatrix, DVector},
    },
    numerical::linalg::{condition_number, damped_solve, symmetric_eigenvalues, SolveMethod},
    optimization::{
        line_search::{ArmijoBacktracking, LineSearchMode, LineSearchParams},
        optimizer::{validate_initial_point, Optimizer, StoppingCriterion, TerminationReason},
        trace::{IterationBase, IterationRecord, OptimizationTrace},
    },
};
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the damped Newton method.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewtonConfig {
    /// Damping λ added to the Hessian diagonal
    pub hessian_damping: f64,
    /// Whether to backtrack along the Newton direction
    pub line_search_mode: LineSearchMode,
    /// Line search parameters
    pub line_search_params: LineSearchParams,
    /// Stopping criterion
    pub stopping: StoppingCriterion,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            hessian_damping: 0.0,
            line_search_mode: LineSearchMode::Armijo,
            line_search_params: LineSearchParams::default(),
            stopping: StoppingCriterion::default(),
        }
    }
}

impl NewtonConfig {
    /// Create a new Newton configuration with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Hessian damping λ
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.hessian_damping = damping;
        self
    }

    /// Set the line search mode
    pub fn with_line_search_mode(mut self, mode: LineSearchMode) -> Self {
        self.line_search_mode = mode;
        self
    }

    /// Set the line search parameters
    pub fn with_line_search_params(mut self, params: LineSearchParams) -> Self {
        self.line_search_params = params;
        self
    }

    /// Set the stopping criterion
    pub fn with_stopping(mut self, stopping: StoppingCriterion) -> Self {
        self.stopping = stopping;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> OptimizerResult<()> {
        if !(self.hessian_damping.is_finite() && self.hessian_damping >= 0.0) {
            return Err(OptimizerError::invalid_configuration(
                "Hessian damping must be non-negative",
                "hessian_damping",
                self.hessian_damping.to_string(),
            ));
        }
        if self.line_search_mode == LineSearchMode::Armijo {
            self.line_search_params.validate()?;
        }
        self.stopping.validate()
    }
}

/// Newton iteration with second-order diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewtonIteration {
    /// Common fields
    pub base: IterationBase,
    /// Hessian at `w_old`, undamped
    pub hessian: DMatrix,
    /// Hessian eigenvalues, descending
    pub eigenvalues: DVector,
    /// max|λ| / min|λ| of the undamped Hessian
    pub condition_number: f64,
    /// Damping added before solving
    pub damping: f64,
    /// Decomposition that solved the system
    pub solve_method: SolveMethod,
}

impl NewtonIteration {
    /// Returns `true` if the undamped Hessian was positive definite.
    pub fn hessian_positive_definite(&self) -> bool {
        self.eigenvalues.iter().all(|l| *l > 0.0)
    }
}

impl IterationRecord for NewtonIteration {
    fn base(&self) -> &IterationBase {
        &self.base
    }
}

/// Damped Newton runner.
///
/// # Examples
///
/// ```
/// use descentlab_core::prelude::*;
/// use descentlab_optim::{Newton, NewtonConfig};
///
/// let bowl = ProblemFunctions::new(
///     "bowl",
///     2,
///     |w: &DVector| 0.5 * w.norm_squared(),
///     |w: &DVector| w.clone(),
///     Domain::cube(-2.0, 2.0, 2),
/// )
/// .unwrap()
/// .with_hessian(|_w: &DVector| DMatrix::identity(2, 2));
///
/// let trace = Newton::new(NewtonConfig::new())
///     .optimize(&bowl, &DVector::from_vec(vec![1.5, -0.5]))
///     .unwrap();
/// assert_eq!(trace.iterations(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Newton {
    config: NewtonConfig,
}

impl Newton {
    /// Creates a runner with the given configuration.
    pub fn new(config: NewtonConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }
}

impl Optimizer for Newton {
    type Record = NewtonIteration;

    fn name(&self) -> &str {
        "Newton"
    }

    fn optimize<P: Problem + ?Sized>(
        &self,
        problem: &P,
        initial_point: &DVector,
    ) -> OptimizerResult<OptimizationTrace<NewtonIteration>> {
        self.config.validate()?;
        validate_initial_point(problem, initial_point)?;
        if !problem.has_hessian() {
            return Err(OptimizerError::missing_hessian(problem.name()));
        }

        let stopping = &self.config.stopping;
        let damping = self.config.hessian_damping;
        let line_search = ArmijoBacktracking::new(self.config.line_search_params.clone());
        let counting = CountingProblem::new(problem);

        let mut w = initial_point.clone();
        let mut loss = counting.objective(&w);
        let mut grad = counting.gradient(&w);
        let mut grad_norm = grad.norm();
        let mut records: Vec<NewtonIteration> = Vec::new();
        let mut failure = None;

        let termination = if grad_norm < stopping.gradient_tolerance {
            TerminationReason::ConvergedGradient
        } else {
            loop {
                let hessian = counting
                    .hessian(&w)
                    .ok_or_else(|| OptimizerError::missing_hessian(problem.name()))?;
                let eigenvalues = symmetric_eigenvalues(&hessian)?;

                let solution = match damped_solve(&hessian, &grad, damping) {
                    Ok(solution) => solution,
                    Err(err) => {
                        warn!(
                            iteration = records.len(),
                            damping,
                            error = %err,
                            "damped Newton system could not be solved"
                        );
                        failure = Some(err);
                        break TerminationReason::SingularSystem;
                    }
                };
                let direction = solution.direction;

                let (alpha, w_new, new_loss, line_search_trace) =
                    match self.config.line_search_mode {
                        LineSearchMode::Armijo => {
                            let result =
                                line_search.search(&counting, &w, loss, &grad, &direction);
                            (
                                result.step_size,
                                result.new_point,
                                result.new_value,
                                Some(result.trace),
                            )
                        }
                        LineSearchMode::None => {
                            let w_new = &w + &direction;
                            let new_loss = counting.objective(&w_new);
                            (1.0, w_new, new_loss, None)
                        }
                    };

                if stopping.has_diverged(new_loss, &w_new) {
                    break TerminationReason::Diverged;
                }

                let new_grad = counting.gradient(&w_new);
                let new_grad_norm = new_grad.norm();
                let cond = condition_number(&eigenvalues);

                debug!(
                    iteration = records.len(),
                    loss = new_loss,
                    grad_norm = new_grad_norm,
                    alpha,
                    condition_number = cond,
                    method = ?solution.method,
                    "Newton step"
                );

                let verdict = stopping.check_step(
                    records.len() + 1,
                    &w,
                    &w_new,
                    loss,
                    new_loss,
                    new_grad_norm,
                    line_search_trace.as_ref().is_some_and(|t| t.degenerate),
                );

                records.push(NewtonIteration {
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
                        line_search: line_search_trace,
                    },
                    hessian,
                    eigenvalues,
                    condition_number: cond,
                    damping,
                    solve_method: solution.method,
                });

                w = w_new;
                loss = new_loss;
                grad = new_grad;
                grad_norm = new_grad_norm;

                if let Some(reason) = verdict {
                    break reason;
                }
            }
        };

        info!(
            algorithm = self.name(),
            problem = problem.name(),
            iterations = records.len(),
            ?termination,
            final_loss = loss,
            "run finished"
        );

        let trace =
            OptimizationTrace::new(records, initial_point.clone(), w, loss, grad_norm, termination)
                .with_evaluations(counting.counts());
        Ok(match failure {
            Some(err) => trace.with_failure(err),
            None => trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use descentlab_core::{
        core::problem::{Domain, ProblemFunctions},
        utils::test_helpers::{diagonal_quadratic, pure_saddle},
    };

    #[test]
    fn test_config_validation() {
        assert!(NewtonConfig::default().validate().is_ok());
        let err = NewtonConfig::new().with_damping(-1.0).validate().unwrap_err();
        assert!(matches!(
            err,
            OptimizerError::InvalidConfiguration { ref parameter, .. } if parameter == "hessian_damping"
        ));
        assert!(NewtonConfig::new().with_damping(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_invalid_line_search_ignored_without_search() {
        let config = NewtonConfig::new()
            .with_line_search_mode(LineSearchMode::None)
            .with_line_search_params(LineSearchParams::new().with_c1(2.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_exact_on_quadratic() {
        let problem = diagonal_quadratic(4.0, 0.5);
        let trace = Newton::default()
            .optimize(&problem, &DVector::from_vec(vec![2.0, -1.0]))
            .unwrap();

        assert_eq!(trace.iterations(), 1);
        assert_eq!(trace.termination, TerminationReason::ConvergedGradient);
        let record = &trace.records[0];
        assert_eq!(record.solve_method, SolveMethod::Cholesky);
        assert_relative_eq!(record.eigenvalues[0], 4.0);
        assert_relative_eq!(record.eigenvalues[1], 0.5);
        assert_relative_eq!(record.condition_number, 8.0);
        assert_relative_eq!(trace.final_point.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_undamped_newton_jumps_to_saddle() {
        // On a quadratic saddle the full Newton step lands exactly on the
        // stationary point, which is not a minimum.
        let problem = pure_saddle();
        let trace = Newton::new(NewtonConfig::new().with_line_search_mode(LineSearchMode::None))
            .optimize(&problem, &DVector::from_vec(vec![0.7, -0.3]))
            .unwrap();

        assert_eq!(trace.termination, TerminationReason::ConvergedGradient);
        assert_relative_eq!(trace.final_point.norm(), 0.0, epsilon = 1e-12);
        let record = &trace.records[0];
        assert!(!record.hessian_positive_definite());
        assert_eq!(record.solve_method, SolveMethod::Lu);
    }

    #[test]
    fn test_singular_system_keeps_partial_trace() {
        // Hessian diag(1, 0) with no damping cannot be solved
        let problem = ProblemFunctions::new(
            "flat valley",
            2,
            |w: &DVector| 0.5 * w[0] * w[0] + w[1],
            |w: &DVector| DVector::from_vec(vec![w[0], 1.0]),
            Domain::cube(-1.0, 1.0, 2),
        )
        .unwrap()
        .with_hessian(|_w: &DVector| DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]));

        let trace = Newton::default()
            .optimize(&problem, &DVector::from_vec(vec![0.5, 0.5]))
            .unwrap();
        assert_eq!(trace.termination, TerminationReason::SingularSystem);
        assert_eq!(trace.iterations(), 0);
        assert!(trace.failure.is_some());

        // Damping makes the same system solvable
        let damped = Newton::new(
            NewtonConfig::new()
                .with_damping(1.0)
                .with_stopping(StoppingCriterion::new().with_max_iterations(3)),
        )
        .optimize(&problem, &DVector::from_vec(vec![0.5, 0.5]))
        .unwrap();
        assert_ne!(damped.termination, TerminationReason::SingularSystem);
        assert!(damped.failure.is_none());
    }

    #[test]
    fn test_missing_hessian_fails_fast() {
        let problem = ProblemFunctions::new(
            "no hessian",
            2,
            |w: &DVector| w.norm_squared(),
            |w: &DVector| w * 2.0,
            Domain::cube(-1.0, 1.0, 2),
        )
        .unwrap();

        let err = Newton::default()
            .optimize(&problem, &DVector::from_vec(vec![0.5, 0.5]))
            .unwrap_err();
        assert_eq!(err, OptimizerError::missing_hessian("no hessian"));
    }

    #[test]
    fn test_zero_iterations_at_stationary_start() {
        let problem = diagonal_quadratic(1.0, 2.0);
        let trace = Newton::default()
            .optimize(&problem, &DVector::zeros(2))
            .unwrap();
        assert_eq!(trace.iterations(), 0);
        assert_eq!(trace.termination, TerminationReason::ConvergedGradient);
        assert_eq!(trace.hessian_evaluations, 0);
    }
}
