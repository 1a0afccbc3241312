//! Stopping criteria, termination states and the optimizer interface.
//!
//! # Termination
//!
//! Every run ends in exactly one [`TerminationReason`]. Second-order and
//! quasi-Newton runners test, after each step w → w_new:
//!
//! 1. loss or position is non-finite or beyond `divergence_threshold` → `Diverged`
//! 2. ‖∇f(w_new)‖ < gtol → `ConvergedGradient`
//! 3. |f(w_new) − f(w)| < ftol · (1 + |f(w)|) → `ConvergedFunctionChange`
//! 4. (1/n) Σ |w_new,i − w_i| < xtol → `ConvergedStep`
//! 5. iterations ≥ max_iterations → `MaxIterations`
//!
//! Gradient descent only uses the gradient test, the iteration cap and the
//! divergence guard. A damped system that cannot be solved ends the run with
//! `SingularSystem`.
//!
//! Reaching the iteration cap is a reportable outcome, not an error.

use crate::core::error::{OptimizerError, OptimizerResult};
use crate::core::problem::Problem;
use crate::core::types::{all_finite, constants, DVector};
use crate::numerical::linalg::mean_abs_step;
use crate::optimization::trace::{IterationRecord, OptimizationTrace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerminationReason {
    /// ‖∇f‖ fell below the gradient tolerance.
    ConvergedGradient,
    /// Relative change of f fell below the function tolerance.
    ConvergedFunctionChange,
    /// Mean absolute step fell below the point tolerance.
    ConvergedStep,
    /// Iteration cap exhausted.
    MaxIterations,
    /// Loss or position became non-finite or exceeded the divergence threshold.
    Diverged,
    /// The damped Newton system could not be solved.
    SingularSystem,
}

impl TerminationReason {
    /// Returns `true` for the three convergence states.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            Self::ConvergedGradient | Self::ConvergedFunctionChange | Self::ConvergedStep
        )
    }

    /// Returns `true` for states that abort a run early (divergence, singular system).
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Diverged | Self::SingularSystem)
    }
}

/// Conditions under which a run stops.
///
/// # Example
///
/// ```
/// use descentlab_core::prelude::*;
///
/// let criterion = StoppingCriterion::new()
///     .with_max_iterations(50)
///     .with_gradient_tolerance(1e-8);
/// assert!(criterion.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoppingCriterion {
    /// Maximum number of iterations (> 0).
    pub max_iterations: usize,
    /// gtol: stop when ‖∇f‖ drops below this.
    pub gradient_tolerance: f64,
    /// ftol: relative function-change tolerance.
    pub function_tolerance: f64,
    /// xtol: mean absolute step tolerance.
    pub point_tolerance: f64,
    /// Loss or position magnitude beyond which the run counts as diverged.
    pub divergence_threshold: f64,
}

impl Default for StoppingCriterion {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            gradient_tolerance: constants::GRADIENT_TOLERANCE,
            function_tolerance: constants::FUNCTION_TOLERANCE,
            point_tolerance: constants::POINT_TOLERANCE,
            divergence_threshold: constants::DIVERGENCE_THRESHOLD,
        }
    }
}

fn ensure_positive(value: f64, parameter: &str) -> OptimizerResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(OptimizerError::invalid_configuration(
            "must be positive and finite",
            parameter,
            value.to_string(),
        ))
    }
}

impl StoppingCriterion {
    /// Creates a criterion with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Sets the gradient tolerance.
    pub fn with_gradient_tolerance(mut self, tol: f64) -> Self {
        self.gradient_tolerance = tol;
        self
    }

    /// Sets the function change tolerance.
    pub fn with_function_tolerance(mut self, tol: f64) -> Self {
        self.function_tolerance = tol;
        self
    }

    /// Sets the point change tolerance.
    pub fn with_point_tolerance(mut self, tol: f64) -> Self {
        self.point_tolerance = tol;
        self
    }

    /// Sets the divergence threshold.
    pub fn with_divergence_threshold(mut self, threshold: f64) -> Self {
        self.divergence_threshold = threshold;
        self
    }

    /// Validates all fields.
    pub fn validate(&self) -> OptimizerResult<()> {
        if self.max_iterations == 0 {
            return Err(OptimizerError::invalid_configuration(
                "must be positive",
                "max_iterations",
                "0",
            ));
        }
        ensure_positive(self.gradient_tolerance, "gradient_tolerance")?;
        ensure_positive(self.function_tolerance, "function_tolerance")?;
        ensure_positive(self.point_tolerance, "point_tolerance")?;
        ensure_positive(self.divergence_threshold, "divergence_threshold")?;
        Ok(())
    }

    /// Returns `true` if the loss or the position has blown up.
    pub fn has_diverged(&self, loss: f64, point: &DVector) -> bool {
        !loss.is_finite()
            || !all_finite(point)
            || loss.abs() > self.divergence_threshold
            || point.amax() > self.divergence_threshold
    }

    /// Post-step convergence tests for Newton-type runners.
    ///
    /// `iterations` is the number of completed iterations including this one.
    /// Divergence must be checked separately, before recording the step.
    ///
    /// A `degenerate` step was forced after the line search exhausted its
    /// trials; its tiny loss change and displacement say nothing about
    /// convergence, so only the gradient test and the iteration cap apply.
    #[allow(clippy::too_many_arguments)]
    pub fn check_step(
        &self,
        iterations: usize,
        w_old: &DVector,
        w_new: &DVector,
        loss_old: f64,
        loss_new: f64,
        grad_norm_new: f64,
        degenerate: bool,
    ) -> Option<TerminationReason> {
        if grad_norm_new < self.gradient_tolerance {
            Some(TerminationReason::ConvergedGradient)
        } else if !degenerate
            && (loss_new - loss_old).abs() < self.function_tolerance * (1.0 + loss_old.abs())
        {
            Some(TerminationReason::ConvergedFunctionChange)
        } else if !degenerate && mean_abs_step(w_new, w_old) < self.point_tolerance {
            Some(TerminationReason::ConvergedStep)
        } else if iterations >= self.max_iterations {
            Some(TerminationReason::MaxIterations)
        } else {
            None
        }
    }
}

/// Checks that `initial_point` fits the problem and is finite.
pub fn validate_initial_point<P: Problem + ?Sized>(
    problem: &P,
    initial_point: &DVector,
) -> OptimizerResult<()> {
    if initial_point.len() != problem.dimension() {
        return Err(OptimizerError::dimension_mismatch(
            problem.dimension(),
            initial_point.len(),
        ));
    }
    if !all_finite(initial_point) {
        return Err(OptimizerError::invalid_configuration(
            "initial point must be finite",
            "initial_point",
            format!("{:?}", initial_point.as_slice()),
        ));
    }
    Ok(())
}

/// An iterative minimizer producing a full trace.
pub trait Optimizer {
    /// Per-iteration record type.
    type Record: IterationRecord;

    /// Short algorithm name used in logs.
    fn name(&self) -> &str;

    /// Runs the algorithm from `initial_point` to termination.
    ///
    /// # Errors
    ///
    /// Configuration problems (invalid parameters, dimension mismatch,
    /// missing Hessian) are returned before any iteration. Everything that
    /// happens once the run has started is recorded in the trace.
    fn optimize<P: Problem + ?Sized>(
        &self,
        problem: &P,
        initial_point: &DVector,
    ) -> OptimizerResult<OptimizationTrace<Self::Record>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::problem::{Domain, ProblemFunctions};

    #[test]
    fn test_default_criterion() {
        let c = StoppingCriterion::default();
        assert_eq!(c.max_iterations, 100);
        assert_eq!(c.gradient_tolerance, 1e-5);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_invalid_criterion() {
        assert!(StoppingCriterion::new()
            .with_max_iterations(0)
            .validate()
            .is_err());
        assert!(StoppingCriterion::new()
            .with_gradient_tolerance(-1.0)
            .validate()
            .is_err());
        assert!(StoppingCriterion::new()
            .with_function_tolerance(0.0)
            .validate()
            .is_err());
        assert!(StoppingCriterion::new()
            .with_point_tolerance(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_divergence_detection() {
        let c = StoppingCriterion::default();
        let small = DVector::from_vec(vec![1.0, 2.0]);
        let huge = DVector::from_vec(vec![1e11, 0.0]);

        assert!(!c.has_diverged(3.0, &small));
        assert!(c.has_diverged(f64::NAN, &small));
        assert!(c.has_diverged(-1e12, &small));
        assert!(c.has_diverged(1.0, &huge));
        assert!(c.has_diverged(1.0, &DVector::from_vec(vec![f64::INFINITY, 0.0])));
    }

    #[test]
    fn test_check_step_order() {
        let c = StoppingCriterion::new().with_max_iterations(5);
        let w0 = DVector::from_vec(vec![0.0, 0.0]);
        let w1 = DVector::from_vec(vec![1.0, 1.0]);

        // Gradient test wins over everything else
        assert_eq!(
            c.check_step(5, &w0, &w0, 1.0, 1.0, 0.0, false),
            Some(TerminationReason::ConvergedGradient)
        );
        // Then function change
        assert_eq!(
            c.check_step(5, &w0, &w0, 1.0, 1.0, 1.0, false),
            Some(TerminationReason::ConvergedFunctionChange)
        );
        // Then step size
        assert_eq!(
            c.check_step(5, &w0, &w0, 1.0, 0.5, 1.0, false),
            Some(TerminationReason::ConvergedStep)
        );
        // Then the cap
        assert_eq!(
            c.check_step(5, &w0, &w1, 1.0, 0.5, 1.0, false),
            Some(TerminationReason::MaxIterations)
        );
        assert_eq!(c.check_step(4, &w0, &w1, 1.0, 0.5, 1.0, false), None);
    }

    #[test]
    fn test_forced_step_only_checks_gradient_and_cap() {
        let c = StoppingCriterion::new().with_max_iterations(5);
        let w0 = DVector::from_vec(vec![0.0, 0.0]);
        let w1 = DVector::from_vec(vec![1e-9, 1e-9]);

        // Tiny loss change and displacement from a forced step are not convergence
        assert_eq!(c.check_step(3, &w0, &w1, 1.0, 1.0, 1.0, true), None);
        assert_eq!(
            c.check_step(5, &w0, &w1, 1.0, 1.0, 1.0, true),
            Some(TerminationReason::MaxIterations)
        );
        assert_eq!(
            c.check_step(3, &w0, &w1, 1.0, 1.0, 0.0, true),
            Some(TerminationReason::ConvergedGradient)
        );
    }

    #[test]
    fn test_termination_reason_classes() {
        assert!(TerminationReason::ConvergedStep.is_converged());
        assert!(!TerminationReason::MaxIterations.is_converged());
        assert!(TerminationReason::SingularSystem.is_failure());
        assert!(!TerminationReason::ConvergedGradient.is_failure());
    }

    #[test]
    fn test_validate_initial_point() {
        let problem = ProblemFunctions::new(
            "bowl",
            2,
            |w: &DVector| w.norm_squared(),
            |w: &DVector| w * 2.0,
            Domain::cube(-1.0, 1.0, 2),
        )
        .unwrap();

        assert!(validate_initial_point(&problem, &DVector::zeros(2)).is_ok());
        assert_eq!(
            validate_initial_point(&problem, &DVector::zeros(3)),
            Err(OptimizerError::dimension_mismatch(2, 3))
        );
        assert!(validate_initial_point(&problem, &DVector::from_vec(vec![f64::NAN, 0.0])).is_err());
    }
}
