//! Algorithm selection and uniform dispatch.
//!
//! [`AlgorithmConfig`] names one of the four runners together with its
//! parameters; [`run`] executes it and returns an [`AlgorithmTrace`] whose
//! accessors work the same way whichever runner produced it.

use crate::gradient_descent::{GradientDescent, GradientDescentConfig, GradientDescentIteration};
use crate::lbfgs::{Lbfgs, LbfgsConfig, LbfgsIteration};
use crate::newton::{Newton, NewtonConfig, NewtonIteration};
use descentlab_core::{
    core::{
        error::{LinalgError, OptimizerError, OptimizerResult},
        problem::Problem,
        types::{constants, DVector},
    },
    optimization::{
        line_search::LineSearchParams,
        optimizer::{Optimizer, StoppingCriterion, TerminationReason},
        trace::{IterationBase, IterationRecord, OptimizationTrace},
    },
};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The four runners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AlgorithmKind {
    /// Gradient descent with a constant step
    GdFixed,
    /// Gradient descent with Armijo backtracking
    GdLineSearch,
    /// Damped Newton
    Newton,
    /// Limited-memory BFGS
    Lbfgs,
}

impl AlgorithmKind {
    /// All kinds, in display order.
    pub const ALL: [AlgorithmKind; 4] = [
        AlgorithmKind::GdFixed,
        AlgorithmKind::GdLineSearch,
        AlgorithmKind::Newton,
        AlgorithmKind::Lbfgs,
    ];

    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GdFixed => "gd-fixed",
            Self::GdLineSearch => "gd-line-search",
            Self::Newton => "newton",
            Self::Lbfgs => "lbfgs",
        }
    }

    /// Parses an identifier produced by [`as_str`](Self::as_str).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Returns `true` for runners that need a Hessian.
    pub fn requires_hessian(&self) -> bool {
        matches!(self, Self::Newton)
    }

    /// Default configuration for this kind.
    pub fn default_config(&self) -> AlgorithmConfig {
        match self {
            Self::GdFixed => AlgorithmConfig::gd_fixed(constants::DEFAULT_LEARNING_RATE),
            Self::GdLineSearch => AlgorithmConfig::gd_line_search(),
            Self::Newton => AlgorithmConfig::Newton(NewtonConfig::new()),
            Self::Lbfgs => AlgorithmConfig::Lbfgs(LbfgsConfig::new()),
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A runner choice with its parameters.
///
/// The two gradient descent variants carry only the parameters of their
/// own step rule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "config", rename_all = "kebab-case"))]
pub enum AlgorithmConfig {
    /// Gradient descent with a constant step
    GdFixed {
        /// Step size
        alpha: f64,
        /// Stopping tests
        stopping: StoppingCriterion,
    },
    /// Gradient descent with Armijo backtracking
    GdLineSearch {
        /// Backtracking parameters
        line_search: LineSearchParams,
        /// Stopping tests
        stopping: StoppingCriterion,
    },
    /// Damped Newton
    Newton(NewtonConfig),
    /// L-BFGS
    Lbfgs(LbfgsConfig),
}

impl AlgorithmConfig {
    /// Fixed-step gradient descent with step `alpha`.
    pub fn gd_fixed(alpha: f64) -> Self {
        Self::GdFixed {
            alpha,
            stopping: StoppingCriterion::default(),
        }
    }

    /// Gradient descent with default Armijo parameters.
    pub fn gd_line_search() -> Self {
        Self::GdLineSearch {
            line_search: LineSearchParams::default(),
            stopping: StoppingCriterion::default(),
        }
    }

    /// Newton with the given damping and Armijo backtracking.
    pub fn newton(damping: f64) -> Self {
        Self::Newton(NewtonConfig::new().with_damping(damping))
    }

    /// L-BFGS with `memory_size` pairs.
    pub fn lbfgs(memory_size: usize) -> Self {
        Self::Lbfgs(LbfgsConfig::new().with_memory_size(memory_size))
    }

    /// The runner this configuration selects.
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Self::GdFixed { .. } => AlgorithmKind::GdFixed,
            Self::GdLineSearch { .. } => AlgorithmKind::GdLineSearch,
            Self::Newton(_) => AlgorithmKind::Newton,
            Self::Lbfgs(_) => AlgorithmKind::Lbfgs,
        }
    }

    /// Stopping criterion of the selected runner.
    pub fn stopping(&self) -> &StoppingCriterion {
        match self {
            Self::GdFixed { stopping, .. } | Self::GdLineSearch { stopping, .. } => stopping,
            Self::Newton(c) => &c.stopping,
            Self::Lbfgs(c) => &c.stopping,
        }
    }

    /// Replaces the stopping criterion.
    pub fn with_stopping(self, stopping: StoppingCriterion) -> Self {
        match self {
            Self::GdFixed { alpha, .. } => Self::GdFixed { alpha, stopping },
            Self::GdLineSearch { line_search, .. } => Self::GdLineSearch {
                line_search,
                stopping,
            },
            Self::Newton(c) => Self::Newton(c.with_stopping(stopping)),
            Self::Lbfgs(c) => Self::Lbfgs(c.with_stopping(stopping)),
        }
    }

    /// Runner configuration of the gradient descent variants.
    pub fn gradient_descent(&self) -> Option<GradientDescentConfig> {
        match self {
            Self::GdFixed { alpha, stopping } => Some(
                GradientDescentConfig::new()
                    .with_fixed_step(*alpha)
                    .with_stopping(stopping.clone()),
            ),
            Self::GdLineSearch {
                line_search,
                stopping,
            } => Some(
                GradientDescentConfig::new()
                    .with_line_search(line_search.clone())
                    .with_stopping(stopping.clone()),
            ),
            Self::Newton(_) | Self::Lbfgs(_) => None,
        }
    }

    /// Validates the parameters of the selected runner.
    pub fn validate(&self) -> OptimizerResult<()> {
        match self {
            Self::Newton(c) => c.validate(),
            Self::Lbfgs(c) => c.validate(),
            Self::GdFixed { .. } | Self::GdLineSearch { .. } => self
                .gradient_descent()
                .map_or(Ok(()), |c| c.validate()),
        }
    }
}

/// Trace of a run started through [`run`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AlgorithmTrace {
    /// Either gradient descent variant
    GradientDescent(OptimizationTrace<GradientDescentIteration>),
    /// Newton
    Newton(OptimizationTrace<NewtonIteration>),
    /// L-BFGS
    Lbfgs(OptimizationTrace<LbfgsIteration>),
}

macro_rules! each_trace {
    ($self:expr, $trace:ident => $body:expr) => {
        match $self {
            AlgorithmTrace::GradientDescent($trace) => $body,
            AlgorithmTrace::Newton($trace) => $body,
            AlgorithmTrace::Lbfgs($trace) => $body,
        }
    };
}

impl AlgorithmTrace {
    /// Terminal state.
    pub fn termination(&self) -> TerminationReason {
        each_trace!(self, t => t.termination)
    }

    /// Final position.
    pub fn final_point(&self) -> &DVector {
        each_trace!(self, t => &t.final_point)
    }

    /// Loss at the final position.
    pub fn final_loss(&self) -> f64 {
        each_trace!(self, t => t.final_loss)
    }

    /// Gradient norm at the final position.
    pub fn final_grad_norm(&self) -> f64 {
        each_trace!(self, t => t.final_grad_norm)
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> usize {
        each_trace!(self, t => t.iterations())
    }

    /// Returns `true` if the run ended in a convergence state.
    pub fn converged(&self) -> bool {
        self.termination().is_converged()
    }

    /// Failure that cut the run short, if any.
    pub fn failure(&self) -> Option<&LinalgError> {
        each_trace!(self, t => t.failure.as_ref())
    }

    /// Positions visited, starting with the initial point.
    pub fn path(&self) -> Vec<DVector> {
        each_trace!(self, t => t.path())
    }

    /// Common fields of every record, in order.
    pub fn bases(&self) -> Vec<&IterationBase> {
        each_trace!(self, t => t.records.iter().map(|r| r.base()).collect())
    }

    /// `(objective, gradient, hessian)` evaluation counts.
    pub fn evaluations(&self) -> (usize, usize, usize) {
        each_trace!(self, t => (
            t.function_evaluations,
            t.gradient_evaluations,
            t.hessian_evaluations,
        ))
    }
}

/// Runs the configured algorithm on `problem` from `initial_point`.
///
/// # Errors
///
/// Returns the runner's configuration errors; see [`Optimizer::optimize`].
///
/// # Examples
///
/// ```
/// use descentlab_core::prelude::*;
/// use descentlab_optim::{run, AlgorithmConfig};
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
/// let trace = run(&bowl, &DVector::from_vec(vec![1.0, 1.0]), &AlgorithmConfig::lbfgs(5)).unwrap();
/// assert!(trace.converged());
/// ```
pub fn run<P: Problem + ?Sized>(
    problem: &P,
    initial_point: &DVector,
    config: &AlgorithmConfig,
) -> OptimizerResult<AlgorithmTrace> {
    config.validate()?;
    Ok(match config {
        AlgorithmConfig::GdFixed { .. } | AlgorithmConfig::GdLineSearch { .. } => {
            let gd = config.gradient_descent().map(GradientDescent::new).unwrap_or_default();
            AlgorithmTrace::GradientDescent(gd.optimize(problem, initial_point)?)
        }
        AlgorithmConfig::Newton(c) => {
            AlgorithmTrace::Newton(Newton::new(c.clone()).optimize(problem, initial_point)?)
        }
        AlgorithmConfig::Lbfgs(c) => {
            AlgorithmTrace::Lbfgs(Lbfgs::new(c.clone()).optimize(problem, initial_point)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient_descent::StepRule;
    use descentlab_core::utils::test_helpers::diagonal_quadratic;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in AlgorithmKind::ALL {
            assert_eq!(AlgorithmKind::from_name(kind.as_str()), Some(kind));
            assert_eq!(kind.default_config().kind(), kind);
            assert!(kind.default_config().validate().is_ok());
        }
        assert_eq!(AlgorithmKind::from_name("adam"), None);
        assert!(AlgorithmKind::Newton.requires_hessian());
        assert!(!AlgorithmKind::Lbfgs.requires_hessian());
    }

    #[test]
    fn test_gradient_descent_variants_carry_their_step_rule() {
        let fixed = AlgorithmConfig::gd_fixed(0.25).gradient_descent().unwrap();
        assert_eq!(fixed.step_rule, StepRule::Fixed(0.25));
        assert!(!fixed.uses_line_search());

        let armijo = AlgorithmConfig::gd_line_search().gradient_descent().unwrap();
        assert_eq!(armijo.step_rule, StepRule::Armijo(LineSearchParams::default()));

        assert!(AlgorithmConfig::newton(0.0).gradient_descent().is_none());
        assert!(matches!(
            AlgorithmConfig::gd_fixed(0.0).validate(),
            Err(OptimizerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_with_stopping_replaces_criterion() {
        let stopping = StoppingCriterion::new().with_max_iterations(3);
        for kind in AlgorithmKind::ALL {
            let config = kind.default_config().with_stopping(stopping.clone());
            assert_eq!(config.stopping(), &stopping);
        }
    }

    #[test]
    fn test_dispatch_matches_kind() {
        let problem = diagonal_quadratic(1.0, 3.0);
        let w0 = DVector::from_vec(vec![1.0, -1.0]);
        let stopping = StoppingCriterion::new().with_max_iterations(500);

        for kind in AlgorithmKind::ALL {
            let config = kind.default_config().with_stopping(stopping.clone());
            let trace = run(&problem, &w0, &config).unwrap();
            let expected = match kind {
                AlgorithmKind::GdFixed | AlgorithmKind::GdLineSearch => {
                    matches!(trace, AlgorithmTrace::GradientDescent(_))
                }
                AlgorithmKind::Newton => matches!(trace, AlgorithmTrace::Newton(_)),
                AlgorithmKind::Lbfgs => matches!(trace, AlgorithmTrace::Lbfgs(_)),
            };
            assert!(expected, "{kind}");
            assert!(trace.converged(), "{kind}: {:?}", trace.termination());
            assert_eq!(trace.bases().len(), trace.iterations());
            assert_eq!(trace.path().len(), trace.iterations() + 1);
        }
    }
}
