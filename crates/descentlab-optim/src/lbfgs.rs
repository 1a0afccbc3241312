//! L-BFGS with a damped initial scaling.
//!
//! L-BFGS (Limited-memory Broyden-Fletcher-Goldfarb-Shanno) approximates the
//! inverse Hessian from the last M curvature pairs
//!
//! ```text
//! sₖ = wₖ₊₁ − wₖ,     yₖ = ∇f(wₖ₊₁) − ∇f(wₖ)
//! ```
//!
//! and never forms a matrix to compute the search direction.
//!
//! ## Two-Loop Recursion
//!
//! ```text
//! q = ∇f(w)
//! for i = newest .. oldest:
//!     ρᵢ = 1 / (sᵢᵀyᵢ)
//!     αᵢ = ρᵢ sᵢᵀq
//!     q  = q − αᵢ yᵢ
//!
//! γ = sᵀy / yᵀy                  (newest pair)
//! r = γ / (1 + λγ) · q           (H₀ = (1/γ + λ)⁻¹ I)
//!
//! for i = oldest .. newest:
//!     β = ρᵢ yᵢᵀr
//!     r = r + (αᵢ − β) sᵢ
//!
//! p = −r
//! ```
//!
//! With an empty memory the direction is steepest descent.
//!
//! ## Curvature Gate
//!
//! A pair enters the memory only if sᵀy > 0. That keeps every ρᵢ positive
//! and the implied inverse Hessian positive definite, so p is always a
//! descent direction. Rejected pairs are still reported in the iteration
//! record. Once M pairs are stored the oldest is evicted.
//!
//! # References
//!
//! - Nocedal & Wright, "Numerical Optimization" (2006), Algorithm 7.4

use descentlab_core::{
    core::{
        error::{OptimizerError, OptimizerResult},
        problem::{CountingProblem, Problem},
        types::{constants, DMatrix, DVector},
    },
    optimization::{
        line_search::{ArmijoBacktracking, LineSearchParams},
        optimizer::{validate_initial_point, Optimizer, StoppingCriterion, TerminationReason},
        trace::{IterationBase, IterationRecord, OptimizationTrace},
    },
};
use std::collections::VecDeque;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the L-BFGS optimizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LbfgsConfig {
    /// Number of curvature pairs to store (typically 5-20)
    pub memory_size: usize,
    /// Damping λ applied to the initial scaling
    pub hessian_damping: f64,
    /// Line search parameters
    pub line_search_params: LineSearchParams,
    /// Stopping criterion
    pub stopping: StoppingCriterion,
}

impl Default for LbfgsConfig {
    fn default() -> Self {
        Self {
            memory_size: constants::LBFGS_MEMORY_SIZE,
            hessian_damping: 0.0,
            line_search_params: LineSearchParams::default(),
            stopping: StoppingCriterion::default(),
        }
    }
}

impl LbfgsConfig {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the memory size (number of pairs to store).
    pub fn with_memory_size(mut self, size: usize) -> Self {
        self.memory_size = size;
        self
    }

    /// Sets the damping of the initial scaling.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.hessian_damping = damping;
        self
    }

    /// Sets the line search parameters.
    pub fn with_line_search_params(mut self, params: LineSearchParams) -> Self {
        self.line_search_params = params;
        self
    }

    /// Sets the stopping criterion.
    pub fn with_stopping(mut self, stopping: StoppingCriterion) -> Self {
        self.stopping = stopping;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> OptimizerResult<()> {
        if self.memory_size == 0 {
            return Err(OptimizerError::invalid_configuration(
                "memory size must be positive",
                "memory_size",
                "0",
            ));
        }
        if !(self.hessian_damping.is_finite() && self.hessian_damping >= 0.0) {
            return Err(OptimizerError::invalid_configuration(
                "Hessian damping must be non-negative",
                "hessian_damping",
                self.hessian_damping.to_string(),
            ));
        }
        self.line_search_params.validate()?;
        self.stopping.validate()
    }
}

/// A curvature pair produced by one step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurvaturePair {
    /// Position difference s = w_new − w_old
    pub s: DVector,
    /// Gradient difference y = ∇f(w_new) − ∇f(w_old)
    pub y: DVector,
    /// sᵀy
    pub sy: f64,
    /// Whether the pair passed the curvature gate
    pub accepted: bool,
}

impl CurvaturePair {
    fn new(s: DVector, y: DVector) -> Self {
        let sy = s.dot(&y);
        Self {
            s,
            y,
            sy,
            accepted: sy > 0.0 && sy.is_finite(),
        }
    }
}

/// Intermediate quantities of the two-loop recursion.
///
/// Per-pair vectors are indexed like the memory, oldest first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TwoLoopDiagnostics {
    /// ρᵢ = 1 / (sᵢᵀyᵢ)
    pub rhos: Vec<f64>,
    /// αᵢ from the first loop
    pub alphas: Vec<f64>,
    /// q after the first loop
    pub q: DVector,
    /// sᵀy / yᵀy of the newest pair
    pub gamma: f64,
    /// γ / (1 + λγ)
    pub gamma_damped: f64,
    /// r after the second loop, the negated direction
    pub r: DVector,
}

/// L-BFGS iteration with quasi-Newton diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LbfgsIteration {
    /// Common fields
    pub base: IterationBase,
    /// Pair produced by this step, accepted or not
    pub pair: CurvaturePair,
    /// Two-loop quantities; `None` when the memory was empty
    pub two_loop: Option<TwoLoopDiagnostics>,
    /// Stored pairs after this step's update
    pub memory_len: usize,
    /// BFGS Hessian approximation implied by the memory after the update.
    /// Diagnostic only; the step never uses it.
    pub approx_hessian: DMatrix,
}

impl IterationRecord for LbfgsIteration {
    fn base(&self) -> &IterationBase {
        &self.base
    }
}

/// Bounded FIFO of accepted pairs.
#[derive(Debug, Clone)]
struct LbfgsMemory {
    capacity: usize,
    pairs: VecDeque<CurvaturePair>,
}

impl LbfgsMemory {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pairs: VecDeque::with_capacity(capacity),
        }
    }

    fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Stores an accepted pair, evicting the oldest beyond capacity.
    fn push(&mut self, pair: CurvaturePair) {
        debug_assert!(pair.accepted);
        if self.pairs.len() == self.capacity {
            self.pairs.pop_front();
        }
        self.pairs.push_back(pair);
    }

    /// γ = sᵀy / yᵀy of the newest pair.
    fn gamma(&self) -> Option<f64> {
        self.pairs.back().map(|p| p.sy / p.y.norm_squared())
    }

    /// Applies the two-loop recursion to `gradient`.
    ///
    /// Returns the search direction and, for a non-empty memory, the
    /// intermediate quantities.
    fn direction(
        &self,
        gradient: &DVector,
        damping: f64,
    ) -> (DVector, Option<TwoLoopDiagnostics>) {
        let Some(gamma) = self.gamma() else {
            return (-gradient, None);
        };

        let m = self.pairs.len();
        let rhos: Vec<f64> = self.pairs.iter().map(|p| 1.0 / p.sy).collect();
        let mut alphas = vec![0.0; m];

        let mut q = gradient.clone();
        for (i, pair) in self.pairs.iter().enumerate().rev() {
            alphas[i] = rhos[i] * pair.s.dot(&q);
            q.axpy(-alphas[i], &pair.y, 1.0);
        }

        let gamma_damped = gamma / (1.0 + damping * gamma);
        let mut r = &q * gamma_damped;

        for (i, pair) in self.pairs.iter().enumerate() {
            let beta = rhos[i] * pair.y.dot(&r);
            r.axpy(alphas[i] - beta, &pair.s, 1.0);
        }

        (
            -&r,
            Some(TwoLoopDiagnostics {
                rhos,
                alphas,
                q,
                gamma,
                gamma_damped,
                r,
            }),
        )
    }

    /// Direct BFGS updates from B₀ = (1/γ + λ) I through every stored pair.
    ///
    /// This is the matrix whose inverse the two-loop recursion applies.
    fn approx_hessian(&self, dimension: usize, damping: f64) -> DMatrix {
        let Some(gamma) = self.gamma() else {
            return DMatrix::identity(dimension, dimension);
        };

        let mut b = DMatrix::identity(dimension, dimension) * (1.0 / gamma + damping);
        for pair in &self.pairs {
            let bs = &b * &pair.s;
            let sbs = pair.s.dot(&bs);
            if sbs <= 0.0 {
                continue;
            }
            b -= &bs * bs.transpose() / sbs;
            b += &pair.y * pair.y.transpose() / pair.sy;
        }
        b
    }
}

/// L-BFGS runner.
///
/// # Examples
///
/// ```
/// use descentlab_core::prelude::*;
/// use descentlab_optim::{Lbfgs, LbfgsConfig};
///
/// let bowl = ProblemFunctions::new(
///     "bowl",
///     2,
///     |w: &DVector| 0.5 * (w[0] * w[0] + 10.0 * w[1] * w[1]),
///     |w: &DVector| DVector::from_vec(vec![w[0], 10.0 * w[1]]),
///     Domain::cube(-2.0, 2.0, 2),
/// )
/// .unwrap();
///
/// let trace = Lbfgs::new(LbfgsConfig::new().with_memory_size(5))
///     .optimize(&bowl, &DVector::from_vec(vec![1.0, 1.0]))
///     .unwrap();
/// assert!(trace.converged());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Lbfgs {
    config: LbfgsConfig,
}

impl Lbfgs {
    /// Creates a runner with the given configuration.
    pub fn new(config: LbfgsConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LbfgsConfig {
        &self.config
    }
}

impl Optimizer for Lbfgs {
    type Record = LbfgsIteration;

    fn name(&self) -> &str {
        "L-BFGS"
    }

    fn optimize<P: Problem + ?Sized>(
        &self,
        problem: &P,
        initial_point: &DVector,
    ) -> OptimizerResult<OptimizationTrace<LbfgsIteration>> {
        self.config.validate()?;
        validate_initial_point(problem, initial_point)?;

        let stopping = &self.config.stopping;
        let damping = self.config.hessian_damping;
        let line_search = ArmijoBacktracking::new(self.config.line_search_params.clone());
        let counting = CountingProblem::new(problem);
        let mut memory = LbfgsMemory::new(self.config.memory_size);

        let mut w = initial_point.clone();
        let mut loss = counting.objective(&w);
        let mut grad = counting.gradient(&w);
        let mut grad_norm = grad.norm();
        let mut records: Vec<LbfgsIteration> = Vec::new();

        let termination = if grad_norm < stopping.gradient_tolerance {
            TerminationReason::ConvergedGradient
        } else {
            loop {
                let (direction, two_loop) = memory.direction(&grad, damping);
                let result = line_search.search(&counting, &w, loss, &grad, &direction);

                if stopping.has_diverged(result.new_value, &result.new_point) {
                    break TerminationReason::Diverged;
                }

                let w_new = result.new_point;
                let new_loss = result.new_value;
                let new_grad = counting.gradient(&w_new);
                let new_grad_norm = new_grad.norm();

                let pair = CurvaturePair::new(&w_new - &w, &new_grad - &grad);
                if pair.accepted {
                    memory.push(pair.clone());
                } else {
                    debug!(
                        iteration = records.len(),
                        sy = pair.sy,
                        "curvature pair rejected"
                    );
                }

                debug!(
                    iteration = records.len(),
                    loss = new_loss,
                    grad_norm = new_grad_norm,
                    alpha = result.step_size,
                    memory = memory.len(),
                    "L-BFGS step"
                );

                let verdict = stopping.check_step(
                    records.len() + 1,
                    &w,
                    &w_new,
                    loss,
                    new_loss,
                    new_grad_norm,
                    result.trace.degenerate,
                );

                records.push(LbfgsIteration {
                    base: IterationBase {
                        iteration: records.len(),
                        w_old: w.clone(),
                        w_new: w_new.clone(),
                        loss,
                        grad,
                        grad_norm,
                        direction,
                        alpha: result.step_size,
                        new_loss,
                        new_grad_norm,
                        line_search: Some(result.trace),
                    },
                    pair,
                    two_loop,
                    memory_len: memory.len(),
                    approx_hessian: memory.approx_hessian(problem.dimension(), damping),
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

        Ok(
            OptimizationTrace::new(records, initial_point.clone(), w, loss, grad_norm, termination)
                .with_evaluations(counting.counts()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use descentlab_core::utils::test_helpers::{diagonal_quadratic, pure_saddle};

    fn pair(s: &[f64], y: &[f64]) -> CurvaturePair {
        CurvaturePair::new(DVector::from_row_slice(s), DVector::from_row_slice(y))
    }

    #[test]
    fn test_config_validation() {
        assert!(LbfgsConfig::default().validate().is_ok());
        assert!(LbfgsConfig::new().with_memory_size(0).validate().is_err());
        assert!(LbfgsConfig::new().with_damping(-0.1).validate().is_err());
        assert!(LbfgsConfig::new()
            .with_line_search_params(LineSearchParams::new().with_max_trials(0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_curvature_gate() {
        assert!(pair(&[1.0, 0.0], &[2.0, 0.0]).accepted);
        assert!(!pair(&[1.0, 0.0], &[-2.0, 0.0]).accepted);
        assert!(!pair(&[1.0, 0.0], &[0.0, 3.0]).accepted);
    }

    #[test]
    fn test_memory_evicts_oldest() {
        let mut memory = LbfgsMemory::new(2);
        memory.push(pair(&[1.0, 0.0], &[1.0, 0.0]));
        memory.push(pair(&[2.0, 0.0], &[2.0, 0.0]));
        memory.push(pair(&[3.0, 0.0], &[3.0, 0.0]));
        assert_eq!(memory.len(), 2);
        assert_eq!(memory.pairs[0].s[0], 2.0);
        assert_eq!(memory.pairs[1].s[0], 3.0);
    }

    #[test]
    fn test_empty_memory_gives_steepest_descent() {
        let memory = LbfgsMemory::new(3);
        let g = DVector::from_vec(vec![1.0, -2.0]);
        let (p, diagnostics) = memory.direction(&g, 0.5);
        assert_eq!(p, -g);
        assert!(diagnostics.is_none());
    }

    #[test]
    fn test_two_loop_single_pair() {
        // One pair from f = ½(w0² + 4 w1²) along the first axis: s = (1, 0), y = (1, 0)
        let mut memory = LbfgsMemory::new(3);
        memory.push(pair(&[1.0, 0.0], &[1.0, 0.0]));

        let g = DVector::from_vec(vec![2.0, 4.0]);
        let (p, diagnostics) = memory.direction(&g, 0.0);
        let d = diagnostics.unwrap();

        assert_relative_eq!(d.rhos[0], 1.0);
        assert_relative_eq!(d.alphas[0], 2.0);
        assert_relative_eq!(d.q, DVector::from_vec(vec![0.0, 4.0]));
        assert_relative_eq!(d.gamma, 1.0);
        assert_relative_eq!(d.gamma_damped, 1.0);
        // β = 0, r = q + 2 s
        assert_relative_eq!(p, DVector::from_vec(vec![-2.0, -4.0]));
    }

    #[test]
    fn test_damping_shrinks_initial_scaling() {
        let mut memory = LbfgsMemory::new(3);
        memory.push(pair(&[2.0, 0.0], &[1.0, 0.0]));

        let g = DVector::from_vec(vec![0.0, 1.0]);
        let (_, d) = memory.direction(&g, 1.0);
        let d = d.unwrap();
        // γ = 2, γ / (1 + λγ) = 2/3
        assert_relative_eq!(d.gamma, 2.0);
        assert_relative_eq!(d.gamma_damped, 2.0 / 3.0);
    }

    #[test]
    fn test_approx_hessian_satisfies_secant_equation() {
        let mut memory = LbfgsMemory::new(3);
        memory.push(pair(&[1.0, 0.5], &[2.0, 1.5]));
        memory.push(pair(&[-0.3, 1.0], &[-0.2, 3.0]));

        let b = memory.approx_hessian(2, 0.0);
        let newest = &memory.pairs[1];
        assert_relative_eq!(&b * &newest.s, newest.y.clone(), epsilon = 1e-12);
        assert_relative_eq!(b.clone(), b.transpose(), epsilon = 1e-12);
    }

    #[test]
    fn test_quadratic_converges() {
        let problem = diagonal_quadratic(1.0, 10.0);
        let trace = Lbfgs::default()
            .optimize(&problem, &DVector::from_vec(vec![1.0, 1.0]))
            .unwrap();
        assert!(trace.converged());
        assert!(trace.records.iter().all(|r| r.base.is_descent_direction()));
    }

    #[test]
    fn test_saddle_rejects_every_pair() {
        let problem = pure_saddle();
        let trace = Lbfgs::default()
            .optimize(&problem, &DVector::from_vec(vec![0.1, 1.0]))
            .unwrap();

        assert_eq!(trace.termination, TerminationReason::Diverged);
        assert!(!trace.records.is_empty());
        for record in &trace.records {
            assert!(!record.pair.accepted);
            assert_eq!(record.memory_len, 0);
            assert!(record.two_loop.is_none());
        }
    }
}
