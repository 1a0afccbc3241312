//! Iteration records and run traces.
//!
//! A run produces an [`OptimizationTrace`]: the totally ordered,
//! append-only history of its iterations plus the terminal state. Records
//! are never modified once pushed.
//!
//! Each algorithm has its own record type carrying algorithm-specific
//! diagnostics; all of them embed an [`IterationBase`] and expose it through
//! [`IterationRecord`], so display code can walk any trace uniformly.

use crate::core::error::LinalgError;
use crate::core::types::DVector;
use crate::optimization::line_search::LineSearchTrace;
use crate::optimization::optimizer::TerminationReason;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fields shared by every algorithm's iteration record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IterationBase {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Position before the step.
    pub w_old: DVector,
    /// Position after the step.
    pub w_new: DVector,
    /// f(w_old).
    pub loss: f64,
    /// ∇f(w_old).
    pub grad: DVector,
    /// ‖∇f(w_old)‖.
    pub grad_norm: f64,
    /// Search direction.
    pub direction: DVector,
    /// Accepted step length.
    pub alpha: f64,
    /// f(w_new).
    pub new_loss: f64,
    /// ‖∇f(w_new)‖.
    pub new_grad_norm: f64,
    /// Line search diagnostics, absent for fixed or full steps.
    pub line_search: Option<LineSearchTrace>,
}

impl IterationBase {
    /// Returns `true` if the line search had to force its smallest step.
    pub fn is_degenerate(&self) -> bool {
        self.line_search.as_ref().is_some_and(|ls| ls.degenerate)
    }

    /// Returns `true` if the direction decreases f to first order.
    pub fn is_descent_direction(&self) -> bool {
        self.grad.dot(&self.direction) < 0.0
    }
}

/// Common access to the shared part of a record.
pub trait IterationRecord {
    /// Shared fields.
    fn base(&self) -> &IterationBase;
}

impl IterationRecord for IterationBase {
    fn base(&self) -> &IterationBase {
        self
    }
}

/// Complete history and outcome of a single run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizationTrace<R> {
    /// Iteration records, in order.
    pub records: Vec<R>,
    /// Starting point.
    pub initial_point: DVector,
    /// Last finite position reached.
    pub final_point: DVector,
    /// f(final_point).
    pub final_loss: f64,
    /// ‖∇f(final_point)‖.
    pub final_grad_norm: f64,
    /// Why the run stopped.
    pub termination: TerminationReason,
    /// Linear algebra failure that ended the run, if any.
    pub failure: Option<LinalgError>,
    /// Objective evaluations, line search trials included.
    pub function_evaluations: usize,
    /// Gradient evaluations.
    pub gradient_evaluations: usize,
    /// Hessian evaluations.
    pub hessian_evaluations: usize,
}

impl<R: IterationRecord> OptimizationTrace<R> {
    /// Creates a trace.
    pub fn new(
        records: Vec<R>,
        initial_point: DVector,
        final_point: DVector,
        final_loss: f64,
        final_grad_norm: f64,
        termination: TerminationReason,
    ) -> Self {
        Self {
            records,
            initial_point,
            final_point,
            final_loss,
            final_grad_norm,
            termination,
            failure: None,
            function_evaluations: 0,
            gradient_evaluations: 0,
            hessian_evaluations: 0,
        }
    }

    /// Attaches the failure that ended the run.
    pub fn with_failure(mut self, failure: LinalgError) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Sets the `(objective, gradient, hessian)` evaluation counts.
    pub fn with_evaluations(mut self, counts: (usize, usize, usize)) -> Self {
        (
            self.function_evaluations,
            self.gradient_evaluations,
            self.hessian_evaluations,
        ) = counts;
        self
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the run ended in a convergence state.
    ///
    /// This only says the stopping tests fired. It does not say the final
    /// point is a minimum; inspect the Hessian for that.
    pub fn converged(&self) -> bool {
        self.termination.is_converged()
    }

    /// Positions visited, starting with the initial point.
    pub fn path(&self) -> Vec<DVector> {
        std::iter::once(self.initial_point.clone())
            .chain(self.records.iter().map(|r| r.base().w_new.clone()))
            .collect()
    }

    /// Loss after each iteration.
    pub fn losses(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.base().new_loss).collect()
    }

    /// Number of iterations whose line search was forced.
    pub fn degenerate_steps(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.base().is_degenerate())
            .count()
    }
}
