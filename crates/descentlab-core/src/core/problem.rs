//! Problem interface consumed by every algorithm runner.
//!
//! A problem is a smooth scalar objective f: ℝⁿ → ℝ with n ∈ {2, 3},
//! together with its hand-coded gradient and (optionally) Hessian, the
//! rectangular domain the visualizer displays, and any known critical points.
//!
//! # Design
//!
//! - Problems are immutable and shared by reference. Runners borrow them for
//!   the duration of a run and never clone them, so the same instance can be
//!   handed to many basin-grid cells at once (hence the `Send + Sync` bound).
//! - The Hessian is optional. First-order methods never ask for it; Newton
//!   refuses to start without it.
//! - Central finite-difference approximations are provided as default
//!   methods so analytic derivatives can be checked against them (see
//!   [`DerivativeChecker`](crate::numerical::derivative_check::DerivativeChecker)).

use crate::core::error::{ProblemError, ProblemResult};
use crate::core::types::{DMatrix, DVector, SUPPORTED_DIMENSIONS};
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned box on which a problem is displayed and sampled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Domain {
    /// One closed interval `(min, max)` per coordinate.
    pub intervals: Vec<(f64, f64)>,
}

impl Domain {
    /// Creates a domain from per-axis intervals.
    pub fn new(intervals: Vec<(f64, f64)>) -> Self {
        Self { intervals }
    }

    /// Creates the hypercube `[min, max]ⁿ`.
    pub fn cube(min: f64, max: f64, dimension: usize) -> Self {
        Self {
            intervals: vec![(min, max); dimension],
        }
    }

    /// Number of axes.
    pub fn dimension(&self) -> usize {
        self.intervals.len()
    }

    /// Interval of the given axis, if it exists.
    pub fn axis(&self, index: usize) -> Option<(f64, f64)> {
        self.intervals.get(index).copied()
    }

    /// Returns `true` if `w` lies inside the box (boundaries included).
    pub fn contains(&self, w: &DVector) -> bool {
        w.len() == self.intervals.len()
            && w
                .iter()
                .zip(&self.intervals)
                .all(|(x, (lo, hi))| *x >= *lo && *x <= *hi)
    }
}

/// Classification of a stationary point by the signs of its Hessian eigenvalues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CriticalPointKind {
    /// Positive definite Hessian.
    Minimum,
    /// Negative definite Hessian.
    Maximum,
    /// Indefinite Hessian.
    Saddle,
}

/// A known stationary point of a problem.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CriticalPoint {
    /// Location of the point.
    pub location: DVector,
    /// Kind of the point.
    pub kind: CriticalPointKind,
}

impl CriticalPoint {
    /// Creates a minimum at `location`.
    pub fn minimum(location: &[f64]) -> Self {
        Self {
            location: DVector::from_column_slice(location),
            kind: CriticalPointKind::Minimum,
        }
    }

    /// Creates a maximum at `location`.
    pub fn maximum(location: &[f64]) -> Self {
        Self {
            location: DVector::from_column_slice(location),
            kind: CriticalPointKind::Maximum,
        }
    }

    /// Creates a saddle point at `location`.
    pub fn saddle(location: &[f64]) -> Self {
        Self {
            location: DVector::from_column_slice(location),
            kind: CriticalPointKind::Saddle,
        }
    }
}

/// Step used by [`Problem::gradient_fd`].
pub const GRADIENT_FD_STEP: f64 = 1e-6;

/// Step used by [`Problem::hessian_fd`].
pub const HESSIAN_FD_STEP: f64 = 1e-5;

/// A smooth objective of two or three variables.
///
/// Implementors must return gradients and Hessians whose length matches
/// [`dimension`](Problem::dimension). Points passed in by the runners always
/// have that length; the runners validate the initial point up front.
pub trait Problem: Debug + Send + Sync {
    /// Human-readable identifier.
    fn name(&self) -> &str;

    /// Number of variables (2 or 3).
    fn dimension(&self) -> usize;

    /// Evaluates f(w).
    fn objective(&self, w: &DVector) -> f64;

    /// Evaluates ∇f(w).
    fn gradient(&self, w: &DVector) -> DVector;

    /// Evaluates ∇²f(w), or `None` for first-order-only problems.
    fn hessian(&self, _w: &DVector) -> Option<DMatrix> {
        None
    }

    /// Returns `true` if [`hessian`](Problem::hessian) is implemented.
    fn has_hessian(&self) -> bool {
        false
    }

    /// Display and sampling box.
    fn domain(&self) -> Domain;

    /// Known global minimizer, if any.
    fn global_minimum(&self) -> Option<DVector> {
        None
    }

    /// Known stationary points (minima, maxima, saddles).
    fn critical_points(&self) -> Vec<CriticalPoint> {
        Vec::new()
    }

    /// Central finite-difference gradient.
    ///
    /// ∂f/∂wᵢ ≈ (f(w + h eᵢ) − f(w − h eᵢ)) / 2h
    fn gradient_fd(&self, w: &DVector) -> DVector {
        let h = GRADIENT_FD_STEP;
        let mut grad = DVector::zeros(w.len());
        let mut probe = w.clone();

        for i in 0..w.len() {
            let original = probe[i];
            probe[i] = original + h;
            let f_plus = self.objective(&probe);
            probe[i] = original - h;
            let f_minus = self.objective(&probe);
            probe[i] = original;
            grad[i] = (f_plus - f_minus) / (2.0 * h);
        }

        grad
    }

    /// Finite-difference Hessian from central differences of the analytic gradient.
    ///
    /// The result is symmetrized as ½(H + Hᵀ).
    fn hessian_fd(&self, w: &DVector) -> DMatrix {
        let h = HESSIAN_FD_STEP;
        let n = w.len();
        let mut hess = DMatrix::zeros(n, n);
        let mut probe = w.clone();

        for i in 0..n {
            let original = probe[i];
            probe[i] = original + h;
            let g_plus = self.gradient(&probe);
            probe[i] = original - h;
            let g_minus = self.gradient(&probe);
            probe[i] = original;

            let column = (g_plus - g_minus) / (2.0 * h);
            hess.set_column(i, &column);
        }

        (&hess + hess.transpose()) * 0.5
    }
}

type ObjectiveFn = Box<dyn Fn(&DVector) -> f64 + Send + Sync>;
type GradientFn = Box<dyn Fn(&DVector) -> DVector + Send + Sync>;
type HessianFn = Box<dyn Fn(&DVector) -> DMatrix + Send + Sync>;

/// Closure-backed problem supplied by an external caller.
///
/// # Example
///
/// ```
/// use descentlab_core::prelude::*;
///
/// let bowl = ProblemFunctions::new(
///     "bowl",
///     2,
///     |w: &DVector| 0.5 * w.norm_squared(),
///     |w: &DVector| w.clone(),
///     Domain::cube(-3.0, 3.0, 2),
/// )
/// .unwrap()
/// .with_hessian(|_w: &DVector| DMatrix::identity(2, 2));
///
/// assert!(bowl.has_hessian());
/// ```
pub struct ProblemFunctions {
    name: String,
    dimension: usize,
    objective: ObjectiveFn,
    gradient: GradientFn,
    hessian: Option<HessianFn>,
    domain: Domain,
    global_minimum: Option<DVector>,
    critical_points: Vec<CriticalPoint>,
}

impl ProblemFunctions {
    /// Creates a first-order problem from an objective and its gradient.
    ///
    /// Fails if `dimension` is not 2 or 3, or if the domain does not have
    /// exactly one non-empty interval per axis.
    pub fn new<S, F, G>(
        name: S,
        dimension: usize,
        objective: F,
        gradient: G,
        domain: Domain,
    ) -> ProblemResult<Self>
    where
        S: Into<String>,
        F: Fn(&DVector) -> f64 + Send + Sync + 'static,
        G: Fn(&DVector) -> DVector + Send + Sync + 'static,
    {
        if !SUPPORTED_DIMENSIONS.contains(&dimension) {
            return Err(ProblemError::invalid_definition(format!(
                "dimension must be 2 or 3, got {dimension}"
            )));
        }
        if domain.dimension() != dimension {
            return Err(ProblemError::invalid_definition(format!(
                "domain has {} intervals for {dimension} axes",
                domain.dimension()
            )));
        }
        if let Some((lo, hi)) = domain
            .intervals
            .iter()
            .find(|(lo, hi)| !(lo.is_finite() && hi.is_finite() && lo < hi))
        {
            return Err(ProblemError::invalid_definition(format!(
                "domain interval [{lo}, {hi}] must be finite with min < max"
            )));
        }

        Ok(Self {
            name: name.into(),
            dimension,
            objective: Box::new(objective),
            gradient: Box::new(gradient),
            hessian: None,
            domain,
            global_minimum: None,
            critical_points: Vec::new(),
        })
    }

    /// Attaches an analytic Hessian.
    pub fn with_hessian<H>(mut self, hessian: H) -> Self
    where
        H: Fn(&DVector) -> DMatrix + Send + Sync + 'static,
    {
        self.hessian = Some(Box::new(hessian));
        self
    }

    /// Records the known global minimizer.
    pub fn with_global_minimum(mut self, location: &[f64]) -> Self {
        self.global_minimum = Some(DVector::from_column_slice(location));
        self
    }

    /// Records a known stationary point.
    pub fn with_critical_point(mut self, point: CriticalPoint) -> Self {
        self.critical_points.push(point);
        self
    }
}

impl Debug for ProblemFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemFunctions")
            .field("name", &self.name)
            .field("dimension", &self.dimension)
            .field("has_hessian", &self.hessian.is_some())
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

impl Problem for ProblemFunctions {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn objective(&self, w: &DVector) -> f64 {
        (self.objective)(w)
    }

    fn gradient(&self, w: &DVector) -> DVector {
        (self.gradient)(w)
    }

    fn hessian(&self, w: &DVector) -> Option<DMatrix> {
        self.hessian.as_ref().map(|h| h(w))
    }

    fn has_hessian(&self) -> bool {
        self.hessian.is_some()
    }

    fn domain(&self) -> Domain {
        self.domain.clone()
    }

    fn global_minimum(&self) -> Option<DVector> {
        self.global_minimum.clone()
    }

    fn critical_points(&self) -> Vec<CriticalPoint> {
        self.critical_points.clone()
    }
}

/// Wrapper that counts objective, gradient and Hessian evaluations.
///
/// Runners wrap the caller's problem in this to report evaluation counts
/// in the trace. Counters are atomic so the wrapper stays `Sync`.
#[derive(Debug)]
pub struct CountingProblem<'a, P: Problem + ?Sized> {
    inner: &'a P,
    objective_count: AtomicUsize,
    gradient_count: AtomicUsize,
    hessian_count: AtomicUsize,
}

impl<'a, P: Problem + ?Sized> CountingProblem<'a, P> {
    /// Creates a counting wrapper around `inner`.
    pub fn new(inner: &'a P) -> Self {
        Self {
            inner,
            objective_count: AtomicUsize::new(0),
            gradient_count: AtomicUsize::new(0),
            hessian_count: AtomicUsize::new(0),
        }
    }

    /// Returns `(objective, gradient, hessian)` evaluation counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.objective_count.load(Ordering::Relaxed),
            self.gradient_count.load(Ordering::Relaxed),
            self.hessian_count.load(Ordering::Relaxed),
        )
    }
}

impl<P: Problem + ?Sized> Problem for CountingProblem<'_, P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn objective(&self, w: &DVector) -> f64 {
        self.objective_count.fetch_add(1, Ordering::Relaxed);
        self.inner.objective(w)
    }

    fn gradient(&self, w: &DVector) -> DVector {
        self.gradient_count.fetch_add(1, Ordering::Relaxed);
        self.inner.gradient(w)
    }

    fn hessian(&self, w: &DVector) -> Option<DMatrix> {
        self.hessian_count.fetch_add(1, Ordering::Relaxed);
        self.inner.hessian(w)
    }

    fn has_hessian(&self) -> bool {
        self.inner.has_hessian()
    }

    fn domain(&self) -> Domain {
        self.inner.domain()
    }

    fn global_minimum(&self) -> Option<DVector> {
        self.inner.global_minimum()
    }

    fn critical_points(&self) -> Vec<CriticalPoint> {
        self.inner.critical_points()
    }
}
