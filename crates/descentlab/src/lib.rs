//! # descentlab
//!
//! Side-by-side comparison of first- and second-order minimizers on small
//! unconstrained problems.
//!
//! Each runner returns a complete trace of what it did: the gradient and
//! direction at every iterate, every line-search trial, the Hessian and its
//! spectrum for Newton, the curvature pairs and two-loop intermediates for
//! L-BFGS. Basin sweeps run one algorithm from a whole grid of starting
//! points and cluster where the runs ended up.
//!
//! The crate re-exports the workspace members:
//!
//! - [`core`]: the `Problem` trait, linear algebra kernel, Armijo line search, traces
//! - [`problems`]: built-in landscapes and the seeded classification datasets
//! - [`optim`]: gradient descent, damped Newton, L-BFGS and the `run` dispatcher
//! - [`basin`]: grid sweeps and single-linkage clustering of convergence locations
//!
//! ## Quick Start
//!
//! ```rust
//! use descentlab::prelude::*;
//!
//! let problem = Himmelblau::new();
//! let start = DVector::from_vec(vec![0.0, 0.0]);
//!
//! let trace = run(&problem, &start, &AlgorithmConfig::lbfgs(10)).unwrap();
//! assert!(trace.converged());
//!
//! let request = BasinRequest::new(8, BasinBounds::square(-5.0, 5.0), AlgorithmConfig::lbfgs(10));
//! let basin = compute_basin(&problem, &request).unwrap();
//! let clusters = cluster_convergence_locations(&basin, &ClusterConfig::default());
//! assert!(clusters.cluster_count() >= 2);
//! ```

pub use descentlab_basin as basin;
pub use descentlab_core as core;
pub use descentlab_optim as optim;
pub use descentlab_problems as problems;

// Re-export nalgebra so callers can build points without a direct dependency
pub use nalgebra;

/// Everything needed to define a problem, run the algorithms and sweep basins.
pub mod prelude {
    pub use descentlab_core::prelude::*;

    pub use descentlab_optim::{
        run, AlgorithmConfig, AlgorithmKind, AlgorithmTrace, CurvaturePair, GradientDescent,
        GradientDescentConfig, GradientDescentIteration, Lbfgs, LbfgsConfig, LbfgsIteration,
        Newton, NewtonConfig, NewtonIteration, StepRule, TwoLoopDiagnostics,
    };

    pub use descentlab_problems::{
        by_name, DataPoint, Dataset, DatasetGenerator, Himmelblau, LogisticRegression,
        PerceptronSvm, Quadratic, Rosenbrock, Saddle, SoftMarginSvm, SquaredHingeSvm,
        ThreeHumpCamel, BUILTIN_PROBLEMS,
    };

    pub use descentlab_basin::{
        cluster_convergence_locations, compute_basin, compute_basin_point, grid_point,
        initialize_basin_data, BasinBounds, BasinClusters, BasinData, BasinError, BasinPoint,
        BasinRequest, BasinResult, BasinSummary, ClusterConfig,
    };
}
