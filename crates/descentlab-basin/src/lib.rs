//! descentlab Basin - basins of convergence for the descentlab runners.
//!
//! A basin sweep runs one algorithm from every point of a regular grid over
//! the first two variables of a problem and records where each run ended.
//! Clustering the convergence locations then tells which attractor every
//! starting point belongs to.
//!
//! Three-variable problems (the classification losses) are swept on a
//! plane: the third coordinate is held at a fixed slice value in every
//! starting point.
//!
//! # Example
//!
//! ```rust
//! use descentlab_basin::{
//!     cluster_convergence_locations, compute_basin, BasinBounds, BasinRequest, ClusterConfig,
//! };
//! use descentlab_core::prelude::*;
//! use descentlab_optim::AlgorithmConfig;
//!
//! let double_well = ProblemFunctions::new(
//!     "double-well",
//!     2,
//!     |w: &DVector| (w[0] * w[0] - 1.0).powi(2) + w[1] * w[1],
//!     |w: &DVector| {
//!         DVector::from_vec(vec![4.0 * w[0] * (w[0] * w[0] - 1.0), 2.0 * w[1]])
//!     },
//!     Domain::cube(-2.0, 2.0, 2),
//! )
//! .unwrap();
//!
//! let request = BasinRequest::new(
//!     4,
//!     BasinBounds::new(-1.5, 1.5, -1.0, 1.0),
//!     AlgorithmConfig::lbfgs(5),
//! );
//! let data = compute_basin(&double_well, &request).unwrap();
//! let clusters = cluster_convergence_locations(&data, &ClusterConfig::default());
//!
//! // One cluster per well, at w = (±1, 0)
//! assert_eq!(clusters.cluster_count(), 2);
//! for centroid in clusters.centroids(&data) {
//!     assert!((centroid.x.abs() - 1.0).abs() < 1e-3 && centroid.y.abs() < 1e-3);
//! }
//! ```

pub mod clustering;
pub mod error;
pub mod grid;
pub mod sampler;

pub use clustering::{
    cluster_convergence_locations, BasinClusters, ClusterConfig, DEFAULT_DISTANCE_THRESHOLD,
};
pub use error::{BasinError, BasinResult};
pub use grid::{
    grid_point, initialize_basin_data, BasinBounds, BasinData, BasinPoint, BasinSummary,
};
pub use sampler::{compute_basin, compute_basin_point, BasinRequest};
