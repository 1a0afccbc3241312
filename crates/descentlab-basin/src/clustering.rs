//! Single-linkage clustering of convergence locations.
//!
//! Two converged cells belong to the same cluster iff they are connected by
//! a chain of cells whose consecutive convergence locations are closer than
//! `distance_threshold`. Clusters are the connected components of that
//! graph, found with petgraph's union-find.
//!
//! Cluster ids are handed out in row-major order of first appearance, so
//! the labelling depends only on the grid contents and clustering the same
//! data twice gives the same result.

use crate::grid::BasinData;
use descentlab_core::core::types::Vector2;
use petgraph::unionfind::UnionFind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default linkage distance between convergence locations.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 1.0;

/// Clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterConfig {
    /// Locations closer than this are linked. A non-positive or NaN
    /// threshold links nothing, leaving one cluster per converged cell.
    pub distance_threshold: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
        }
    }
}

impl ClusterConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the linkage distance.
    pub fn with_distance_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = threshold;
        self
    }
}

/// Cluster labelling of a basin grid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BasinClusters {
    resolution: usize,
    ids: Vec<Option<usize>>,
    cluster_count: usize,
}

impl BasinClusters {
    /// Cluster id per cell in row-major order; `None` for cells that did not converge.
    pub fn ids(&self) -> &[Option<usize>] {
        &self.ids
    }

    /// Cluster id of cell `(row, col)`.
    pub fn id(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.resolution || col >= self.resolution {
            return None;
        }
        self.ids[row * self.resolution + col]
    }

    /// Number of clusters, one more than the largest id.
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Ids with −1 standing for non-converged cells.
    pub fn to_signed_ids(&self) -> Vec<i64> {
        self.ids
            .iter()
            .map(|id| id.map_or(-1, |id| id as i64))
            .collect()
    }

    /// Number of cells in each cluster.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.cluster_count];
        for id in self.ids.iter().flatten() {
            sizes[*id] += 1;
        }
        sizes
    }

    /// Mean convergence location of each cluster.
    ///
    /// `data` must be the grid these clusters were computed from.
    pub fn centroids(&self, data: &BasinData) -> Vec<Vector2> {
        let mut sums = vec![Vector2::zeros(); self.cluster_count];
        let mut counts = vec![0usize; self.cluster_count];

        for ((_, _, point), id) in data.cells().zip(&self.ids) {
            if let Some(id) = id {
                sums[*id] += point.convergence_loc;
                counts[*id] += 1;
            }
        }

        sums.into_iter()
            .zip(counts)
            .map(|(sum, count)| sum / count as f64)
            .collect()
    }
}

/// Groups the converged cells of `data` by where they converged.
///
/// Stalled and diverged cells get no cluster.
///
/// # Example
///
/// ```
/// use descentlab_basin::{
///     cluster_convergence_locations, initialize_basin_data, BasinBounds, ClusterConfig,
/// };
/// use descentlab_core::core::types::Vector2;
///
/// let mut data = initialize_basin_data(2, BasinBounds::square(0.0, 1.0)).unwrap();
/// for (i, loc) in [(0.0, 0.0), (0.5, 0.0), (5.0, 5.0)].into_iter().enumerate() {
///     let point = &mut data.points[i / 2][i % 2];
///     point.converged = true;
///     point.convergence_loc = Vector2::new(loc.0, loc.1);
/// }
///
/// let clusters = cluster_convergence_locations(&data, &ClusterConfig::default());
/// assert_eq!(clusters.to_signed_ids(), vec![0, 0, 1, -1]);
/// ```
pub fn cluster_convergence_locations(data: &BasinData, config: &ClusterConfig) -> BasinClusters {
    let cells: Vec<(usize, Vector2)> = data
        .cells()
        .enumerate()
        .filter(|(_, (_, _, point))| point.converged && !point.stalled)
        .map(|(index, (_, _, point))| (index, point.convergence_loc))
        .collect();

    let mut forest = UnionFind::<usize>::new(cells.len());
    for i in 0..cells.len() {
        for j in (i + 1)..cells.len() {
            if (cells[i].1 - cells[j].1).norm() < config.distance_threshold {
                forest.union(i, j);
            }
        }
    }

    let mut ids = vec![None; data.len()];
    let mut root_ids: Vec<Option<usize>> = vec![None; cells.len()];
    let mut cluster_count = 0;

    for (member, (index, _)) in cells.iter().enumerate() {
        let root = forest.find_mut(member);
        let id = *root_ids[root].get_or_insert_with(|| {
            cluster_count += 1;
            cluster_count - 1
        });
        ids[*index] = Some(id);
    }

    BasinClusters {
        resolution: data.resolution,
        ids,
        cluster_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{initialize_basin_data, BasinBounds};
    use pretty_assertions::assert_eq;

    /// Grid whose converged cells sit at the given locations, `None` marking stalled cells.
    fn grid_with(resolution: usize, locations: &[Option<(f64, f64)>]) -> BasinData {
        let mut data = initialize_basin_data(resolution, BasinBounds::square(-1.0, 1.0)).unwrap();
        for (i, loc) in locations.iter().enumerate() {
            let point = &mut data.points[i / resolution][i % resolution];
            match loc {
                Some((x, y)) => {
                    point.converged = true;
                    point.convergence_loc = Vector2::new(*x, *y);
                }
                None => point.stalled = true,
            }
        }
        data
    }

    #[test]
    fn test_chain_links_distant_endpoints() {
        // Endpoints are 1.8 apart but linked through the middle cell
        let data = grid_with(
            2,
            &[Some((0.0, 0.0)), Some((0.9, 0.0)), Some((1.8, 0.0)), None],
        );
        let clusters = cluster_convergence_locations(&data, &ClusterConfig::default());
        assert_eq!(clusters.to_signed_ids(), vec![0, 0, 0, -1]);
        assert_eq!(clusters.cluster_count(), 1);
        assert_eq!(clusters.sizes(), vec![3]);
    }

    #[test]
    fn test_ids_follow_first_appearance() {
        let data = grid_with(
            2,
            &[Some((5.0, 5.0)), Some((-5.0, 0.0)), Some((5.2, 5.0)), Some((0.0, 0.0))],
        );
        let clusters = cluster_convergence_locations(&data, &ClusterConfig::default());
        assert_eq!(clusters.ids(), &[Some(0), Some(1), Some(0), Some(2)]);
        assert_eq!(clusters.id(1, 0), Some(0));
        assert_eq!(clusters.id(2, 0), None);

        let centroids = clusters.centroids(&data);
        assert_eq!(centroids.len(), 3);
        assert!((centroids[0] - Vector2::new(5.1, 5.0)).norm() < 1e-12);
    }

    #[test]
    fn test_threshold_is_strict_and_configurable() {
        let data = grid_with(2, &[Some((0.0, 0.0)), Some((1.0, 0.0)), None, None]);

        let strict = cluster_convergence_locations(&data, &ClusterConfig::default());
        assert_eq!(strict.cluster_count(), 2);

        let loose = cluster_convergence_locations(
            &data,
            &ClusterConfig::new().with_distance_threshold(1.5),
        );
        assert_eq!(loose.cluster_count(), 1);

        let none = cluster_convergence_locations(
            &data,
            &ClusterConfig::new().with_distance_threshold(f64::NAN),
        );
        assert_eq!(none.cluster_count(), 2);
    }

    #[test]
    fn test_no_converged_cells() {
        let data = grid_with(2, &[None, None, None, None]);
        let clusters = cluster_convergence_locations(&data, &ClusterConfig::default());
        assert_eq!(clusters.cluster_count(), 0);
        assert!(clusters.to_signed_ids().iter().all(|id| *id == -1));
        assert!(clusters.centroids(&data).is_empty());
    }

    #[test]
    fn test_labels_do_not_depend_on_merge_order() {
        // The middle location links to both ends only after they were seen
        let data = grid_with(
            2,
            &[Some((1.6, 0.0)), Some((10.0, 10.0)), Some((0.0, 0.0)), Some((0.8, 0.0))],
        );
        let clusters = cluster_convergence_locations(&data, &ClusterConfig::default());
        assert_eq!(clusters.to_signed_ids(), vec![0, 1, 0, 0]);
        assert_eq!(clusters.sizes(), vec![3, 1]);
    }

    #[test]
    fn test_clustering_is_idempotent() {
        let data = grid_with(
            3,
            &[
                Some((0.0, 0.0)),
                None,
                Some((3.0, 3.0)),
                Some((0.4, 0.1)),
                Some((3.3, 2.9)),
                None,
                Some((-4.0, 1.0)),
                Some((0.2, -0.3)),
                None,
            ],
        );
        let config = ClusterConfig::default();
        let first = cluster_convergence_locations(&data, &config);
        let second = cluster_convergence_locations(&data, &config);
        assert_eq!(first, second);
        assert_eq!(first.to_signed_ids(), vec![0, -1, 1, 0, 1, -1, 2, 0, -1]);
    }
}
