//! Basin sweeps and clustering on the built-in problems.

use descentlab_basin::{
    cluster_convergence_locations, compute_basin, initialize_basin_data, BasinBounds, BasinData,
    BasinError, BasinRequest, ClusterConfig,
};
use descentlab_core::prelude::*;
use descentlab_core::utils::test_helpers::nearest_within;
use descentlab_optim::AlgorithmConfig;
use descentlab_problems::{DatasetGenerator, Himmelblau, LogisticRegression, Quadratic};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn quadratic_basin_is_a_single_cluster() {
    let problem = Quadratic::well_conditioned();
    let request = BasinRequest::new(7, BasinBounds::square(-3.0, 3.0), AlgorithmConfig::newton(0.0));
    let data = compute_basin(&problem, &request).unwrap();

    assert_eq!(data.summary().converged, 49);
    assert!(data.cells().all(|(_, _, p)| p.iterations_used <= 1));

    let clusters = cluster_convergence_locations(&data, &ClusterConfig::default());
    assert_eq!(clusters.cluster_count(), 1);
    assert_eq!(clusters.sizes(), vec![49]);
    assert!(clusters.centroids(&data)[0].norm() < 1e-10);
}

#[test]
fn himmelblau_clusters_sit_on_distinct_critical_points() {
    let problem = Himmelblau::new();
    let critical: Vec<DVector> = problem
        .critical_points()
        .into_iter()
        .map(|p| p.location)
        .collect();
    let request = BasinRequest::new(9, BasinBounds::square(-5.0, 5.0), AlgorithmConfig::lbfgs(10))
        .with_slice(1.0);
    let data = compute_basin(&problem, &request).unwrap();
    assert_eq!(data.slice, None);

    let clusters = cluster_convergence_locations(&data, &ClusterConfig::default());
    let centroids: Vec<DVector> = clusters
        .centroids(&data)
        .iter()
        .map(|c| DVector::from_vec(vec![c.x, c.y]))
        .collect();

    let mut hit = Vec::new();
    for centroid in &centroids {
        let index = nearest_within(centroid, &critical, 1e-3)
            .unwrap_or_else(|| panic!("centroid {centroid:?} is not a critical point"));
        assert!(!hit.contains(&index), "two clusters on critical point {index}");
        hit.push(index);
    }

    // One cluster on each of the four minima
    for minimum in Himmelblau::minima() {
        let on_minimum = centroids
            .iter()
            .filter(|c| (*c - &minimum).norm() < 1e-3)
            .count();
        assert_eq!(on_minimum, 1, "minimum {:?}", minimum.as_slice());
    }
    let minima_clusters = centroids
        .iter()
        .filter(|c| nearest_within(c, &Himmelblau::minima(), 1e-3).is_some())
        .count();
    assert_eq!(minima_clusters, 4);

    // Non-converged cells carry no id
    for ((_, _, point), id) in data.cells().zip(clusters.to_signed_ids()) {
        assert_eq!(point.converged, id >= 0);
    }
}

#[test]
fn sweep_is_reproducible() {
    let problem = Himmelblau::new();
    let request = BasinRequest::new(6, BasinBounds::square(-4.0, 4.0), AlgorithmConfig::gd_line_search());

    let first = compute_basin(&problem, &request).unwrap();
    let second = compute_basin(&problem, &request).unwrap();
    assert_eq!(first, second);

    let config = ClusterConfig::default();
    assert_eq!(
        cluster_convergence_locations(&first, &config),
        cluster_convergence_locations(&second, &config)
    );
}

#[test]
fn logistic_regression_is_swept_on_a_slice() {
    let dataset = DatasetGenerator::from_seed(7)
        .gaussian_clusters(25, 3.0, 0.8)
        .unwrap();
    let problem = LogisticRegression::new(&dataset, 0.1).unwrap();
    let bounds = BasinBounds::square(-3.0, 3.0);
    let algorithm = AlgorithmConfig::lbfgs(5).with_stopping(
        StoppingCriterion::new()
            .with_max_iterations(500)
            .with_function_tolerance(1e-15)
            .with_point_tolerance(1e-15),
    );

    let missing = BasinRequest::new(4, bounds, algorithm.clone());
    assert_eq!(
        compute_basin(&problem, &missing).unwrap_err(),
        BasinError::missing_slice(problem.name(), 3)
    );

    let request = BasinRequest::new(4, bounds, algorithm).with_slice(0.0);
    let data = compute_basin(&problem, &request).unwrap();
    assert_eq!(data.slice, Some(0.0));
    assert_eq!(data.summary().diverged, 0);

    // Strictly convex: every converged run lands on the same minimizer
    let clusters = cluster_convergence_locations(&data, &ClusterConfig::default());
    assert_eq!(clusters.cluster_count(), 1);
}

fn labelled_grid(resolution: usize, locations: &[Option<(f64, f64)>]) -> BasinData {
    let mut data = initialize_basin_data(resolution, BasinBounds::square(0.0, 1.0)).unwrap();
    for (i, location) in locations.iter().enumerate() {
        let point = &mut data.points[i / resolution][i % resolution];
        match location {
            Some((x, y)) => {
                point.converged = true;
                point.convergence_loc.x = *x;
                point.convergence_loc.y = *y;
            }
            None => point.diverged = true,
        }
    }
    data
}

proptest! {
    #[test]
    fn close_cells_share_a_cluster_and_ids_are_ordered(
        locations in prop::collection::vec(
            prop::option::of((-5.0..5.0_f64, -5.0..5.0_f64)),
            16,
        ),
        threshold in 0.1..2.0_f64,
    ) {
        let data = labelled_grid(4, &locations);
        let config = ClusterConfig::new().with_distance_threshold(threshold);
        let clusters = cluster_convergence_locations(&data, &config);
        let ids = clusters.ids();

        for (i, a) in locations.iter().enumerate() {
            for (j, b) in locations.iter().enumerate() {
                if let (Some(a), Some(b)) = (a, b) {
                    let distance = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
                    if distance < threshold {
                        prop_assert_eq!(ids[i], ids[j]);
                    }
                }
            }
            prop_assert_eq!(a.is_some(), ids[i].is_some());
        }

        // Each new id is exactly one past the largest seen so far
        let mut next = 0;
        for id in ids.iter().flatten() {
            prop_assert!(*id <= next);
            if *id == next {
                next += 1;
            }
        }
        prop_assert_eq!(next, clusters.cluster_count());
        prop_assert_eq!(clusters.sizes().iter().sum::<usize>(), ids.iter().flatten().count());
    }
}
