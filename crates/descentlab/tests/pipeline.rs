//! The facade wires problems, runners and basin sweeps together.

use descentlab::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn every_builtin_problem_runs_under_every_algorithm() {
    let start = DVector::from_vec(vec![0.5, -0.5]);
    let stopping = StoppingCriterion::new().with_max_iterations(20);

    for name in BUILTIN_PROBLEMS {
        let problem = by_name(name).unwrap();
        for kind in AlgorithmKind::ALL {
            let config = kind.default_config().with_stopping(stopping.clone());
            let trace = run(problem.as_ref(), &start, &config).unwrap();
            assert!(trace.iterations() <= 20, "{name} / {kind}");
            assert_eq!(trace.path().len(), trace.iterations() + 1, "{name} / {kind}");
        }
    }
}

#[test]
fn three_hump_camel_basin_from_the_prelude() {
    let problem = ThreeHumpCamel::new();
    let bounds = BasinBounds::from_domain(&problem.domain()).unwrap();
    let request = BasinRequest::new(5, bounds, AlgorithmConfig::newton(0.0));
    let data = compute_basin(&problem, &request).unwrap();

    let summary = data.summary();
    assert_eq!(summary.converged + summary.diverged + summary.stalled, 25);
    assert!(data.cells().all(|(_, _, p)| p.is_computed()));

    let clusters = cluster_convergence_locations(&data, &ClusterConfig::default());
    assert_eq!(clusters.ids().len(), 25);
    assert_eq!(clusters.sizes().iter().sum::<usize>(), summary.converged);
}
