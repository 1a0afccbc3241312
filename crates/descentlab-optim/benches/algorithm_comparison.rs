//! Runner throughput on the classic test landscapes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use descentlab_core::core::types::DVector;
use descentlab_optim::{run, AlgorithmConfig, AlgorithmKind, StoppingCriterion};
use descentlab_problems::{by_name, BUILTIN_PROBLEMS};

fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("algorithms");
    let start = DVector::from_vec(vec![-1.2, 1.0]);
    let stopping = StoppingCriterion::new().with_max_iterations(200);

    for name in BUILTIN_PROBLEMS {
        let Some(problem) = by_name(name) else {
            continue;
        };
        for kind in AlgorithmKind::ALL {
            let config: AlgorithmConfig = kind.default_config().with_stopping(stopping.clone());
            group.bench_with_input(BenchmarkId::new(kind.as_str(), name), &config, |b, config| {
                b.iter(|| run(problem.as_ref(), black_box(&start), config))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_algorithms);
criterion_main!(benches);
