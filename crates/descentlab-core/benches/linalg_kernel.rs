use criterion::{black_box, criterion_group, criterion_main, Criterion};
use descentlab_core::prelude::*;

fn bench_eigenvalues(c: &mut Criterion) {
    let h2 = DMatrix::from_row_slice(2, 2, &[-42.0, 3.0, 3.0, -26.0]);
    let h3 = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.5, 1.0, -2.0, 0.0, 0.5, 0.0, 1.0]);

    let mut group = c.benchmark_group("eigenvalues");
    group.bench_function("closed_form_2x2", |b| {
        b.iter(|| eigenvalues_2x2(black_box(&h2)))
    });
    group.bench_function("symmetric_3x3", |b| {
        b.iter(|| symmetric_eigenvalues(black_box(&h3)))
    });
    group.finish();
}

fn bench_damped_solve(c: &mut Criterion) {
    let spd = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 200.0]);
    let indefinite = DMatrix::from_row_slice(2, 2, &[-42.0, 0.0, 0.0, -26.0]);
    let g = DVector::from_vec(vec![-14.0, -22.0]);

    let mut group = c.benchmark_group("damped_solve");
    group.bench_function("cholesky", |b| {
        b.iter(|| damped_solve(black_box(&spd), black_box(&g), 0.0))
    });
    group.bench_function("lu_fallback", |b| {
        b.iter(|| damped_solve(black_box(&indefinite), black_box(&g), 0.01))
    });
    group.finish();
}

criterion_group!(benches, bench_eigenvalues, bench_damped_solve);
criterion_main!(benches);
