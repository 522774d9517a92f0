//! Criterion benchmarks for the QP solver and 1-D spacing.
//! Focus sizes: n in {2, 8, 32, 128} intervals.
//! Results: by default under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, Rng, SeedableRng};
use chartlabel::qp::{solve_qp, QpProblem};
use chartlabel::spacing::{space_apart, IntervalSpec, SpacingBounds};

/// Crowded ticks: positions closer than their widths.
fn crowded_intervals(n: usize, seed: u64) -> Vec<IntervalSpec> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| IntervalSpec::new(i as f64 * 3.0 + rng.gen_range(-1.0..1.0), rng.gen_range(3.0..6.0)))
        .collect()
}

/// Projection of a random point onto random half-spaces through a ball.
fn random_projection(n: usize, m: usize, seed: u64) -> QpProblem {
    let mut rng = StdRng::seed_from_u64(seed);
    let c = DVector::from_fn(n, |_, _| rng.gen_range(-10.0..10.0));
    let a = DMatrix::from_fn(m, n, |_, _| rng.gen_range(-1.0..1.0));
    let b = DVector::from_fn(m, |_, _| rng.gen_range(-2.0..0.0));
    QpProblem::new(DMatrix::identity(n, n), c, a, b, 0).unwrap()
}

fn bench_spacing(c: &mut Criterion) {
    let mut group = c.benchmark_group("spacing");
    for &n in &[2usize, 8, 32, 128] {
        group.bench_with_input(BenchmarkId::new("space_apart", n), &n, |b, &n| {
            b.iter_batched(
                || crowded_intervals(n, 17),
                |ivs| {
                    let _x = space_apart(&ivs, 1.0, SpacingBounds::default()).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_qp(c: &mut Criterion) {
    let mut group = c.benchmark_group("qp");
    for &n in &[2usize, 8, 32] {
        group.bench_with_input(BenchmarkId::new("random_projection", n), &n, |b, &n| {
            b.iter_batched(
                || random_projection(n, 2 * n, 23),
                |p| {
                    let _s = solve_qp(&p).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_spacing, bench_qp);
criterion_main!(benches);
