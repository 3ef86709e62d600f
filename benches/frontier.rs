use std::hint::black_box;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use frontier_rs::quant::portfolio::efficient_frontier;
use frontier_rs::quant::portfolio::estimate_moments;
use frontier_rs::quant::portfolio::invert;
use frontier_rs::quant::portfolio::max_sharpe_weights;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Distribution;
use rand_distr::Normal;

const OBSERVATIONS: usize = 756;

fn returns(n: usize) -> Array2<f64> {
  let mut rng = StdRng::seed_from_u64(42);
  let noise = Normal::new(0.0, 0.012).unwrap();
  Array2::from_shape_fn((n, OBSERVATIONS), |(i, _)| {
    0.0001 * (i % 7) as f64 + noise.sample(&mut rng)
  })
}

fn bench_moments(c: &mut Criterion) {
  let mut group = c.benchmark_group("Moments");

  for n in [10, 60, 120] {
    let r = returns(n);
    group.bench_with_input(BenchmarkId::from_parameter(n), &r, |b, r| {
      b.iter(|| black_box(estimate_moments(r)))
    });
  }

  group.finish();
}

fn bench_frontier(c: &mut Criterion) {
  let mut group = c.benchmark_group("Frontier");
  group.sample_size(20);

  for n in [10, 60, 120] {
    let moments = estimate_moments(&returns(n));
    group.bench_with_input(BenchmarkId::new("sweep", n), &moments, |b, m| {
      b.iter(|| black_box(efficient_frontier(m, 50, 0.04)))
    });
    group.bench_with_input(BenchmarkId::new("invert", n), &moments, |b, m| {
      b.iter(|| black_box(invert(&m.cov)))
    });
    group.bench_with_input(BenchmarkId::new("tangency", n), &moments, |b, m| {
      b.iter(|| black_box(max_sharpe_weights(&m.mean, &m.cov, 0.04)))
    });
  }

  group.finish();
}

criterion_group!(benches, bench_moments, bench_frontier);
criterion_main!(benches);
