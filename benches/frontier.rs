use std::hint::black_box;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use portfolio_rs::quant::portfolio::AssetUniverse;
use portfolio_rs::quant::portfolio::MeanVarianceOptimizer;
use portfolio_rs::quant::portfolio::MonteCarloSimulator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Distribution;
use rand_distr::Normal;

/// Random universe with a factor-plus-noise covariance.
fn universe(n: usize) -> AssetUniverse {
  let mut rng = StdRng::seed_from_u64(2024);
  let noise = Normal::new(0.0, 0.02).unwrap();

  let periods = 104;
  let returns: Vec<Vec<f64>> = (0..n)
    .map(|i| {
      let drift = 0.001 * (i % 5) as f64;
      (0..periods).map(|_| drift + noise.sample(&mut rng)).collect()
    })
    .collect();

  AssetUniverse::from_return_series(&returns).unwrap()
}

fn bench_optimize(c: &mut Criterion) {
  let mut group = c.benchmark_group("MeanVarianceOptimizer");

  for &n in &[5, 20, 50] {
    let u = universe(n);
    let optimizer = MeanVarianceOptimizer::default();
    group.bench_with_input(BenchmarkId::new("optimize", n), &u, |b, u| {
      b.iter(|| black_box(optimizer.optimize(u).unwrap()))
    });
  }

  group.finish();
}

fn bench_simulate(c: &mut Criterion) {
  let mut group = c.benchmark_group("MonteCarloSimulator");
  group.sample_size(20);

  for &n in &[5, 20] {
    let u = universe(n);
    let simulator = MonteCarloSimulator::default();
    group.bench_with_input(BenchmarkId::new("simulate_50k", n), &u, |b, u| {
      let mut rng = StdRng::seed_from_u64(7);
      b.iter(|| black_box(simulator.simulate(u, &mut rng).unwrap()))
    });
  }

  group.finish();
}

criterion_group!(benches, bench_optimize, bench_simulate);
criterion_main!(benches);
