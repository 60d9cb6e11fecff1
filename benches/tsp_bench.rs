//! Criterion benchmarks for the TSP engines.
//!
//! Cities are scattered uniformly over a 1000 x 1000 square from a fixed
//! seed, so every run sees the same instance.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_tsp::aco::{AcoConfig, AcoRunner};
use u_tsp::ga::{GaConfig, GaRunner};
use u_tsp::geometry::CityMap;
use u_tsp::local_search::two_opt_improve;
use u_tsp::random::{create_rng, random_permutation};
use u_tsp::sa::{SaConfig, SaRunner};
use u_tsp::tour::Tour;

fn scattered(n: usize) -> CityMap {
    let mut rng = create_rng(7);
    let mut cities = CityMap::new();
    for i in 0..n {
        let x = rng.random_range(0.0..1000.0);
        let y = rng.random_range(0.0..1000.0);
        cities.insert(format!("C{i}"), x, y).expect("unique ids");
    }
    cities
}

fn random_tour(cities: &CityMap) -> Tour {
    let dm = cities.distance_matrix();
    let order = random_permutation(cities.len(), &mut create_rng(11));
    Tour::from_order(order, &dm).expect("valid permutation")
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_ga(c: &mut Criterion) {
    let mut group = c.benchmark_group("ga");
    group.sample_size(10);

    for (n, pop, gen) in [(14usize, 100usize, 150usize), (50, 100, 100), (100, 100, 50)] {
        let cities = scattered(n);
        let config = GaConfig::default()
            .with_population_size(pop)
            .with_generations(gen)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::new(format!("n{}_p{}_g{}", n, pop, gen), n),
            &(cities, config),
            |b, (cities, config)| {
                b.iter(|| {
                    let result = GaRunner::run(black_box(cities), black_box(config));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_aco(c: &mut Criterion) {
    let mut group = c.benchmark_group("aco");
    group.sample_size(10);

    for &n in &[14, 50, 100] {
        let cities = scattered(n);
        let config = AcoConfig::default()
            .with_num_ants(20)
            .with_iterations(30)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(cities, config),
            |b, (cities, config)| {
                b.iter(|| {
                    let result = AcoRunner::run(black_box(cities), black_box(config));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_two_opt(c: &mut Criterion) {
    let mut group = c.benchmark_group("two_opt");
    group.sample_size(10);

    for &n in &[50, 100, 200] {
        let cities = scattered(n);
        let dm = cities.distance_matrix();
        let start = random_tour(&cities);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(start, dm), |b, (start, dm)| {
            b.iter(|| black_box(two_opt_improve(black_box(start), black_box(dm))))
        });
    }
    group.finish();
}

fn bench_sa(c: &mut Criterion) {
    let mut group = c.benchmark_group("sa");
    group.sample_size(10);

    for &n in &[50, 100, 200] {
        let cities = scattered(n);
        let dm = cities.distance_matrix();
        let start = random_tour(&cities);
        let config = SaConfig::default()
            .with_temperature_reduction_rate(0.999)
            .with_max_iterations(5_000)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(start, dm, config),
            |b, (start, dm, config)| {
                b.iter(|| {
                    let result = SaRunner::run(black_box(start), black_box(dm), black_box(config));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_ga, bench_aco, bench_two_opt, bench_sa);
criterion_main!(benches);
