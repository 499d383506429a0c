//! Performance benchmarks for dispatch_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dispatch_core::dispatch::DispatchEngine;
use dispatch_core::graph::Graph;
use dispatch_core::hungarian;
use dispatch_core::matrix::CostMatrix;
use dispatch_core::model::LocationId;
use dispatch_core::shortest_path::shortest_path;
use dispatch_core::test_helpers::{active_shuttle, grid_network, pending_ride, store_with_network};

fn bench_shortest_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortest_path");
    for side in [10u64, 20, 40] {
        let (locations, paths) = grid_network(side, side);
        let graph = Graph::build(&locations, &paths);
        let corner_a = LocationId(1);
        let corner_b = LocationId(side * side);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{side}x{side}")),
            &graph,
            |b, graph| {
                b.iter(|| black_box(shortest_path(graph, corner_a, corner_b)));
            },
        );
    }
    group.finish();
}

fn random_matrix(rng: &mut StdRng, size: usize) -> CostMatrix {
    CostMatrix::from_rows(
        (0..size)
            .map(|_| (0..size).map(|_| rng.gen_range(0.0..100.0)).collect())
            .collect(),
    )
}

fn bench_hungarian(c: &mut Criterion) {
    let mut group = c.benchmark_group("hungarian_solve");
    for size in [10usize, 25, 50] {
        let mut rng = StdRng::seed_from_u64(42);
        let matrix = random_matrix(&mut rng, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &matrix, |b, matrix| {
            b.iter(|| black_box(hungarian::solve(matrix).unwrap()));
        });
    }
    group.finish();
}

fn bench_matching_cycle(c: &mut Criterion) {
    // 20 rides, 15 shuttles on a 10x10 campus grid. The store is reseeded
    // per iteration because a cycle consumes its pending rides.
    let (locations, paths) = grid_network(10, 10);
    let mut rng = StdRng::seed_from_u64(7);
    let rides: Vec<(u64, u64, u64)> = (1..=20)
        .map(|id| (id, rng.gen_range(1..=100), rng.gen_range(1..=100)))
        .collect();
    let shuttles: Vec<(u64, u64)> = (1..=15).map(|id| (id, rng.gen_range(1..=100))).collect();

    c.bench_function("matching_cycle_20x15", |b| {
        b.iter(|| {
            let store = store_with_network(locations.clone(), paths.clone());
            for &(id, source, destination) in &rides {
                store.add_ride(pending_ride(id, source, destination));
            }
            for &(id, at) in &shuttles {
                store.add_shuttle(active_shuttle(id, at));
            }
            let engine = DispatchEngine::default();
            black_box(engine.run_matching_cycle(&store, &store).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_shortest_path,
    bench_hungarian,
    bench_matching_cycle
);
criterion_main!(benches);
