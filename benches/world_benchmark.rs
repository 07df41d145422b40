/*
 * Amoeba Simulation Benchmark
 *
 * Benchmarks for the simulation core: a full world tick at several population
 * sizes (with and without the spatial grid and the parallel agent pass) and
 * a fluid step on its own.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use amoebas::{FluidGrid, FluidParams, SimulationParams, ViewBounds, World};

const DT: f32 = 1.0 / 60.0;

fn view() -> ViewBounds {
    ViewBounds::new(1600.0, 1000.0)
}

// A world that has already settled into wandering
fn warmed_world(params: &SimulationParams, n: usize) -> World {
    let mut world = World::new(params, view()).expect("benchmark params are valid");
    world.spawn_agents(n, 1234);
    for _ in 0..120 {
        world.step(DT, None);
    }
    world
}

// Benchmark a full tick with the different neighbor strategies
fn bench_world_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_step");

    let variants = [
        ("brute_force", false, false),
        ("spatial_grid", true, false),
        ("grid_parallel", true, true),
    ];

    for num_agents in [50, 200, 400].iter() {
        for (name, grid, parallel) in variants {
            let mut params = SimulationParams::default();
            params.num_agents = *num_agents;
            params.enable_spatial_grid = grid;
            params.enable_parallel = parallel;

            group.bench_with_input(BenchmarkId::new(name, num_agents), num_agents, |b, &n| {
                let mut world = warmed_world(&params, n);
                b.iter(|| {
                    world.step(black_box(DT), None);
                });
            });
        }
    }

    group.finish();
}

// Benchmark the fluid grid alone at a few resolutions
fn bench_fluid_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("fluid_step");

    for cell_scale in [4.0f32, 8.0, 16.0].iter() {
        let params = FluidParams {
            cell_scale: *cell_scale,
            ..FluidParams::default()
        };

        group.bench_with_input(BenchmarkId::from_parameter(cell_scale), &params, |b, params| {
            let world = warmed_world(&SimulationParams::default(), 100);
            let mut fluid = FluidGrid::new(view(), *params);
            b.iter(|| {
                fluid.step(black_box(DT), world.agents().iter());
            });
        });
    }

    group.finish();
}

// Configure the benchmarks
criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_world_step, bench_fluid_step
}

criterion_main!(benches);
