use amoebas::{AgentState, PointerState, SimulationParams, ViewBounds, World};
use approx::assert_abs_diff_eq;
use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DT: f32 = 1.0 / 60.0;

fn view() -> ViewBounds {
    ViewBounds::new(800.0, 600.0)
}

fn world_with(params: &SimulationParams, count: usize, seed: u64) -> World {
    let mut world = World::new(params, view()).unwrap();
    world.spawn_agents(count, seed);
    world
}

fn assert_same_agents(a: &World, b: &World, epsilon: f32) {
    assert_eq!(a.agents().len(), b.agents().len());
    for agent in a.agents() {
        let other = b.agents().iter().find(|o| o.id == agent.id).unwrap();
        assert_eq!(agent.state, other.state, "agent {}", agent.id);
        assert_abs_diff_eq!(agent.position.x, other.position.x, epsilon = epsilon);
        assert_abs_diff_eq!(agent.position.y, other.position.y, epsilon = epsilon);
        assert_abs_diff_eq!(agent.velocity.x, other.velocity.x, epsilon = epsilon);
        assert_abs_diff_eq!(agent.velocity.y, other.velocity.y, epsilon = epsilon);
    }
}

#[test]
fn speed_never_exceeds_state_cap() {
    let params = SimulationParams::default();
    let mut world = world_with(&params, 40, 11);
    let mut rng = StdRng::seed_from_u64(99);

    for agent in world.agents_mut() {
        agent.velocity = vec2(rng.gen_range(-600.0..600.0), rng.gen_range(-600.0..600.0));
        agent.state = AgentState::ALL[rng.gen_range(0..3)];
        agent.state_time = rng.gen_range(0.0..1.0);
    }

    for tick in 0..240 {
        let pointer = PointerState::new(
            vec2(rng.gen_range(0.0..800.0), rng.gen_range(0.0..600.0)),
            tick % 40 < 20,
        );
        world.step(DT, Some(pointer));

        for agent in world.agents() {
            let cap = agent.state.speed_cap(&params.steering);
            assert!(
                agent.speed() <= cap + 1e-3,
                "agent {} in {:?} at {} > {}",
                agent.id,
                agent.state,
                agent.speed(),
                cap
            );
        }
    }
}

#[test]
fn pointer_press_sends_nearby_agent_fleeing_and_release_lets_it_go() {
    let params = SimulationParams::default();
    let mut world = World::new(&params, view()).unwrap();
    world.add_agent(vec2(400.0, 300.0), 20.0);

    let pressed = PointerState::new(vec2(430.0, 300.0), true);
    world.step(DT, Some(pressed));
    assert_eq!(world.agents()[0].state, AgentState::Flee);
    assert!(world.agents()[0].velocity.x < 0.0);

    // Hold for a while, then release: back to wandering after the minimum flee time
    for _ in 0..20 {
        world.step(DT, Some(pressed));
    }
    assert_eq!(world.agents()[0].state, AgentState::Flee);

    let released = PointerState::new(vec2(430.0, 300.0), false);
    for _ in 0..40 {
        world.step(DT, Some(released));
    }
    let agent = &world.agents()[0];
    assert_ne!(agent.state, AgentState::Flee);
    assert!(agent.target_picks >= 1);
}

#[test]
fn same_seed_gives_identical_runs() {
    let params = SimulationParams::default();
    let mut a = world_with(&params, 25, 42);
    let mut b = world_with(&params, 25, 42);

    for _ in 0..300 {
        a.step(DT, None);
        b.step(DT, None);
    }

    assert_same_agents(&a, &b, 0.0);
    assert_eq!(a.fluid().dye(), b.fluid().dye());
}

#[test]
fn parallel_pass_matches_sequential() {
    let sequential = SimulationParams::default();
    let mut parallel = SimulationParams::default();
    parallel.enable_parallel = true;

    let mut a = world_with(&sequential, 60, 5);
    let mut b = world_with(&parallel, 60, 5);
    for _ in 0..200 {
        a.step(DT, None);
        b.step(DT, None);
    }

    assert_same_agents(&a, &b, 0.0);
}

#[test]
fn update_order_does_not_change_the_outcome() {
    let mut params = SimulationParams::default();
    params.enable_spatial_grid = false;

    let mut a = world_with(&params, 30, 8);
    let mut b = world_with(&params, 30, 8);
    b.agents_mut().reverse();

    for _ in 0..30 {
        a.step(DT, None);
        b.step(DT, None);
    }

    assert_same_agents(&a, &b, 1e-2);
}

#[test]
fn spatial_grid_matches_brute_force() {
    let with_grid = SimulationParams::default();
    let mut brute_force = SimulationParams::default();
    brute_force.enable_spatial_grid = false;

    let mut a = world_with(&with_grid, 50, 21);
    let mut b = world_with(&brute_force, 50, 21);
    for _ in 0..30 {
        a.step(DT, None);
        b.step(DT, None);
    }

    assert_same_agents(&a, &b, 1e-2);
}

#[test]
fn spatial_grid_matches_brute_force_with_mixed_sizes() {
    let mut with_grid = SimulationParams::default();
    with_grid.min_radius = 6.0;
    with_grid.max_radius = 60.0;
    with_grid.steering.avoid_radius_factor = 1.5;
    let mut brute_force = with_grid.clone();
    brute_force.enable_spatial_grid = false;

    let mut a = world_with(&with_grid, 40, 17);
    let mut b = world_with(&brute_force, 40, 17);
    for _ in 0..30 {
        a.step(DT, None);
        b.step(DT, None);
    }

    assert_same_agents(&a, &b, 1e-2);
}

#[test]
fn agents_stay_near_the_view() {
    let params = SimulationParams::default();
    let mut world = world_with(&params, 30, 3);

    for _ in 0..1800 {
        world.step(DT, None);
    }

    for agent in world.agents() {
        let margin = agent.radius * 2.0;
        assert!(agent.position.x > -margin && agent.position.x < 800.0 + margin);
        assert!(agent.position.y > -margin && agent.position.y < 600.0 + margin);
    }
}

#[test]
fn moving_agents_leave_dye() {
    let params = SimulationParams::default();
    let mut world = world_with(&params, 10, 4);
    assert_eq!(world.fluid().total_dye(), 0.0);

    for _ in 0..120 {
        world.step(DT, None);
    }
    assert!(world.state_counts().wander + world.state_counts().idle == 10);
    assert!(world.fluid().total_dye() > 0.0);
}

#[test]
fn resize_recreates_a_zeroed_fluid_grid() {
    let params = SimulationParams::default();
    let mut world = world_with(&params, 10, 4);
    for _ in 0..120 {
        world.step(DT, None);
    }
    assert_eq!((world.fluid().width(), world.fluid().height()), (100, 75));

    world.resize(ViewBounds::new(1024.0, 768.0));
    assert_eq!((world.fluid().width(), world.fluid().height()), (128, 96));
    assert_eq!(world.fluid().total_dye(), 0.0);
    assert!(world.fluid().velocity_x().iter().all(|v| *v == 0.0));

    // Targets picked from now on use the new bounds
    world.step(DT, None);
    assert_eq!(world.view(), ViewBounds::new(1024.0, 768.0));
}

#[test]
fn changing_cell_scale_rebuilds_the_fluid_grid() {
    let mut params = SimulationParams::default();
    let mut world = world_with(&params, 5, 4);

    params.fluid.cell_scale = 16.0;
    world.apply_params(&params);
    assert_eq!((world.fluid().width(), world.fluid().height()), (50, 37));
}
