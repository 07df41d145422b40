/*
 * World Module
 *
 * The World owns the agent population, the fluid grid and the per-tick
 * neighbor structures. One call to `step` is one fixed simulation tick:
 *
 * 1. Snapshot every agent's kinematics (plus its lookahead position)
 * 2. Bin the snapshot into the spatial grid, if enabled
 * 3. Update every agent against the read-only snapshot, sequentially or on
 *    the rayon pool; agents only ever write to themselves
 * 4. Feed the agents' wakes into the fluid grid and advance it once
 *
 * Because step 3 never observes a partially updated population, the outcome
 * does not depend on agent order or on the parallel toggle.
 */

use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::agent::Agent;
use crate::brain::AgentState;
use crate::environment::{AgentSnapshot, NeighborView, PointerState, TickContext, ViewBounds};
use crate::error::ConfigError;
use crate::fluid::FluidGrid;
use crate::params::{FluidParams, SimulationParams, SmoothingParams, SteeringParams};
use crate::spatial_grid::SpatialGrid;

// Number of agents in each behavior state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub idle: usize,
    pub wander: usize,
    pub flee: usize,
}

pub struct World {
    agents: Vec<Agent>,
    fluid: FluidGrid,
    view: ViewBounds,
    steering: SteeringParams,
    smoothing: SmoothingParams,
    min_radius: f32,
    max_radius: f32,

    // Per-tick neighbor structures, reused across ticks
    snapshots: Vec<AgentSnapshot>,
    grid: Option<SpatialGrid>,

    enable_spatial_grid: bool,
    enable_parallel: bool,

    next_id: u32,
    tick_count: u64,
}

impl World {
    // An empty world; call `spawn_agents` or `add_agent` to populate it
    pub fn new(params: &SimulationParams, view: ViewBounds) -> Result<Self, ConfigError> {
        params.validate()?;

        let fluid = FluidGrid::new(view, params.fluid);
        log::info!(
            "world created for a {:.0}x{:.0} view, fluid grid {}x{}",
            view.width,
            view.height,
            fluid.width(),
            fluid.height()
        );

        Ok(Self {
            agents: Vec::new(),
            fluid,
            view,
            steering: params.steering,
            smoothing: params.smoothing,
            min_radius: params.min_radius,
            max_radius: params.max_radius,
            snapshots: Vec::new(),
            grid: None,
            enable_spatial_grid: params.enable_spatial_grid,
            enable_parallel: params.enable_parallel,
            next_id: 0,
            tick_count: 0,
        })
    }

    // Replace the population with `count` agents laid out deterministically from `seed`
    pub fn spawn_agents(&mut self, count: usize, seed: u64) {
        self.agents.clear();
        self.next_id = 0;

        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..count {
            let radius = rng.gen_range(self.min_radius..=self.max_radius);

            // Keep the whole body on screen where the view allows it
            let x = spawn_coordinate(&mut rng, radius, self.view.width);
            let y = spawn_coordinate(&mut rng, radius, self.view.height);

            self.add_agent(vec2(x, y), radius);
        }

        log::debug!("spawned {} agents with seed {:#x}", count, seed);
    }

    // Add one agent in Idle and return its id. Panics on a non-positive radius.
    pub fn add_agent(&mut self, position: Vec2, radius: f32) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.agents.push(Agent::new(id, position, radius));
        id
    }

    // Advance the simulation by one fixed tick
    pub fn step(&mut self, dt: f32, pointer: Option<PointerState>) {
        if !(dt > 0.0) || !dt.is_finite() {
            log::trace!("skipping tick with dt {}", dt);
            return;
        }

        // Snapshot pre-tick kinematics
        let lookahead = self.steering.avoid_lookahead;
        self.snapshots.clear();
        self.snapshots.extend(self.agents.iter().map(|a| a.snapshot(lookahead)));

        self.rebuild_grid();

        let neighbors = NeighborView::new(&self.snapshots, self.grid.as_ref());
        let ctx = TickContext::new(self.view, pointer, neighbors);
        let steering = &self.steering;
        let smoothing = &self.smoothing;

        // Choose between parallel and sequential processing based on the setting
        if self.enable_parallel {
            self.agents
                .par_iter_mut()
                .for_each(|agent| agent.update(dt, &ctx, steering, smoothing));
        } else {
            for agent in &mut self.agents {
                agent.update(dt, &ctx, steering, smoothing);
            }
        }

        // Fluid after all agents
        if self.fluid.needs_resize(self.view) {
            self.recreate_fluid(*self.fluid.params());
        }
        self.fluid.step(dt, self.agents.iter());

        self.tick_count += 1;
        log::trace!(
            "tick {}: {} agents, total dye {:.3}",
            self.tick_count,
            self.agents.len(),
            self.fluid.total_dye()
        );
    }

    // Re-bin predicted positions. Cell size covers the largest avoidance reach
    // (desired radius or overlap distance), so a 3x3 query around any point finds
    // every agent that can repel it.
    fn rebuild_grid(&mut self) {
        if !self.enable_spatial_grid || self.snapshots.is_empty() {
            self.grid = None;
            return;
        }

        let max_radius = self.snapshots.iter().map(|s| s.radius).fold(0.0, f32::max);
        let cell_size = (max_radius * self.steering.avoid_radius_factor)
            .max(2.0 * max_radius + self.steering.avoid_padding);
        let (width, height) = (self.view.width, self.view.height);

        let reusable = self
            .grid
            .as_ref()
            .map_or(false, |grid| grid.fits(cell_size, width, height));
        if !reusable {
            let grid = SpatialGrid::new(cell_size, width, height);
            log::info!(
                "spatial grid rebuilt: {}x{} cells of {:.1}",
                grid.cols,
                grid.rows,
                grid.cell_size
            );
            self.grid = Some(grid);
        }

        if let Some(grid) = self.grid.as_mut() {
            grid.clear();
            for (i, snapshot) in self.snapshots.iter().enumerate() {
                grid.insert(i, snapshot.predicted);
            }
        }
    }

    fn recreate_fluid(&mut self, params: FluidParams) {
        self.fluid = FluidGrid::new(self.view, params);
        log::info!(
            "fluid grid recreated at {}x{} (cell scale {})",
            self.fluid.width(),
            self.fluid.height(),
            params.cell_scale
        );
    }

    // New view size. The fluid grid is replaced right away when its resolution changes.
    pub fn resize(&mut self, view: ViewBounds) {
        if view == self.view {
            return;
        }
        log::debug!("view resized to {:.0}x{:.0}", view.width, view.height);

        self.view = view;
        if self.fluid.needs_resize(view) {
            self.recreate_fluid(*self.fluid.params());
        }
    }

    // Apply tuning changed at runtime. The population is left alone; callers
    // respawn when counts or radii change.
    pub fn apply_params(&mut self, params: &SimulationParams) {
        self.steering = params.steering;
        self.smoothing = params.smoothing;
        self.min_radius = params.min_radius;
        self.max_radius = params.max_radius;
        self.enable_spatial_grid = params.enable_spatial_grid;
        self.enable_parallel = params.enable_parallel;

        if params.fluid.cell_scale != self.fluid.params().cell_scale {
            self.recreate_fluid(params.fluid);
        } else {
            self.fluid.set_params(params.fluid);
        }

        log::debug!(
            "params applied: grid {}, parallel {}",
            self.enable_spatial_grid,
            self.enable_parallel
        );
    }

    pub fn state_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for agent in &self.agents {
            match agent.state {
                AgentState::Idle => counts.idle += 1,
                AgentState::Wander => counts.wander += 1,
                AgentState::Flee => counts.flee += 1,
            }
        }
        counts
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn fluid(&self) -> &FluidGrid {
        &self.fluid
    }

    pub fn view(&self) -> ViewBounds {
        self.view
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn steering(&self) -> &SteeringParams {
        &self.steering
    }
}

fn spawn_coordinate(rng: &mut StdRng, radius: f32, extent: f32) -> f32 {
    if extent > radius * 2.0 {
        rng.gen_range(radius..=extent - radius)
    } else {
        extent * 0.5
    }
}
