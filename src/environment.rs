/*
 * Environment Module
 *
 * The read-only view every agent receives once per tick: pointer state, view
 * bounds, and a snapshot of all agents' kinematics taken before any agent was
 * updated. Agents never see a neighbor's already-updated values from the same
 * tick, so update order (or running the agent pass in parallel) cannot change
 * the outcome.
 */

use nannou::prelude::*;

use crate::spatial_grid::SpatialGrid;

// Pointer in view space (origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub position: Vec2,
    pub pressed: bool,
}

impl PointerState {
    pub fn new(position: Vec2, pressed: bool) -> Self {
        Self { position, pressed }
    }
}

// Size of the view agents live in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub width: f32,
    pub height: f32,
}

impl ViewBounds {
    // A minimised window can report zero or garbage; keep at least one unit per axis
    pub fn new(width: f32, height: f32) -> Self {
        let sanitize = |v: f32| if v.is_finite() { v.max(1.0) } else { 1.0 };
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }
}

// Pre-tick kinematics of one agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshot {
    pub id: u32,
    pub radius: f32,
    // Position extrapolated by the avoidance lookahead
    pub predicted: Vec2,
}

// Neighbor lookup over the snapshot, optionally accelerated by a spatial grid
#[derive(Clone, Copy)]
pub struct NeighborView<'a> {
    snapshots: &'a [AgentSnapshot],
    grid: Option<&'a SpatialGrid>,
}

impl<'a> NeighborView<'a> {
    pub fn new(snapshots: &'a [AgentSnapshot], grid: Option<&'a SpatialGrid>) -> Self {
        Self { snapshots, grid }
    }

    pub fn empty() -> NeighborView<'static> {
        NeighborView {
            snapshots: &[],
            grid: None,
        }
    }

    // Every snapshot whose predicted position may lie within the grid's cell size
    // of `predicted`. Without a grid this is the whole population.
    pub fn candidates(&self, predicted: Vec2) -> Vec<&'a AgentSnapshot> {
        match self.grid {
            Some(grid) => grid
                .get_nearby_indices(predicted)
                .into_iter()
                .filter_map(|i| self.snapshots.get(i))
                .collect(),
            None => self.snapshots.iter().collect(),
        }
    }
}

// Everything an agent may read during one tick
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub pointer: PointerState,
    pub view: ViewBounds,
    pub neighbors: NeighborView<'a>,
}

impl<'a> TickContext<'a> {
    // A missing pointer means released at the origin
    pub fn new(view: ViewBounds, pointer: Option<PointerState>, neighbors: NeighborView<'a>) -> Self {
        Self {
            pointer: pointer.unwrap_or_default(),
            view,
            neighbors,
        }
    }
}
