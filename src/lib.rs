/*
 * Amoeba Simulation - Module Definitions
 *
 * This file defines the module structure for the amoeba simulation. The
 * simulation core (agents, steering, fluid, world) has no windowing
 * dependencies beyond nannou's vector types; the app, input, renderer and ui
 * modules are the thin viewer built on top of it.
 */

// Re-export key components for easier access
pub use agent::Agent;
pub use brain::AgentState;
pub use environment::{AgentSnapshot, NeighborView, PointerState, TickContext, ViewBounds};
pub use error::ConfigError;
pub use fluid::{FluidGrid, WakeSource};
pub use params::{FluidParams, SimulationParams, SmoothingParams, SteeringParams};
pub use spatial_grid::SpatialGrid;
pub use timestep::FixedTimestep;
pub use world::{StateCounts, World};

// Simulation core
pub mod agent;
pub mod brain;
pub mod environment;
pub mod error;
pub mod fluid;
pub mod params;
pub mod spatial_grid;
pub mod steering;
pub mod target;
pub mod timestep;
pub mod world;

// Viewer
pub mod app;
pub mod debug;
pub mod input;
pub mod renderer;
pub mod ui;

// Constants
pub const BLOB_OUTLINE_STEPS: usize = 72;
pub const WINDOW_TITLE: &str = "Amoebas";
