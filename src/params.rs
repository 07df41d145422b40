/*
 * Simulation Parameters Module
 *
 * This module defines the tunable parameters of the simulation, grouped per
 * component: steering gains and caps, render smoothing, and the fluid grid.
 * Every constant the algorithms use lives here so it can be tuned from the UI,
 * swept in tests, or loaded from a JSON tuning file. It also provides change
 * detection so the app knows when the population or fluid grid must be rebuilt.
 */

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// Steering gains, speed caps and radii used by the agent state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringParams {
    // Per-state speed caps (units per second)
    pub idle_max_speed: f32,
    pub wander_max_speed: f32,
    pub flee_max_speed: f32,

    // Idle
    pub idle_damping: f32,
    pub idle_dwell: f32,

    // Seek-with-slowdown
    pub seek_max_speed: f32,
    pub seek_slow_radius: f32,
    pub seek_responsiveness: f32,
    pub arrive_radius: f32,

    // Lateral wiggle while wandering
    pub wiggle_accel: f32,
    pub wiggle_rate: f32,
    pub wiggle_phase_per_id: f32,

    // Soft containment spring (per second, per unit of penetration)
    pub boundary_gain: f32,

    // Pointer fleeing
    pub flee_margin: f32,
    pub flee_base_accel: f32,
    pub flee_close_accel: f32,
    pub flee_min_duration: f32,

    // Neighbor avoidance
    pub avoid_radius_factor: f32,
    pub avoid_lookahead: f32,
    pub avoid_padding: f32,
    pub avoid_overlap_weight: f32,
    pub avoid_strength: f32,

    // Heading follows velocity only above this speed
    pub heading_noise_floor: f32,
    pub heading_turn_sharpness: f32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            idle_max_speed: 60.0,
            wander_max_speed: 90.0,
            flee_max_speed: 140.0,
            idle_damping: 6.0,
            idle_dwell: 0.8,
            seek_max_speed: 90.0,
            seek_slow_radius: 120.0,
            seek_responsiveness: 6.0,
            arrive_radius: 20.0,
            wiggle_accel: 400.0,
            wiggle_rate: 3.0,
            wiggle_phase_per_id: 10.0,
            boundary_gain: 600.0,
            flee_margin: 40.0,
            flee_base_accel: 120.0,
            flee_close_accel: 260.0,
            flee_min_duration: 0.5,
            avoid_radius_factor: 3.0,
            avoid_lookahead: 0.35,
            avoid_padding: 4.0,
            avoid_overlap_weight: 6.0,
            avoid_strength: 220.0,
            heading_noise_floor: 0.5,
            heading_turn_sharpness: 12.0,
        }
    }
}

// Exponential smoothing of the values the renderer reads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingParams {
    pub speed_sharpness: f32,
    pub heading_sharpness: f32,
    pub heading_gate_speed: f32,
    pub deform_sharpness: f32,
    pub deform_reference_speed: f32,
    pub accel_threshold: f32,
    pub accel_range: f32,
    pub pulse_rise: f32,
    pub pulse_decay: f32,
    pub turn_threshold: f32,
    pub turn_range: f32,
    pub turn_rise: f32,
    pub turn_decay: f32,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            speed_sharpness: 19.0,
            heading_sharpness: 22.0,
            heading_gate_speed: 12.0,
            deform_sharpness: 8.0,
            deform_reference_speed: 160.0,
            accel_threshold: 40.0,
            accel_range: 220.0,
            pulse_rise: 25.0,
            pulse_decay: 8.0,
            turn_threshold: 2.0,
            turn_range: 10.0,
            turn_rise: 30.0,
            turn_decay: 10.0,
        }
    }
}

// One of the two wake deposits left behind a moving agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WakeSplat {
    // Distance behind the agent centre, in multiples of its radius
    pub offset: f32,
    // Share of the injected velocity pushed opposite the travel direction
    pub push: f32,
    // Deposit amount per second at full speed
    pub strength: f32,
    // Splat radius relative to `FluidParams::splat_radius`
    pub radius_scale: f32,
}

// Fluid grid tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidParams {
    // View units per grid cell; bigger = cheaper and blurrier
    pub cell_scale: f32,
    pub velocity_damping: f32,
    pub dye_damping: f32,
    pub advection: f32,
    pub inject_velocity: f32,
    pub inject_dye: f32,
    // Splat radius in grid cells
    pub splat_radius: f32,
    pub blur_iterations: usize,
    pub min_inject_speed: f32,
    pub reference_speed: f32,
    pub near_wake: WakeSplat,
    pub far_wake: WakeSplat,
}

impl Default for FluidParams {
    fn default() -> Self {
        Self {
            cell_scale: 8.0,
            velocity_damping: 0.985,
            dye_damping: 0.992,
            advection: 0.9,
            inject_velocity: 0.35,
            inject_dye: 0.35,
            splat_radius: 10.0,
            blur_iterations: 2,
            min_inject_speed: 0.5,
            reference_speed: 120.0,
            near_wake: WakeSplat {
                offset: 0.6,
                push: 0.9,
                strength: 90.0,
                radius_scale: 0.8,
            },
            far_wake: WakeSplat {
                offset: 1.2,
                push: 0.6,
                strength: 60.0,
                radius_scale: 1.1,
            },
        }
    }
}

// Parameters for the whole simulation, adjustable via UI or a tuning file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub num_agents: usize,
    pub seed: u64,
    pub min_radius: f32,
    pub max_radius: f32,
    pub steering: SteeringParams,
    pub smoothing: SmoothingParams,
    pub fluid: FluidParams,

    // Performance settings
    pub enable_parallel: bool,
    pub enable_spatial_grid: bool,

    // Fixed timestep loop
    pub fixed_physics_fps: f32,
    pub max_frame_dt: f32,
    pub max_catch_up_ticks: u32,

    pub show_debug: bool,
    pub show_fluid: bool,
    pub pause_simulation: bool,

    // Internal state for tracking changes
    #[serde(skip)]
    previous_values: Option<ParamSnapshot>,
}

// A snapshot of parameter values used for change detection
#[derive(Debug, Clone)]
struct ParamSnapshot {
    num_agents: usize,
    seed: u64,
    min_radius: f32,
    max_radius: f32,
    steering: SteeringParams,
    smoothing: SmoothingParams,
    fluid: FluidParams,
    enable_parallel: bool,
    enable_spatial_grid: bool,
    fixed_physics_fps: f32,
    show_debug: bool,
    show_fluid: bool,
    pause_simulation: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_agents: 14,
            seed: 0xA110_CA7E,
            min_radius: 18.0,
            max_radius: 30.0,
            steering: SteeringParams::default(),
            smoothing: SmoothingParams::default(),
            fluid: FluidParams::default(),
            enable_parallel: false,
            enable_spatial_grid: true,
            fixed_physics_fps: 60.0,
            max_frame_dt: 0.05,
            max_catch_up_ticks: 5,
            show_debug: false,
            show_fluid: true,
            pause_simulation: false,
            previous_values: None,
        }
    }
}

impl SimulationParams {
    // Load a (possibly partial) JSON tuning file; missing fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let params: SimulationParams = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_radius > 0.0) || !self.min_radius.is_finite() {
            return Err(ConfigError::Invalid("min_radius must be positive"));
        }
        if !(self.max_radius >= self.min_radius) || !self.max_radius.is_finite() {
            return Err(ConfigError::Invalid("max_radius must be at least min_radius"));
        }
        if *Self::get_num_agents_range().end() < self.num_agents {
            return Err(ConfigError::Invalid("num_agents is too large"));
        }
        if !(self.fixed_physics_fps > 0.0) {
            return Err(ConfigError::Invalid("fixed_physics_fps must be positive"));
        }
        if !(self.max_frame_dt > 0.0) {
            return Err(ConfigError::Invalid("max_frame_dt must be positive"));
        }
        if self.max_catch_up_ticks == 0 {
            return Err(ConfigError::Invalid("max_catch_up_ticks must be at least 1"));
        }

        let s = &self.steering;
        if !(s.idle_max_speed > 0.0 && s.wander_max_speed > 0.0 && s.flee_max_speed > 0.0) {
            return Err(ConfigError::Invalid("state speed caps must be positive"));
        }
        if !(s.seek_slow_radius > 0.0) {
            return Err(ConfigError::Invalid("seek_slow_radius must be positive"));
        }
        if !(s.avoid_radius_factor > 0.0) {
            return Err(ConfigError::Invalid("avoid_radius_factor must be positive"));
        }
        if !(s.avoid_lookahead >= 0.0) {
            return Err(ConfigError::Invalid("avoid_lookahead must be non-negative"));
        }
        if !(s.heading_noise_floor >= 0.0) {
            return Err(ConfigError::Invalid("heading_noise_floor must be non-negative"));
        }

        let f = &self.fluid;
        if !(f.cell_scale >= 1.0) {
            return Err(ConfigError::Invalid("fluid cell_scale must be at least 1"));
        }
        if !(f.velocity_damping > 0.0 && f.velocity_damping <= 1.0)
            || !(f.dye_damping > 0.0 && f.dye_damping <= 1.0)
        {
            return Err(ConfigError::Invalid("fluid damping must be in (0, 1]"));
        }
        if !(f.splat_radius > 0.0) {
            return Err(ConfigError::Invalid("fluid splat_radius must be positive"));
        }
        if !(f.reference_speed > 0.0) {
            return Err(ConfigError::Invalid("fluid reference_speed must be positive"));
        }
        if f.blur_iterations > *Self::get_blur_iterations_range().end() {
            return Err(ConfigError::Invalid("fluid blur_iterations is too large"));
        }

        Ok(())
    }

    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&mut self) {
        self.previous_values = Some(ParamSnapshot {
            num_agents: self.num_agents,
            seed: self.seed,
            min_radius: self.min_radius,
            max_radius: self.max_radius,
            steering: self.steering,
            smoothing: self.smoothing,
            fluid: self.fluid,
            enable_parallel: self.enable_parallel,
            enable_spatial_grid: self.enable_spatial_grid,
            fixed_physics_fps: self.fixed_physics_fps,
            show_debug: self.show_debug,
            show_fluid: self.show_fluid,
            pause_simulation: self.pause_simulation,
        });
    }

    // Check if any parameters have changed since the last snapshot
    // Returns a tuple of (population_changed, fluid_grid_changed, any_changed)
    pub fn detect_changes(&self) -> (bool, bool, bool) {
        let Some(prev) = &self.previous_values else {
            return (false, false, false);
        };

        let population_changed = self.num_agents != prev.num_agents
            || self.seed != prev.seed
            || self.min_radius != prev.min_radius
            || self.max_radius != prev.max_radius;

        // Only the cell scale forces a new grid, other fluid knobs apply in place
        let fluid_grid_changed = self.fluid.cell_scale != prev.fluid.cell_scale;

        let any_changed = population_changed
            || self.fluid != prev.fluid
            || self.steering != prev.steering
            || self.smoothing != prev.smoothing
            || self.enable_parallel != prev.enable_parallel
            || self.enable_spatial_grid != prev.enable_spatial_grid
            || self.fixed_physics_fps != prev.fixed_physics_fps
            || self.show_debug != prev.show_debug
            || self.show_fluid != prev.show_fluid
            || self.pause_simulation != prev.pause_simulation;

        (population_changed, fluid_grid_changed, any_changed)
    }

    // Get parameter ranges for UI sliders
    pub fn get_num_agents_range() -> std::ops::RangeInclusive<usize> {
        0..=400
    }

    pub fn get_speed_cap_range() -> std::ops::RangeInclusive<f32> {
        10.0..=400.0
    }

    pub fn get_radius_range() -> std::ops::RangeInclusive<f32> {
        4.0..=80.0
    }

    pub fn get_avoid_factor_range() -> std::ops::RangeInclusive<f32> {
        1.0..=20.0
    }

    pub fn get_lookahead_range() -> std::ops::RangeInclusive<f32> {
        0.0..=2.0
    }

    pub fn get_strength_range() -> std::ops::RangeInclusive<f32> {
        0.0..=1000.0
    }

    pub fn get_damping_range() -> std::ops::RangeInclusive<f32> {
        0.9..=1.0
    }

    pub fn get_cell_scale_range() -> std::ops::RangeInclusive<f32> {
        2.0..=32.0
    }

    pub fn get_blur_iterations_range() -> std::ops::RangeInclusive<usize> {
        0..=8
    }

    pub fn get_physics_fps_range() -> std::ops::RangeInclusive<f32> {
        15.0..=240.0
    }
}
