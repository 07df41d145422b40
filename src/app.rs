/*
 * Application Module
 *
 * This module defines the main application model for the amoeba viewer. It
 * handles initialization (window, tuning file, world) and the per-frame
 * update: control panel, parameter changes, and the fixed timestep loop that
 * advances the world.
 *
 * Rendering lives in the renderer module and window events in the input
 * module; the model only glues them to the simulation core.
 */

use std::path::Path;
use std::time::Instant;

use nannou::prelude::*;
use nannou_egui::Egui;

use crate::debug::DebugInfo;
use crate::environment::{PointerState, ViewBounds};
use crate::input;
use crate::params::SimulationParams;
use crate::renderer;
use crate::timestep::FixedTimestep;
use crate::ui;
use crate::world::World;
use crate::WINDOW_TITLE;

// Used when the primary monitor cannot be queried
const FALLBACK_WINDOW_SIZE: (u32, u32) = (1280, 800);

// Main model for the application
pub struct Model {
    pub world: World,
    pub params: SimulationParams,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    // Pointer in view space
    pub pointer: PointerState,
    // Fixed timestep physics
    pub stepper: FixedTimestep,
    pub last_update_time: Instant,
}

// Tuning from the file named by the first CLI argument, or defaults
fn load_params() -> SimulationParams {
    let Some(path) = std::env::args().nth(1) else {
        return SimulationParams::default();
    };

    match SimulationParams::from_json_file(Path::new(&path)) {
        Ok(params) => {
            log::info!("loaded tuning from {}", path);
            params
        }
        Err(err) => {
            log::error!("{}: {}, falling back to defaults", path, err);
            SimulationParams::default()
        }
    }
}

// Initialize the model
pub fn model(app: &App) -> Model {
    // Size the window at 80% of the primary monitor
    let (window_width, window_height) = app
        .primary_monitor()
        .map(|monitor| {
            let size = monitor.size();
            ((size.width as f32 * 0.8) as u32, (size.height as f32 * 0.8) as u32)
        })
        .unwrap_or(FALLBACK_WINDOW_SIZE);

    // Create the main window
    let window_id = app
        .new_window()
        .title(WINDOW_TITLE)
        .size(window_width, window_height)
        .view(renderer::view)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .touch(input::touch)
        .resized(input::resized)
        .raw_event(input::raw_window_event)
        .build()
        .expect("failed to create the main window");

    let window = app.window(window_id).expect("main window closed during setup");
    let egui = Egui::from_window(&window);

    let rect = window.rect();
    let view = ViewBounds::new(rect.w(), rect.h());

    let mut params = load_params();
    let mut world = match World::new(&params, view) {
        Ok(world) => world,
        Err(err) => {
            log::error!("{}, falling back to defaults", err);
            params = SimulationParams::default();
            World::new(&params, view).expect("default parameters are valid")
        }
    };
    world.spawn_agents(params.num_agents, params.seed);

    let stepper = FixedTimestep::new(params.fixed_physics_fps, params.max_frame_dt, params.max_catch_up_ticks);

    Model {
        world,
        params,
        egui,
        debug_info: DebugInfo::default(),
        pointer: PointerState::default(),
        stepper,
        last_update_time: Instant::now(),
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    // Update debug info
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let changes = ui::update_ui(&mut model.egui, &mut model.params, &model.debug_info);

    if changes.any_changed {
        if changes.fluid_grid_changed {
            log::debug!("fluid cell scale changed to {}", model.params.fluid.cell_scale);
        }
        model.world.apply_params(&model.params);
        model.stepper.set_physics_fps(model.params.fixed_physics_fps);
    }

    if changes.respawn || changes.population_changed {
        model.world.spawn_agents(model.params.num_agents, model.params.seed);
    }

    // Calculate time since last update
    let now = Instant::now();
    let frame_time = now.duration_since(model.last_update_time);
    model.last_update_time = now;

    if model.params.pause_simulation {
        // Don't bank paused time
        model.stepper.reset();
        model.debug_info.physics_updates_per_frame = 0;
    } else {
        let ticks = model.stepper.advance(frame_time);
        let dt = model.stepper.dt();
        for _ in 0..ticks {
            model.world.step(dt, Some(model.pointer));
        }
        model.debug_info.physics_updates_per_frame = ticks;
    }

    model.debug_info.interpolation_alpha = model.stepper.alpha();
    model.debug_info.capture(&model.world);
}
