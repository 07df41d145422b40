/*
 * UI Module
 *
 * This module contains functions for creating and updating the control panel
 * using nannou_egui, plus the debug text overlay. Parameter change detection
 * is handled by the SimulationParams struct.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::SimulationParams;

// What the last UI frame changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiChanges {
    // Respawn button pressed
    pub respawn: bool,
    pub population_changed: bool,
    pub fluid_grid_changed: bool,
    pub any_changed: bool,
}

// Build the control panel for this frame and report what changed
pub fn update_ui(egui: &mut Egui, params: &mut SimulationParams, debug_info: &DebugInfo) -> UiChanges {
    let mut respawn = false;

    // Take a snapshot of current parameter values for change detection
    params.take_snapshot();

    let ctx = egui.begin_frame();

    egui::Window::new("Amoeba Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Population", |ui| {
                ui.add(egui::Slider::new(&mut params.num_agents, SimulationParams::get_num_agents_range()).text("Agents"));
                ui.add(egui::Slider::new(&mut params.min_radius, SimulationParams::get_radius_range()).text("Min Radius"));
                ui.add(egui::Slider::new(&mut params.max_radius, SimulationParams::get_radius_range()).text("Max Radius"));

                if ui.button("Respawn").clicked() {
                    respawn = true;
                }
            });

            ui.collapsing("Steering", |ui| {
                let s = &mut params.steering;
                ui.add(egui::Slider::new(&mut s.idle_max_speed, SimulationParams::get_speed_cap_range()).text("Idle Max Speed"));
                ui.add(egui::Slider::new(&mut s.wander_max_speed, SimulationParams::get_speed_cap_range()).text("Wander Max Speed"));
                ui.add(egui::Slider::new(&mut s.flee_max_speed, SimulationParams::get_speed_cap_range()).text("Flee Max Speed"));
                ui.add(egui::Slider::new(&mut s.seek_max_speed, SimulationParams::get_speed_cap_range()).text("Seek Max Speed"));
                ui.add(egui::Slider::new(&mut s.flee_margin, 0.0..=200.0).text("Flee Margin"));
            });

            ui.collapsing("Avoidance", |ui| {
                let s = &mut params.steering;
                ui.add(egui::Slider::new(&mut s.avoid_radius_factor, SimulationParams::get_avoid_factor_range()).text("Radius Factor"));
                ui.add(egui::Slider::new(&mut s.avoid_lookahead, SimulationParams::get_lookahead_range()).text("Lookahead (s)"));
                ui.add(egui::Slider::new(&mut s.avoid_strength, SimulationParams::get_strength_range()).text("Strength"));
                ui.add(egui::Slider::new(&mut s.avoid_overlap_weight, 0.0..=20.0).text("Overlap Weight"));
            });

            ui.collapsing("Fluid", |ui| {
                let f = &mut params.fluid;
                ui.add(egui::Slider::new(&mut f.cell_scale, SimulationParams::get_cell_scale_range()).text("Cell Scale"));
                ui.add(egui::Slider::new(&mut f.velocity_damping, SimulationParams::get_damping_range()).text("Velocity Damping"));
                ui.add(egui::Slider::new(&mut f.dye_damping, SimulationParams::get_damping_range()).text("Dye Damping"));
                ui.add(egui::Slider::new(&mut f.advection, 0.0..=4.0).text("Advection"));
                ui.add(egui::Slider::new(&mut f.inject_velocity, 0.0..=2.0).text("Inject Velocity"));
                ui.add(egui::Slider::new(&mut f.inject_dye, 0.0..=2.0).text("Inject Dye"));
                ui.add(egui::Slider::new(&mut f.blur_iterations, SimulationParams::get_blur_iterations_range()).text("Blur Passes"));
                ui.checkbox(&mut params.show_fluid, "Show Fluid");
            });

            ui.collapsing("Performance Tuning", |ui| {
                ui.checkbox(&mut params.enable_parallel, "Enable Parallel Processing");
                ui.checkbox(&mut params.enable_spatial_grid, "Enable Spatial Grid");
                ui.add(egui::Slider::new(&mut params.fixed_physics_fps, SimulationParams::get_physics_fps_range()).text("Physics FPS"));

                ui.separator();

                // Performance metrics
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Ticks this frame: {}", debug_info.physics_updates_per_frame));
            });

            ui.checkbox(&mut params.show_debug, "Show Debug Info");
            ui.checkbox(&mut params.pause_simulation, "Pause Simulation");
        });

    // Sliders move independently; keep the radius range ordered
    if params.max_radius < params.min_radius {
        params.max_radius = params.min_radius;
    }

    let (population_changed, fluid_grid_changed, any_changed) = params.detect_changes();

    UiChanges {
        respawn,
        population_changed,
        fluid_grid_changed,
        any_changed,
    }
}

// Draw debug information on the screen
pub fn draw_debug_info(draw: &nannou::Draw, debug_info: &DebugInfo, window_rect: nannou::geom::Rect) {
    let lines = debug_info.lines();

    // Create a background panel in the top-right corner
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 260.0;
    let panel_height = line_height * lines.len() as f32 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    // Draw the background panel
    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_y = window_rect.top() - margin;

    for (i, text) in lines.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);

        draw.text(text)
            .x_y(panel_x, y)
            .w(panel_width - margin)
            .left_justify()
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
