/*
 * Renderer Module
 *
 * This module draws the simulation: the fluid dye overlay, every agent as a
 * soft deforming blob, the pointer marker and the optional debug overlay.
 *
 * Blob shape comes entirely from the agent's smoothed render values. Speed
 * stretches the body forward and squeezes its sides, the acceleration pulse
 * swells the front, turning widens the squeeze, and a slow surface wave keeps
 * resting blobs alive.
 */

use std::f32::consts::{PI, TAU};

use nannou::prelude::*;

use crate::agent::Agent;
use crate::app::Model;
use crate::fluid::FluidGrid;
use crate::input::to_window_space;
use crate::ui;
use crate::BLOB_OUTLINE_STEPS;

// Dye below this is not worth a draw call
const DYE_VISIBILITY_THRESHOLD: f32 = 0.004;
const DYE_STRENGTH: f32 = 0.22;

// Outline of an agent's body in view space, `steps` points without repeating the first
pub fn blob_outline(agent: &Agent, steps: usize) -> Vec<Vec2> {
    let base = agent.radius;
    let t = agent.age;
    let dir = if agent.render_heading.is_finite() { agent.render_heading } else { 0.0 };
    let s = agent.deform.clamp(0.0, 1.0);
    let p = agent.pulse.clamp(0.0, 1.0);
    let tp = agent.turn_pulse.clamp(0.0, 1.0);

    // Deformation controls
    let bulge_front = (3.0 * s) * (3.0 * p);
    let bulge_back = 10.0 * s;
    let side_squish = (0.10 + 0.28 * s) * base * (1.0 + 0.55 * tp);
    let wave_amp = 2.5 * (1.0 - s) + 1.5 * p;
    let area_comp = 1.0 - 0.10 * s;

    (0..steps)
        .map(|i| {
            let a = i as f32 / steps as f32 * TAU;

            let rel = a - dir;
            let forward = rel.cos();
            let side = rel.sin();

            let dir_bulge = if forward > 0.0 { forward * bulge_front } else { forward * bulge_back };
            let squish = -side_squish * side * side;

            let wave = (a * 3.0 + t * (1.2 + 0.8 * s)).sin() * wave_amp
                + (a * 7.0 - t * (0.9 + 0.5 * s)).sin() * (wave_amp * 0.35);

            // Never let the outline fold through the centre
            let r = (base * area_comp + dir_bulge + squish + wave).max(base * 0.2);

            agent.position + vec2(a.cos(), a.sin()) * r
        })
        .collect()
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    // Begin drawing
    let draw = app.draw();
    let window_rect = app.window_rect();

    // Clear the background
    draw.background().color(rgb(0.05, 0.10, 0.10));

    if model.params.show_fluid {
        draw_fluid(&draw, model.world.fluid(), window_rect);
    }

    for agent in model.world.agents() {
        draw_agent(&draw, agent, window_rect);
    }

    draw_pointer(&draw, model, window_rect);

    // Draw debug visualization if enabled
    if model.params.show_debug {
        for agent in model.world.agents() {
            let pos = to_window_space(agent.position, window_rect);
            let target = to_window_space(agent.target, window_rect);

            // Avoidance radius
            draw.ellipse()
                .xy(pos)
                .radius(agent.radius * model.world.steering().avoid_radius_factor)
                .no_fill()
                .stroke(rgba(1.0, 1.0, 1.0, 0.15))
                .stroke_weight(1.0);

            // Current wander target
            draw.line()
                .start(pos)
                .end(target)
                .color(rgba(1.0, 0.9, 0.4, 0.3))
                .stroke_weight(1.0);

            // Velocity vector, flipped into window space
            draw.arrow()
                .start(pos)
                .end(pos + vec2(agent.velocity.x, -agent.velocity.y) * 0.4)
                .color(YELLOW)
                .stroke_weight(2.0);
        }

        ui::draw_debug_info(&draw, &model.debug_info, window_rect);
    }

    // Finish drawing
    if let Err(err) = draw.to_frame(app, &frame) {
        log::error!("failed to draw frame: {:?}", err);
    }

    // Draw the egui UI
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        log::error!("failed to draw control panel: {:?}", err);
    }
}

// Low resolution dye as translucent white cells
fn draw_fluid(draw: &Draw, fluid: &FluidGrid, window_rect: Rect) {
    let scale = fluid.cell_scale();
    let dye = fluid.dye();

    for y in 0..fluid.height() {
        for x in 0..fluid.width() {
            let d = dye[x + y * fluid.width()].clamp(0.0, 1.0);
            if d < DYE_VISIBILITY_THRESHOLD {
                continue;
            }

            let centre = vec2((x as f32 + 0.5) * scale, (y as f32 + 0.5) * scale);
            draw.rect()
                .xy(to_window_space(centre, window_rect))
                .w_h(scale, scale)
                .color(rgba(0.85, 1.0, 0.92, d * DYE_STRENGTH));
        }
    }
}

fn draw_agent(draw: &Draw, agent: &Agent, window_rect: Rect) {
    let outline: Vec<Point2> = blob_outline(agent, BLOB_OUTLINE_STEPS)
        .into_iter()
        .map(|p| to_window_space(p, window_rect))
        .collect();
    let centre = to_window_space(agent.position, window_rect);
    let s = agent.deform.clamp(0.0, 1.0);
    let v = (agent.render_speed / 140.0).clamp(0.0, 1.0);

    // Gel-like glow
    draw.ellipse()
        .xy(centre)
        .radius(agent.radius * (1.25 + 0.15 * (1.0 - s)))
        .color(rgba(0.86, 1.0, 0.9, 0.06));

    // Body
    draw.polygon()
        .points(outline.iter().cloned())
        .color(rgba(0.55, 0.88, 0.70, 0.55));

    // Shadow core, opposite an upper-left key light that leans toward travel
    let heading = if agent.render_heading.is_finite() { agent.render_heading } else { 0.0 };
    let light = (vec2((-PI * 0.35).cos(), (-PI * 0.35).sin()) + vec2(heading.cos(), heading.sin()) * 0.55)
        .normalize_or_zero();
    let core = agent.position - light * agent.radius * (0.18 + 0.04 * v);
    draw.ellipse()
        .xy(to_window_space(core, window_rect))
        .radius(agent.radius * 0.55)
        .color(rgba(0.18, 0.57, 0.40, 0.35));

    // Highlight
    let highlight = agent.position + light * agent.radius * (0.42 + 0.07 * v);
    draw.ellipse()
        .xy(to_window_space(highlight, window_rect))
        .radius(agent.radius * (0.18 + 0.06 * v))
        .color(rgba(1.0, 1.0, 1.0, 0.35));

    // Dark edge
    let mut closed = outline;
    if let Some(first) = closed.first().copied() {
        closed.push(first);
    }
    draw.polyline()
        .weight(1.0 + 0.6 * (1.0 - s))
        .points(closed)
        .color(rgba(0.16, 0.31, 0.27, 0.4));
}

fn draw_pointer(draw: &Draw, model: &Model, window_rect: Rect) {
    let pointer = model.pointer;
    let (radius, alpha) = if pointer.pressed { (10.0, 1.0) } else { (6.0, 0.7) };

    draw.ellipse()
        .xy(to_window_space(pointer.position, window_rect))
        .radius(radius)
        .color(rgba(1.0, 1.0, 1.0, alpha * 0.6));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resting_blob_is_roughly_round() {
        let agent = Agent::new(0, vec2(100.0, 100.0), 20.0);
        let outline = blob_outline(&agent, BLOB_OUTLINE_STEPS);

        assert_eq!(outline.len(), BLOB_OUTLINE_STEPS);
        for p in &outline {
            let r = (*p - agent.position).length();
            // Side squish plus surface wave stay within a few units
            assert!(r > 14.0 && r < 24.0, "radius {}", r);
        }
    }

    #[test]
    fn fast_blob_is_longer_than_wide() {
        let mut agent = Agent::new(0, vec2(100.0, 100.0), 20.0);
        agent.deform = 1.0;
        agent.render_heading = 0.0;

        // Points at 0, 90, 180 and 270 degrees: the front holds, sides squeeze, the back tucks in
        let outline = blob_outline(&agent, 4);
        let front = (outline[0] - agent.position).length();
        let side = (outline[1] - agent.position).length();
        let back = (outline[2] - agent.position).length();
        assert!(front > side);
        assert!(front > back);
    }
}
