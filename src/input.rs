/*
 * Input Module
 *
 * This module handles window events for the amoeba simulation and feeds them
 * into the simulation's pointer and view state.
 *
 * nannou reports positions centred on the window with y pointing up, while
 * the simulation works in view space: origin at the top-left corner, y
 * pointing down. All conversions between the two live here.
 *
 * Features:
 * - Mouse and single-touch pointer tracking
 * - Presses over the egui panel are not forwarded to the agents
 * - Window resizes propagate to the world's view bounds
 */

use nannou::event::TouchEvent;
use nannou::prelude::*;
use nannou::winit::event::{MouseButton, TouchPhase};

use crate::app::Model;
use crate::environment::ViewBounds;

// Window coordinates (centred, y up) to view coordinates (top-left, y down)
pub fn to_view_space(pos: Point2, window: Rect) -> Vec2 {
    vec2(pos.x - window.left(), window.top() - pos.y)
}

// View coordinates back to window coordinates for drawing
pub fn to_window_space(pos: Vec2, window: Rect) -> Point2 {
    pt2(window.left() + pos.x, window.top() - pos.y)
}

// Mouse moved event handler
pub fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    model.pointer.position = to_view_space(pos, app.window_rect());
}

// Mouse pressed event handler
pub fn mouse_pressed(_app: &App, model: &mut Model, button: MouseButton) {
    // Clicks on the control panel belong to the UI
    if button == MouseButton::Left && !model.egui.ctx().is_pointer_over_area() {
        model.pointer.pressed = true;
    }
}

// Mouse released event handler
pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.pointer.pressed = false;
    }
}

// Touch event handler, the first finger acts as the pointer
pub fn touch(app: &App, model: &mut Model, touch: TouchEvent) {
    model.pointer.position = to_view_space(touch.position, app.window_rect());

    match touch.phase {
        TouchPhase::Started => model.pointer.pressed = true,
        TouchPhase::Moved => {}
        TouchPhase::Ended | TouchPhase::Cancelled => model.pointer.pressed = false,
    }
}

// Window resized event handler
pub fn resized(_app: &App, model: &mut Model, size: Vec2) {
    let view = ViewBounds::new(size.x, size.y);
    model.world.resize(view);
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    // Pass events to egui
    model.egui.handle_raw_event(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_centre_maps_to_view_centre() {
        let window = Rect::from_w_h(800.0, 600.0);
        assert_eq!(to_view_space(pt2(0.0, 0.0), window), vec2(400.0, 300.0));
        assert_eq!(to_view_space(pt2(-400.0, 300.0), window), vec2(0.0, 0.0));
        assert_eq!(to_view_space(pt2(400.0, -300.0), window), vec2(800.0, 600.0));
    }

    #[test]
    fn conversions_are_inverse() {
        let window = Rect::from_w_h(1024.0, 768.0);
        let p = vec2(123.0, 456.0);
        assert_eq!(to_view_space(to_window_space(p, window), window), p);
    }
}
