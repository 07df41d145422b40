/*
 * Agent Module
 *
 * This module defines the Agent struct: one wandering blob. It owns its
 * kinematics, its behavior state and the smoothed values the renderer reads
 * (speed, heading, deformation and the acceleration/turn "muscle" pulses).
 *
 * Behavior itself lives in the brain module; an agent only knows how to enter
 * a state, pick a new wander target and smooth its render values.
 */

use nannou::prelude::*;

use crate::brain::{self, AgentState};
use crate::environment::{AgentSnapshot, TickContext, ViewBounds};
use crate::fluid::WakeSource;
use crate::params::{SmoothingParams, SteeringParams};
use crate::steering::{approach_factor, lerp_angle, wrap_angle};
use crate::target;

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub heading: f32,

    // Behavior
    pub state: AgentState,
    pub state_time: f32,
    pub target: Vec2,
    pub target_picks: u32,
    // Seeded from the id on the first wandering tick
    pub wiggle_phase: Option<f32>,

    // Render-facing values
    pub age: f32,
    pub render_speed: f32,
    pub render_heading: f32,
    pub deform: f32,
    pub pulse: f32,
    pub turn_pulse: f32,

    prev_velocity: Vec2,
}

impl Agent {
    pub fn new(id: u32, position: Vec2, radius: f32) -> Self {
        assert!(
            radius.is_finite() && radius > 0.0,
            "agent radius must be positive and finite, got {}",
            radius
        );

        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            radius,
            heading: 0.0,
            state: AgentState::Idle,
            state_time: 0.0,
            target: position,
            target_picks: 0,
            wiggle_phase: None,
            age: 0.0,
            render_speed: 0.0,
            render_heading: 0.0,
            deform: 0.0,
            pulse: 0.0,
            turn_pulse: 0.0,
            prev_velocity: Vec2::ZERO,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    // Kinematics other agents may read during the next tick
    pub fn snapshot(&self, lookahead: f32) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            radius: self.radius,
            predicted: self.position + self.velocity * lookahead,
        }
    }

    // Switch state and restart the dwell clock; wandering always starts with a fresh target
    pub fn enter(&mut self, state: AgentState, view: ViewBounds) {
        log::debug!("agent {}: {:?} -> {:?}", self.id, self.state, state);
        self.state = state;
        self.state_time = 0.0;
        if state == AgentState::Wander {
            self.pick_target(view);
        }
    }

    pub fn pick_target(&mut self, view: ViewBounds) {
        self.target_picks = self.target_picks.wrapping_add(1);
        self.target = target::target_point(self.id, self.target_picks, view, self.radius);
    }

    // Run one fixed step: behavior first, then the render smoothing that reads its result
    pub fn update(
        &mut self,
        dt: f32,
        ctx: &TickContext<'_>,
        steering: &SteeringParams,
        smoothing: &SmoothingParams,
    ) {
        brain::think(self, ctx, steering, dt);
        self.smooth(smoothing, dt);
    }

    fn smooth(&mut self, params: &SmoothingParams, dt: f32) {
        self.age += dt;

        let speed = self.velocity.length();
        let heading = if speed > 0.0 {
            self.velocity.y.atan2(self.velocity.x)
        } else {
            self.render_heading
        };

        self.render_speed += (speed - self.render_speed) * approach_factor(params.speed_sharpness, dt);

        // Smooth heading using shortest-angle interpolation, gated so a
        // nearly stationary blob does not spin on velocity noise
        let gate = (speed / params.heading_gate_speed).min(1.0);
        let blend = approach_factor(params.heading_sharpness, dt) * gate;
        if blend > 0.0 {
            self.render_heading = wrap_angle(lerp_angle(self.render_heading, heading, blend));
        }
        if !self.render_heading.is_finite() {
            self.render_heading = if heading.is_finite() { heading } else { 0.0 };
        }

        let target_deform = (speed / params.deform_reference_speed).min(1.0);
        self.deform += (target_deform - self.deform) * approach_factor(params.deform_sharpness, dt);

        // Acceleration from the velocity delta, turn rate from the heading lag
        let step = dt.max(1e-6);
        let accel = (self.velocity - self.prev_velocity).length() / step;
        self.prev_velocity = self.velocity;
        let turn_rate = wrap_angle(heading - self.render_heading).abs() / step;

        let accel_act = ((accel - params.accel_threshold) / params.accel_range).clamp(0.0, 1.0);
        let turn_act = ((turn_rate - params.turn_threshold) / params.turn_range).clamp(0.0, 1.0);

        // Fast rise, slower decay feels muscular
        let pulse_rate = if accel_act > self.pulse { params.pulse_rise } else { params.pulse_decay };
        self.pulse += (accel_act - self.pulse) * approach_factor(pulse_rate, dt);

        let turn_rate_k = if turn_act > self.turn_pulse { params.turn_rise } else { params.turn_decay };
        self.turn_pulse += (turn_act - self.turn_pulse) * approach_factor(turn_rate_k, dt);
    }
}

impl WakeSource for Agent {
    fn wake_position(&self) -> Vec2 {
        self.position
    }

    fn wake_radius(&self) -> f32 {
        self.radius
    }

    // Falls back to the smoothed heading and speed if the velocity is corrupt
    fn wake_velocity(&self) -> Vec2 {
        if self.velocity.is_finite() {
            self.velocity
        } else {
            let heading = if self.render_heading.is_finite() { self.render_heading } else { 0.0 };
            vec2(heading.cos(), heading.sin()) * self.render_speed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::NeighborView;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    #[should_panic(expected = "radius")]
    fn zero_radius_is_rejected() {
        Agent::new(0, Vec2::ZERO, 0.0);
    }

    #[test]
    fn picking_advances_the_counter_deterministically() {
        let view = ViewBounds::new(800.0, 600.0);
        let mut a = Agent::new(5, vec2(400.0, 300.0), 20.0);
        let mut b = Agent::new(5, vec2(100.0, 100.0), 20.0);

        a.pick_target(view);
        b.pick_target(view);
        assert_eq!(a.target_picks, 1);
        assert_eq!(a.target, b.target);

        let first = a.target;
        a.pick_target(view);
        assert_eq!(a.target_picks, 2);
        assert_ne!(a.target, first);
    }

    #[test]
    fn render_values_follow_motion() {
        let steering = SteeringParams::default();
        let smoothing = SmoothingParams::default();
        let view = ViewBounds::new(800.0, 600.0);
        let ctx = TickContext::new(view, None, NeighborView::empty());

        let mut agent = Agent::new(1, vec2(400.0, 300.0), 20.0);
        agent.enter(AgentState::Wander, view);
        for _ in 0..30 {
            agent.update(DT, &ctx, &steering, &smoothing);
        }

        assert!(agent.render_speed > 0.0);
        assert!(agent.deform > 0.0 && agent.deform <= 1.0);
        assert!(agent.pulse >= 0.0 && agent.pulse <= 1.0);
        assert!(agent.turn_pulse >= 0.0 && agent.turn_pulse <= 1.0);
        assert!(agent.render_heading.is_finite());
        assert!((agent.age - 30.0 * DT).abs() < 1e-4);
    }

    #[test]
    fn corrupt_velocity_falls_back_to_smoothed_motion() {
        let mut agent = Agent::new(1, Vec2::ZERO, 20.0);
        agent.velocity = vec2(f32::NAN, 0.0);
        agent.render_heading = 0.0;
        agent.render_speed = 50.0;
        assert_eq!(agent.wake_velocity(), vec2(50.0, 0.0));
    }

    #[test]
    fn stationary_agent_keeps_its_render_heading() {
        let smoothing = SmoothingParams::default();
        let mut agent = Agent::new(1, Vec2::ZERO, 20.0);
        agent.render_heading = 1.25;
        agent.smooth(&smoothing, DT);
        assert_eq!(agent.render_heading, 1.25);
    }
}
