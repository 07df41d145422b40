/*
 * Brain Module
 *
 * The per-agent behavior state machine. Each state has a handler in a
 * dispatch table; a handler runs that state's steering primitives and may
 * return the state to switch to. A pointer press near the agent interrupts
 * any state except Flee before the handler runs.
 *
 * Every tick ends the same way regardless of state: neighbor avoidance under
 * the state's speed cap, a hard clamp to that cap, heading follow, and an
 * explicit Euler position step.
 */

use nannou::prelude::*;

use crate::agent::Agent;
use crate::environment::TickContext;
use crate::params::SteeringParams;
use crate::steering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentState {
    Idle = 0,
    Wander = 1,
    Flee = 2,
}

// Runs one state's steering and returns the state to switch to, if any
pub type StateHandler = fn(&mut Agent, &TickContext<'_>, &SteeringParams, f32) -> Option<AgentState>;

const STATE_HANDLERS: [StateHandler; 3] = [idle, wander, flee];

impl AgentState {
    pub const ALL: [AgentState; 3] = [AgentState::Idle, AgentState::Wander, AgentState::Flee];

    pub fn handler(self) -> StateHandler {
        STATE_HANDLERS[self as usize]
    }

    pub fn speed_cap(self, params: &SteeringParams) -> f32 {
        match self {
            AgentState::Idle => params.idle_max_speed,
            AgentState::Wander => params.wander_max_speed,
            AgentState::Flee => params.flee_max_speed,
        }
    }
}

// One fixed step of behavior for a single agent
pub fn think(agent: &mut Agent, ctx: &TickContext<'_>, params: &SteeringParams, dt: f32) {
    agent.state_time += dt;

    if let Some(next) = pointer_interrupt(agent, ctx, params) {
        agent.enter(next, ctx.view);
    }

    let handler = agent.state.handler();
    if let Some(next) = handler(agent, ctx, params, dt) {
        agent.enter(next, ctx.view);
    }

    // The cap of the state we ended up in, after any transition
    let cap = agent.state.speed_cap(params);

    let me = agent.snapshot(params.avoid_lookahead);
    let repulsion = steering::avoidance_repulsion(&me, ctx.neighbors.candidates(me.predicted), params);
    steering::apply_avoidance(&mut agent.velocity, repulsion, params.avoid_strength, cap, dt);
    steering::clamp_speed(&mut agent.velocity, cap);

    agent.heading = steering::turn_toward_velocity(agent.heading, agent.velocity, params, dt);

    agent.position += agent.velocity * dt;
}

// Pointer pressed on or near the body forces Flee
fn pointer_interrupt(agent: &Agent, ctx: &TickContext<'_>, params: &SteeringParams) -> Option<AgentState> {
    if agent.state == AgentState::Flee || !ctx.pointer.pressed {
        return None;
    }

    let flee_radius = agent.radius + params.flee_margin;
    let distance_squared = (agent.position - ctx.pointer.position).length_squared();
    (distance_squared < flee_radius * flee_radius).then_some(AgentState::Flee)
}

fn idle(agent: &mut Agent, _ctx: &TickContext<'_>, params: &SteeringParams, dt: f32) -> Option<AgentState> {
    steering::damp(&mut agent.velocity, params.idle_damping, dt);

    (agent.state_time > params.idle_dwell).then_some(AgentState::Wander)
}

fn wander(agent: &mut Agent, ctx: &TickContext<'_>, params: &SteeringParams, dt: f32) -> Option<AgentState> {
    steering::seek(&mut agent.velocity, agent.position, agent.target, params, dt);

    let phase = agent.wiggle_phase.unwrap_or(agent.id as f32 * params.wiggle_phase_per_id) + dt * params.wiggle_rate;
    agent.wiggle_phase = Some(phase);
    steering::wiggle(&mut agent.velocity, agent.heading, phase, params.wiggle_accel, dt);

    steering::contain(&mut agent.velocity, agent.position, agent.radius, ctx.view, params.boundary_gain, dt);
    steering::clamp_speed(&mut agent.velocity, params.wander_max_speed);

    let arrive_squared = params.arrive_radius * params.arrive_radius;
    ((agent.target - agent.position).length_squared() < arrive_squared).then_some(AgentState::Idle)
}

fn flee(agent: &mut Agent, ctx: &TickContext<'_>, params: &SteeringParams, dt: f32) -> Option<AgentState> {
    let fallback = vec2(agent.heading.cos(), agent.heading.sin());
    let accel = steering::flee_acceleration(agent.position, ctx.pointer.position, agent.radius, fallback, params);
    agent.velocity += accel * dt;

    steering::contain(&mut agent.velocity, agent.position, agent.radius, ctx.view, params.boundary_gain, dt);
    steering::clamp_speed(&mut agent.velocity, params.flee_max_speed);

    (agent.state_time > params.flee_min_duration && !ctx.pointer.pressed).then_some(AgentState::Wander)
}
