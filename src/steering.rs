/*
 * Steering Module
 *
 * Reusable velocity-adjustment routines composed by the agent state machine:
 * seek with slowdown, damping, speed clamping, soft boundary containment,
 * pointer fleeing, lookahead neighbor avoidance and lateral wiggle.
 *
 * All rates are expressed per second and folded in with frame-rate independent
 * factors (e^(-k*dt) and 1 - e^(-k*dt)), so the same tuning works at any fixed
 * timestep.
 */

use std::f32::consts::{PI, TAU};

use nannou::prelude::*;

use crate::environment::{AgentSnapshot, ViewBounds};
use crate::params::SteeringParams;
use crate::target::hash01;

// Floor for distances used as divisors
pub const MIN_DISTANCE: f32 = 1e-4;

// Blend factor for approaching a target at `sharpness` per second
#[inline]
pub fn approach_factor(sharpness: f32, dt: f32) -> f32 {
    1.0 - (-sharpness * dt).exp()
}

// Wrap an angle difference into [-PI, PI)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

// Shortest-arc interpolation from `from` toward `to`
#[inline]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    from + wrap_angle(to - from) * t
}

// Rescale velocity to exactly `cap` when it is faster
pub fn clamp_speed(velocity: &mut Vec2, cap: f32) {
    let speed_squared = velocity.length_squared();
    if speed_squared > cap * cap {
        let speed = speed_squared.sqrt();
        *velocity *= cap / speed;
    }
}

// Exponential decay toward rest
pub fn damp(velocity: &mut Vec2, rate: f32, dt: f32) {
    *velocity *= (-rate * dt).exp();
}

// Approach a velocity pointing at `target`, slowing down inside the slow radius
pub fn seek(velocity: &mut Vec2, position: Vec2, target: Vec2, params: &SteeringParams, dt: f32) {
    let offset = target - position;
    let distance = offset.length().max(MIN_DISTANCE);

    // Desired speed ramps down near the target
    let desired_speed = params.seek_max_speed * (distance / params.seek_slow_radius).min(1.0);
    let desired = offset / distance * desired_speed;

    *velocity += (desired - *velocity) * approach_factor(params.seek_responsiveness, dt);

    clamp_speed(velocity, params.seek_max_speed);
}

// Push velocity back inward when the body overlaps a view edge.
// Additive, so an agent may poke out briefly before the spring wins.
pub fn contain(velocity: &mut Vec2, position: Vec2, radius: f32, view: ViewBounds, gain: f32, dt: f32) {
    let k = gain * dt;

    if position.x < radius {
        velocity.x += (radius - position.x) * k;
    }
    if position.x > view.width - radius {
        velocity.x -= (position.x - (view.width - radius)) * k;
    }
    if position.y < radius {
        velocity.y += (radius - position.y) * k;
    }
    if position.y > view.height - radius {
        velocity.y -= (position.y - (view.height - radius)) * k;
    }
}

// Acceleration away from the pointer, ramping up as the pointer gets closer.
// `fallback` is used when the pointer sits exactly on the agent.
pub fn flee_acceleration(
    position: Vec2,
    pointer: Vec2,
    radius: f32,
    fallback: Vec2,
    params: &SteeringParams,
) -> Vec2 {
    let offset = position - pointer;
    let distance_squared = offset.length_squared();
    let distance = distance_squared.sqrt().max(MIN_DISTANCE);

    let away = if distance_squared > MIN_DISTANCE * MIN_DISTANCE {
        offset / distance
    } else {
        fallback
    };

    // 0..1 where 1 is "on top of the pointer"
    let flee_radius = radius + params.flee_margin;
    let closeness = (1.0 - distance / flee_radius).max(0.0);

    away * (params.flee_base_accel + params.flee_close_accel * closeness)
}

// Lateral perturbation perpendicular to the heading; sin drives x, cos drives y
pub fn wiggle(velocity: &mut Vec2, heading: f32, phase: f32, accel: f32, dt: f32) {
    let perp = vec2(-heading.sin(), heading.cos());
    velocity.x += perp.x * phase.sin() * accel * dt;
    velocity.y += perp.y * phase.cos() * accel * dt;
}

// Opposite unit directions for a pair of agents whose predicted positions coincide
fn separation_fallback(id: u32, other: u32) -> Vec2 {
    let (lo, hi) = if id < other { (id, other) } else { (other, id) };
    let angle = hash01(lo as f64 * 7919.0 + hi as f64) as f32 * TAU;
    let dir = vec2(angle.cos(), angle.sin());
    if id < other {
        dir
    } else {
        -dir
    }
}

// Weighted sum of unit vectors away from every neighbor predicted to come closer
// than the desired radius, or close enough that the bodies would overlap.
// The result is unscaled; see `apply_avoidance`.
pub fn avoidance_repulsion<'a, I>(me: &AgentSnapshot, neighbors: I, params: &SteeringParams) -> Vec2
where
    I: IntoIterator<Item = &'a AgentSnapshot>,
{
    let desired = me.radius * params.avoid_radius_factor;

    let mut repulsion = Vec2::ZERO;

    for other in neighbors {
        if other.id == me.id {
            continue;
        }

        // A much bigger neighbor can overlap from outside our own desired radius
        let min_separation = me.radius + other.radius + params.avoid_padding;
        let reach = desired.max(min_separation);

        let offset = me.predicted - other.predicted;
        let distance_squared = offset.length_squared();
        if distance_squared >= reach * reach {
            continue;
        }

        let distance = distance_squared.sqrt().max(MIN_DISTANCE);
        let away = if distance_squared > MIN_DISTANCE * MIN_DISTANCE {
            offset / distance
        } else {
            separation_fallback(me.id, other.id)
        };

        // Grows quadratically as the predicted gap shrinks
        let closeness = (1.0 - distance / desired).max(0.0);
        let mut weight = closeness * closeness;

        // Strong extra penalty once the bodies would overlap
        if distance < min_separation {
            let overlap = 1.0 - distance / min_separation;
            weight += params.avoid_overlap_weight * overlap * overlap;
        }

        repulsion += away * weight;
    }

    repulsion
}

// Fold a repulsion sum into the velocity and re-apply the state cap
pub fn apply_avoidance(velocity: &mut Vec2, repulsion: Vec2, strength: f32, cap: f32, dt: f32) {
    if repulsion == Vec2::ZERO {
        return;
    }
    *velocity += repulsion * strength * dt;
    clamp_speed(velocity, cap);
}

// Heading follows the velocity direction, but only once the agent actually moves
pub fn turn_toward_velocity(heading: f32, velocity: Vec2, params: &SteeringParams, dt: f32) -> f32 {
    let speed = velocity.length();
    if speed <= params.heading_noise_floor {
        return if heading.is_finite() { heading } else { 0.0 };
    }

    let target = velocity.y.atan2(velocity.x);
    if !heading.is_finite() {
        return target;
    }

    wrap_angle(lerp_angle(heading, target, approach_factor(params.heading_turn_sharpness, dt)))
}
