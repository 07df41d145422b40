/*
 * Timestep Module
 *
 * Fixed timestep driver for the simulation. Real frame time is accumulated
 * and consumed in fixed physics steps, so agent behavior does not depend on
 * the render frame rate. Long frames are clamped and the number of catch-up
 * steps per frame is capped; leftover time waits in the accumulator, up to
 * one capped burst of steps.
 */

use std::time::Duration;

pub struct FixedTimestep {
    step: Duration,
    max_frame: Duration,
    max_ticks: u32,
    accumulator: Duration,
}

impl FixedTimestep {
    pub fn new(physics_fps: f32, max_frame_dt: f32, max_ticks: u32) -> Self {
        Self {
            step: Duration::from_secs_f32(1.0 / physics_fps.max(1.0)),
            max_frame: Duration::from_secs_f32(max_frame_dt.max(0.0)),
            max_ticks: max_ticks.max(1),
            accumulator: Duration::ZERO,
        }
    }

    // Step size in seconds
    pub fn dt(&self) -> f32 {
        self.step.as_secs_f32()
    }

    pub fn set_physics_fps(&mut self, physics_fps: f32) {
        self.step = Duration::from_secs_f32(1.0 / physics_fps.max(1.0));
    }

    // Add one frame's worth of time and return how many fixed steps to run
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.accumulator += frame_time.min(self.max_frame);

        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_ticks {
            self.accumulator -= self.step;
            ticks += 1;
        }

        if ticks == self.max_ticks && self.accumulator >= self.step {
            log::warn!(
                "fixed timestep hit the catch-up cap of {} ticks, {:.1} ms behind",
                self.max_ticks,
                self.accumulator.as_secs_f32() * 1000.0
            );
            // Never bank more than one capped burst
            self.accumulator = self.accumulator.min(self.step * self.max_ticks);
        }

        ticks
    }

    // Fraction of a step left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        (self.accumulator.as_secs_f32() / self.step.as_secs_f32()).clamp(0.0, 1.0)
    }

    // Drop any backlog, e.g. when resuming from pause
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}
