/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains performance metrics
 * and simulation statistics displayed in the UI and the debug overlay.
 *
 * Includes metrics for:
 * - FPS and frame time
 * - Fixed physics ticks run in the last frame and the interpolation alpha
 * - Agents per behavior state
 * - Fluid grid resolution and total dye
 */

use std::time::Duration;

use crate::world::{StateCounts, World};

// Debug information to display
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub physics_updates_per_frame: u32,
    pub interpolation_alpha: f32,
    pub tick_count: u64,
    pub agent_count: usize,
    pub state_counts: StateCounts,
    pub fluid_size: (usize, usize),
    pub total_dye: f32,
}

impl DebugInfo {
    // Refresh the simulation statistics from the world
    pub fn capture(&mut self, world: &World) {
        self.tick_count = world.tick_count();
        self.agent_count = world.agents().len();
        self.state_counts = world.state_counts();
        self.fluid_size = (world.fluid().width(), world.fluid().height());
        self.total_dye = world.fluid().total_dye();
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("FPS: {:.1}", self.fps),
            format!("Frame time: {:.2} ms", self.frame_time.as_secs_f64() * 1000.0),
            format!(
                "Ticks/frame: {}  alpha: {:.2}",
                self.physics_updates_per_frame, self.interpolation_alpha
            ),
            format!("Agents: {}  (tick {})", self.agent_count, self.tick_count),
            format!(
                "Idle {} / Wander {} / Flee {}",
                self.state_counts.idle, self.state_counts.wander, self.state_counts.flee
            ),
            format!("Fluid: {}x{}  dye {:.1}", self.fluid_size.0, self.fluid_size.1, self.total_dye),
        ]
    }
}
