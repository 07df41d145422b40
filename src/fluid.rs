/*
 * Fluid Module
 *
 * A coarse background grid that carries wakes left by moving agents. It holds
 * a velocity field and a dye field at roughly one cell per `cell_scale` view
 * units. Each step damps both fields, advects dye backward along the velocity
 * (semi-Lagrangian), softens dye with a few 4-neighbor relaxation passes, and
 * then deposits fresh splats behind every moving wake source.
 *
 * There is no pressure projection. The velocity field is only pushed and
 * damped, which is enough for soft trailing wakes.
 */

use nannou::prelude::*;

use crate::environment::ViewBounds;
use crate::params::{FluidParams, WakeSplat};

// Fewest cells per axis, regardless of view size
pub const MIN_GRID_CELLS: usize = 32;

// Anything that stirs the fluid as it moves
pub trait WakeSource {
    fn wake_position(&self) -> Vec2;
    fn wake_radius(&self) -> f32;
    // Motion used to orient and size the wake, in view units per second
    fn wake_velocity(&self) -> Vec2;
}

// Grid resolution for a view at the given cell scale
pub fn grid_dimensions(view: ViewBounds, cell_scale: f32) -> (usize, usize) {
    let scale = cell_scale.max(1.0);
    let w = ((view.width / scale).floor() as usize).max(MIN_GRID_CELLS);
    let h = ((view.height / scale).floor() as usize).max(MIN_GRID_CELLS);
    (w, h)
}

pub struct FluidGrid {
    width: usize,
    height: usize,
    params: FluidParams,
    vx: Vec<f32>,
    vy: Vec<f32>,
    dye: Vec<f32>,
    scratch: Vec<f32>,
}

impl FluidGrid {
    pub fn new(view: ViewBounds, params: FluidParams) -> Self {
        let (width, height) = grid_dimensions(view, params.cell_scale);
        let cells = width * height;

        Self {
            width,
            height,
            params,
            vx: vec![0.0; cells],
            vy: vec![0.0; cells],
            dye: vec![0.0; cells],
            scratch: vec![0.0; cells],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_scale(&self) -> f32 {
        self.params.cell_scale.max(1.0)
    }

    pub fn params(&self) -> &FluidParams {
        &self.params
    }

    // Tuning that keeps the resolution can be swapped in place
    pub fn set_params(&mut self, params: FluidParams) {
        self.params = params;
    }

    pub fn dye(&self) -> &[f32] {
        &self.dye
    }

    pub fn velocity_x(&self) -> &[f32] {
        &self.vx
    }

    pub fn velocity_y(&self) -> &[f32] {
        &self.vy
    }

    pub fn total_dye(&self) -> f32 {
        self.dye.iter().sum()
    }

    // Dye at a cell, or None outside the grid
    pub fn value_at(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.dye[self.idx(x, y)])
        } else {
            None
        }
    }

    // True when the view maps to a different resolution than this grid
    pub fn needs_resize(&self, view: ViewBounds) -> bool {
        grid_dimensions(view, self.params.cell_scale) != (self.width, self.height)
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    // Damp, advect, soften, then inject wakes from `sources`
    pub fn step<'a, S, I>(&mut self, dt: f32, sources: I)
    where
        S: WakeSource + 'a,
        I: IntoIterator<Item = &'a S>,
    {
        self.damp();
        self.advect(dt);
        self.blur();
        self.inject(sources, dt);
    }

    pub fn damp(&mut self) {
        let vel = self.params.velocity_damping;
        let dye = self.params.dye_damping;

        for v in self.vx.iter_mut().chain(self.vy.iter_mut()) {
            *v *= vel;
        }
        for d in &mut self.dye {
            *d *= dye;
        }
    }

    // Semi-Lagrangian backtrace of dye along the cell velocity
    pub fn advect(&mut self, dt: f32) {
        let k = self.params.advection * dt;

        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.idx(x, y);
                let back_x = x as f32 - self.vx[i] * k;
                let back_y = y as f32 - self.vy[i] * k;
                self.scratch[i] = self.sample_dye(back_x, back_y);
            }
        }

        std::mem::swap(&mut self.dye, &mut self.scratch);
    }

    // Bilinear dye sample in grid coordinates, clamped to the grid
    fn sample_dye(&self, x: f32, y: f32) -> f32 {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;

        // NaN falls through clamp unchanged; treat it as the origin
        let x = if x.is_finite() { x.clamp(0.0, max_x) } else { 0.0 };
        let y = if y.is_finite() { y.clamp(0.0, max_y) } else { 0.0 };

        let x0 = (x.floor() as usize).min(self.width - 2);
        let y0 = (y.floor() as usize).min(self.height - 2);
        let tx = x - x0 as f32;
        let ty = y - y0 as f32;

        let d00 = self.dye[self.idx(x0, y0)];
        let d10 = self.dye[self.idx(x0 + 1, y0)];
        let d01 = self.dye[self.idx(x0, y0 + 1)];
        let d11 = self.dye[self.idx(x0 + 1, y0 + 1)];

        let top = d00 * (1.0 - tx) + d10 * tx;
        let bottom = d01 * (1.0 - tx) + d11 * tx;
        top * (1.0 - ty) + bottom * ty
    }

    // 4-neighbor relaxation. A missing neighbor at the border counts as the
    // cell itself, so the total amount of dye is preserved.
    pub fn blur(&mut self) {
        let (w, h) = (self.width, self.height);

        for _ in 0..self.params.blur_iterations {
            self.scratch.copy_from_slice(&self.dye);
            let src = &self.scratch;

            for y in 0..h {
                for x in 0..w {
                    let i = x + y * w;
                    let c = src[i];
                    let left = if x > 0 { src[i - 1] } else { c };
                    let right = if x + 1 < w { src[i + 1] } else { c };
                    let up = if y > 0 { src[i - w] } else { c };
                    let down = if y + 1 < h { src[i + w] } else { c };

                    self.dye[i] = (c * 4.0 + left + right + up + down) / 8.0;
                }
            }
        }
    }

    // Gaussian-ish deposit of velocity and dye centred on a view-space position.
    // `radius` is in grid cells; cells outside the grid are skipped.
    pub fn add_splat(&mut self, position: Vec2, push: Vec2, amount: f32, radius: f32) {
        let scale = self.cell_scale();
        let gx = position.x / scale;
        let gy = position.y / scale;
        if !gx.is_finite() || !gy.is_finite() || !(radius > 0.0) {
            return;
        }

        let r2 = radius * radius;
        let x0 = (gx - radius).floor().max(0.0);
        let y0 = (gy - radius).floor().max(0.0);
        let x1 = (gx + radius).ceil().min((self.width - 1) as f32);
        let y1 = (gy + radius).ceil().min((self.height - 1) as f32);
        if x0 > x1 || y0 > y1 {
            return;
        }

        for y in (y0 as usize)..=(y1 as usize) {
            for x in (x0 as usize)..=(x1 as usize) {
                let dx = x as f32 - gx;
                let dy = y as f32 - gy;
                let d2 = dx * dx + dy * dy;
                if d2 > r2 {
                    continue;
                }

                let falloff = (-d2 / (r2 * 0.35)).exp();
                let i = self.idx(x, y);
                self.vx[i] += push.x * falloff * amount;
                self.vy[i] += push.y * falloff * amount;
                self.dye[i] += falloff * amount;
            }
        }
    }

    // Two splats behind each moving source: a strong one near the trailing
    // edge and a weaker, wider one further back
    pub fn inject<'a, S, I>(&mut self, sources: I, dt: f32)
    where
        S: WakeSource + 'a,
        I: IntoIterator<Item = &'a S>,
    {
        let p = self.params;

        for source in sources {
            let velocity = source.wake_velocity();
            let speed = velocity.length();
            // Also skips NaN speeds
            if !(speed > p.min_inject_speed) {
                continue;
            }

            let dir = velocity / speed;
            let intensity = (speed / p.reference_speed).min(1.0);
            let push = p.inject_velocity * intensity;
            let ink = p.inject_dye * intensity;

            for wake in [p.near_wake, p.far_wake] {
                self.deposit_wake(source, dir, push, ink, &wake, dt);
            }
        }
    }

    fn deposit_wake<S: WakeSource>(&mut self, source: &S, dir: Vec2, push: f32, ink: f32, wake: &WakeSplat, dt: f32) {
        let at = source.wake_position() - dir * source.wake_radius() * wake.offset;
        self.add_splat(
            at,
            -dir * push * wake.push,
            ink * dt * wake.strength,
            self.params.splat_radius * wake.radius_scale,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    struct Stirrer {
        position: Vec2,
        velocity: Vec2,
        radius: f32,
    }

    impl WakeSource for Stirrer {
        fn wake_position(&self) -> Vec2 {
            self.position
        }

        fn wake_radius(&self) -> f32 {
            self.radius
        }

        fn wake_velocity(&self) -> Vec2 {
            self.velocity
        }
    }

    const NONE: [Stirrer; 0] = [];

    fn grid() -> FluidGrid {
        FluidGrid::new(ViewBounds::new(800.0, 600.0), FluidParams::default())
    }

    #[test]
    fn dimensions_have_a_floor() {
        assert_eq!(grid_dimensions(ViewBounds::new(800.0, 600.0), 8.0), (100, 75));
        assert_eq!(grid_dimensions(ViewBounds::new(100.0, 90.0), 8.0), (32, 32));
    }

    #[test]
    fn dye_decays_without_injection() {
        let mut fluid = grid();
        fluid.add_splat(vec2(400.0, 300.0), Vec2::ZERO, 1.0, 6.0);

        let mut previous = fluid.total_dye();
        assert!(previous > 0.0);
        for _ in 0..120 {
            fluid.step(1.0 / 60.0, NONE.iter());
            let total = fluid.total_dye();
            assert!(total < previous, "dye grew: {} -> {}", previous, total);
            assert!(fluid.dye().iter().all(|d| *d >= 0.0));
            previous = total;
        }
    }

    #[test]
    fn zero_velocity_advection_is_identity() {
        let mut fluid = grid();
        for (i, d) in fluid.dye.iter_mut().enumerate() {
            *d = (i % 17) as f32 * 0.1;
        }
        let before = fluid.dye.clone();

        fluid.advect(1.0 / 60.0);

        for (a, b) in before.iter().zip(fluid.dye()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn blur_preserves_total_dye() {
        let mut fluid = grid();
        fluid.add_splat(vec2(4.0, 4.0), Vec2::ZERO, 2.0, 5.0);
        fluid.add_splat(vec2(500.0, 200.0), Vec2::ZERO, 1.0, 8.0);

        let before = fluid.total_dye();
        fluid.blur();
        assert_abs_diff_eq!(fluid.total_dye(), before, epsilon = before * 1e-4);
    }

    #[test]
    fn splats_clip_at_the_grid_edge() {
        let mut fluid = grid();
        fluid.add_splat(vec2(0.0, 0.0), Vec2::ZERO, 1.0, 10.0);
        assert!(fluid.value_at(0, 0).unwrap() > 0.9);

        let mut untouched = grid();
        untouched.add_splat(vec2(-5000.0, 9000.0), Vec2::ZERO, 1.0, 10.0);
        untouched.add_splat(vec2(f32::NAN, 10.0), Vec2::ZERO, 1.0, 10.0);
        assert_eq!(untouched.total_dye(), 0.0);
    }

    #[test]
    fn wakes_trail_behind_and_push_backward() {
        let mut fluid = grid();
        let mover = [Stirrer {
            position: vec2(400.0, 300.0),
            velocity: vec2(120.0, 0.0),
            radius: 24.0,
        }];

        fluid.inject(mover.iter(), 1.0 / 60.0);

        // Agent at cell (50, 37); behind is -x
        let behind = fluid.value_at(45, 37).unwrap();
        let ahead = fluid.value_at(55, 37).unwrap();
        assert!(behind > ahead);
        let i = fluid.idx(46, 37);
        assert!(fluid.velocity_x()[i] < 0.0);
    }

    #[test]
    fn slow_sources_leave_no_wake() {
        let mut fluid = grid();
        let idle = [Stirrer {
            position: vec2(400.0, 300.0),
            velocity: vec2(0.3, 0.0),
            radius: 24.0,
        }];

        fluid.inject(idle.iter(), 1.0 / 60.0);
        assert_eq!(fluid.total_dye(), 0.0);
    }

    #[test]
    fn resize_is_detected_from_resolution() {
        let fluid = grid();
        assert!(!fluid.needs_resize(ViewBounds::new(803.0, 601.0)));
        assert!(fluid.needs_resize(ViewBounds::new(1024.0, 600.0)));
    }
}
