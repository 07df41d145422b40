/*
 * Target Picker Module
 *
 * Deterministic wander targets. A target is a pure function of the agent id,
 * its pick counter and the view size, so a run can be replayed exactly and
 * tests can predict where an agent is heading.
 */

use nannou::prelude::*;

use crate::environment::ViewBounds;

// Multipliers feeding the two independent hash streams
const U_ID_MUL: f64 = 1013.0;
const U_PICK_MUL: f64 = 9176.0;
const V_ID_MUL: f64 = 733.0;
const V_PICK_MUL: f64 = 31337.0;

/// Deterministic value in [0, 1) from the fractional part of a large-amplitude sine.
pub fn hash01(n: f64) -> f64 {
    let x = n.sin() * 43_758.545_312_3;
    let f = x - x.floor();
    // floor can round up to x for huge magnitudes
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

/// Target point for `id` at its `pick_count`-th pick, inset by `radius` from every edge.
pub fn target_point(id: u32, pick_count: u32, view: ViewBounds, radius: f32) -> Vec2 {
    let id = id as f64;
    let n = pick_count as f64;

    let u = hash01(id * U_ID_MUL + n * U_PICK_MUL) as f32;
    let v = hash01(id * V_ID_MUL + n * V_PICK_MUL) as f32;

    vec2(
        inset_lerp(u, view.width, radius),
        inset_lerp(v, view.height, radius),
    )
}

// Map t in [0, 1) onto [r, extent - r]; collapses to the midpoint when the view is too small
fn inset_lerp(t: f32, extent: f32, r: f32) -> f32 {
    let span = extent - 2.0 * r;
    if span <= 0.0 {
        return extent * 0.5;
    }
    r + t * span
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewBounds {
        ViewBounds::new(1280.0, 800.0)
    }

    #[test]
    fn hash_stays_in_unit_interval() {
        for n in 0..10_000 {
            let h = hash01(n as f64 * 977.0);
            assert!((0.0..1.0).contains(&h), "hash01({}) = {}", n, h);
        }
    }

    #[test]
    fn same_inputs_give_same_point() {
        let a = target_point(7, 3, view(), 20.0);
        let b = target_point(7, 3, view(), 20.0);
        assert_eq!(a, b);
    }

    #[test]
    fn different_ids_or_picks_give_different_points() {
        let base = target_point(7, 3, view(), 20.0);
        assert_ne!(base, target_point(8, 3, view(), 20.0));
        assert_ne!(base, target_point(7, 4, view(), 20.0));
    }

    #[test]
    fn points_stay_inside_the_inset_rectangle() {
        let r = 25.0;
        for id in 0..50 {
            for pick in 1..50 {
                let p = target_point(id, pick, view(), r);
                assert!(p.x >= r && p.x <= 1280.0 - r, "x out of bounds: {:?}", p);
                assert!(p.y >= r && p.y <= 800.0 - r, "y out of bounds: {:?}", p);
            }
        }
    }

    #[test]
    fn narrow_view_targets_the_middle() {
        let p = target_point(1, 1, ViewBounds::new(30.0, 800.0), 20.0);
        assert_eq!(p.x, 15.0);
        assert!(p.y >= 20.0 && p.y <= 780.0);
    }
}
