//! Movement primitives
//!
//! Positions are screen space (y down). Headings are degrees, 0 = +x and
//! counter-clockwise as seen on screen. Wrapping works on a rotation-invariant
//! half extent, so a sprite disappears fully before it reappears.

use glam::Vec2;

use crate::consts::{HEIGHT, WIDTH};
use crate::heading_vector;

/// Ship velocity update: `v' = a^2 * v + thrust * a * speed * dt`.
///
/// With `thrust` zero the velocity decays geometrically. `max_speed`, when
/// set, clamps the magnitude.
pub fn accelerate(vel: Vec2, thrust: Vec2, accel: f32, speed: f32, dt: f32, max_speed: Option<f32>) -> Vec2 {
    let next = vel * accel * accel + thrust * accel * speed * dt;
    match max_speed {
        Some(max) => next.clamp_length_max(max),
        None => next,
    }
}

/// Straight-line motion along a heading
#[inline]
pub fn translate(pos: Vec2, heading_degrees: f32, speed: f32, dt: f32) -> Vec2 {
    pos + heading_vector(heading_degrees) * speed * dt
}

/// Half extent that bounds a sprite of `size` at any rotation
#[inline]
pub fn spin_extent(size: Vec2) -> Vec2 {
    Vec2::splat(size.length() / 2.0)
}

/// Toroidal wrap: leaving past one edge (plus the half extent) re-enters just
/// outside the opposite edge. An axis only wraps at the edge `travel` points
/// toward, so a re-entered sprite nudged back by shake stays put. Positions
/// already in range are returned as-is.
pub fn wrap(pos: Vec2, half: Vec2, travel: Vec2) -> Vec2 {
    let mut out = pos;
    if out.x > WIDTH + half.x && travel.x >= 0.0 {
        out.x = -half.x;
    } else if out.x < -half.x && travel.x <= 0.0 {
        out.x = WIDTH + half.x;
    }
    if out.y > HEIGHT + half.y && travel.y >= 0.0 {
        out.y = -half.y;
    } else if out.y < -half.y && travel.y <= 0.0 {
        out.y = HEIGHT + half.y;
    }
    out
}

/// Keep the whole sprite on screen
pub fn clamp_to_field(pos: Vec2, half: Vec2) -> Vec2 {
    let max = Vec2::new(WIDTH, HEIGHT) - half;
    Vec2::new(
        pos.x.clamp(half.x, max.x.max(half.x)),
        pos.y.clamp(half.y, max.y.max(half.y)),
    )
}

/// Entirely past a screen edge
pub fn is_off_screen(pos: Vec2, half: Vec2) -> bool {
    pos.x <= -half.x || pos.x >= WIDTH + half.x || pos.y <= -half.y || pos.y >= HEIGHT + half.y
}
