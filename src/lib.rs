//! Lemonoids - a fragmenting-asteroid arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, damage, fragmentation)
//! - `settings`: Data-driven game balance
//! - `highscore`: The persisted high score record
//! - `error`: Error types for the load/save edges

pub mod error;
pub mod highscore;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use highscore::HighScore;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Play field dimensions (screen space, origin top-left, y down)
    pub const WIDTH: f32 = 1000.0;
    pub const HEIGHT: f32 = 750.0;
    pub const CENTER_X: f32 = WIDTH / 2.0;
    pub const CENTER_Y: f32 = HEIGHT / 2.0;

    /// Target frame rate
    pub const FPS: u32 = 144;
    /// Fixed simulation timestep, one frame
    pub const SIM_DT: f32 = 1.0 / FPS as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of discrete lemonoid size tiers
    pub const TIER_COUNT: usize = 4;
}

/// Centre of the play field
#[inline]
pub fn field_center() -> Vec2 {
    Vec2::new(consts::CENTER_X, consts::CENTER_Y)
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}

/// Unit vector for a heading in degrees.
///
/// Headings follow the mathematical convention (0 = +x, counter-clockwise),
/// but the y component is inverted to land in y-down screen space.
#[inline]
pub fn heading_vector(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.cos(), -rad.sin())
}

/// Heading in degrees (0..360, rounded to 2 decimals) from `from` toward `to`
pub fn aim_degrees(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    let angle = (-delta.y).atan2(delta.x).rem_euclid(std::f32::consts::TAU);
    (angle.to_degrees() * 100.0).round() / 100.0
}
