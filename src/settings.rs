//! Game balance and preferences
//!
//! Every tunable the simulation reads lives here. Loaded from a JSON file at
//! startup; any key missing from the file falls back to the default below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::TIER_COUNT;
use crate::error::{SimError, SimResult};
use crate::sim::SizeTier;

/// What happens when the ship reaches a screen edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EdgeMode {
    /// Teleport to the opposite edge
    #[default]
    Wrap,
    /// Stop at the edge
    Clamp,
}

/// Per size-tier policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSpec {
    /// Starting (and maximum) health
    pub health: u32,
    /// Points for a projectile kill
    pub death_score: u64,
    /// Sprite scale relative to the base lemonoid sprite
    pub scale: f32,
    /// Tumble rate (degrees/sec)
    pub tumble_rate: f32,
    /// Damage dealt to the ship on contact
    pub ship_damage: u32,
    /// Death burst: particle count
    pub burst_count: u32,
    /// Death burst: particle radius (px)
    pub burst_radius: f32,
    /// Death burst: particle speed (px/sec)
    pub burst_speed: f32,
    /// Death burst: alpha lost per second
    pub burst_fade: f32,
}

/// One step of the asteroid spawn schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnStep {
    /// Score at which this interval takes over
    pub min_score: u64,
    /// Milliseconds between root spawns
    pub interval_ms: u32,
}

/// Shape of the camera shake burst for a tier-1 kill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakePattern {
    /// Initial offset magnitude (px)
    pub magnitude: f32,
    /// Neutral (1, 1) frames between kicks
    pub hold_frames: u32,
    /// The first, strong sign-flipping kick
    pub kick: f32,
    /// Number of damped rebounds after the kick
    pub rebounds: u32,
    /// Rebound factor range (negative: flips direction and decays)
    pub rebound_min: f32,
    pub rebound_max: f32,
}

impl Default for ShakePattern {
    fn default() -> Self {
        Self {
            magnitude: 16.0,
            hold_frames: 8,
            kick: -1.8,
            rebounds: 16,
            rebound_min: -0.8,
            rebound_max: -0.5,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Lemonoids ===
    /// Tier policy, index 0 = tier 1 (largest)
    pub tiers: Vec<TierSpec>,
    /// Base (tier 1) sprite extents
    pub lemonoid_width: f32,
    pub lemonoid_height: f32,
    /// Root spawn speed (px/sec)
    pub root_speed: f32,
    /// Children spawned when a non-terminal lemonoid dies
    pub fragment_count: u32,
    /// Speed multiplier per generation
    pub fragment_speed_mult: f32,
    /// Heading offsets of the fragments around the parent direction (degrees)
    pub fragment_offsets: Vec<f32>,
    /// Uniform jitter applied to each fragment offset (± degrees)
    pub fragment_jitter: f32,
    /// How long the hit flash lasts (sec)
    pub flash_duration: f32,

    // === Scoring & damage ===
    /// Points per projectile hit
    pub hit_score: u64,
    /// Damage a projectile deals
    pub projectile_damage: u32,

    // === Lasers ===
    pub laser_speed: f32,
    /// Seconds between shots while fire is held
    pub fire_interval: f32,
    /// Accuracy cone width (degrees)
    pub accuracy: f32,
    /// Distinct lemonoids a laser may hit before it is removed
    pub laser_hit_limit: u32,
    pub laser_length: f32,
    pub laser_width: f32,

    // === Ship ===
    /// Per-frame acceleration/decay factor
    pub ship_accel: f32,
    /// Thrust strength
    pub ship_speed: f32,
    /// Optional cap on velocity magnitude (px/frame)
    pub ship_max_speed: Option<f32>,
    pub ship_edge: EdgeMode,
    pub ship_width: f32,
    pub ship_height: f32,
    pub ship_max_health: u32,
    pub ship_max_lives: u32,
    /// Seconds spent dead before respawn or game over
    pub respawn_delay: f32,
    /// Seconds between invincibility blink toggles
    pub blink_interval: f32,
    /// Blink toggles before invincibility ends
    pub blink_count: u32,

    // === Effects ===
    /// Debris particles per surviving hit
    pub debris_count: u32,
    pub debris_speed: f32,
    /// Debris cone width (degrees)
    pub debris_spread: f32,
    pub debris_radius: f32,
    pub debris_fade: f32,
    /// Explosion alpha lost per second
    pub explosion_fade: f32,
    /// Big explosion animation rate (frames/sec)
    pub explosion_frame_rate: f32,
    /// Frames in the big explosion animation
    pub explosion_frames: u32,

    // === Timers ===
    pub spawn_schedule: Vec<SpawnStep>,
    pub shake: ShakePattern,

    // === Presentation ===
    /// Screen shake on big kills
    pub screen_shake: bool,
    /// Reduced motion (suppresses shake)
    pub reduced_motion: bool,
    /// Particle effects
    pub particles: bool,
    /// Particle cap (oldest are dropped first)
    pub max_particles: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let tier = |health, death_score, scale, tumble_rate, ship_damage, burst: (u32, f32, f32, f32)| {
            TierSpec {
                health,
                death_score,
                scale,
                tumble_rate,
                ship_damage,
                burst_count: burst.0,
                burst_radius: burst.1,
                burst_speed: burst.2,
                burst_fade: burst.3,
            }
        };

        Self {
            tiers: vec![
                tier(10, 100, 1.0, 100.0, 4, (8, 6.0, 320.0, 300.0)),
                tier(4, 50, 0.5, 200.0, 3, (12, 4.0, 260.0, 400.0)),
                tier(2, 20, 0.25, 400.0, 2, (16, 3.0, 220.0, 550.0)),
                tier(1, 10, 0.125, 800.0, 1, (20, 2.0, 180.0, 700.0)),
            ],
            lemonoid_width: 128.0,
            lemonoid_height: 96.0,
            root_speed: 75.0,
            fragment_count: 3,
            fragment_speed_mult: 1.5,
            fragment_offsets: vec![-75.0, 0.0, 75.0],
            fragment_jitter: 30.0,
            flash_duration: 0.08,

            hit_score: 5,
            projectile_damage: 1,

            laser_speed: 1000.0,
            fire_interval: 0.05,
            accuracy: 3.0,
            laser_hit_limit: 2,
            laser_length: 24.0,
            laser_width: 4.0,

            ship_accel: 0.975,
            ship_speed: 20.0,
            ship_max_speed: None,
            ship_edge: EdgeMode::Wrap,
            ship_width: 48.0,
            ship_height: 40.0,
            ship_max_health: 10,
            ship_max_lives: 3,
            respawn_delay: 2.0,
            blink_interval: 0.15,
            blink_count: 12,

            debris_count: 4,
            debris_speed: 240.0,
            debris_spread: 60.0,
            debris_radius: 2.0,
            debris_fade: 900.0,
            explosion_fade: 550.0,
            explosion_frame_rate: 20.0,
            explosion_frames: 9,

            spawn_schedule: vec![
                SpawnStep { min_score: 0, interval_ms: 15_000 },
                SpawnStep { min_score: 10_000, interval_ms: 10_000 },
                SpawnStep { min_score: 50_000, interval_ms: 7_500 },
                SpawnStep { min_score: 100_000, interval_ms: 1_000 },
            ],
            shake: ShakePattern::default(),

            screen_shake: true,
            reduced_motion: false,
            particles: true,
            max_particles: 500,
        }
    }
}

impl Settings {
    /// Policy for a size tier
    #[inline]
    pub fn tier(&self, tier: SizeTier) -> &TierSpec {
        // `validate` guarantees one entry per tier
        &self.tiers[tier.index()]
    }

    /// Root spawn interval for the current score
    pub fn spawn_interval_ms(&self, score: u64) -> u32 {
        self.spawn_schedule
            .iter()
            .filter(|step| score >= step.min_score)
            .max_by_key(|step| step.min_score)
            .map(|step| step.interval_ms)
            .unwrap_or(self.spawn_schedule[0].interval_ms)
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles { 0 } else { self.max_particles }
    }

    /// Check the values the simulation relies on
    pub fn validate(&self) -> SimResult<()> {
        fn invalid(name: &'static str, reason: impl Into<String>) -> SimError {
            SimError::InvalidSetting { name, reason: reason.into() }
        }

        if self.tiers.len() != TIER_COUNT {
            return Err(invalid(
                "tiers",
                format!("expected {} tiers, got {}", TIER_COUNT, self.tiers.len()),
            ));
        }
        if self.tiers.iter().any(|t| t.health == 0) {
            return Err(invalid("tiers.health", "every tier needs health > 0"));
        }
        if self.ship_max_health == 0 {
            return Err(invalid("ship_max_health", "must be > 0"));
        }
        if self.ship_max_lives == 0 {
            return Err(invalid("ship_max_lives", "must be > 0"));
        }
        if self.spawn_schedule.is_empty() || self.spawn_schedule.iter().any(|s| s.interval_ms == 0) {
            return Err(invalid("spawn_schedule", "needs at least one step with interval > 0"));
        }
        if self.fire_interval <= 0.0 || self.blink_interval <= 0.0 {
            return Err(invalid("fire_interval/blink_interval", "must be > 0"));
        }
        if self.laser_hit_limit == 0 {
            return Err(invalid("laser_hit_limit", "must be > 0"));
        }
        if self.fragment_offsets.len() != self.fragment_count as usize {
            return Err(invalid(
                "fragment_offsets",
                format!("expected {} offsets, got {}", self.fragment_count, self.fragment_offsets.len()),
            ));
        }
        Ok(())
    }

    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> SimResult<Self> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> SimResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_spawn_interval_tightens_with_score() {
        let settings = Settings::default();
        assert_eq!(settings.spawn_interval_ms(0), 15_000);
        assert_eq!(settings.spawn_interval_ms(9_999), 15_000);
        assert_eq!(settings.spawn_interval_ms(10_000), 10_000);
        assert_eq!(settings.spawn_interval_ms(75_000), 7_500);
        assert_eq!(settings.spawn_interval_ms(1_000_000), 1_000);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "hit_score": 7, "ship_edge": "Clamp" }"#).unwrap();
        assert_eq!(settings.hit_score, 7);
        assert_eq!(settings.ship_edge, EdgeMode::Clamp);
        assert_eq!(settings.tiers.len(), TIER_COUNT);
    }

    #[test]
    fn test_missing_tier_rejected() {
        let mut settings = Settings::default();
        settings.tiers.pop();
        assert!(matches!(
            settings.validate(),
            Err(SimError::InvalidSetting { name: "tiers", .. })
        ));
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_screen_shake());
    }

    #[test]
    fn test_particles_off_caps_at_zero() {
        let settings = Settings {
            particles: false,
            ..Default::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }
}
