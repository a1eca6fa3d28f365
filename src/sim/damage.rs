//! Damage, death and fragmentation
//!
//! Health only ever goes down, and each lemonoid dies at most once. A
//! non-terminal death spawns `fragment_count` children one tier down; a
//! terminal death spawns nothing. Score is awarded only for projectile damage.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::collision::Contact;
use super::context::{Effects, Spawn};
use super::shake::ShakeBurst;
use super::state::{Explosion, ExplosionKind, GameEvent, Lemonoid, Particle, Ship, ShipStatus, SizeTier};
use crate::settings::Settings;

/// Where the damage came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DamageSource {
    /// A laser: scores
    Projectile,
    /// Body contact with a lemonoid or the ship: never scores
    Collision,
}

/// A single application of damage
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub amount: u32,
    pub source: DamageSource,
    /// Where the hit landed, relative to the target (drives debris)
    pub contact: Option<&'a Contact>,
}

impl<'a> Hit<'a> {
    pub fn projectile(amount: u32, contact: Option<&'a Contact>) -> Self {
        Self {
            amount,
            source: DamageSource::Projectile,
            contact,
        }
    }

    pub fn collision(amount: u32) -> Self {
        Self {
            amount,
            source: DamageSource::Collision,
            contact: None,
        }
    }
}

/// What a hit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Target was already dead or immune
    Ignored,
    Survived,
    Destroyed,
}

/// Applies hits using the frame's settings and RNG, reporting through `Effects`
pub struct DamageEngine<'a, R: Rng> {
    pub settings: &'a Settings,
    pub rng: &'a mut R,
    /// Ship heading; the tier-1 shake kicks along it
    pub shake_heading: f32,
    /// Simulation clock (seconds)
    pub now: f64,
}

impl<'a, R: Rng> DamageEngine<'a, R> {
    pub fn new(settings: &'a Settings, rng: &'a mut R, shake_heading: f32, now: f64) -> Self {
        Self {
            settings,
            rng,
            shake_heading,
            now,
        }
    }

    /// Damage a lemonoid, killing and fragmenting it at zero health
    pub fn hit_lemonoid(&mut self, lemonoid: &mut Lemonoid, hit: Hit<'_>, fx: &mut impl Effects) -> HitOutcome {
        if !lemonoid.alive || lemonoid.health == 0 {
            return HitOutcome::Ignored;
        }

        lemonoid.health = lemonoid.health.saturating_sub(hit.amount);
        if hit.source == DamageSource::Projectile {
            fx.award(self.settings.hit_score);
        }
        fx.emit(GameEvent::LemonoidHit {
            tier: lemonoid.tier,
            source: hit.source,
        });

        if lemonoid.health > 0 {
            lemonoid.flash_timer = self.settings.flash_duration;
            if let Some(contact) = hit.contact {
                self.spawn_debris(lemonoid.pos, contact, fx);
            }
            return HitOutcome::Survived;
        }

        self.destroy_lemonoid(lemonoid, hit.source, fx);
        HitOutcome::Destroyed
    }

    fn destroy_lemonoid(&mut self, lemonoid: &mut Lemonoid, source: DamageSource, fx: &mut impl Effects) {
        lemonoid.alive = false;
        let settings = self.settings;
        let tier = settings.tier(lemonoid.tier);

        let mut fragments = 0;
        if let Some(child) = lemonoid.tier.next() {
            let speed = lemonoid.move_speed * settings.fragment_speed_mult;
            for &offset in &settings.fragment_offsets {
                let jitter = if settings.fragment_jitter > 0.0 {
                    self.rng.random_range(-settings.fragment_jitter..=settings.fragment_jitter)
                } else {
                    0.0
                };
                let heading = lemonoid.direction_degrees + offset + jitter;
                fx.spawn(Spawn::Lemonoid(Lemonoid::new(child, lemonoid.pos, heading, speed, settings)));
                fragments += 1;
            }
        }

        let kind = if lemonoid.tier == SizeTier::ROOT {
            ExplosionKind::Big
        } else {
            ExplosionKind::Flash
        };
        fx.spawn(Spawn::Explosion(Explosion::new(lemonoid.pos, kind, tier.scale)));
        self.spawn_burst(
            lemonoid.pos,
            tier.burst_count,
            tier.burst_radius,
            tier.burst_speed,
            tier.burst_fade,
            fx,
        );

        if source == DamageSource::Projectile {
            fx.award(tier.death_score);
        }
        if lemonoid.tier == SizeTier::ROOT && settings.effective_screen_shake() {
            fx.shake(ShakeBurst::impact(&settings.shake, self.shake_heading, &mut *self.rng));
        }

        log::debug!(
            "Lemonoid {} (tier {}) destroyed by {:?}, {} fragments",
            lemonoid.id,
            lemonoid.tier.number(),
            source,
            fragments
        );
        fx.emit(GameEvent::LemonoidDestroyed {
            tier: lemonoid.tier,
            source,
            fragments,
        });
    }

    /// Damage the ship. Ignored while dead or invulnerable.
    pub fn hit_ship(&mut self, ship: &mut Ship, amount: u32, fx: &mut impl Effects) -> HitOutcome {
        if !ship.is_alive() || ship.invulnerable {
            return HitOutcome::Ignored;
        }

        ship.health = ship.health.saturating_sub(amount);
        fx.emit(GameEvent::ShipHit { health: ship.health });
        if ship.health > 0 {
            return HitOutcome::Survived;
        }

        ship.status = ShipStatus::Dying { died_at: self.now };
        ship.lives = ship.lives.saturating_sub(1);
        ship.vel = Vec2::ZERO;
        ship.firing = false;

        let settings = self.settings;
        let tier = settings.tier(SizeTier::ROOT);
        fx.spawn(Spawn::Explosion(Explosion::new(ship.pos, ExplosionKind::Big, 0.5)));
        self.spawn_burst(
            ship.pos,
            tier.burst_count,
            tier.burst_radius,
            tier.burst_speed,
            tier.burst_fade,
            fx,
        );

        log::info!("Ship destroyed, {} lives left", ship.lives);
        fx.emit(GameEvent::ShipDestroyed { lives: ship.lives });
        HitOutcome::Destroyed
    }

    /// Debris out of the far side of the body, away from the impact
    fn spawn_debris(&mut self, center: Vec2, contact: &Contact, fx: &mut impl Effects) {
        let settings = self.settings;
        let heading = contact.impact_heading() + 180.0;
        let half_spread = settings.debris_spread / 2.0;
        let origin = center + contact.offset;

        for _ in 0..settings.debris_count {
            let jitter = if half_spread > 0.0 {
                self.rng.random_range(-half_spread..=half_spread)
            } else {
                0.0
            };
            fx.spawn(Spawn::Particle(Particle::new(
                origin,
                heading + jitter,
                settings.debris_speed,
                settings.debris_radius,
                settings.debris_fade,
            )));
        }
    }

    /// Radial burst, evenly spaced with a little jitter
    fn spawn_burst(&mut self, center: Vec2, count: u32, radius: f32, speed: f32, fade: f32, fx: &mut impl Effects) {
        if count == 0 {
            return;
        }
        let step = 360.0 / count as f32;
        for i in 0..count {
            let heading = i as f32 * step + self.rng.random_range(0.0..step);
            let speed = speed * self.rng.random_range(0.6..=1.0);
            fx.spawn(Spawn::Particle(Particle::new(center, heading, speed, radius, fade)));
        }
    }
}
