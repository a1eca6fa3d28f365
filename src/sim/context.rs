//! Capabilities handed to entities during a frame
//!
//! The damage engine never touches `SimState` directly. It reports score,
//! spawns, shake and events through these traits, and the tick loop applies
//! the collected `FrameEffects` once collision resolution is done. Anything
//! spawned this frame therefore joins the collision pass on the next frame.

use glam::Vec2;

use super::shake::ShakeBurst;
use super::state::{Explosion, GameEvent, Laser, Lemonoid, Particle};

/// Receives score awards
pub trait ScoreSink {
    fn award(&mut self, points: u64);
}

/// Receives new entities
pub trait SpawnQueue {
    fn spawn(&mut self, spawn: Spawn);
}

/// Receives camera shake requests
pub trait ShakeSink {
    fn shake(&mut self, burst: ShakeBurst);
}

/// Receives gameplay events
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Everything the damage engine may do to the world
pub trait Effects: ScoreSink + SpawnQueue + ShakeSink + EventSink {}

impl<T: ScoreSink + SpawnQueue + ShakeSink + EventSink> Effects for T {}

/// The narrow view a health bar needs of its owner
pub trait HealthBarOwner {
    fn health(&self) -> u32;
    fn max_health(&self) -> u32;
    fn position(&self) -> Vec2;
}

/// A deferred spawn
#[derive(Debug, Clone)]
pub enum Spawn {
    Lemonoid(Lemonoid),
    Laser(Laser),
    Particle(Particle),
    Explosion(Explosion),
}

/// Effects collected over one frame
#[derive(Debug, Default)]
pub struct FrameEffects {
    pub score: u64,
    pub spawns: Vec<Spawn>,
    pub shakes: Vec<ShakeBurst>,
    pub events: Vec<GameEvent>,
}

impl FrameEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lemonoids queued so far
    pub fn lemonoid_spawns(&self) -> impl Iterator<Item = &Lemonoid> {
        self.spawns.iter().filter_map(|spawn| match spawn {
            Spawn::Lemonoid(lemonoid) => Some(lemonoid),
            _ => None,
        })
    }

    /// Particles queued so far
    pub fn particle_spawns(&self) -> impl Iterator<Item = &Particle> {
        self.spawns.iter().filter_map(|spawn| match spawn {
            Spawn::Particle(particle) => Some(particle),
            _ => None,
        })
    }
}

impl ScoreSink for FrameEffects {
    fn award(&mut self, points: u64) {
        self.score += points;
    }
}

impl SpawnQueue for FrameEffects {
    fn spawn(&mut self, spawn: Spawn) {
        self.spawns.push(spawn);
    }
}

impl ShakeSink for FrameEffects {
    fn shake(&mut self, burst: ShakeBurst) {
        self.shakes.push(burst);
    }
}

impl EventSink for FrameEffects {
    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
