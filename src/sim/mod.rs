//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, IDs ascending)
//! - No rendering or platform dependencies

pub mod collision;
pub mod context;
pub mod damage;
pub mod geometry;
pub mod movement;
pub mod shake;
pub mod state;
pub mod tick;

pub use collision::{Contact, ContactLatch, Hitbox, test_overlap};
pub use context::{Effects, EventSink, FrameEffects, HealthBarOwner, ScoreSink, ShakeSink, Spawn, SpawnQueue};
pub use damage::{DamageEngine, DamageSource, Hit, HitOutcome};
pub use geometry::{PixelMask, Rect};
pub use shake::{ShakeBurst, ShakeQueue};
pub use state::{
    Explosion, ExplosionKind, GameEvent, GamePhase, HealthBar, HealthBarView, Laser, Lemonoid, LemonoidHealthBar,
    Particle, Ship, ShipStatus, SimState, SizeTier, Snapshot, SpriteBank,
};
pub use tick::{TickInput, tick};
