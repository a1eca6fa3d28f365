//! Game state and core simulation types
//!
//! `SimState` is the explicit simulation context: every collection, the score,
//! the shake queue and the RNG live here and are handed to each update by
//! reference. Nothing is global.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collision::{ContactLatch, Hitbox};
use super::context::HealthBarOwner;
use super::damage::DamageSource;
use super::geometry::{PixelMask, Rect};
use super::movement;
use super::shake::ShakeQueue;
use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::settings::{EdgeMode, Settings};
use crate::{field_center, heading_vector, normalize_degrees};

/// Discrete fragmentation generation, 1 = root (largest), 4 = terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SizeTier {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl SizeTier {
    pub const ROOT: SizeTier = SizeTier::One;
    pub const TERMINAL: SizeTier = SizeTier::Four;
    pub const ALL: [SizeTier; TIER_COUNT] = [SizeTier::One, SizeTier::Two, SizeTier::Three, SizeTier::Four];

    /// 1..=4
    #[inline]
    pub fn number(self) -> u8 {
        self as u8
    }

    /// 0-based table index
    #[inline]
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// The tier fragments of this tier are born into
    pub fn next(self) -> Option<SizeTier> {
        match self {
            SizeTier::One => Some(SizeTier::Two),
            SizeTier::Two => Some(SizeTier::Three),
            SizeTier::Three => Some(SizeTier::Four),
            SizeTier::Four => None,
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == SizeTier::TERMINAL
    }

    /// Damage a lemonoid of this tier deals to whatever it strikes
    #[inline]
    pub fn collision_damage(self) -> u32 {
        4 - (self.number() as u32 - 1)
    }
}

impl TryFrom<u8> for SizeTier {
    type Error = SimError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SizeTier::One),
            2 => Ok(SizeTier::Two),
            3 => Ok(SizeTier::Three),
            4 => Ok(SizeTier::Four),
            other => Err(SimError::UnknownSizeTier(other)),
        }
    }
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended, waiting for restart input
    GameOver,
}

/// Things that happened this frame, for audio/render collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GameEvent {
    LaserFired,
    LemonoidHit { tier: SizeTier, source: DamageSource },
    LemonoidDestroyed { tier: SizeTier, source: DamageSource, fragments: u32 },
    ShipHit { health: u32 },
    ShipDestroyed { lives: u32 },
    Respawned,
    GameOver { score: u64 },
    Restarted,
    SpawnIntervalChanged { interval_ms: u32 },
}

/// Unrotated collision masks, built once from settings
#[derive(Debug, Clone)]
pub struct SpriteBank {
    pub ship: PixelMask,
    pub laser: PixelMask,
    lemonoids: Vec<PixelMask>,
}

impl SpriteBank {
    pub fn new(settings: &Settings) -> Self {
        let px = |v: f32| (v.round() as u32).max(1);
        let lemonoids = SizeTier::ALL
            .iter()
            .map(|&tier| {
                let scale = settings.tier(tier).scale;
                PixelMask::ellipse(px(settings.lemonoid_width * scale), px(settings.lemonoid_height * scale))
            })
            .collect();

        Self {
            ship: PixelMask::dart(px(settings.ship_width), px(settings.ship_height)),
            laser: PixelMask::filled(px(settings.laser_length), px(settings.laser_width)),
            lemonoids,
        }
    }

    #[inline]
    pub fn lemonoid(&self, tier: SizeTier) -> &PixelMask {
        &self.lemonoids[tier.index()]
    }
}

/// Health bar component, owned by the entity it reports on
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthBar {
    /// Anchor offset from the owner's position
    pub offset: Vec2,
    pub scale: f32,
}

/// What a renderer needs to draw a health bar this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthBarView {
    pub anchor: Vec2,
    pub percent: f32,
    pub colour: [u8; 3],
    /// The segment shows "full" above half health
    pub segment_full: bool,
    /// How far (0..1 of a segment width) the segment has slid toward empty
    pub segment_shift: f32,
}

impl HealthBar {
    pub fn new(offset: Vec2, scale: f32) -> Self {
        Self { offset, scale }
    }

    pub fn view(&self, owner: &impl HealthBarOwner) -> HealthBarView {
        // max_health > 0 is a validated setting
        let percent = (owner.health() as f32 / owner.max_health() as f32).clamp(0.0, 1.0);
        HealthBarView {
            anchor: owner.position() + self.offset,
            percent,
            colour: health_colour(percent),
            segment_full: percent > 0.5,
            segment_shift: ((1.0 - percent) * 2.0) % 1.0,
        }
    }
}

/// Green at full health, yellow at half, red when empty
pub fn health_colour(percent: f32) -> [u8; 3] {
    if percent > 0.5 {
        [(255.0 * (1.0 - percent) * 2.0) as u8, 255, 0]
    } else {
        [255, (255.0 * percent * 2.0) as u8, 0]
    }
}

/// Ship life cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ShipStatus {
    Alive,
    /// Playing the death animation; `died_at` is sim time in seconds
    Dying { died_at: f64 },
}

/// The player's ship
#[derive(Debug, Clone, Serialize)]
pub struct Ship {
    pub pos: Vec2,
    /// Accumulated velocity (px/frame)
    pub vel: Vec2,
    /// Aim heading (degrees)
    pub rotation_degrees: f32,
    pub health: u32,
    pub max_health: u32,
    pub lives: u32,
    pub max_lives: u32,
    pub status: ShipStatus,
    pub invulnerable: bool,
    pub blinks_remaining: u32,
    pub time_since_blink_toggle: f32,
    /// Blink state for the renderer
    pub visible: bool,
    /// Seconds until the next shot may fire
    pub fire_cooldown: f32,
    /// Fire held this frame (selects the "shoot" sprite)
    pub firing: bool,
    pub health_bar: HealthBar,
    #[serde(skip)]
    pub contact: ContactLatch,
    #[serde(skip)]
    pub hitbox: Hitbox,
}

impl Ship {
    pub fn new(settings: &Settings) -> Self {
        Self {
            pos: field_center(),
            vel: Vec2::ZERO,
            rotation_degrees: 0.0,
            health: settings.ship_max_health,
            max_health: settings.ship_max_health,
            lives: settings.ship_max_lives,
            max_lives: settings.ship_max_lives,
            status: ShipStatus::Alive,
            invulnerable: false,
            blinks_remaining: 0,
            time_since_blink_toggle: 0.0,
            visible: true,
            fire_cooldown: 0.0,
            firing: false,
            health_bar: HealthBar::new(Vec2::new(0.0, -settings.ship_height), 0.5),
            contact: ContactLatch::default(),
            hitbox: Hitbox::default(),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.status == ShipStatus::Alive
    }

    /// Back to the centre with full health and a blink cycle of invulnerability
    pub fn respawn(&mut self, settings: &Settings) {
        self.pos = field_center();
        self.vel = Vec2::ZERO;
        self.rotation_degrees = 0.0;
        self.health = self.max_health;
        self.status = ShipStatus::Alive;
        self.invulnerable = settings.blink_count > 0;
        self.blinks_remaining = settings.blink_count;
        self.time_since_blink_toggle = 0.0;
        self.visible = true;
        self.fire_cooldown = 0.0;
        self.contact.reset();
    }

    /// Full reset for a new run
    pub fn reset(&mut self, settings: &Settings) {
        *self = Ship::new(settings);
    }

    /// Advance the invulnerability blink timer
    pub fn update_blink(&mut self, dt: f32, interval: f32) {
        if !self.invulnerable {
            return;
        }
        self.time_since_blink_toggle += dt;
        while self.time_since_blink_toggle >= interval {
            self.time_since_blink_toggle -= interval;
            self.visible = !self.visible;
            self.blinks_remaining = self.blinks_remaining.saturating_sub(1);
            if self.blinks_remaining == 0 {
                self.invulnerable = false;
                self.visible = true;
                self.time_since_blink_toggle = 0.0;
                break;
            }
        }
    }

    /// Thrust, integrate, handle the screen edge and refresh the hitbox
    pub fn advance(&mut self, thrust: Vec2, dt: f32, shake: Vec2, settings: &Settings, sprites: &SpriteBank) {
        self.vel = movement::accelerate(
            self.vel,
            thrust,
            settings.ship_accel,
            settings.ship_speed,
            dt,
            settings.ship_max_speed,
        );
        self.pos += self.vel + shake;

        let mask = sprites.ship.rotated(self.rotation_degrees);
        self.pos = match settings.ship_edge {
            EdgeMode::Wrap => movement::wrap(self.pos, movement::spin_extent(sprites.ship.size()), self.vel),
            EdgeMode::Clamp => movement::clamp_to_field(self.pos, mask.size() / 2.0),
        };
        self.hitbox = Hitbox::new(self.pos, mask);
    }
}

impl HealthBarOwner for Ship {
    fn health(&self) -> u32 {
        self.health
    }

    fn max_health(&self) -> u32 {
        self.max_health
    }

    fn position(&self) -> Vec2 {
        self.pos
    }
}

/// A laser bolt
#[derive(Debug, Clone, Serialize)]
pub struct Laser {
    pub pos: Vec2,
    /// Fixed at spawn, jitter included
    pub heading_degrees: f32,
    pub speed: f32,
    /// Distinct lemonoids hit so far
    pub hit_count: u32,
    /// Lemonoids already hit (each is hit at most once)
    pub hit_ids: Vec<u32>,
    pub alive: bool,
    #[serde(skip)]
    pub hitbox: Hitbox,
}

impl Laser {
    pub fn new(pos: Vec2, heading_degrees: f32, speed: f32, sprites: &SpriteBank) -> Self {
        Self {
            pos,
            heading_degrees,
            speed,
            hit_count: 0,
            hit_ids: Vec::new(),
            alive: true,
            hitbox: Hitbox::new(pos, sprites.laser.rotated(heading_degrees)),
        }
    }

    /// Record contact with a lemonoid. Returns true the first time this
    /// lemonoid is touched; that contact is the hit.
    pub fn register_hit(&mut self, lemonoid_id: u32) -> bool {
        if self.hit_ids.contains(&lemonoid_id) {
            return false;
        }
        self.hit_ids.push(lemonoid_id);
        self.hit_count += 1;
        true
    }

    /// Fly straight; lasers die at the screen edge
    pub fn advance(&mut self, dt: f32, shake: Vec2) {
        self.pos = movement::translate(self.pos, self.heading_degrees, self.speed, dt) + shake;
        self.hitbox.move_to(self.pos);
        if movement::is_off_screen(self.pos, self.hitbox.half_extents()) {
            self.alive = false;
        }
    }
}

/// Per-category "currently colliding" latches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollisionLatches {
    pub laser: ContactLatch,
    pub asteroid: ContactLatch,
}

/// A fragmenting lemonoid
#[derive(Debug, Clone, Serialize)]
pub struct Lemonoid {
    pub id: u32,
    pub tier: SizeTier,
    pub pos: Vec2,
    /// Travel heading (degrees), fixed for life
    pub direction_degrees: f32,
    /// Visual tumble (degrees)
    pub rotation_degrees: f32,
    pub move_speed: f32,
    pub health: u32,
    pub max_health: u32,
    /// Exempt from lemonoid-vs-lemonoid damage until fully inside the field once
    pub first_contact: bool,
    /// Toroidal wrap is active (root spawns start outside the field)
    pub wraps: bool,
    pub colliding_with: CollisionLatches,
    /// Seconds left on the hit flash
    pub flash_timer: f32,
    pub alive: bool,
    pub health_bar: Option<HealthBar>,
    #[serde(skip)]
    pub hitbox: Hitbox,
}

impl Lemonoid {
    pub fn new(tier: SizeTier, pos: Vec2, direction_degrees: f32, move_speed: f32, settings: &Settings) -> Self {
        let spec = settings.tier(tier);
        let health_bar = (!tier.is_terminal()).then(|| {
            let lift = settings.lemonoid_height * spec.scale / 2.0 + 8.0;
            HealthBar::new(Vec2::new(0.0, -lift), spec.scale.max(0.5))
        });

        Self {
            id: 0,
            tier,
            pos,
            direction_degrees: normalize_degrees(direction_degrees),
            rotation_degrees: 0.0,
            move_speed,
            health: spec.health,
            max_health: spec.health,
            first_contact: true,
            wraps: true,
            colliding_with: CollisionLatches::default(),
            flash_timer: 0.0,
            alive: true,
            health_bar,
            hitbox: Hitbox::default(),
        }
    }

    /// A root spawn: placed one field-width from the centre along `angle`,
    /// heading back toward the centre
    pub fn root(angle: f32, settings: &Settings) -> Self {
        let pos = field_center() + heading_vector(angle) * WIDTH;
        let mut lemonoid = Self::new(SizeTier::ROOT, pos, angle + 180.0, settings.root_speed, settings);
        lemonoid.rotation_degrees = normalize_degrees(angle);
        lemonoid.wraps = false;
        lemonoid
    }

    #[inline]
    pub fn is_flashing(&self) -> bool {
        self.flash_timer > 0.0
    }

    /// Translate, tumble, wrap and refresh the hitbox
    pub fn advance(&mut self, dt: f32, shake: Vec2, settings: &Settings, sprites: &SpriteBank) {
        self.pos = movement::translate(self.pos, self.direction_degrees, self.move_speed, dt) - shake;
        self.rotation_degrees =
            (self.rotation_degrees % 360.0) + settings.tier(self.tier).tumble_rate * dt;
        self.flash_timer = (self.flash_timer - dt).max(0.0);

        let sprite = sprites.lemonoid(self.tier);
        if self.wraps {
            let travel = heading_vector(self.direction_degrees);
            self.pos = movement::wrap(self.pos, movement::spin_extent(sprite.size()), travel);
        }
        let mask = sprite.rotated(self.rotation_degrees);
        self.hitbox = Hitbox::new(self.pos, mask);
        if !self.wraps && self.hitbox.rect.is_inside(&field_rect()) {
            self.wraps = true;
        }
    }

    /// Close the first-contact window once the lemonoid has been fully inside
    /// the field
    pub fn update_first_contact(&mut self) {
        if self.first_contact && self.hitbox.mask.width() > 0 && self.hitbox.rect.is_inside(&field_rect()) {
            self.first_contact = false;
        }
    }
}

impl HealthBarOwner for Lemonoid {
    fn health(&self) -> u32 {
        self.health
    }

    fn max_health(&self) -> u32 {
        self.max_health
    }

    fn position(&self) -> Vec2 {
        self.pos
    }
}

/// Explosion styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExplosionKind {
    /// Rotating god-rays (big kills, ship deaths)
    Big,
    /// Single flash (smaller kills)
    Flash,
}

/// A fading explosion sprite
#[derive(Debug, Clone, Serialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub kind: ExplosionKind,
    pub scale: f32,
    pub alpha: f32,
    /// Animation frame (fractional)
    pub frame: f32,
    pub alive: bool,
}

impl Explosion {
    /// Alpha at spawn
    pub const START_ALPHA: f32 = 256.0;

    pub fn new(pos: Vec2, kind: ExplosionKind, scale: f32) -> Self {
        Self {
            pos,
            kind,
            scale,
            alpha: Self::START_ALPHA,
            frame: 0.0,
            alive: true,
        }
    }

    pub fn advance(&mut self, dt: f32, settings: &Settings) {
        if self.kind == ExplosionKind::Big && settings.explosion_frames > 0 {
            self.frame = (self.frame + settings.explosion_frame_rate * dt) % settings.explosion_frames as f32;
        }
        self.alpha -= settings.explosion_fade * dt;
        if self.alpha <= 0.0 {
            self.alive = false;
        }
    }

    /// Where to draw this frame
    #[inline]
    pub fn draw_position(&self, shake: Vec2) -> Vec2 {
        self.pos + shake
    }
}

/// A debris or burst particle
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub heading_degrees: f32,
    pub speed: f32,
    pub radius: f32,
    pub alpha: f32,
    /// Alpha lost per second
    pub fade: f32,
    pub alive: bool,
}

impl Particle {
    pub fn new(pos: Vec2, heading_degrees: f32, speed: f32, radius: f32, fade: f32) -> Self {
        Self {
            pos,
            heading_degrees,
            speed,
            radius,
            alpha: 255.0,
            fade,
            alive: true,
        }
    }

    pub fn advance(&mut self, dt: f32, shake: Vec2) {
        self.pos = movement::translate(self.pos, self.heading_degrees, self.speed, dt) + shake;
        self.alpha -= self.fade * dt;
        if self.alpha <= 0.0 || movement::is_off_screen(self.pos, Vec2::splat(self.radius)) {
            self.alive = false;
        }
    }
}

/// The play field as a rect
#[inline]
pub fn field_rect() -> Rect {
    Rect::new(0, 0, WIDTH as i32, HEIGHT as i32)
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct SimState {
    pub settings: Settings,
    pub sprites: SpriteBank,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation clock (seconds)
    pub time: f64,
    /// Frame counter
    pub frame: u64,
    pub score: u64,
    pub highscore: u64,
    pub shake: ShakeQueue,
    pub ship: Ship,
    pub lasers: Vec<Laser>,
    pub lemonoids: Vec<Lemonoid>,
    pub explosions: Vec<Explosion>,
    pub particles: Vec<Particle>,
    /// Events emitted during the last tick
    pub events: Vec<GameEvent>,
    /// Root spawn accumulator (ms)
    pub time_since_last_spawn: f32,
    /// Interval currently in force (ms)
    pub spawn_interval_ms: u32,
    /// Next entity ID
    next_id: u32,
}

impl SimState {
    /// Create a new run with validated settings
    pub fn new(settings: Settings, seed: u64, highscore: u64) -> SimResult<Self> {
        settings.validate()?;

        let mut state = Self {
            sprites: SpriteBank::new(&settings),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            time: 0.0,
            frame: 0,
            score: 0,
            highscore,
            shake: ShakeQueue::new(),
            ship: Ship::new(&settings),
            lasers: Vec::new(),
            lemonoids: Vec::new(),
            explosions: Vec::new(),
            particles: Vec::new(),
            events: Vec::new(),
            time_since_last_spawn: 0.0,
            spawn_interval_ms: settings.spawn_interval_ms(0),
            next_id: 1,
            settings,
        };

        state.spawn_root_lemonoid();
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Register a lemonoid, assigning its ID
    pub fn add_lemonoid(&mut self, mut lemonoid: Lemonoid) -> u32 {
        lemonoid.id = self.next_entity_id();
        let id = lemonoid.id;
        self.lemonoids.push(lemonoid);
        id
    }

    /// Add a particle, dropping the oldest ones past the cap
    pub fn add_particle(&mut self, particle: Particle) {
        let cap = self.settings.max_particles();
        if cap == 0 {
            return;
        }
        self.particles.push(particle);
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
        }
    }

    /// Spawn a root lemonoid at a random angle
    pub fn spawn_root_lemonoid(&mut self) -> u32 {
        let angle = self.rng.random_range(0..=360) as f32;
        let lemonoid = Lemonoid::root(angle, &self.settings);
        self.add_lemonoid(lemonoid)
    }

    /// Clear everything for a fresh run. High score survives.
    pub fn reset(&mut self) {
        self.score = 0;
        self.lasers.clear();
        self.lemonoids.clear();
        self.explosions.clear();
        self.particles.clear();
        self.shake.clear();
        self.ship.reset(&self.settings);
        self.time_since_last_spawn = 0.0;
        self.spawn_interval_ms = self.settings.spawn_interval_ms(0);
    }

    /// Take this frame's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Serializable view for debug overlays and dumps
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            frame: self.frame,
            time: self.time,
            score: self.score,
            highscore: self.highscore,
            shake_offset: self.shake.offset(),
            pending_shake: self.shake.len(),
            spawn_interval_ms: self.spawn_interval_ms,
            ship: &self.ship,
            ship_health_bar: self.ship.health_bar.view(&self.ship),
            lemonoid_health_bars: self
                .lemonoids
                .iter()
                .filter_map(|l| l.health_bar.map(|bar| LemonoidHealthBar { id: l.id, bar: bar.view(l) }))
                .collect(),
            lasers: &self.lasers,
            lemonoids: &self.lemonoids,
            explosions: &self.explosions,
            particles: &self.particles,
        }
    }
}

/// A lemonoid's health bar, keyed by lemonoid ID
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LemonoidHealthBar {
    pub id: u32,
    pub bar: HealthBarView,
}

/// A read-only view of the simulation
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub frame: u64,
    pub time: f64,
    pub score: u64,
    pub highscore: u64,
    pub shake_offset: Vec2,
    pub pending_shake: usize,
    pub spawn_interval_ms: u32,
    pub ship: &'a Ship,
    pub ship_health_bar: HealthBarView,
    /// Terminal-tier lemonoids have no bar
    pub lemonoid_health_bars: Vec<LemonoidHealthBar>,
    pub lasers: &'a [Laser],
    pub lemonoids: &'a [Lemonoid],
    pub explosions: &'a [Explosion],
    pub particles: &'a [Particle],
}
