//! Ship respawn, invulnerability and spawn schedule behaviour

use glam::Vec2;

use lemonoids::consts::*;
use lemonoids::field_center;
use lemonoids::settings::Settings;
use lemonoids::sim::{GameEvent, Lemonoid, SimState, SizeTier, TickInput, tick};

fn step(state: &mut SimState) {
    tick(state, &TickInput::default(), SIM_DT);
}

fn park_on_ship(state: &mut SimState, tier: SizeTier) {
    let mut lemonoid = Lemonoid::new(tier, state.ship.pos, 0.0, 0.0, &state.settings);
    lemonoid.first_contact = false;
    state.add_lemonoid(lemonoid);
}

#[test]
fn invulnerability_lasts_exactly_blink_count_firings() {
    let mut state = SimState::new(Settings::default(), 42, 0).unwrap();
    state.lemonoids.clear();
    state.ship.respawn(&state.settings);
    park_on_ship(&mut state, SizeTier::Four);

    let blink_count = state.settings.blink_count;
    let mut firings = 0;
    let mut last_remaining = state.ship.blinks_remaining;
    while state.ship.invulnerable {
        step(&mut state);
        firings += last_remaining - state.ship.blinks_remaining;
        last_remaining = state.ship.blinks_remaining;
        // Untouchable while blinking
        assert_eq!(state.ship.health, state.ship.max_health);
        assert_eq!(state.lemonoids.len(), 1);
    }
    assert_eq!(firings, blink_count);

    // Contact that began while invulnerable is not a new hit
    step(&mut state);
    assert_eq!(state.ship.health, state.ship.max_health);

    // A fresh contact lands
    state.lemonoids.clear();
    step(&mut state);
    park_on_ship(&mut state, SizeTier::Four);
    step(&mut state);
    assert_eq!(state.ship.health, state.ship.max_health - 1);
}

#[test]
fn respawn_keeps_lemonoids_and_clears_lasers() {
    let mut state = SimState::new(Settings::default(), 7, 0).unwrap();
    state.lemonoids.clear();
    state.ship.health = 1;
    park_on_ship(&mut state, SizeTier::Four);

    // A bystander far from the ship
    let mut bystander = Lemonoid::new(SizeTier::Two, Vec2::new(100.0, 100.0), 0.0, 0.0, &state.settings);
    bystander.first_contact = false;
    let bystander_id = state.add_lemonoid(bystander);

    step(&mut state);
    assert!(state.events.iter().any(|e| matches!(e, GameEvent::ShipDestroyed { lives: 2 })));

    let mut respawned = false;
    for _ in 0..(3.0 / SIM_DT) as usize {
        step(&mut state);
        if state.events.contains(&GameEvent::Respawned) {
            respawned = true;
            break;
        }
    }

    assert!(respawned);
    assert!(state.lemonoids.iter().any(|l| l.id == bystander_id));
    assert!(state.lasers.is_empty());
    assert_eq!(state.ship.pos, field_center());
    assert_eq!(state.ship.lives, 2);
}

#[test]
fn spawn_interval_tracks_score() {
    let mut state = SimState::new(Settings::default(), 3, 0).unwrap();
    state.lemonoids.clear();
    state.score = 10_000;

    step(&mut state);

    assert_eq!(state.spawn_interval_ms, 10_000);
    assert!(state.events.contains(&GameEvent::SpawnIntervalChanged { interval_ms: 10_000 }));
}

#[test]
fn tier_one_kill_shakes_the_screen() {
    let mut state = SimState::new(Settings::default(), 11, 0).unwrap();
    state.lemonoids.clear();
    let pos = Vec2::new(250.0, 250.0);
    let mut target = Lemonoid::new(SizeTier::One, pos, 0.0, 0.0, &state.settings);
    target.first_contact = false;
    target.health = 1;
    state.add_lemonoid(target);
    let laser = lemonoids::sim::Laser::new(pos, 0.0, 0.0, &state.sprites);
    state.lasers.push(laser);

    step(&mut state);

    assert_eq!(state.score, 5 + 100);
    assert!(!state.shake.is_empty());
    assert_eq!(state.lemonoids.len(), 3);
    assert!(state.lemonoids.iter().all(|l| l.tier == SizeTier::Two && l.first_contact));

    // The burst runs its course and settles
    let frames = state.shake.len();
    for _ in 0..frames {
        step(&mut state);
    }
    assert_eq!(state.shake.offset(), Vec2::ZERO);
}

#[test]
fn snapshot_serializes() {
    let state = SimState::new(Settings::default(), 5, 99).unwrap();
    let json = serde_json::to_value(state.snapshot()).unwrap();
    assert_eq!(json["highscore"], 99);
    assert_eq!(json["lemonoids"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["phase"], "Playing");
}

#[test]
fn snapshot_carries_lemonoid_health_bars() {
    let mut state = SimState::new(Settings::default(), 5, 0).unwrap();
    state.lemonoids.clear();
    let big = state.add_lemonoid(Lemonoid::new(SizeTier::Two, Vec2::new(100.0, 100.0), 0.0, 0.0, &state.settings));
    state.add_lemonoid(Lemonoid::new(SizeTier::Four, Vec2::new(300.0, 100.0), 0.0, 0.0, &state.settings));
    state.lemonoids[0].health = 2;

    let snapshot = state.snapshot();
    assert_eq!(snapshot.lemonoid_health_bars.len(), 1);
    let entry = snapshot.lemonoid_health_bars[0];
    assert_eq!(entry.id, big);
    assert!((entry.bar.percent - 0.5).abs() < 1e-6);
    assert!(entry.bar.anchor.y < 100.0);
}
