//! High score and settings persistence

use std::fs;

use lemonoids::settings::EdgeMode;
use lemonoids::{HighScore, Settings, SimError};

#[test]
fn high_score_round_trips_through_disk() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("lemonoids.sav");

    let mut score = HighScore::new(120);
    assert!(score.record(4_350));
    score.save(&path)?;

    assert_eq!(fs::read_to_string(&path)?, "HIGHSCORE = 4350");
    assert_eq!(HighScore::load(&path)?, score);
    Ok(())
}

#[test]
fn missing_save_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("nope.sav");

    match HighScore::load(&path) {
        Err(SimError::SaveMissing { path: missing }) => assert_eq!(missing, path),
        other => panic!("expected SaveMissing, got {:?}", other),
    }
    Ok(())
}

#[test]
fn malformed_save_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("bad.sav");
    fs::write(&path, "HIGHSCORE = -3")?;

    assert!(matches!(HighScore::load(&path), Err(SimError::SaveMalformed { .. })));
    Ok(())
}

#[test]
fn settings_round_trip_and_fall_back() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;

    // No file: defaults
    let defaults = Settings::load(&tmp.path().join("missing.json"))?;
    assert_eq!(defaults.hit_score, 5);

    let path = tmp.path().join("settings.json");
    let custom = Settings {
        ship_edge: EdgeMode::Clamp,
        laser_hit_limit: 3,
        ..Default::default()
    };
    custom.save(&path)?;

    let loaded = Settings::load(&path)?;
    assert_eq!(loaded.ship_edge, EdgeMode::Clamp);
    assert_eq!(loaded.laser_hit_limit, 3);
    Ok(())
}

#[test]
fn invalid_settings_file_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("settings.json");

    fs::write(&path, "{ not json")?;
    assert!(matches!(Settings::load(&path), Err(SimError::Settings(_))));

    fs::write(&path, r#"{ "laser_hit_limit": 0 }"#)?;
    assert!(matches!(
        Settings::load(&path),
        Err(SimError::InvalidSetting { name: "laser_hit_limit", .. })
    ));
    Ok(())
}
