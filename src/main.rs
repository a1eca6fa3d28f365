//! Lemonoids headless runner
//!
//! Loads settings and the high score, lets the autopilot play for a fixed
//! number of frames, then writes the high score back.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use lemonoids::consts::*;
use lemonoids::sim::{GameEvent, GamePhase, SimState, TickInput, tick};
use lemonoids::{HighScore, Settings, SimResult};

/// Lemonoids - run the simulation headless with the demo pilot
#[derive(Parser, Debug)]
#[command(name = "lemonoids")]
#[command(about = "Run the Lemonoids simulation headless and track the high score")]
struct Args {
    /// High score save file
    #[arg(long, default_value = "lemonoids.sav")]
    save: PathBuf,

    /// Create a zeroed save file if none exists
    #[arg(long)]
    init_save: bool,

    /// Settings JSON (defaults are used if the file is missing)
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,

    /// Frames to simulate
    #[arg(long, default_value_t = 60 * FPS as u64)]
    frames: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON snapshot of the final state here
    #[arg(long)]
    dump: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("lemonoids: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> SimResult<()> {
    log::info!("Lemonoids (headless) starting...");

    let settings = Settings::load(&args.settings)?;

    if args.init_save && !args.save.exists() {
        HighScore::default().save(&args.save)?;
    }
    let mut highscore = HighScore::load(&args.save)?;
    log::info!("High score: {}", highscore.best);

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Seed: {}", seed);

    let mut state = SimState::new(settings, seed, highscore.best)?;
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let mut kills = 0u64;
    let mut deaths = 0u64;
    for _ in 0..args.frames {
        tick(&mut state, &input, SIM_DT);
        for event in state.drain_events() {
            match event {
                GameEvent::LemonoidDestroyed { .. } => kills += 1,
                GameEvent::ShipDestroyed { .. } => deaths += 1,
                GameEvent::GameOver { score } => log::info!("Run ended with {} points", score),
                _ => {}
            }
        }

        if state.frame % (10 * FPS as u64) == 0 && state.phase == GamePhase::Playing {
            log::info!(
                "t={:.0}s score={} lemonoids={} lives={}",
                state.time,
                state.score,
                state.lemonoids.len(),
                state.ship.lives
            );
        }
    }

    if highscore.record(state.highscore) {
        log::info!("New high score: {}", highscore.best);
    }
    highscore.save(&args.save)?;

    if let Some(path) = &args.dump {
        let json = serde_json::to_string_pretty(&state.snapshot())?;
        std::fs::write(path, json)?;
        log::info!("Snapshot written to {}", path.display());
    }

    println!(
        "frames={} score={} highscore={} kills={} deaths={}",
        args.frames, state.score, highscore.best, kills, deaths
    );
    Ok(())
}
