//! Rockstar Bros headless runner
//!
//! Usage: `rockstar-bros [LEVELS.json [STAGE_ID]]`
//!
//! Plays a scripted session (run right, hop and shoot periodically, fire the
//! ultimate whenever the meter is full, tap the rhythm lanes) and logs every
//! event. Set `RUST_LOG=info` or `RUST_LOG=debug` to see the output.

use std::process::ExitCode;

use rockstar_bros::consts::SIM_DT;
use rockstar_bros::sim::{GamePhase, LevelData, LevelError, RenderSnapshot, StageData};
use rockstar_bros::{ControlMap, Game, Tuning};

/// Two minutes of play at 60 Hz
const MAX_FRAMES: u64 = 60 * 120;
const SEED: u64 = 0x524f_434b;

/// Keys the scripted player holds on `frame`
fn scripted_keys(frame: u64, snapshot: &RenderSnapshot) -> Vec<&'static str> {
    if let Some(rhythm) = &snapshot.rhythm {
        // Tap whichever lane has a target near the hit line
        let lane_keys = ["f", "g", "h"];
        return rhythm
            .targets
            .iter()
            .filter(|t| (t.y - rhythm.hit_line).abs() <= rhythm.windows[1])
            .map(|t| lane_keys[t.lane])
            .collect();
    }

    let mut keys = vec!["right"];
    if frame % 45 == 0 {
        keys.push("space");
    }
    if frame % 20 < 2 {
        keys.push("j");
    }
    if snapshot.hud.charge >= snapshot.hud.charge_max {
        keys.push("k");
    }
    keys
}

fn load_game(args: &[String]) -> Result<Game, Box<dyn std::error::Error>> {
    let tuning = Tuning::default();
    let controls = ControlMap::default();
    match args {
        [] => Ok(Game::new(&StageData::demo(), tuning, controls, SEED)),
        [path, rest @ ..] => {
            let level = LevelData::load(path)?;
            let stage_id = match rest.first() {
                Some(id) => id.parse()?,
                None => level.stages.first().map(|s| s.stage_id).ok_or(LevelError::NoStages)?,
            };
            Ok(Game::from_level(level, stage_id, tuning, controls, SEED)?)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut game = match load_game(&args) {
        Ok(game) => game,
        Err(err) => {
            log::error!("Could not start: {err}");
            eprintln!("rockstar-bros: {err}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("Rockstar Bros starting...");
    let mut frame = 0;
    while frame < MAX_FRAMES {
        let keys = scripted_keys(frame, &game.snapshot());
        for event in game.update(keys.as_slice(), SIM_DT) {
            log::info!("[frame {}] {:?}", game.state().frame, event);
        }
        frame += 1;

        match game.phase() {
            GamePhase::StageComplete if game.advance_stage() => {}
            GamePhase::StageComplete | GamePhase::GameOver => break,
            _ => {}
        }
    }

    let snapshot = game.snapshot();
    log::info!("Finished after {frame} frames in phase {:?}", snapshot.phase);
    match serde_json::to_string_pretty(&snapshot.hud) {
        Ok(hud) => println!("{hud}"),
        Err(err) => log::error!("Failed to serialize HUD: {err}"),
    }
    if let Some(stars) = game.stars() {
        println!("stars: {stars}");
    }
    ExitCode::SUCCESS
}
