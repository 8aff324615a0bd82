//! Ladderfall entry point
//!
//! Headless runner: plays the built-in level pack with the attract-mode
//! pilot at the fixed simulation rate, logs game events, and prints a
//! JSON summary of where the run ended.
//!
//! Usage: `ladderfall [frames] [seed] [tuning.json]`

use std::path::Path;

use serde::Serialize;

use ladderfall::audio::LogAudio;
use ladderfall::consts::WORLD_FPS;
use ladderfall::demo::AttractPilot;
use ladderfall::level::{LevelTable, builtin};
use ladderfall::sim::{GameEvent, GamePhase, GameState, sprite, tick};
use ladderfall::tuning::Tuning;

const DEFAULT_FRAMES: u64 = 60 * WORLD_FPS as u64;
const DEFAULT_SEED: u64 = 0x1adde7;

/// Where a headless run ended
#[derive(Debug, Serialize)]
struct RunSummary {
    frames: u64,
    seed: u64,
    phase: GamePhase,
    level_index: usize,
    score: u32,
    lives: u8,
    treasures_left: Option<u16>,
    deaths: usize,
    visible_sprites: usize,
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[cfg(target_arch = "wasm32")]
fn init_logging() {}

/// Parse a numeric argument, warning when one is given but unreadable
fn parse_arg(name: &str, arg: Option<String>, default: u64) -> u64 {
    let Some(arg) = arg else {
        return default;
    };
    match arg.parse() {
        Ok(value) => value,
        Err(err) => {
            log::warn!("Ignoring {} argument '{}': {}, using {}", name, arg, err, default);
            default
        }
    }
}

fn main() {
    init_logging();
    log::info!("Ladderfall (headless) starting...");

    let mut args = std::env::args().skip(1);
    let frames = parse_arg("frames", args.next(), DEFAULT_FRAMES);
    let seed = parse_arg("seed", args.next(), DEFAULT_SEED);
    let tuning = args.next().map_or_else(Tuning::default, |path| Tuning::load(Path::new(&path)));

    let blob = match builtin::table_bytes() {
        Ok(blob) => blob,
        Err(err) => {
            log::error!("Cannot pack the built-in levels: {}", err);
            std::process::exit(1);
        }
    };
    let table = LevelTable::new(&blob);
    log::info!("Level table: {} levels, {} bytes", table.count(), blob.len());

    let mut state = GameState::new(tuning);
    if !state.start(&table, 0) {
        log::error!("Built-in level 0 failed to load");
        std::process::exit(1);
    }

    let mut pilot = AttractPilot::new(seed);
    let mut audio = LogAudio;
    let mut deaths = 0;
    let mut ran = 0;
    for _ in 0..frames {
        let input = pilot.next_snapshot();
        tick(&mut state, &table, &input, &mut audio);
        ran += 1;

        for event in state.drain_events() {
            if matches!(event, GameEvent::Died { .. }) {
                deaths += 1;
            }
            log::info!("[{:>6}] {:?}", state.time_ticks, event);
        }
        if matches!(state.phase, GamePhase::Title | GamePhase::GameOver) {
            break;
        }
    }

    let summary = RunSummary {
        frames: ran,
        seed,
        phase: state.phase,
        level_index: state.level_index,
        score: state.score,
        lives: state.lives,
        treasures_left: state.world.as_ref().map(|w| w.treasures_left),
        deaths,
        visible_sprites: state.entities.iter().filter_map(sprite).count(),
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Cannot serialize run summary: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg("frames", None, 7), 7);
        assert_eq!(parse_arg("frames", Some("120".into()), 7), 120);
        assert_eq!(parse_arg("seed", Some("not-a-number".into()), 7), 7);
        assert_eq!(parse_arg("seed", Some("-3".into()), 7), 7);
    }
}
