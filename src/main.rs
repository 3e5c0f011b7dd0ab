//! Don't Touch Blocks entry point
//!
//! Headless demo: runs one autopiloted session through the fixed-timestep
//! frame pump, renders the final frame and records the best score.
//!
//! Usage: `dont-touch-blocks [seed] [seconds]`

use std::process::ExitCode;
use std::time::Duration;

use dont_touch_blocks::consts::*;
use dont_touch_blocks::persistence::{self, JsonFileStore};
use dont_touch_blocks::renderer::Canvas;
use dont_touch_blocks::sim::{FixedStepClock, GameSession, TickInput};
use dont_touch_blocks::terrain::TerrainError;
use dont_touch_blocks::Settings;

const SAVE_PATH: &str = "save.json";
const FRAME_TIME: Duration = Duration::from_millis(16);
/// Every this many frames, simulate a slow frame
const HITCH_EVERY: u64 = 240;
const HITCH_TIME: Duration = Duration::from_millis(150);
/// Consecutive starved frames before giving up
const MAX_STARVED_FRAMES: u32 = 200;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0xD0_7B10);
    let seconds: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60);

    match run(seed, seconds) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(seed: u64, seconds: u64) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Don't Touch Blocks (headless) starting...");
    let mut store = JsonFileStore::open(SAVE_PATH)?;
    let settings = Settings::load(&store);
    log::info!(
        "Fullscreen: {}, muted: {}, best score: {}",
        settings.fullscreen,
        settings.muted,
        persistence::best_score(&store)
    );

    let mut session = GameSession::new(seed)?;
    let mut clock = FixedStepClock::default();
    let input = TickInput { autopilot: true };
    let total_frames = seconds * 1_000 / FRAME_TIME.as_millis() as u64;
    let mut starved_frames = 0;

    'frames: for frame in 0..total_frames {
        let elapsed = if frame > 0 && frame % HITCH_EVERY == 0 {
            HITCH_TIME
        } else {
            FRAME_TIME
        };
        for _ in 0..clock.advance(elapsed) {
            match session.tick(&input) {
                Ok(()) => starved_frames = 0,
                Err(TerrainError::Starved { waited }) => {
                    starved_frames += 1;
                    log::warn!("Terrain starved for {waited:?}, skipping rest of frame {frame}");
                    if starved_frames >= MAX_STARVED_FRAMES {
                        return Err("terrain generator stopped keeping up".into());
                    }
                    continue 'frames;
                }
                Err(err) => return Err(err.into()),
            }
        }
        if session.is_game_over() {
            break;
        }
    }

    let mut canvas = Canvas::new(WINDOW_WIDTH as usize, WINDOW_HEIGHT as usize);
    session.render(&mut canvas);
    log::info!(
        "Ran {} ticks ({} dropped): score {}, promotions {}, tiles created {}",
        session.time_ticks(),
        clock.dropped_ticks(),
        session.score().quantize(2),
        session.terrain().promotions(),
        session.terrain().tiles_created()
    );

    if session.record_best_score(&mut store)? {
        println!("New best score: {}", session.score().quantize(2));
    } else {
        println!("Score: {}", session.score().quantize(2));
    }
    Ok(())
}
