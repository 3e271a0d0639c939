//! Pongout headless runner
//!
//! Plays one autoplay match (both paddles driven by the pursuit AI) at a
//! fixed 60 Hz frame rate and prints the result.
//!
//! Usage: `pongout [SETTINGS.json] [--variant classic|twin] [--seed N]`

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "pongout")]
#[command(about = "Play one headless Pongout match with both paddles on autopilot")]
struct Args {
    /// JSON settings file; missing fields take defaults
    settings: Option<PathBuf>,
    /// Game variant (classic or twin)
    #[arg(long, value_parser = parse_variant)]
    variant: Option<pongout::Variant>,
    /// Match RNG seed
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_variant(s: &str) -> Result<pongout::Variant, String> {
    pongout::Variant::from_str(s).ok_or_else(|| format!("unknown variant '{s}'"))
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use pongout::Settings;
    use pongout::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

    env_logger::init();

    let args = Args::parse();
    let seed = args.seed;

    let mut settings = match &args.settings {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("Failed to load {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };
    if let Some(variant) = args.variant {
        settings.apply_variant(variant);
    }

    let mut state = match GameState::new(settings, seed) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("Invalid settings: {err}");
            std::process::exit(1);
        }
    };
    log::info!("Pongout (headless) starting, seed {seed}");

    const FRAME_DT: f32 = 1.0 / 60.0;
    const MAX_FRAMES: u64 = 60 * 60 * 5;

    let mut input = TickInput {
        start: true,
        autoplay: true,
        ..Default::default()
    };
    let mut bricks_destroyed = 0u32;
    let mut paddle_hits = 0u32;

    for _ in 0..MAX_FRAMES {
        for event in tick(&mut state, &input, FRAME_DT) {
            match event {
                GameEvent::BrickDestroyed { .. } => bricks_destroyed += 1,
                GameEvent::PaddleHit { .. } => paddle_hits += 1,
                _ => {}
            }
        }
        input.start = false;

        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    let seconds = state.time_ticks as f32 * FRAME_DT;
    match state.winner {
        Some(winner) => println!("{winner:?} wins after {seconds:.1}s"),
        None => println!("No winner after {seconds:.1}s"),
    }
    println!(
        "Bricks destroyed: {bricks_destroyed}/{} | paddle hits: {paddle_hits}",
        state.bricks.len()
    );
    for paddle in &state.paddles {
        println!(
            "{:?}: {} misses, height {:.0}",
            paddle.side, paddle.misses, paddle.height
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; a front-end drives `tick` itself
}
