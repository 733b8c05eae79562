#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line host that plays a Tile Defence session.

mod scenario;
mod summary;

use std::{path::PathBuf, sync::Arc};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tile_defence_engine::{init_game, FrameClock, Outcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

use scenario::Scenario;
use summary::{Summary, Tally};

/// Real seconds covered by one host frame.
const FRAME_SECONDS: f64 = 1.0 / 30.0;

/// Runs a scripted Tile Defence session without a display.
#[derive(Debug, Parser)]
#[command(name = "tile-defence", version, about)]
struct Args {
    /// TOML scenario with map, tuning overrides and build order.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Real seconds to simulate before stopping.
    #[arg(long, default_value_t = 120.0)]
    seconds: f64,
    /// Time-scale multiplier applied to every tick.
    #[arg(long, default_value_t = 1.0)]
    speed: f64,
    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Tile Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "--seconds must be a non-negative number"
    );

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };

    let mut game = init_game(Arc::new(scenario.grid()), scenario.config.clone());
    ensure!(
        game.set_speed_multiplier(args.speed),
        "--speed must be a positive number, got {}",
        args.speed
    );
    let build = scenario.build(&mut game);
    if scenario.auto_start() && !game.start_wave() {
        info!("first wave could not start");
    }

    let mut clock = FrameClock::new();
    let mut tally = Tally::default();
    let frames = (args.seconds / FRAME_SECONDS).ceil() as u64;
    for _ in 0..frames {
        let report = clock.advance(&mut game, FRAME_SECONDS);
        tally.record(&report.events);
        if game.outcome() != Outcome::InProgress {
            break;
        }
    }

    let summary = Summary::new(&game, build, tally);
    info!(outcome = summary.outcome, lives = summary.lives, "session finished");
    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
        println!("{json}");
    } else {
        println!("{}", summary.render());
    }
    Ok(())
}
