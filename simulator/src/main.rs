//! Ropesim Simulator
//!
//! Drives the rope crossing simulation: spawns randomly-arriving actors,
//! lets the coordinator arbitrate the rope, and waits for all of them to
//! finish.

use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod arrivals;
mod config;
mod controller;
mod metrics;
mod scenario;

use config::SimulationConfig;
use controller::SimulationController;
use scenario::Scenario;

/// Ropesim Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "Single-lane rope crossing simulation")]
struct Args {
    /// Number of actors to simulate
    #[arg(short, long, default_value = "30")]
    actors: usize,

    /// Mean inter-arrival delay in milliseconds
    #[arg(long, default_value = "2000")]
    mean_arrival_ms: u64,

    /// Time one actor spends crossing, in milliseconds
    #[arg(long, default_value = "1000")]
    crossing_ms: u64,

    /// Scenario to run (builtin name or path to a .json file)
    #[arg(short, long)]
    scenario: Option<String>,

    /// Simulation speed multiplier
    #[arg(long, default_value = "1.0")]
    speed: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = SimulationConfig {
        actors: args.actors,
        mean_arrival: Duration::from_millis(args.mean_arrival_ms),
        crossing_time: Duration::from_millis(args.crossing_ms),
        speed: args.speed,
        seed: args.seed,
    };
    config.validate()?;

    info!("Starting Ropesim Simulator");
    info!("Actors: {}", config.actors);
    info!("Speed: {}x", config.speed);

    let controller = SimulationController::new(config);

    if let Some(scenario_name) = &args.scenario {
        info!("Running scenario: {}", scenario_name);

        let scenario = Scenario::load(scenario_name)?;
        controller.run_scenario(scenario).await?;
    } else {
        controller.run().await?;
    }

    // Print summary
    let metrics = controller.metrics();
    let rope = controller.rope_metrics();
    info!("Simulation complete");
    info!("Total crossings: {}", metrics.total_crossings);
    info!("Eastbound: {}", metrics.eastbound_crossings);
    info!("Westbound: {}", metrics.westbound_crossings);
    info!("Average wait: {}ms", metrics.average_wait_ms());
    info!("Worst wait: {}ms", metrics.max_wait_ms());
    info!("Peak occupancy: {}", rope.peak_occupancy());
    info!("Rope handovers: {}", rope.releases);

    Ok(())
}
