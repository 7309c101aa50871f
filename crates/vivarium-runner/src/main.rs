//! Headless driver for the vivarium simulation.
//!
//! Runs the world for the configured number of ticks and prints the end-of-run
//! summary as JSON. An optional first argument names a JSON `SimConfig` file;
//! otherwise the reference defaults are used.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vivarium_core::SimConfig;
use vivarium_world::World;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            load_config(&path).with_context(|| format!("loading config from {path}"))?
        }
        None => SimConfig::default(),
    };
    config.validate().context("invalid configuration")?;

    info!(
        num_ticks = config.num_ticks,
        seed = config.seed,
        "starting vivarium run"
    );

    let mut world = World::new(config);
    let summary = world.run();

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn load_config(path: &str) -> vivarium_core::Result<SimConfig> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
