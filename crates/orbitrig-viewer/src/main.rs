//! Orbitrig Viewer - Main entry point
//!
//! Opens a small demo scene with the orbit rig and a couple of view hotspots.

mod app;
mod config;
mod ui;

use anyhow::Result;
use clap::Parser;
use orbitrig_core::InputMode;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "orbitrig")]
#[command(about = "Orbit camera rig demo viewer")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "orbitrig.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Input backend override (automatic, pointer, touch)
    #[arg(short, long)]
    input: Option<InputMode>,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Orbitrig v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        config::save_default_config(&args.config)?;
        return Ok(());
    }

    let mut config = config::load_config(&args.config)?;

    if let Some(mode) = args.input {
        config.rig.input.mode = mode;
    }

    info!(
        input = ?config.rig.input.mode,
        pan = config.rig.pan.enabled,
        views = config.views.len(),
        "Configuration loaded"
    );

    app::run(config);

    Ok(())
}
