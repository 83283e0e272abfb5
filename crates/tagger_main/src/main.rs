//! imgtagger - keyboard-driven image tagging
//!
//! Usage:
//!     imgtagger session.conf [--json] [--dump-config]

mod app;
mod input;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use render::{OutputFormat, Renderer};
use std::path::PathBuf;
use tagger_core::{Config, DisplayMode, Session};

#[derive(Parser, Debug)]
#[command(name = "imgtagger", version, about = "Tag images from the keyboard")]
struct Args {
    /// Session configuration file
    config: PathBuf,

    /// Print responses as JSON lines
    #[arg(long)]
    json: bool,

    /// Print the parsed configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load configuration {}", args.config.display()))?;

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    // Initialize logging and panic hook first
    let log_dir = config.log_dir().unwrap_or_else(tagger_log::default_log_dir);
    let _log_guard = tagger_log::init(&log_dir)?;

    if let Err(e) = tagger_log::cleanup_old_logs(&log_dir, 7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("imgtagger starting with {:?}", args.config);

    let columns = match config.mode() {
        DisplayMode::Grid => config.grid_dims()?.1,
        DisplayMode::Single => 1,
    };
    let format = if args.json { OutputFormat::Json } else { OutputFormat::Text };

    let session = Session::open(config).map_err(|e| {
        tracing::error!("Startup failed: {}", e);
        e
    })?;

    app::run(session, Renderer::new(format, columns))
}
