//! imgtagger-thumbs - pre-generate grid thumbnails
//!
//! Usage:
//!     imgtagger-thumbs session.conf [--force] [--threads N]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tagger_core::{thumbnail, Config};

#[derive(Parser, Debug)]
#[command(name = "imgtagger-thumbs", version, about = "Generate thumbnails for grid mode")]
struct Args {
    /// Session configuration file
    config: PathBuf,

    /// Regenerate thumbnails that already exist
    #[arg(long)]
    force: bool,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load configuration {}", args.config.display()))?;

    let log_dir = config.log_dir().unwrap_or_else(tagger_log::default_log_dir);
    let _log_guard = tagger_log::init(&log_dir)?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let report = thumbnail::generate_for_session(&config, args.force)?;
    println!(
        "{} generated, {} skipped, {} failed",
        report.generated, report.skipped, report.failed
    );

    if report.failed > 0 {
        anyhow::bail!("{} thumbnails could not be generated; see the log for details", report.failed);
    }
    Ok(())
}
