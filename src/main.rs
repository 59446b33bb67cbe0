//! Reelmark caption stamper
//!
//! Stamps a numbered caption banner onto the first seconds of every video
//! chunk in a directory and writes `video_{N}.mp4` files with the original
//! audio.
//!
//! # Usage
//!
//! ```bash
//! reelmark run --input-dir output/chunks --output-dir processed_videos --caption "Top five beaches"
//! reelmark layout --caption "Top five beaches" --width 1080 --height 1920
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use reelmark::adapters::tracing_log::{init_logging, LogLevel};
use reelmark::cli::{commands, Cli, Commands};

/// Main entry point for the Reelmark CLI application
fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let level = LogLevel::parse(&cli.log_level)?;
    init_logging(level, cli.log_json);

    info!("Starting Reelmark");

    // Execute the requested command
    match cli.command {
        Commands::Run(args) => {
            info!("Executing run command");
            let report = commands::run(args)?;
            info!(status = ?report.status, produced = report.produced(), "Run command completed");
        }
        Commands::Layout(args) => {
            info!("Executing layout command");
            commands::layout(args)?;
        }
    }

    Ok(())
}
