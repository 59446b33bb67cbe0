//! CLI module for Reelmark
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{LayoutArgs, RunArgs};

/// Reelmark caption stamper
///
/// Stamps a numbered caption banner onto the opening seconds of every video
/// chunk in a directory and keeps the original audio.
#[derive(Parser, Debug)]
#[command(name = "reelmark")]
#[command(about = "Reelmark - numbered caption banners for video chunks")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (RUST_LOG takes precedence when set)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Emit log events as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stamp every chunk in the input directory
    Run(args::RunArgs),
    /// Print the banner layout for a frame size without touching any video
    Layout(args::LayoutArgs),
}
