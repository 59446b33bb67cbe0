//! Command implementations

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::toml_config::AppConfig;
use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::args::{LayoutArgs, RunArgs};
use crate::config_initialization::{initialize_configuration, resolve_caption, ConfigOverrides};
use crate::domain::model::{BatchReport, BatchRequest, BatchStatus, ChunkOutcome};
use crate::error::ReelmarkError;
use crate::layout::compute_layout;

/// Execute the run command
pub fn run(args: RunArgs) -> Result<BatchReport> {
    let config = initialize_configuration(args.config.as_deref(), &args.overrides())
        .context("Failed to load configuration")?;
    let caption = resolve_caption(args.caption.as_deref(), &config.batch.caption_file);

    info!("Input: {}", config.batch.input_dir.display());
    info!("Output: {}", config.batch.output_dir.display());
    info!("Caption: {}", caption);

    let request = build_request(&config, caption);
    let container = DefaultAppContainer::new(&config).context("Failed to initialize video engine")?;
    let report = container
        .batch_interactor()
        .run_batch(&request)
        .context("Batch aborted")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_report(&report);
    }
    Ok(report)
}

/// Execute the layout command
pub fn layout(args: LayoutArgs) -> Result<()> {
    let config = initialize_configuration(args.config.as_deref(), &ConfigOverrides::default())
        .context("Failed to load configuration")?;
    let style = &config.banner;

    let layout = compute_layout(&args.caption, args.number, args.width, args.height, style, &style.font());
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}

fn build_request(config: &AppConfig, caption: String) -> BatchRequest {
    BatchRequest::new(&config.batch.input_dir, &config.batch.output_dir, caption)
        .with_start_number(config.batch.start_number)
        .with_overlay_seconds(config.batch.overlay_seconds)
        .with_preserve_input_on_total_failure(config.batch.preserve_input_on_total_failure)
}

/// Display batch report in human-readable format
fn display_report(report: &BatchReport) {
    if report.status == BatchStatus::NoInput {
        let no_input = ReelmarkError::NoInput {
            dir: report.input_dir.clone(),
        };
        println!("{}. Nothing to process.", no_input);
        return;
    }

    println!("Batch Results");
    println!("=============");
    for result in &report.results {
        match (&result.outcome, &result.output) {
            (ChunkOutcome::WithAudio, Some(output)) => {
                println!("  ✓ {} -> {}", result.chunk, output.display());
            }
            (ChunkOutcome::WithoutAudio { reason }, Some(output)) => {
                println!("  ✓ {} -> {} (no audio: {})", result.chunk, output.display(), reason);
            }
            (ChunkOutcome::Skipped { error }, _) => {
                println!("  ✗ {} skipped: {}", result.chunk, error);
            }
            (_, None) => {
                println!("  ✗ {} produced no output", result.chunk);
            }
        }
    }
    println!();
    println!(
        "Processed {} of {} videos into {}",
        report.produced(),
        report.results.len(),
        report.output_dir.display()
    );
    if !report.input_reset {
        println!("Input directory {} was left in place", report.input_dir.display());
    }
}
