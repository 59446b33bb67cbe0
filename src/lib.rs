//! Reelmark library
//!
//! Stamps a numbered caption banner onto the opening seconds of every video
//! chunk in a directory, keeps each chunk's original audio when an `ffmpeg`
//! executable is available, and writes `video_{N}.mp4` files to an output
//! directory.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod discovery;
pub mod domain;
pub mod engine;
pub mod error;
pub mod layout;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::BatchInteractor;
pub use domain::model::{BatchReport, BatchRequest, BatchStatus, CaptionLayout, RenderResult, VideoChunk};
pub use error::{ReelmarkError, ReelmarkResult};
pub use layout::{compute_layout, BannerStyle, TextMeasure};

/// Initialize the libav libraries
pub fn init() -> ReelmarkResult<()> {
    ffmpeg_next::init().map_err(|e| ReelmarkError::FFmpegInitError {
        message: e.to_string(),
    })?;
    ffmpeg_next::util::log::set_level(ffmpeg_next::util::log::Level::Error);

    Ok(())
}
