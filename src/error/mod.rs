//! Error handling module for Reelmark

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Reelmark operations
#[derive(Error, Debug)]
pub enum ReelmarkError {
    /// No chunks to process
    #[error("No video files found in '{}'", dir.display())]
    NoInput { dir: PathBuf },

    /// Chunk could not be opened for decoding
    #[error("Could not open video file {}: {message}", path.display())]
    DecodeOpen { path: PathBuf, message: String },

    /// Frame decoding error
    #[error("Decoding failed: {message}")]
    Decode { message: String },

    /// Frame encoding or muxing error
    #[error("Encoding failed: {message}")]
    Encode { message: String },

    /// Audio remux error that could not be absorbed by the fallback chain
    #[error("Audio remux failed: {message}")]
    Remux { message: String },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// File system operation error
    #[error("File system operation failed on {}: {source}", path.display())]
    Fs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// FFmpeg initialization error
    #[error("Failed to initialize FFmpeg: {message}")]
    FFmpegInitError { message: String },
}

impl ReelmarkError {
    /// Wrap an I/O error with the path it happened on
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Fs {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for Reelmark operations
pub type ReelmarkResult<T> = std::result::Result<T, ReelmarkError>;
