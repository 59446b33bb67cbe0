// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One input video file in a batch, numbered by its position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoChunk {
    /// Full path to the chunk
    pub path: PathBuf,
    /// Zero-based position in the sorted batch
    pub index: usize,
    /// Unique number shown in the banner and used for the output name
    pub number: u64,
}

impl VideoChunk {
    /// Create a chunk numbered `start_number + index`
    pub fn new(path: impl Into<PathBuf>, index: usize, start_number: u64) -> Self {
        Self {
            path: path.into(),
            index,
            number: start_number + index as u64,
        }
    }

    /// File name used in log lines
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

impl fmt::Display for VideoChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Video #{} ({})", self.number, self.file_name())
    }
}

/// Axis-aligned rectangle in frame pixel coordinates.
///
/// `x`/`y` are signed: a banner wider than the frame starts left of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

/// One wrapped line of banner text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutLine {
    pub text: String,
    pub width: u32,
    pub height: u32,
    /// Top-left corner of the line's ink box
    pub origin: (i32, i32),
}

impl LayoutLine {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Banner geometry for one chunk, computed against its frame size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionLayout {
    pub lines: Vec<LayoutLine>,
    pub bounds: Rect,
}

impl CaptionLayout {
    /// Tokens of every line, in order
    pub fn tokens(&self) -> Vec<&str> {
        self.lines
            .iter()
            .flat_map(|line| line.text.split_whitespace())
            .collect()
    }
}

/// Stream properties the renderer needs before layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoGeometry {
    pub width: u32,
    pub height: u32,
    /// Frames per second as reported by the container
    pub frame_rate: f64,
    /// Total frames recorded by the container, 0 when unknown
    pub total_frames: u64,
}

impl VideoGeometry {
    /// Number of leading frames that carry the banner.
    ///
    /// The time bound is `seconds × fps` rounded to the nearest whole frame,
    /// clamped to the recorded frame count when the container knows it. The
    /// rate is not truncated first, so 5 s at 29.97 fps is 150 frames rather
    /// than `int(29.97) × 5 = 145`; either way the window stays within 5 s.
    pub fn overlay_frame_count(&self, overlay_seconds: f64) -> u64 {
        let window = (overlay_seconds.max(0.0) * self.frame_rate.max(0.0)).round() as u64;
        if self.total_frames > 0 {
            window.min(self.total_frames)
        } else {
            window
        }
    }
}

/// Frame counters reported by the overlay renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    pub frames_written: u64,
    pub overlay_frames: u64,
}

/// Outcome of processing one chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChunkOutcome {
    /// Final file carries the original audio
    WithAudio,
    /// Final file is the silent render
    WithoutAudio { reason: String },
    /// Chunk was not produced
    Skipped { error: String },
}

/// Per-chunk record collected by the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResult {
    pub chunk: VideoChunk,
    pub output: Option<PathBuf>,
    pub outcome: ChunkOutcome,
    pub stats: Option<RenderStats>,
}

impl RenderResult {
    pub fn produced(chunk: VideoChunk, output: PathBuf, has_audio: bool, reason: Option<String>, stats: RenderStats) -> Self {
        let outcome = if has_audio {
            ChunkOutcome::WithAudio
        } else {
            ChunkOutcome::WithoutAudio {
                reason: reason.unwrap_or_else(|| "audio merge skipped".to_string()),
            }
        };
        Self {
            chunk,
            output: Some(output),
            outcome,
            stats: Some(stats),
        }
    }

    pub fn skipped(chunk: VideoChunk, error: impl fmt::Display) -> Self {
        Self {
            chunk,
            output: None,
            outcome: ChunkOutcome::Skipped {
                error: error.to_string(),
            },
            stats: None,
        }
    }

    pub fn is_produced(&self) -> bool {
        self.output.is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.outcome == ChunkOutcome::WithAudio
    }
}

/// How a batch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every discovered chunk was attempted
    Completed,
    /// Nothing to process; the input directory was left alone
    NoInput,
}

/// Parameters of one batch invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub caption: String,
    pub start_number: u64,
    pub overlay_seconds: f64,
    /// Keep the input directory when no chunk produced output
    pub preserve_input_on_total_failure: bool,
}

impl BatchRequest {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, caption: impl Into<String>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            caption: caption.into(),
            start_number: 1,
            overlay_seconds: 5.0,
            preserve_input_on_total_failure: false,
        }
    }

    pub fn with_start_number(mut self, start_number: u64) -> Self {
        self.start_number = start_number;
        self
    }

    pub fn with_overlay_seconds(mut self, overlay_seconds: f64) -> Self {
        self.overlay_seconds = overlay_seconds;
        self
    }

    pub fn with_preserve_input_on_total_failure(mut self, preserve: bool) -> Self {
        self.preserve_input_on_total_failure = preserve;
        self
    }
}

/// Accumulated state and results of one batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub status: BatchStatus,
    pub caption: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub start_number: u64,
    pub results: Vec<RenderResult>,
    pub input_reset: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchReport {
    /// Start an empty report for the request
    pub fn begin(request: &BatchRequest) -> Self {
        Self {
            status: BatchStatus::Completed,
            caption: request.caption.clone(),
            input_dir: request.input_dir.clone(),
            output_dir: request.output_dir.clone(),
            start_number: request.start_number,
            results: Vec::new(),
            input_reset: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(mut self, status: BatchStatus) -> Self {
        self.status = status;
        self.finished_at = Some(Utc::now());
        self
    }

    /// Number of final files written
    pub fn produced(&self) -> usize {
        self.results.iter().filter(|r| r.is_produced()).count()
    }

    pub fn with_audio(&self) -> usize {
        self.results.iter().filter(|r| r.has_audio()).count()
    }

    pub fn without_audio(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, ChunkOutcome::WithoutAudio { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, ChunkOutcome::Skipped { .. }))
            .count()
    }

    /// Paths of every final file, in chunk order
    pub fn output_files(&self) -> Vec<&Path> {
        self.results
            .iter()
            .filter_map(|r| r.output.as_deref())
            .collect()
    }
}
