//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` command-line tool to put a chunk's original audio back
//! next to its re-encoded video.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::engine::remux::RemuxOutcome;
use crate::ports::AudioMuxer;

/// Default executable looked up on `PATH`
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Audio merge through the ffmpeg CLI
#[derive(Debug, Clone)]
pub struct FFmpegCliMuxer {
    program: PathBuf,
    audio_codec: String,
}

impl FFmpegCliMuxer {
    /// Create new FFmpeg adapter
    pub fn new(program: impl Into<PathBuf>, audio_codec: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            audio_codec: audio_codec.into(),
        }
    }

    /// Resolve the executable, by path or on `PATH`
    pub fn locate(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }

    /// Arguments that copy video from `silent_path`, transcode the first
    /// audio stream of `original_path` and write `output_path`
    pub fn merge_args(&self, silent_path: &Path, original_path: &Path, output_path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        args.push("-y".into());
        args.push("-i".into());
        args.push(silent_path.into());
        args.push("-i".into());
        args.push(original_path.into());
        args.extend(["-c:v", "copy", "-c:a"].map(OsString::from));
        args.push(self.audio_codec.as_str().into());
        args.extend(["-map", "0:v:0", "-map", "1:a:0"].map(OsString::from));
        args.push(output_path.into());
        args
    }
}

impl Default for FFmpegCliMuxer {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG, "aac")
    }
}

impl AudioMuxer for FFmpegCliMuxer {
    fn merge(&self, silent_path: &Path, original_path: &Path, output_path: &Path) -> RemuxOutcome {
        let Some(executable) = self.locate() else {
            return RemuxOutcome::ToolMissing;
        };

        debug!(program = %executable.display(), output = %output_path.display(), "Running audio merge");
        let result = Command::new(&executable)
            .args(self.merge_args(silent_path, original_path, output_path))
            .stdin(Stdio::null())
            .output();

        match result {
            Ok(output) if output.status.success() => RemuxOutcome::Merged,
            Ok(output) => RemuxOutcome::MergeFailed {
                diagnostics: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => RemuxOutcome::ToolMissing,
            Err(e) => RemuxOutcome::MergeFailed {
                diagnostics: format!("failed to run {}: {}", executable.display(), e),
            },
        }
    }
}
