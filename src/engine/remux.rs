//! Audio reattachment with a fallback to the silent render

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{ReelmarkError, ReelmarkResult};
use crate::ports::{AudioMuxer, FsPort};

/// Result of one merge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemuxOutcome {
    /// The encoder wrote the merged file
    Merged,
    /// The encoder executable could not be located
    ToolMissing,
    /// The encoder ran and failed
    MergeFailed { diagnostics: String },
}

impl RemuxOutcome {
    /// Human-readable reason for an audio-less result
    pub fn fallback_reason(&self) -> Option<String> {
        match self {
            RemuxOutcome::Merged => None,
            RemuxOutcome::ToolMissing => Some("ffmpeg not found".to_string()),
            RemuxOutcome::MergeFailed { diagnostics } => {
                let last_line = diagnostics.lines().last().unwrap_or("").trim();
                if last_line.is_empty() {
                    Some("audio merge failed".to_string())
                } else {
                    Some(format!("audio merge failed: {}", last_line))
                }
            }
        }
    }
}

/// Final file of a chunk after remux
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedAudio {
    pub final_path: PathBuf,
    pub has_audio: bool,
    pub outcome: RemuxOutcome,
}

/// Merge the original audio into the silent render, or fall back to the
/// silent render alone.
///
/// Either way exactly one file, `final_path`, is left behind. When the
/// intermediate cannot be removed after a merge, the merged file is dropped
/// and a `Remux` error is returned instead.
pub fn attach_audio(
    fs: &dyn FsPort,
    muxer: &dyn AudioMuxer,
    silent_path: &Path,
    original_path: &Path,
    final_path: &Path,
) -> ReelmarkResult<AttachedAudio> {
    let mut outcome = muxer.merge(silent_path, original_path, final_path);

    if outcome == RemuxOutcome::Merged && !fs.file_exists(final_path) {
        outcome = RemuxOutcome::MergeFailed {
            diagnostics: "encoder exited successfully without writing output".to_string(),
        };
    }

    if outcome == RemuxOutcome::Merged {
        if let Err(first) = fs.remove_file(silent_path) {
            warn!(path = %silent_path.display(), error = %first, "Could not remove silent intermediate, retrying");
            if let Err(e) = fs.remove_file(silent_path) {
                if let Err(cleanup) = fs.remove_file(final_path) {
                    warn!(path = %final_path.display(), error = %cleanup, "Could not remove merged output");
                }
                return Err(ReelmarkError::Remux {
                    message: format!("could not remove silent intermediate {}: {}", silent_path.display(), e),
                });
            }
        }
        info!(output = %final_path.display(), "Audio merged");
        return Ok(AttachedAudio {
            final_path: final_path.to_path_buf(),
            has_audio: true,
            outcome,
        });
    }

    if let RemuxOutcome::MergeFailed { diagnostics } = &outcome {
        warn!(output = %final_path.display(), diagnostics = %diagnostics, "Audio merge failed, output will have no audio");
    } else {
        warn!(output = %final_path.display(), "FFmpeg not found, output will have no audio");
    }

    if fs.file_exists(final_path) {
        fs.remove_file(final_path)?;
    }
    fs.rename(silent_path, final_path).map_err(|e| ReelmarkError::Remux {
        message: format!("could not keep silent render as {}: {}", final_path.display(), e),
    })?;

    Ok(AttachedAudio {
        final_path: final_path.to_path_buf(),
        has_audio: false,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalFsAdapter;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Muxer double that optionally writes the output before reporting
    struct ScriptedMuxer {
        outcome: RemuxOutcome,
        write_output: bool,
    }

    impl AudioMuxer for ScriptedMuxer {
        fn merge(&self, _silent: &Path, _original: &Path, output: &Path) -> RemuxOutcome {
            if self.write_output {
                fs::write(output, b"merged").unwrap();
            }
            self.outcome.clone()
        }
    }

    struct Fixture {
        _temp: TempDir,
        dir: PathBuf,
        silent: PathBuf,
        original: PathBuf,
        output: PathBuf,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_path_buf();
        let silent = dir.join("video_1_temp.mp4");
        let original = dir.join("chunk.mp4");
        let output = dir.join("video_1.mp4");
        fs::write(&silent, b"silent").unwrap();
        fs::write(&original, b"original").unwrap();
        Fixture {
            _temp: temp,
            dir,
            silent,
            original,
            output,
        }
    }

    fn outputs(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|n| n.starts_with("video_1"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_merge_success_removes_intermediate() {
        let f = fixture();
        let muxer = ScriptedMuxer {
            outcome: RemuxOutcome::Merged,
            write_output: true,
        };
        let attached = attach_audio(&LocalFsAdapter::new(), &muxer, &f.silent, &f.original, &f.output).unwrap();

        assert!(attached.has_audio);
        assert_eq!(attached.final_path, f.output);
        assert_eq!(outputs(&f.dir), vec!["video_1.mp4"]);
        assert_eq!(fs::read(&f.output).unwrap(), b"merged");
        assert!(f.original.exists());
    }

    #[test]
    fn test_tool_missing_renames_silent() {
        let f = fixture();
        let muxer = ScriptedMuxer {
            outcome: RemuxOutcome::ToolMissing,
            write_output: false,
        };
        let attached = attach_audio(&LocalFsAdapter::new(), &muxer, &f.silent, &f.original, &f.output).unwrap();

        assert!(!attached.has_audio);
        assert_eq!(attached.outcome, RemuxOutcome::ToolMissing);
        assert_eq!(outputs(&f.dir), vec!["video_1.mp4"]);
        assert_eq!(fs::read(&f.output).unwrap(), b"silent");
    }

    #[test]
    fn test_merge_failure_discards_partial_output() {
        let f = fixture();
        let muxer = ScriptedMuxer {
            outcome: RemuxOutcome::MergeFailed {
                diagnostics: "Stream map '1:a:0' matches no streams.".to_string(),
            },
            write_output: true,
        };
        let attached = attach_audio(&LocalFsAdapter::new(), &muxer, &f.silent, &f.original, &f.output).unwrap();

        assert!(!attached.has_audio);
        assert_eq!(outputs(&f.dir), vec!["video_1.mp4"]);
        assert_eq!(fs::read(&f.output).unwrap(), b"silent");
    }

    #[test]
    fn test_reported_success_without_file_falls_back() {
        let f = fixture();
        let muxer = ScriptedMuxer {
            outcome: RemuxOutcome::Merged,
            write_output: false,
        };
        let attached = attach_audio(&LocalFsAdapter::new(), &muxer, &f.silent, &f.original, &f.output).unwrap();

        assert!(!attached.has_audio);
        assert!(matches!(attached.outcome, RemuxOutcome::MergeFailed { .. }));
        assert_eq!(outputs(&f.dir), vec!["video_1.mp4"]);
    }

    /// File system whose `remove_file` always fails for intermediates
    struct StickyIntermediates {
        inner: LocalFsAdapter,
        attempts: AtomicUsize,
    }

    impl FsPort for StickyIntermediates {
        fn dir_exists(&self, dir: &Path) -> bool {
            self.inner.dir_exists(dir)
        }
        fn file_exists(&self, path: &Path) -> bool {
            self.inner.file_exists(path)
        }
        fn list_files(&self, dir: &Path) -> ReelmarkResult<Vec<PathBuf>> {
            self.inner.list_files(dir)
        }
        fn clear_dir(&self, dir: &Path) -> ReelmarkResult<()> {
            self.inner.clear_dir(dir)
        }
        fn recreate_dir(&self, dir: &Path) -> ReelmarkResult<()> {
            self.inner.recreate_dir(dir)
        }
        fn remove_file(&self, path: &Path) -> ReelmarkResult<()> {
            if path.to_string_lossy().ends_with("_temp.mp4") {
                self.attempts.fetch_add(1, Ordering::SeqCst);
                return Err(ReelmarkError::fs(
                    path,
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "file in use"),
                ));
            }
            self.inner.remove_file(path)
        }
        fn rename(&self, from: &Path, to: &Path) -> ReelmarkResult<()> {
            self.inner.rename(from, to)
        }
    }

    #[test]
    fn test_stuck_intermediate_after_merge_is_remux_error() {
        let f = fixture();
        let fs_port = StickyIntermediates {
            inner: LocalFsAdapter::new(),
            attempts: AtomicUsize::new(0),
        };
        let muxer = ScriptedMuxer {
            outcome: RemuxOutcome::Merged,
            write_output: true,
        };
        let result = attach_audio(&fs_port, &muxer, &f.silent, &f.original, &f.output);

        assert!(matches!(result, Err(ReelmarkError::Remux { .. })));
        assert_eq!(fs_port.attempts.load(Ordering::SeqCst), 2);
        assert!(!f.output.exists());
    }

    #[test]
    fn test_missing_silent_render_is_remux_error() {
        let f = fixture();
        fs::remove_file(&f.silent).unwrap();
        let muxer = ScriptedMuxer {
            outcome: RemuxOutcome::ToolMissing,
            write_output: false,
        };
        let result = attach_audio(&LocalFsAdapter::new(), &muxer, &f.silent, &f.original, &f.output);

        assert!(matches!(result, Err(ReelmarkError::Remux { .. })));
        assert!(!f.output.exists());
    }

    #[test]
    fn test_fallback_reason_uses_last_diagnostic_line() {
        let outcome = RemuxOutcome::MergeFailed {
            diagnostics: "ffmpeg version 6\nInput #1 has no audio\n".to_string(),
        };
        assert_eq!(
            outcome.fallback_reason().unwrap(),
            "audio merge failed: Input #1 has no audio"
        );
        assert_eq!(RemuxOutcome::Merged.fallback_reason(), None);
        assert_eq!(
            RemuxOutcome::ToolMissing.fallback_reason().unwrap(),
            "ffmpeg not found"
        );
    }
}
