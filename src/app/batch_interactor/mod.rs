// Batch interactor - Orchestrates the stamping of every chunk in a directory

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::discovery::discover_chunks;
use crate::domain::model::{BatchReport, BatchRequest, BatchStatus, RenderResult, VideoChunk};
use crate::engine::remux::attach_audio;
use crate::error::ReelmarkResult;
use crate::layout::{compute_layout, BannerStyle};
use crate::ports::{AudioMuxer, ChunkRenderer, FsPort};
use crate::utils::path::{final_output_path, silent_output_path};
use crate::utils::format_duration;

/// Interactor for the batch stamping use case
pub struct BatchInteractor {
    fs_port: Arc<dyn FsPort>,
    renderer: Arc<dyn ChunkRenderer>,
    muxer: Arc<dyn AudioMuxer>,
    banner: BannerStyle,
}

impl BatchInteractor {
    /// Create new batch interactor with injected ports
    pub fn new(
        fs_port: Arc<dyn FsPort>,
        renderer: Arc<dyn ChunkRenderer>,
        muxer: Arc<dyn AudioMuxer>,
        banner: BannerStyle,
    ) -> Self {
        Self {
            fs_port,
            renderer,
            muxer,
            banner,
        }
    }

    /// Run one batch.
    ///
    /// Only a failure to prepare the output directory is returned as an
    /// error. Chunk failures are recorded in the report and the batch moves
    /// on to the next chunk.
    pub fn run_batch(&self, request: &BatchRequest) -> ReelmarkResult<BatchReport> {
        let started = Instant::now();
        let mut report = BatchReport::begin(request);

        info!(
            input = %request.input_dir.display(),
            output = %request.output_dir.display(),
            caption = %request.caption,
            "Starting batch"
        );

        self.reset_output(&request.output_dir)?;

        let chunks = discover_chunks(self.fs_port.as_ref(), &request.input_dir, request.start_number)?;
        if chunks.is_empty() {
            if self.fs_port.dir_exists(&request.input_dir) {
                warn!(input = %request.input_dir.display(), "No video files found, nothing to process");
            } else {
                warn!(input = %request.input_dir.display(), "Input directory does not exist, nothing to process");
            }
            return Ok(report.finish(BatchStatus::NoInput));
        }
        info!("Found {} video files to process", chunks.len());

        let total = chunks.len();
        for chunk in chunks {
            info!(
                chunk = %chunk.file_name(),
                number = chunk.number,
                "Processing part {}/{}",
                chunk.index + 1,
                total
            );
            let result = match self.process_chunk(&chunk, request) {
                Ok(result) => result,
                Err(e) => {
                    error!(
                        chunk = %chunk.file_name(),
                        number = chunk.number,
                        path = %chunk.path.display(),
                        error = %e,
                        "Chunk skipped"
                    );
                    RenderResult::skipped(chunk, e)
                }
            };
            report.results.push(result);
        }

        if request.preserve_input_on_total_failure && report.produced() == 0 {
            warn!(
                input = %request.input_dir.display(),
                "No chunk produced output, keeping input directory"
            );
        } else {
            report.input_reset = self.reset_input(&request.input_dir);
        }

        info!(
            produced = report.produced(),
            with_audio = report.with_audio(),
            skipped = report.skipped(),
            elapsed = %format_duration(started.elapsed()),
            "Batch finished"
        );
        Ok(report.finish(BatchStatus::Completed))
    }

    /// Clear the output directory, creating it when absent
    pub fn reset_output(&self, dir: &Path) -> ReelmarkResult<()> {
        self.fs_port.clear_dir(dir)?;
        info!(dir = %dir.display(), "Output directory ready");
        Ok(())
    }

    /// Delete and recreate the input directory; failure is logged only
    pub fn reset_input(&self, dir: &Path) -> bool {
        match self.fs_port.recreate_dir(dir) {
            Ok(()) => {
                info!(dir = %dir.display(), "Input directory cleared");
                true
            }
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "Could not clear input directory");
                false
            }
        }
    }

    fn process_chunk(&self, chunk: &VideoChunk, request: &BatchRequest) -> ReelmarkResult<RenderResult> {
        let geometry = self.renderer.probe(&chunk.path)?;
        let layout = compute_layout(
            &request.caption,
            chunk.number,
            geometry.width,
            geometry.height,
            &self.banner,
            &self.banner.font(),
        );

        let silent_path = silent_output_path(&request.output_dir, chunk.number);
        let final_path = final_output_path(&request.output_dir, chunk.number);

        let stats = match self
            .renderer
            .render(&chunk.path, &layout, request.overlay_seconds, &silent_path)
        {
            Ok(stats) => stats,
            Err(e) => {
                if self.fs_port.file_exists(&silent_path) {
                    if let Err(cleanup) = self.fs_port.remove_file(&silent_path) {
                        warn!(path = %silent_path.display(), error = %cleanup, "Could not remove partial render");
                    }
                }
                return Err(e);
            }
        };

        let attached = attach_audio(
            self.fs_port.as_ref(),
            self.muxer.as_ref(),
            &silent_path,
            &chunk.path,
            &final_path,
        )?;

        info!(
            chunk = %chunk.file_name(),
            number = chunk.number,
            output = %attached.final_path.display(),
            frames = stats.frames_written,
            overlay_frames = stats.overlay_frames,
            has_audio = attached.has_audio,
            "Chunk done"
        );

        Ok(RenderResult::produced(
            chunk.clone(),
            attached.final_path,
            attached.has_audio,
            attached.outcome.fallback_reason(),
            stats,
        ))
    }
}
