// Ports - Capability traits the batch is wired through

use std::path::{Path, PathBuf};

use crate::domain::model::{CaptionLayout, RenderStats, VideoGeometry};
use crate::engine::remux::RemuxOutcome;
use crate::error::ReelmarkResult;

/// Port for file system operations on the batch directories
pub trait FsPort: Send + Sync {
    /// Check if directory exists
    fn dir_exists(&self, dir: &Path) -> bool;

    /// Check if file exists
    fn file_exists(&self, path: &Path) -> bool;

    /// Regular files directly inside `dir`, in no particular order.
    /// A missing directory yields an empty list.
    fn list_files(&self, dir: &Path) -> ReelmarkResult<Vec<PathBuf>>;

    /// Remove everything inside `dir`, creating it when absent
    fn clear_dir(&self, dir: &Path) -> ReelmarkResult<()>;

    /// Delete `dir` with its contents and create it again empty
    fn recreate_dir(&self, dir: &Path) -> ReelmarkResult<()>;

    /// Remove a single file
    fn remove_file(&self, path: &Path) -> ReelmarkResult<()>;

    /// Move `from` to `to`, replacing `to`
    fn rename(&self, from: &Path, to: &Path) -> ReelmarkResult<()>;
}

/// Port for decoding a chunk and writing its stamped, silent copy
pub trait ChunkRenderer: Send + Sync {
    /// Open the chunk and read its frame geometry
    fn probe(&self, chunk_path: &Path) -> ReelmarkResult<VideoGeometry>;

    /// Stamp `layout` on the leading `overlay_seconds` and write `silent_path`
    fn render(
        &self,
        chunk_path: &Path,
        layout: &CaptionLayout,
        overlay_seconds: f64,
        silent_path: &Path,
    ) -> ReelmarkResult<RenderStats>;
}

/// Port for the external audio merge
pub trait AudioMuxer: Send + Sync {
    /// Combine the video of `silent_path` with the audio of `original_path` into `output_path`
    fn merge(&self, silent_path: &Path, original_path: &Path, output_path: &Path) -> RemuxOutcome;
}
