//! Chunk discovery
//!
//! Lists the video files of a batch and assigns each its unique number.

use std::path::Path;

use tracing::debug;

use crate::domain::model::VideoChunk;
use crate::error::ReelmarkResult;
use crate::ports::FsPort;

/// Container extensions accepted as chunks, compared lower-cased
pub const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

/// Whether `path` has one of the accepted video extensions
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Discover the chunks directly inside `dir`, sorted by file name.
///
/// A missing directory is not an error; it simply has nothing to process.
pub fn discover_chunks(fs: &dyn FsPort, dir: &Path, start_number: u64) -> ReelmarkResult<Vec<VideoChunk>> {
    let mut files: Vec<_> = fs
        .list_files(dir)?
        .into_iter()
        .filter(|path| is_video_file(path))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!(dir = %dir.display(), count = files.len(), "Discovered chunks");

    Ok(files
        .into_iter()
        .enumerate()
        .map(|(index, path)| VideoChunk::new(path, index, start_number))
        .collect())
}
