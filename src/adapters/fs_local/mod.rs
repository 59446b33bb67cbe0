// Local filesystem adapter - Directory lifecycle on the host file system

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ReelmarkError, ReelmarkResult};
use crate::ports::FsPort;

/// Filesystem adapter backed by `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    /// Create new local filesystem adapter
    pub fn new() -> Self {
        Self
    }

    fn create_directory(dir: &Path) -> ReelmarkResult<()> {
        fs::create_dir_all(dir).map_err(|e| ReelmarkError::fs(dir, e))
    }
}

impl FsPort for LocalFsAdapter {
    fn dir_exists(&self, dir: &Path) -> bool {
        dir.is_dir()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_files(&self, dir: &Path) -> ReelmarkResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                ReelmarkError::fs(path, e.into())
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn clear_dir(&self, dir: &Path) -> ReelmarkResult<()> {
        if dir.is_dir() {
            for entry in fs::read_dir(dir).map_err(|e| ReelmarkError::fs(dir, e))? {
                let path = entry.map_err(|e| ReelmarkError::fs(dir, e))?.path();
                let removed = if path.is_dir() {
                    fs::remove_dir_all(&path)
                } else {
                    fs::remove_file(&path)
                };
                removed.map_err(|e| ReelmarkError::fs(&path, e))?;
                debug!(path = %path.display(), "Removed stale entry");
            }
        }
        Self::create_directory(dir)
    }

    fn recreate_dir(&self, dir: &Path) -> ReelmarkResult<()> {
        if dir.exists() {
            fs::remove_dir_all(dir).map_err(|e| ReelmarkError::fs(dir, e))?;
        }
        Self::create_directory(dir)
    }

    fn remove_file(&self, path: &Path) -> ReelmarkResult<()> {
        fs::remove_file(path).map_err(|e| ReelmarkError::fs(path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> ReelmarkResult<()> {
        if let Some(parent) = to.parent() {
            if !parent.as_os_str().is_empty() {
                Self::create_directory(parent)?;
            }
        }
        fs::rename(from, to).map_err(|e| ReelmarkError::fs(from, e))
    }
}
