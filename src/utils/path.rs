//! Output file naming

use std::path::{Path, PathBuf};

/// Final output for the chunk numbered `number`
pub fn final_output_path(output_dir: &Path, number: u64) -> PathBuf {
    output_dir.join(format!("video_{}.mp4", number))
}

/// Silent intermediate written before the audio merge
pub fn silent_output_path(output_dir: &Path, number: u64) -> PathBuf {
    output_dir.join(format!("video_{}_temp.mp4", number))
}
