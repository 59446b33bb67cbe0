//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::config_initialization::ConfigOverrides;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory holding the chunks [default: output/chunks]
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving video_{N}.mp4 files [default: processed_videos]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Caption text, instead of reading the caption file
    #[arg(short, long, env = "REELMARK_CAPTION")]
    pub caption: Option<String>,

    /// File whose first line is the caption [default: userText.txt]
    #[arg(long)]
    pub caption_file: Option<PathBuf>,

    /// Number given to the first chunk
    #[arg(long)]
    pub start_number: Option<u64>,

    /// Seconds of banner at the start of each chunk
    #[arg(long)]
    pub overlay_seconds: Option<f64>,

    /// Keep the input directory when no chunk could be produced
    #[arg(long)]
    pub preserve_input: bool,

    /// Configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// ffmpeg executable used for the audio merge
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Print the batch report as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Values that override the configuration file and environment
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            caption_file: self.caption_file.clone(),
            start_number: self.start_number,
            overlay_seconds: self.overlay_seconds,
            preserve_input_on_total_failure: self.preserve_input.then_some(true),
            ffmpeg_path: self.ffmpeg.clone(),
        }
    }
}

/// Arguments for the layout command
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Caption text
    #[arg(short, long)]
    pub caption: String,

    /// Unique number shown before the caption
    #[arg(short, long, default_value = "1")]
    pub number: u64,

    /// Frame width in pixels
    #[arg(long)]
    pub width: u32,

    /// Frame height in pixels
    #[arg(long)]
    pub height: u32,

    /// Configuration file (TOML) supplying the banner style
    #[arg(long)]
    pub config: Option<PathBuf>,
}
