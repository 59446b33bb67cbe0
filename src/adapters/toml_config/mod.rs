// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapters::exec_ffmpeg::DEFAULT_FFMPEG;
use crate::engine::EngineConfig;
use crate::error::{ReelmarkError, ReelmarkResult};
use crate::layout::BannerStyle;

/// Files looked for, in order, when no path is given
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["reelmark.toml", "config/reelmark.toml"];

/// `[batch]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchSettings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// First line of this file is the caption when none is given directly
    pub caption_file: PathBuf,
    pub start_number: u64,
    pub overlay_seconds: f64,
    pub preserve_input_on_total_failure: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("output/chunks"),
            output_dir: PathBuf::from("processed_videos"),
            caption_file: PathBuf::from("userText.txt"),
            start_number: 1,
            overlay_seconds: 5.0,
            preserve_input_on_total_failure: false,
        }
    }
}

/// `[encoder]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderSettings {
    /// Executable name or path of the audio merge tool
    pub ffmpeg_path: PathBuf,
    pub audio_codec: String,
    pub video_bit_rate: usize,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG),
            audio_codec: "aac".to_string(),
            video_bit_rate: EngineConfig::default().video_bit_rate,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub batch: BatchSettings,
    pub banner: BannerStyle,
    pub encoder: EncoderSettings,
}

impl AppConfig {
    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> ReelmarkResult<()> {
        let invalid = |message: &str| {
            Err(ReelmarkError::Config {
                message: message.to_string(),
            })
        };

        if self.banner.words_per_line < 1 {
            return invalid("banner.words_per_line must be at least 1");
        }
        if self.banner.font_scale < 1 {
            return invalid("banner.font_scale must be at least 1");
        }
        if self.banner.thickness < 1 {
            return invalid("banner.thickness must be at least 1");
        }
        if !self.batch.overlay_seconds.is_finite() || self.batch.overlay_seconds < 0.0 {
            return invalid("batch.overlay_seconds must be a non-negative number");
        }
        if self.encoder.video_bit_rate == 0 {
            return invalid("encoder.video_bit_rate must be greater than 0");
        }
        if self.encoder.audio_codec.trim().is_empty() {
            return invalid("encoder.audio_codec must not be empty");
        }
        Ok(())
    }

    /// Engine settings derived from this configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            banner: self.banner.clone(),
            video_bit_rate: self.encoder.video_bit_rate,
        }
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse configuration text; missing keys keep their defaults
    pub fn parse(content: &str) -> ReelmarkResult<AppConfig> {
        toml::from_str(content).map_err(|e| ReelmarkError::Config {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }

    /// Load and parse a configuration file
    pub fn load(path: &Path) -> ReelmarkResult<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| ReelmarkError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config = Self::parse(&content).map_err(|e| ReelmarkError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// First default config file present under `root`
    pub fn find_default(root: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = TomlConfigAdapter::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.batch.input_dir, PathBuf::from("output/chunks"));
        assert_eq!(config.batch.output_dir, PathBuf::from("processed_videos"));
        assert_eq!(config.banner.words_per_line, 4);
        assert_eq!(config.banner.top_margin, 250);
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let config = TomlConfigAdapter::parse(
            r#"
            [batch]
            start_number = 7
            overlay_seconds = 2.5

            [banner]
            top_margin = 40
            background_color = [10, 20, 30]

            [encoder]
            audio_codec = "libopus"
            "#,
        )
        .unwrap();

        assert_eq!(config.batch.start_number, 7);
        assert_eq!(config.batch.overlay_seconds, 2.5);
        assert_eq!(config.batch.caption_file, PathBuf::from("userText.txt"));
        assert_eq!(config.banner.top_margin, 40);
        assert_eq!(config.banner.background_color, [10, 20, 30]);
        assert_eq!(config.banner.padding_x, 20);
        assert_eq!(config.encoder.audio_codec, "libopus");
        assert_eq!(config.encoder.ffmpeg_path, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(TomlConfigAdapter::parse("[batch]\ninput = \"x\"\n").is_err());
        assert!(TomlConfigAdapter::parse("[network]\nport = 1\n").is_err());
        assert!(TomlConfigAdapter::parse("[banner]\nfont = \"arial\"\n").is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.banner.words_per_line = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.batch.overlay_seconds = -1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.batch.overlay_seconds = 0.0;
        assert!(config.validate().is_ok());

        let mut config = AppConfig::default();
        config.encoder.video_bit_rate = 0;
        assert!(matches!(config.validate(), Err(ReelmarkError::Config { .. })));
    }

    #[test]
    fn test_find_default_prefers_root_file() {
        let temp = TempDir::new().unwrap();
        assert_eq!(TomlConfigAdapter::find_default(temp.path()), None);

        std::fs::create_dir(temp.path().join("config")).unwrap();
        std::fs::write(temp.path().join("config/reelmark.toml"), "").unwrap();
        assert_eq!(
            TomlConfigAdapter::find_default(temp.path()),
            Some(temp.path().join("config/reelmark.toml"))
        );

        std::fs::write(temp.path().join("reelmark.toml"), "").unwrap();
        assert_eq!(
            TomlConfigAdapter::find_default(temp.path()),
            Some(temp.path().join("reelmark.toml"))
        );
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = TomlConfigAdapter::load(Path::new("/nonexistent/reelmark.toml")).unwrap_err();
        assert!(err.to_string().contains("reelmark.toml"));
    }
}
