//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter};
use crate::error::{ReelmarkError, ReelmarkResult};

/// Caption used when neither a caption nor a readable caption file is given
pub const DEFAULT_CAPTION: &str = "Default Caption";

/// Values given on the command line; `None` leaves lower layers in place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub caption_file: Option<PathBuf>,
    pub start_number: Option<u64>,
    pub overlay_seconds: Option<f64>,
    pub preserve_input_on_total_failure: Option<bool>,
    pub ffmpeg_path: Option<PathBuf>,
}

/// Resolve the configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(config_path: Option<&Path>, overrides: &ConfigOverrides) -> ReelmarkResult<AppConfig> {
    let root = std::env::current_dir().map_err(|e| ReelmarkError::Config {
        message: format!("Cannot determine working directory: {}", e),
    })?;
    resolve_configuration(config_path, &root, |key| std::env::var(key).ok(), overrides)
}

/// Layered resolution with an injectable environment
pub fn resolve_configuration<F>(
    config_path: Option<&Path>,
    root: &Path,
    env: F,
    overrides: &ConfigOverrides,
) -> ReelmarkResult<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    info!("Initializing configuration hierarchy");

    let mut config = load_config_file(config_path, root)?;

    let env_overrides = apply_environment(&mut config, env)?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    let cli_overrides = apply_cli_overrides(&mut config, overrides);
    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }

    config.validate()?;
    Ok(config)
}

/// Load the explicit file, or the first default file found under `root`.
///
/// An explicit path that cannot be read is an error; absent default files
/// fall back to built-in defaults.
pub fn load_config_file(explicit: Option<&Path>, root: &Path) -> ReelmarkResult<AppConfig> {
    if let Some(path) = explicit {
        return TomlConfigAdapter::load(path);
    }
    match TomlConfigAdapter::find_default(root) {
        Some(path) => TomlConfigAdapter::load(&path),
        None => {
            info!("No config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Apply `REELMARK_*` variables, returning how many were set
pub fn apply_environment<F>(config: &mut AppConfig, env: F) -> ReelmarkResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;
    let mut lookup = |key: &str| {
        let value = env(key).filter(|v| !v.trim().is_empty());
        if let Some(value) = &value {
            info!("Found environment override: {} = {}", key, value);
            applied += 1;
        }
        value
    };

    if let Some(v) = lookup("REELMARK_INPUT_DIR") {
        config.batch.input_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup("REELMARK_OUTPUT_DIR") {
        config.batch.output_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup("REELMARK_CAPTION_FILE") {
        config.batch.caption_file = PathBuf::from(v);
    }
    if let Some(v) = lookup("REELMARK_START_NUMBER") {
        config.batch.start_number = parse_env("REELMARK_START_NUMBER", &v)?;
    }
    if let Some(v) = lookup("REELMARK_OVERLAY_SECONDS") {
        config.batch.overlay_seconds = parse_env("REELMARK_OVERLAY_SECONDS", &v)?;
    }
    if let Some(v) = lookup("REELMARK_PRESERVE_INPUT") {
        config.batch.preserve_input_on_total_failure = parse_env("REELMARK_PRESERVE_INPUT", &v)?;
    }
    if let Some(v) = lookup("REELMARK_FFMPEG") {
        config.encoder.ffmpeg_path = PathBuf::from(v);
    }
    if let Some(v) = lookup("REELMARK_AUDIO_CODEC") {
        config.encoder.audio_codec = v;
    }

    Ok(applied)
}

fn parse_env<T>(key: &str, value: &str) -> ReelmarkResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| ReelmarkError::Config {
        message: format!("Invalid value for {}: '{}' ({})", key, value, e),
    })
}

/// Apply CLI argument overrides, returning how many were set
pub fn apply_cli_overrides(config: &mut AppConfig, overrides: &ConfigOverrides) -> usize {
    let mut applied = 0;

    if let Some(v) = &overrides.input_dir {
        config.batch.input_dir = v.clone();
        applied += 1;
    }
    if let Some(v) = &overrides.output_dir {
        config.batch.output_dir = v.clone();
        applied += 1;
    }
    if let Some(v) = &overrides.caption_file {
        config.batch.caption_file = v.clone();
        applied += 1;
    }
    if let Some(v) = overrides.start_number {
        config.batch.start_number = v;
        applied += 1;
    }
    if let Some(v) = overrides.overlay_seconds {
        config.batch.overlay_seconds = v;
        applied += 1;
    }
    if let Some(v) = overrides.preserve_input_on_total_failure {
        config.batch.preserve_input_on_total_failure = v;
        applied += 1;
    }
    if let Some(v) = &overrides.ffmpeg_path {
        config.encoder.ffmpeg_path = v.clone();
        applied += 1;
    }

    applied
}

/// Caption for the batch: the explicit one, else the first line of
/// `caption_file`, else [`DEFAULT_CAPTION`]
pub fn resolve_caption(explicit: Option<&str>, caption_file: &Path) -> String {
    if let Some(caption) = explicit {
        return caption.trim().to_string();
    }

    match std::fs::read_to_string(caption_file) {
        Ok(content) => {
            let first_line = content.lines().next().unwrap_or("").trim();
            if first_line.is_empty() {
                warn!(path = %caption_file.display(), "Caption file is empty, using default caption");
                DEFAULT_CAPTION.to_string()
            } else {
                first_line.to_string()
            }
        }
        Err(e) => {
            warn!(path = %caption_file.display(), error = %e, "Caption file not readable, using default caption");
            DEFAULT_CAPTION.to_string()
        }
    }
}
