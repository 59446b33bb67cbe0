//! Core stamping engine module

use serde::{Deserialize, Serialize};

use crate::layout::BannerStyle;

pub mod draw;
pub mod overlay;
pub mod remux;

pub use draw::BannerSprite;
pub use overlay::LibavOverlayRenderer;
pub use remux::{attach_audio, AttachedAudio, RemuxOutcome};

/// Stamping engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Banner appearance
    pub banner: BannerStyle,
    /// Target bit rate of the re-encoded video stream
    pub video_bit_rate: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            banner: BannerStyle::default(),
            video_bit_rate: 8_000_000,
        }
    }
}
