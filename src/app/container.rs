use std::sync::Arc;

use crate::adapters::toml_config::AppConfig;
use crate::adapters::{FFmpegCliMuxer, LocalFsAdapter};
use crate::app::batch_interactor::BatchInteractor;
use crate::engine::LibavOverlayRenderer;
use crate::error::ReelmarkResult;
use crate::ports::{AudioMuxer, ChunkRenderer, FsPort};

pub trait AppContainer: Send + Sync {
    fn batch_interactor(&self) -> Arc<BatchInteractor>;
}

pub struct DefaultAppContainer {
    batch_interactor: Arc<BatchInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> ReelmarkResult<Self> {
        let fs_port = Arc::new(LocalFsAdapter::new());
        let renderer = Arc::new(LibavOverlayRenderer::new(config.engine_config())?);
        let muxer = Arc::new(FFmpegCliMuxer::new(
            config.encoder.ffmpeg_path.clone(),
            config.encoder.audio_codec.clone(),
        ));

        let batch_interactor = Arc::new(BatchInteractor::new(
            fs_port as Arc<dyn FsPort>,
            renderer as Arc<dyn ChunkRenderer>,
            muxer as Arc<dyn AudioMuxer>,
            config.banner.clone(),
        ));

        Ok(Self { batch_interactor })
    }
}

impl AppContainer for DefaultAppContainer {
    fn batch_interactor(&self) -> Arc<BatchInteractor> {
        Arc::clone(&self.batch_interactor)
    }
}
