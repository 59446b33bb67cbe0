//! Frame-accurate banner overlay using libav decode and re-encode

use std::path::Path;
use std::time::Instant;

use ffmpeg_next as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::software::scaling::{Context as Scaler, Flags as ScaleFlags};
use ffmpeg::util::frame::video::Video as VideoFrame;
use ffmpeg::{codec, encoder, format, media, Packet, Rational};
use image::RgbImage;
use tracing::{debug, info, warn};

use crate::domain::model::{CaptionLayout, RenderStats, VideoGeometry};
use crate::engine::{BannerSprite, EngineConfig};
use crate::error::{ReelmarkError, ReelmarkResult};
use crate::ports::ChunkRenderer;

/// Silent intermediate codec, the libavcodec counterpart of `mp4v`
const OUTPUT_CODEC: codec::Id = codec::Id::MPEG4;
const OUTPUT_PIXEL: Pixel = Pixel::YUV420P;
/// Largest time base denominator the MPEG-4 encoder accepts
const MAX_TIME_BASE_DEN: i32 = 65535;

/// Renderer that decodes a chunk, stamps its leading frames and writes a
/// video-only copy at the same size and frame rate
pub struct LibavOverlayRenderer {
    config: EngineConfig,
}

/// Opened input with its decoder
struct DecodeSession {
    input: format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::decoder::Video,
    frame_rate: Rational,
    encoder_rate: Rational,
    total_frames: u64,
}

/// Opened output with its encoder
struct EncodeSession {
    output: format::context::Output,
    encoder: encoder::video::Encoder,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    stream_index: usize,
}

impl LibavOverlayRenderer {
    /// Create a renderer, initializing libav
    pub fn new(config: EngineConfig) -> ReelmarkResult<Self> {
        crate::init()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn open_input(path: &Path) -> ReelmarkResult<DecodeSession> {
        let decode_open = |message: String| ReelmarkError::DecodeOpen {
            path: path.to_path_buf(),
            message,
        };

        let input = format::input(&path).map_err(|e| decode_open(e.to_string()))?;
        let stream = input
            .streams()
            .best(media::Type::Video)
            .ok_or_else(|| decode_open("no video stream".to_string()))?;
        let stream_index = stream.index();

        let decoder = codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| decode_open(format!("decoder context: {}", e)))?
            .decoder()
            .video()
            .map_err(|e| decode_open(format!("video decoder: {}", e)))?;

        let frame_rate = [stream.avg_frame_rate(), stream.rate()]
            .into_iter()
            .find(|rate| rate.numerator() > 0 && rate.denominator() > 0)
            .ok_or_else(|| decode_open("unknown frame rate".to_string()))?;
        let encoder_rate = encoder_frame_rate(stream.rate(), stream.avg_frame_rate())
            .ok_or_else(|| decode_open("unknown frame rate".to_string()))?;
        let total_frames = stream.frames().max(0) as u64;

        Ok(DecodeSession {
            input,
            stream_index,
            decoder,
            frame_rate,
            encoder_rate,
            total_frames,
        })
    }

    fn open_output(&self, path: &Path, width: u32, height: u32, frame_rate: Rational) -> ReelmarkResult<EncodeSession> {
        let encode_err = |message: String| ReelmarkError::Encode { message };

        let mut output = format::output(&path)
            .map_err(|e| encode_err(format!("create {}: {}", path.display(), e)))?;
        let global_header = output.format().flags().contains(format::Flags::GLOBAL_HEADER);

        let codec = encoder::find(OUTPUT_CODEC)
            .ok_or_else(|| encode_err("MPEG-4 encoder not available".to_string()))?;
        let encoder_time_base = frame_rate.invert();

        let mut stream = output
            .add_stream(codec)
            .map_err(|e| encode_err(format!("add video stream: {}", e)))?;
        let stream_index = stream.index();

        let mut video = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|e| encode_err(format!("video encoder: {}", e)))?;
        video.set_width(width);
        video.set_height(height);
        video.set_format(OUTPUT_PIXEL);
        video.set_time_base(encoder_time_base);
        video.set_frame_rate(Some(frame_rate));
        video.set_bit_rate(self.config.video_bit_rate);
        if global_header {
            video.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let encoder = video
            .open_as(codec)
            .map_err(|e| encode_err(format!("open encoder: {}", e)))?;
        stream.set_parameters(&encoder);
        stream.set_time_base(encoder_time_base);

        output
            .write_header()
            .map_err(|e| encode_err(format!("write header: {}", e)))?;
        let stream_time_base = output
            .stream(stream_index)
            .map(|s| s.time_base())
            .ok_or_else(|| encode_err("output stream vanished".to_string()))?;

        Ok(EncodeSession {
            output,
            encoder,
            encoder_time_base,
            stream_time_base,
            stream_index,
        })
    }
}

impl EncodeSession {
    fn send(&mut self, frame: &VideoFrame) -> ReelmarkResult<()> {
        self.encoder.send_frame(frame).map_err(|e| ReelmarkError::Encode {
            message: format!("send frame: {}", e),
        })?;
        self.drain()
    }

    fn drain(&mut self) -> ReelmarkResult<()> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| ReelmarkError::Encode {
                    message: format!("write packet: {}", e),
                })?;
        }
        Ok(())
    }

    fn finish(mut self) -> ReelmarkResult<()> {
        self.encoder.send_eof().map_err(|e| ReelmarkError::Encode {
            message: format!("flush encoder: {}", e),
        })?;
        self.drain()?;
        self.output.write_trailer().map_err(|e| ReelmarkError::Encode {
            message: format!("write trailer: {}", e),
        })
    }
}

/// Pixel converters between the decoder, the banner canvas and the encoder
struct Scalers {
    to_rgb: Scaler,
    rgb_to_output: Scaler,
    to_output: Scaler,
}

impl Scalers {
    fn new(source: Pixel, width: u32, height: u32) -> ReelmarkResult<Self> {
        let get = |from: Pixel, to: Pixel| {
            Scaler::get(from, width, height, to, width, height, ScaleFlags::BILINEAR).map_err(scale_err)
        };
        Ok(Self {
            to_rgb: get(source, Pixel::RGB24)?,
            rgb_to_output: get(Pixel::RGB24, OUTPUT_PIXEL)?,
            to_output: get(source, OUTPUT_PIXEL)?,
        })
    }
}

/// Per-frame state of one render
struct FramePipeline {
    sprite: BannerSprite,
    overlay_frames: u64,
    width: u32,
    height: u32,
    // created from the first decoded frame, whose pixel format is authoritative
    scalers: Option<Scalers>,
    stats: RenderStats,
}

impl FramePipeline {
    fn process(&mut self, decoded: &VideoFrame, session: &mut EncodeSession) -> ReelmarkResult<()> {
        let index = self.stats.frames_written;
        let mut out = VideoFrame::empty();

        let scalers = match self.scalers.take() {
            Some(scalers) => scalers,
            None => Scalers::new(decoded.format(), self.width, self.height)?,
        };
        let scalers = self.scalers.insert(scalers);

        if index < self.overlay_frames {
            let mut rgb = VideoFrame::empty();
            scalers.to_rgb.run(decoded, &mut rgb).map_err(scale_err)?;
            let mut image = frame_to_image(&rgb)?;
            self.sprite.stamp(&mut image);
            image_to_frame(&image, &mut rgb);
            scalers.rgb_to_output.run(&rgb, &mut out).map_err(scale_err)?;
            self.stats.overlay_frames += 1;
        } else {
            scalers.to_output.run(decoded, &mut out).map_err(scale_err)?;
        }

        out.set_pts(Some(index as i64));
        session.send(&out)?;
        self.stats.frames_written += 1;
        Ok(())
    }

    fn receive_all(&mut self, decoder: &mut ffmpeg::decoder::Video, session: &mut EncodeSession) -> ReelmarkResult<()> {
        let mut decoded = VideoFrame::empty();
        while decoder.receive_frame(&mut decoded).is_ok() {
            self.process(&decoded, session)?;
        }
        Ok(())
    }
}

/// Encoder frame rate: the first of the base or average rate that is exact
/// within the MPEG-4 time base limit, else the closest fraction to the base
/// rate that fits.
///
/// Frames are written with pts = index, so the choice only sets playback speed.
fn encoder_frame_rate(base: Rational, average: Rational) -> Option<Rational> {
    let candidates: Vec<Rational> = [base, average]
        .into_iter()
        .filter(|rate| rate.numerator() > 0 && rate.denominator() > 0)
        .collect();

    for rate in &candidates {
        if let Ok(exact) = rate.reduce_with_limit(MAX_TIME_BASE_DEN) {
            return Some(exact);
        }
    }
    candidates
        .first()
        .map(|rate| rate.reduce_with_limit(MAX_TIME_BASE_DEN).unwrap_or_else(|closest| closest))
        .filter(|rate| rate.numerator() > 0)
}

fn scale_err(e: ffmpeg::Error) -> ReelmarkError {
    ReelmarkError::Decode {
        message: format!("pixel conversion: {}", e),
    }
}

/// Copy a packed RGB24 frame into an image, dropping row padding
fn frame_to_image(frame: &VideoFrame) -> ReelmarkResult<RgbImage> {
    let (width, height) = (frame.width(), frame.height());
    let stride = frame.stride(0);
    let row = width as usize * 3;
    let data = frame.data(0);

    let mut buffer = Vec::with_capacity(row * height as usize);
    for y in 0..height as usize {
        buffer.extend_from_slice(&data[y * stride..y * stride + row]);
    }
    RgbImage::from_raw(width, height, buffer).ok_or_else(|| ReelmarkError::Decode {
        message: "frame buffer size mismatch".to_string(),
    })
}

/// Copy an image back into a packed RGB24 frame of the same size
fn image_to_frame(image: &RgbImage, frame: &mut VideoFrame) {
    let stride = frame.stride(0);
    let row = image.width() as usize * 3;
    let source = image.as_raw();
    let data = frame.data_mut(0);
    for y in 0..image.height() as usize {
        data[y * stride..y * stride + row].copy_from_slice(&source[y * row..(y + 1) * row]);
    }
}

impl ChunkRenderer for LibavOverlayRenderer {
    fn probe(&self, chunk_path: &Path) -> ReelmarkResult<VideoGeometry> {
        let session = Self::open_input(chunk_path)?;
        Ok(VideoGeometry {
            width: session.decoder.width(),
            height: session.decoder.height(),
            frame_rate: f64::from(session.frame_rate),
            total_frames: session.total_frames,
        })
    }

    fn render(
        &self,
        chunk_path: &Path,
        layout: &CaptionLayout,
        overlay_seconds: f64,
        silent_path: &Path,
    ) -> ReelmarkResult<RenderStats> {
        let started = Instant::now();
        let mut input = Self::open_input(chunk_path)?;
        let (width, height) = (input.decoder.width(), input.decoder.height());
        let geometry = VideoGeometry {
            width,
            height,
            frame_rate: f64::from(input.frame_rate),
            total_frames: input.total_frames,
        };
        let overlay_frames = geometry.overlay_frame_count(overlay_seconds);

        info!(
            input = %chunk_path.display(),
            width,
            height,
            fps = geometry.frame_rate,
            total_frames = geometry.total_frames,
            overlay_frames,
            "Rendering banner overlay"
        );

        if input.encoder_rate != input.frame_rate {
            debug!(
                source = ?input.frame_rate,
                encoder = ?input.encoder_rate,
                "Encoding at an MPEG-4 compatible rate"
            );
        }
        let mut session = self.open_output(silent_path, width, height, input.encoder_rate)?;
        let mut pipeline = FramePipeline {
            sprite: BannerSprite::new(layout, &self.config.banner),
            overlay_frames,
            width,
            height,
            scalers: None,
            stats: RenderStats::default(),
        };

        for (stream, packet) in input.input.packets() {
            if stream.index() != input.stream_index {
                continue;
            }
            if let Err(e) = input.decoder.send_packet(&packet) {
                warn!(input = %chunk_path.display(), error = %e, "Skipping undecodable packet");
                continue;
            }
            pipeline.receive_all(&mut input.decoder, &mut session)?;
        }

        input.decoder.send_eof().map_err(|e| ReelmarkError::Decode {
            message: format!("flush decoder: {}", e),
        })?;
        pipeline.receive_all(&mut input.decoder, &mut session)?;
        session.finish()?;

        debug!(
            frames = pipeline.stats.frames_written,
            overlay_frames = pipeline.stats.overlay_frames,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Overlay render finished"
        );
        Ok(pipeline.stats)
    }
}
