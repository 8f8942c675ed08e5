//! PNG frame recording.

use image::ColorType;
use tracing::info;

use crate::driver::Presenter;
use crate::error::{PresentError, RecordError};
use crate::frame::Frame;
use crate::params::RecordingConfig;
use crate::raster::Canvas;

/// Presenter that rasterizes frames and writes every n-th one to disk
pub struct FrameRecorder {
    config: RecordingConfig,
    frame_num: usize,
    written: usize,
}

impl FrameRecorder {
    /// Create the output directory and start counting at frame 0
    pub fn new(config: RecordingConfig) -> Result<Self, RecordError> {
        std::fs::create_dir_all(&config.output_dir).map_err(|source| RecordError::CreateDir {
            path: config.output_dir.clone(),
            source,
        })?;
        info!(dir = %config.output_dir, frames = config.frames, "recording frames");
        Ok(Self {
            config,
            frame_num: 0,
            written: 0,
        })
    }

    /// Frames offered so far, written or not
    pub fn frames_seen(&self) -> usize {
        self.frame_num
    }

    pub fn frames_written(&self) -> usize {
        self.written
    }

    /// Whether the configured frame count has been reached
    pub fn is_done(&self) -> bool {
        self.frame_num >= self.config.frames
    }

    /// Rasterize and save one frame if it falls on the capture stride
    pub fn record(&mut self, frame: &Frame) -> Result<(), RecordError> {
        let frame_num = self.frame_num;
        self.frame_num += 1;
        if !self.config.should_capture(frame_num) {
            return Ok(());
        }
        let image = Canvas::render(frame);
        image::save_buffer(
            self.config.frame_path(frame_num),
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgba8,
        )
        .map_err(|source| RecordError::Save {
            frame: frame_num,
            source,
        })?;
        self.written += 1;
        Ok(())
    }
}

impl Presenter for FrameRecorder {
    fn present(&mut self, frame: &Frame) -> Result<(), PresentError> {
        if self.is_done() {
            return Ok(());
        }
        self.record(frame)?;
        Ok(())
    }
}
