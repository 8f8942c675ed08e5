//! Tick loop and recording configuration.

use std::time::Duration;

/// Frame pacing configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Delay between the end of one tick and the start of the next
    /// 16 ms ≈ 60 Hz; best effort, a long tick pushes the next one back
    pub tick_interval: Duration,

    /// Simulated time per tick (seconds)
    pub tick_dt_s: f32,

    /// Base layer overscale on each side at sensitivity 1.0 (pixels)
    /// Twice the maximum parallax so edges never show
    pub base_margin_px: f32,

    /// How often the tick loop reports frame statistics
    pub stats_interval: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(16),
            tick_dt_s: 0.016,
            base_margin_px: 120.0,
            stats_interval: Duration::from_secs(1),
        }
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Number of ticks to run
    pub frames: usize,

    /// Output directory for frames
    pub output_dir: String,

    /// Write every n-th frame (1 = all)
    pub every: usize,
}

impl RecordingConfig {
    pub fn new(frames: usize, output_dir: impl Into<String>) -> Self {
        Self {
            frames,
            output_dir: output_dir.into(),
            every: 1,
        }
    }

    /// Whether the given tick number should be written to disk
    pub fn should_capture(&self, frame_num: usize) -> bool {
        frame_num % self.every.max(1) == 0
    }

    /// Frame file path
    pub fn frame_path(&self, frame_num: usize) -> String {
        format!("{}/frame_{:05}.png", self.output_dir, frame_num)
    }
}
