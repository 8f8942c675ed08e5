//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigSnapshot, WaterStyle};
use crate::error::ConfigError;
use crate::params::{ForceParams, RecordingConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "tiltscape")]
#[command(about = "Tilt-reactive live wallpaper renderer", long_about = None)]
pub struct Args {
    /// Number of ticks to run
    #[arg(long, value_name = "N", default_value = "300")]
    pub frames: usize,

    /// Directory for recorded PNG frames
    #[arg(long, value_name = "DIR", default_value = "frames")]
    pub output: String,

    /// Write every n-th frame
    #[arg(long, value_name = "N", default_value = "1")]
    pub every: usize,

    /// Base layer image (PNG, JPEG, ...)
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Configuration snapshot as JSON
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Surface width in pixels
    #[arg(
        long,
        value_name = "PX",
        default_value = "540",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub width: u32,

    /// Surface height in pixels
    #[arg(
        long,
        value_name = "PX",
        default_value = "960",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub height: u32,

    /// Seed for particles, bodies and synthetic motion
    #[arg(long)]
    pub seed: Option<u64>,

    /// Particle archetype: 0 snow, 1 rain, 2 fireflies, 3 leaves, 4 bubbles, 5 stars
    #[arg(long, value_name = "INDEX")]
    pub particles: Option<i64>,

    /// Enable water with the given style: pond or ripple
    #[arg(long, value_name = "STYLE")]
    pub water: Option<String>,

    /// Run the threaded tick loop in real time instead of stepping offline
    #[arg(long)]
    pub realtime: bool,

    /// Use the video wallpaper's faster gravity smoothing
    #[arg(long)]
    pub video: bool,
}

impl Args {
    /// Load `--config` (or defaults) and apply flag overrides
    pub fn config_snapshot(&self) -> Result<ConfigSnapshot, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ConfigSnapshot::load(path)?,
            None => ConfigSnapshot::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(archetype) = self.particles {
            config.particles_enabled = true;
            config.particle_archetype = archetype;
        }
        if let Some(style) = &self.water {
            config.water_enabled = true;
            config.water_style = match style.to_lowercase().as_str() {
                "ripple" => WaterStyle::Ripple,
                "pond" => WaterStyle::Pond,
                other => {
                    tracing::warn!(style = other, "unknown water style, using pond");
                    WaterStyle::Pond
                }
            };
        }
        Ok(config)
    }

    /// Sensor smoothing parameters for the selected wallpaper variant
    pub fn force_params(&self) -> ForceParams {
        if self.video {
            ForceParams::video()
        } else {
            ForceParams::default()
        }
    }

    pub fn recording_config(&self) -> RecordingConfig {
        let mut config = RecordingConfig::new(self.frames, self.output.clone());
        config.every = self.every.max(1);
        config
    }
}
