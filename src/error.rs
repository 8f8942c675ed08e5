//! Error types for configuration loading, presentation and recording.
//!
//! None of these stop the tick loop; the loop only exits on an explicit
//! shutdown.

use thiserror::Error;

/// Errors raised while reading a configuration snapshot
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid color '{0}', expected #AARRGGBB or #RRGGBB")]
    InvalidColor(String),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors a presentation surface can report for one frame
#[derive(Debug, Error)]
pub enum PresentError {
    /// Surface exists but cannot accept a frame right now; the tick is skipped
    #[error("surface not ready")]
    NotReady,

    #[error("failed to present frame: {0}")]
    Failed(String),
}

/// Errors raised while writing recorded frames
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to create output directory '{path}': {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to save frame {frame}: {source}")]
    Save {
        frame: usize,
        source: image::ImageError,
    },
}

impl From<RecordError> for PresentError {
    fn from(e: RecordError) -> Self {
        PresentError::Failed(e.to_string())
    }
}
