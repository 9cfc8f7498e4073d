// The single error type for the library. Per-frame conditions that are part of
// normal operation (no silhouette, not calibrated) are NOT errors and live in
// `pipeline::FrameReport` instead; everything here is something a caller may
// want to log, skip, or surface.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrainerError>;

#[derive(Debug, Error)]
pub enum TrainerError {
    /// The frame buffer is empty, truncated, or does not match the learned background.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("unknown mode: {0}")]
    UnknownExercise(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session log error: {0}")]
    Csv(#[from] csv::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TrainerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrainerError::Io {
            path: path.into(),
            source,
        }
    }
}
