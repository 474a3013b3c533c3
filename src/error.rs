use std::path::PathBuf;

use thiserror::Error;

/// Reasons a route could not be loaded. Loading is the only fallible step;
/// playback itself never errors.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read route from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("route payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("route payload is not an array")]
    NotAnArray,

    #[error("route point #{index} is invalid: {reason}")]
    InvalidPoint { index: usize, reason: String },

    #[error("route point #{index} has an unparsable timestamp: {value:?}")]
    InvalidTimestamp { index: usize, value: String },

    #[error("failed to read GPX track: {source}")]
    Gpx {
        #[source]
        source: gpx::errors::GpxError,
    },

    #[error("GPX track point #{index} has no time")]
    MissingTime { index: usize },
}
