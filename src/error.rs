//! Error types for city generation and export.

use std::io;

/// Errors surfaced by the generation pipeline and the exporters.
#[derive(Debug, thiserror::Error)]
pub enum CityError {
    /// Malformed configuration (non-positive dimensions, missing zone
    /// entries, inverted height bounds, ...). Raised before any stage runs.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Export or statistics requested before generation completed.
    #[error("city generation not complete")]
    NotReady,

    /// Export write failure.
    #[error("export I/O error: {0}")]
    Io(#[from] io::Error),

    /// Structured-data serialization failure.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Preview image encoding failure.
    #[error("preview image error: {0}")]
    Image(#[from] image::ImageError),

    /// Export path with an extension no exporter handles.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
}
