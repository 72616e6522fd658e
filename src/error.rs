//! Error types for the acquisition pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while acquiring a webcam image.
///
/// Every variant is resolved where it occurs: logged with the source address
/// and the pass moves on to the next source. Only configuration errors raised
/// at startup are fatal to the process.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not parse {input:?}: {reason}")]
    Parse { input: String, reason: String },

    #[error("no matching webcam image found at {address}")]
    Extraction { address: String },

    #[error("unsupported image format, cannot normalize to png")]
    UnsupportedFormat,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("could not persist {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ScrapeError>;
