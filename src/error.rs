//! Error types for the imgnorm library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`NormalizeError`] — **Fatal**: something outside the normalizer
//!   contract went wrong (input file missing, download failed, output could
//!   not be written, invalid configuration). Returned as
//!   `Err(NormalizeError)` from input resolution, config building and
//!   [`crate::normalize::normalize_to_file`].
//!
//! * [`CompressionError`] — **Absorbed**: the compression collaborator
//!   failed. The normalizer never propagates it; it falls back to the
//!   original file and records the error in
//!   [`crate::output::NormalizeOutcome::Fallback`] so callers can still see
//!   what happened.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the imgnorm library.
///
/// Compression failures use [`CompressionError`] and never reach the caller
/// of [`crate::normalize::normalize`].
#[derive(Debug, Error)]
pub enum NormalizeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output image file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Any failure of the compression collaborator.
///
/// Stored in [`crate::output::NormalizeOutcome::Fallback`]; the normalizer
/// returns the original file whenever one of these occurs.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompressionError {
    /// The MIME tag names a format the compressor cannot handle.
    #[error("unsupported image format '{mime_type}'")]
    UnsupportedFormat { mime_type: String },

    /// The payload could not be decoded as the tagged format.
    #[error("failed to decode image: {detail}")]
    Decode { detail: String },

    /// Re-encoding a candidate failed.
    #[error("failed to encode image: {detail}")]
    Encode { detail: String },

    /// Every candidate came out at least as large as the input.
    #[error("compression did not reduce size ({original} bytes in, best candidate {best} bytes)")]
    NoReduction { original: u64, best: u64 },

    /// The blocking worker running the compression died.
    #[error("compression worker failed: {detail}")]
    WorkerFailed { detail: String },

    /// The collaborator panicked while compressing.
    #[error("compressor panicked: {detail}")]
    Panicked { detail: String },

    /// Failure reported by a third-party [`crate::pipeline::compress::Compressor`].
    #[error("{detail}")]
    Other { detail: String },
}

impl CompressionError {
    /// Wrap an arbitrary failure from a custom compressor.
    pub fn other(detail: impl Into<String>) -> Self {
        CompressionError::Other {
            detail: detail.into(),
        }
    }
}

impl From<image::ImageError> for CompressionError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Unsupported(u) => CompressionError::UnsupportedFormat {
                mime_type: u.format_hint().to_string(),
            },
            image::ImageError::Encoding(enc) => CompressionError::Encode {
                detail: enc.to_string(),
            },
            other => CompressionError::Decode {
                detail: other.to_string(),
            },
        }
    }
}
