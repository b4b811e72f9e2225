//! # imgnorm
//!
//! Best-effort image normalization before upload.
//!
//! Users hand over whatever their camera produced. Uploading a 6 MB photo
//! wastes bandwidth and storage, but refusing or failing the upload because
//! a compressor choked on it is worse. This crate shrinks large images and
//! guarantees that the caller always gets a usable file back.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ImageFile
//!  │
//!  ├─ 1. Gate      ≤ 100 KiB → returned untouched (compressor not called)
//!  ├─ 2. Compress  Compressor::compress(file, {maxSizeMB: 0.4,
//!  │               maxWidthOrHeight: 1200, initialQuality: 0.8,
//!  │               useWebWorker: true})
//!  └─ 3. Fallback  any error or panic → original file
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgnorm::{normalize, ImageFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let photo = ImageFile::from_path("holiday.jpg").await?;
//!     let upload = normalize(photo).await; // never fails
//!     std::fs::write("upload.jpg", upload.bytes())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Plugging in another compressor
//!
//! The default [`ImageCompressor`] handles JPEG and PNG with the `image`
//! crate. Anything implementing [`Compressor`] can replace it via
//! [`NormalizerConfigBuilder::compressor`]; the fallback policy applies to
//! it just the same.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `imgnorm` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod file;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CompressionOptions, NormalizerConfig, NormalizerConfigBuilder};
pub use error::{CompressionError, NormalizeError};
pub use file::ImageFile;
pub use normalize::{
    normalize, normalize_all, normalize_detailed, normalize_sync, normalize_to_file,
    normalize_with, write_file_atomic,
};
pub use output::{BatchStats, NormalizeOutcome, Normalized};
pub use pipeline::compress::{Compressor, ImageCompressor};
pub use progress::{NoopProgressCallback, NormalizeProgressCallback, ProgressCallback};
pub use stream::{normalize_inputs_stream, normalize_stream, NormalizedStream};

/// Re-exported so custom [`Compressor`] implementations need no direct dependency.
pub use async_trait::async_trait;
