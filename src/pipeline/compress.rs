//! The compression collaborator: the [`Compressor`] capability and its
//! default [`ImageCompressor`] implementation.
//!
//! The normalizer treats compression as a black box: hand over a file and a
//! [`CompressionOptions`] record, get back a new file or a
//! [`CompressionError`]. Modelling it as a trait lets callers plug in a
//! remote service or a test stub without touching the normalizer.
//!
//! ## How `ImageCompressor` chases the size target
//!
//! ```text
//! decode ─▶ fit longest edge ─▶ encode @ q
//!                                  │ > maxSizeMB?
//!                                  ▼
//!                      q *= 0.95, edges *= 0.95, re-encode   (≤ max_iterations)
//! ```
//!
//! The smallest candidate wins. If even that is not smaller than the input
//! the compressor reports [`CompressionError::NoReduction`] and the
//! normalizer keeps the original.

use crate::config::CompressionOptions;
use crate::error::CompressionError;
use crate::file::ImageFile;
use crate::pipeline::{encode, resize};
use async_trait::async_trait;
use image::ImageFormat;
use tracing::debug;

/// An asynchronous, fallible compression routine.
///
/// Implementations must be `Send + Sync`: batch normalization shares one
/// compressor across concurrently running files.
#[async_trait]
pub trait Compressor: Send + Sync {
    /// Produce a compressed copy of `file` honouring `options`.
    async fn compress(
        &self,
        file: &ImageFile,
        options: &CompressionOptions,
    ) -> Result<ImageFile, CompressionError>;
}

/// Default compressor backed by the `image` crate. Handles JPEG and PNG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageCompressor {
    /// Encode attempts before settling for the smallest candidate. Default: 10.
    pub max_iterations: u32,
    /// Per-attempt multiplier applied to quality and both edges. Default: 0.95.
    pub shrink_factor: f32,
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            shrink_factor: 0.95,
        }
    }
}

#[async_trait]
impl Compressor for ImageCompressor {
    async fn compress(
        &self,
        file: &ImageFile,
        options: &CompressionOptions,
    ) -> Result<ImageFile, CompressionError> {
        if !options.use_web_worker {
            return self.compress_blocking(file, options);
        }

        // Decoding and encoding are CPU-bound; keep them off the async workers.
        let this = *self;
        let file = file.clone();
        let options = *options;
        on_blocking_pool(move || this.compress_blocking(&file, &options)).await
    }
}

/// Run `job` on tokio's blocking pool. A panicking or cancelled job becomes
/// [`CompressionError::WorkerFailed`].
async fn on_blocking_pool<F>(job: F) -> Result<ImageFile, CompressionError>
where
    F: FnOnce() -> Result<ImageFile, CompressionError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| CompressionError::WorkerFailed {
            detail: e.to_string(),
        })?
}

impl ImageCompressor {
    /// Synchronous implementation of [`Compressor::compress`].
    pub fn compress_blocking(
        &self,
        file: &ImageFile,
        options: &CompressionOptions,
    ) -> Result<ImageFile, CompressionError> {
        let format = match file.format() {
            Some(f @ (ImageFormat::Jpeg | ImageFormat::Png)) => f,
            _ => {
                return Err(CompressionError::UnsupportedFormat {
                    mime_type: file.mime_type().to_string(),
                })
            }
        };

        let decoded = image::load_from_memory_with_format(file.bytes(), format).map_err(|e| {
            CompressionError::Decode {
                detail: e.to_string(),
            }
        })?;

        let max_bytes = options.max_size_bytes();
        let max_edge = options.max_width_or_height;
        if file.len() <= max_bytes && decoded.width() <= max_edge && decoded.height() <= max_edge {
            debug!("{}: already within limits", file.name());
            return Ok(file.clone());
        }

        let mut canvas = resize::fit_within(decoded, max_edge);
        let mut quality = options.initial_quality;
        let mut best = encode::encode_image(&canvas, format, quality)?;
        let mut attempts = 1;

        while best.len() as u64 > max_bytes && attempts < self.max_iterations {
            quality *= self.shrink_factor;
            canvas = resize::shrink(&canvas, self.shrink_factor);
            let candidate = encode::encode_image(&canvas, format, quality)?;
            if candidate.len() < best.len() {
                best = candidate;
            }
            attempts += 1;
        }

        debug!(
            "{}: {} → {} bytes after {} attempt(s)",
            file.name(),
            file.len(),
            best.len(),
            attempts
        );

        if best.len() as u64 >= file.len() {
            return Err(CompressionError::NoReduction {
                original: file.len(),
                best: best.len() as u64,
            });
        }

        Ok(ImageFile::new(file.name(), file.mime_type(), best))
    }
}
