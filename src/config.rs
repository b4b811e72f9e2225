//! Configuration types for image normalization.
//!
//! All normalizer behaviour is controlled through [`NormalizerConfig`],
//! built via its [`NormalizerConfigBuilder`]. The defaults are the upload
//! policy: files up to 100 KiB pass through untouched, larger ones are
//! compressed towards 0.4 MB and 1200 px at an initial quality of 0.8.
//! Those numbers are policy constants; change them through the builder,
//! not by editing the defaults.

use crate::error::NormalizeError;
use crate::pipeline::compress::Compressor;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Files at or below this many bytes are never compressed.
pub const DEFAULT_PASSTHROUGH_THRESHOLD: u64 = 100 * 1024;

/// Target ceiling handed to the compressor, in megabytes.
pub const DEFAULT_MAX_SIZE_MB: f64 = 0.4;

/// Longest edge, in pixels, handed to the compressor.
pub const DEFAULT_MAX_WIDTH_OR_HEIGHT: u32 = 1200;

/// Starting quality on the 0–1 scale.
pub const DEFAULT_INITIAL_QUALITY: f32 = 0.8;

/// The option record passed to a [`Compressor`].
///
/// Serialises with the field names compression routines conventionally
/// accept: `maxSizeMB`, `maxWidthOrHeight`, `useWebWorker`, `initialQuality`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionOptions {
    /// Upper bound on the output size, in MB (1 MB = 1024 × 1024 bytes).
    #[serde(rename = "maxSizeMB")]
    pub max_size_mb: f64,

    /// Upper bound on the longest edge of the output, in pixels.
    #[serde(rename = "maxWidthOrHeight")]
    pub max_width_or_height: u32,

    /// Permit running off the async executor (on the blocking pool).
    #[serde(rename = "useWebWorker")]
    pub use_web_worker: bool,

    /// Quality of the first encode attempt, 0–1.
    #[serde(rename = "initialQuality")]
    pub initial_quality: f32,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            max_width_or_height: DEFAULT_MAX_WIDTH_OR_HEIGHT,
            use_web_worker: true,
            initial_quality: DEFAULT_INITIAL_QUALITY,
        }
    }
}

impl CompressionOptions {
    /// `max_size_mb` expressed in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        (self.max_size_mb * 1024.0 * 1024.0) as u64
    }
}

/// Configuration for normalizing one or more files.
///
/// Built via [`NormalizerConfig::builder()`] or using
/// [`NormalizerConfig::default()`].
///
/// # Example
/// ```rust
/// use imgnorm::NormalizerConfig;
///
/// let config = NormalizerConfig::builder()
///     .passthrough_threshold(64 * 1024)
///     .max_width_or_height(800)
///     .build()
///     .unwrap();
/// assert_eq!(config.options.max_width_or_height, 800);
/// ```
#[derive(Clone)]
pub struct NormalizerConfig {
    /// Inputs of at most this many bytes are returned unchanged. Default: 102 400.
    pub passthrough_threshold: u64,

    /// Options handed to the compressor for larger inputs.
    pub options: CompressionOptions,

    /// Compression collaborator. If None, uses
    /// [`crate::pipeline::compress::ImageCompressor`] with its defaults.
    pub compressor: Option<Arc<dyn Compressor>>,

    /// Files normalized at once by the batch APIs. Default: 4.
    pub concurrency: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress callback for batch operations.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            passthrough_threshold: DEFAULT_PASSTHROUGH_THRESHOLD,
            options: CompressionOptions::default(),
            compressor: None,
            concurrency: 4,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for NormalizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizerConfig")
            .field("passthrough_threshold", &self.passthrough_threshold)
            .field("options", &self.options)
            .field(
                "compressor",
                &self.compressor.as_ref().map(|_| "<dyn Compressor>"),
            )
            .field("concurrency", &self.concurrency)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn Callback>"),
            )
            .finish()
    }
}

impl NormalizerConfig {
    /// Create a new builder for `NormalizerConfig`.
    pub fn builder() -> NormalizerConfigBuilder {
        NormalizerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`NormalizerConfig`].
#[derive(Debug)]
pub struct NormalizerConfigBuilder {
    config: NormalizerConfig,
}

impl NormalizerConfigBuilder {
    pub fn passthrough_threshold(mut self, bytes: u64) -> Self {
        self.config.passthrough_threshold = bytes;
        self
    }

    pub fn max_size_mb(mut self, mb: f64) -> Self {
        self.config.options.max_size_mb = mb;
        self
    }

    pub fn max_width_or_height(mut self, px: u32) -> Self {
        self.config.options.max_width_or_height = px;
        self
    }

    pub fn use_web_worker(mut self, v: bool) -> Self {
        self.config.options.use_web_worker = v;
        self
    }

    pub fn initial_quality(mut self, q: f32) -> Self {
        self.config.options.initial_quality = q;
        self
    }

    pub fn options(mut self, options: CompressionOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn compressor(mut self, compressor: Arc<dyn Compressor>) -> Self {
        self.config.compressor = Some(compressor);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Attach a progress callback for batch events.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<NormalizerConfig, NormalizeError> {
        let o = &self.config.options;
        if !o.max_size_mb.is_finite() || o.max_size_mb <= 0.0 {
            return Err(NormalizeError::InvalidConfig(format!(
                "maxSizeMB must be a positive number, got {}",
                o.max_size_mb
            )));
        }
        if o.max_width_or_height == 0 {
            return Err(NormalizeError::InvalidConfig(
                "maxWidthOrHeight must be ≥ 1".into(),
            ));
        }
        if !(o.initial_quality > 0.0 && o.initial_quality <= 1.0) {
            return Err(NormalizeError::InvalidConfig(format!(
                "initialQuality must be in (0, 1], got {}",
                o.initial_quality
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upload_policy() {
        let c = NormalizerConfig::default();
        assert_eq!(c.passthrough_threshold, 102_400);
        assert_eq!(c.options.max_size_mb, 0.4);
        assert_eq!(c.options.max_width_or_height, 1200);
        assert!(c.options.use_web_worker);
        assert_eq!(c.options.initial_quality, 0.8);
        assert!(c.compressor.is_none());
    }

    #[test]
    fn options_serialise_with_collaborator_field_names() {
        let json = serde_json::to_value(CompressionOptions::default()).unwrap();
        assert_eq!(json["maxSizeMB"], 0.4);
        assert_eq!(json["maxWidthOrHeight"], 1200);
        assert_eq!(json["useWebWorker"], true);
        assert!((json["initialQuality"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn max_size_bytes_uses_binary_megabytes() {
        assert_eq!(CompressionOptions::default().max_size_bytes(), 419_430);
    }

    #[test]
    fn builder_rejects_non_positive_size() {
        assert!(NormalizerConfig::builder().max_size_mb(0.0).build().is_err());
        assert!(NormalizerConfig::builder()
            .max_size_mb(f64::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn builder_rejects_bad_quality_and_dimension() {
        assert!(NormalizerConfig::builder()
            .initial_quality(1.5)
            .build()
            .is_err());
        assert!(NormalizerConfig::builder()
            .initial_quality(0.0)
            .build()
            .is_err());
        assert!(NormalizerConfig::builder()
            .max_width_or_height(0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_clamps_concurrency() {
        let c = NormalizerConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, 1);
    }
}
