//! The normalizer: best-effort shrinking of images before upload.
//!
//! ## Contract
//!
//! [`normalize`] always hands back a usable file and never fails. Files at
//! or below the passthrough threshold are returned untouched without calling
//! the compressor. Larger files go through the configured [`Compressor`];
//! if it errors or panics, the error is dropped and the original file comes
//! back unchanged. The upload pipeline must not depend on compression
//! succeeding, so there is deliberately no `Result` in these signatures.
//!
//! The only fallible entry point is [`normalize_to_file`], and only because
//! reading the input and writing the output can fail.

use crate::config::NormalizerConfig;
use crate::error::{CompressionError, NormalizeError};
use crate::file::ImageFile;
use crate::output::{BatchStats, NormalizeOutcome, Normalized};
use crate::pipeline::compress::{Compressor, ImageCompressor};
use crate::pipeline::input;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info, warn};

/// Normalize a file with the default policy and the default compressor.
///
/// # Example
/// ```rust,no_run
/// use imgnorm::{normalize, ImageFile};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let photo = ImageFile::from_path("photo.jpg").await?;
/// let upload = normalize(photo).await;
/// println!("{} bytes, {}", upload.len(), upload.mime_type());
/// # Ok(())
/// # }
/// ```
pub async fn normalize(file: ImageFile) -> ImageFile {
    normalize_with(file, &NormalizerConfig::default()).await
}

/// Normalize a file under `config`.
pub async fn normalize_with(file: ImageFile, config: &NormalizerConfig) -> ImageFile {
    normalize_detailed(file, config).await.into_file()
}

/// Normalize a file and report which path it took.
pub async fn normalize_detailed(file: ImageFile, config: &NormalizerConfig) -> Normalized {
    normalize_indexed(0, file, config).await
}

/// Synchronous wrapper around [`normalize_with`].
///
/// Outside an async context a temporary tokio runtime is created. Inside a
/// multi-thread runtime the current worker is handed over with
/// `block_in_place`. Inside a current-thread runtime blocking is impossible,
/// so the original file is returned, as it is when no runtime can be built.
pub fn normalize_sync(file: ImageFile, config: &NormalizerConfig) -> ImageFile {
    if let Ok(handle) = Handle::try_current() {
        if handle.runtime_flavor() == RuntimeFlavor::MultiThread {
            return tokio::task::block_in_place(|| handle.block_on(normalize_with(file, config)));
        }
        warn!(
            "{}: called from a current-thread runtime, keeping original",
            file.name()
        );
        return file;
    }

    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(normalize_with(file, config)),
        Err(e) => {
            warn!("{}: no runtime for compression, keeping original: {}", file.name(), e);
            file
        }
    }
}

/// Normalize several files, at most `config.concurrency` at a time.
///
/// Results come back in input order together with aggregate stats.
pub async fn normalize_all(
    files: Vec<ImageFile>,
    config: &NormalizerConfig,
) -> (Vec<Normalized>, BatchStats) {
    let start = Instant::now();
    let total = files.len();
    info!("Normalizing {} file(s)", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let results: Vec<Normalized> = stream::iter(
        files
            .into_iter()
            .enumerate()
            .map(|(index, file)| normalize_tracked(index, file, config)),
    )
    .buffered(config.concurrency.max(1))
    .collect()
    .await;

    let mut stats = BatchStats::from_results(&results);
    stats.total_duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Batch complete: {} passthrough, {} compressed, {} fallback; {} → {} bytes in {}ms",
        stats.passthrough,
        stats.compressed,
        stats.fallback,
        stats.bytes_in,
        stats.bytes_out,
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(&stats);
    }

    (results, stats)
}

/// Resolve `input` (path or URL), normalize it and write the result.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
///
/// # Errors
/// Only input resolution and output writing fail; compression never does.
pub async fn normalize_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &NormalizerConfig,
) -> Result<Normalized, NormalizeError> {
    let file = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let result = normalize_detailed(file, config).await;
    write_file_atomic(output_path.as_ref(), &result.file).await?;
    Ok(result)
}

/// Write `file` to `path` via a sibling temp file and a rename.
pub async fn write_file_atomic(path: &Path, file: &ImageFile) -> Result<(), NormalizeError> {
    let write_err = |source| NormalizeError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = temp_sibling(path);
    tokio::fs::write(&tmp_path, file.bytes())
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    debug!("Wrote {} bytes to {}", file.len(), path.display());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// The single-file pipeline: threshold gate, compressor, fallback.
pub(crate) async fn normalize_indexed(
    index: usize,
    file: ImageFile,
    config: &NormalizerConfig,
) -> Normalized {
    let start = Instant::now();
    let original_bytes = file.len();

    if original_bytes <= config.passthrough_threshold {
        debug!(
            "{}: {} bytes ≤ {} threshold, passing through",
            file.name(),
            original_bytes,
            config.passthrough_threshold
        );
        return Normalized {
            index,
            file,
            original_bytes,
            outcome: NormalizeOutcome::Passthrough,
            duration_ms: start.elapsed().as_millis() as u64,
        };
    }

    let compressor = resolve_compressor(config);
    let attempt = AssertUnwindSafe(compressor.compress(&file, &config.options))
        .catch_unwind()
        .await;
    let result = attempt.unwrap_or_else(|panic| {
        Err(CompressionError::Panicked {
            detail: panic_message(panic.as_ref()),
        })
    });

    let (file, outcome) = match result {
        Ok(compressed) => {
            let compressed_bytes = compressed.len();
            if compressed_bytes > original_bytes {
                debug!(
                    "{}: compressor returned a larger file ({} > {})",
                    compressed.name(),
                    compressed_bytes,
                    original_bytes
                );
            }
            (
                compressed,
                NormalizeOutcome::Compressed {
                    original_bytes,
                    compressed_bytes,
                },
            )
        }
        Err(error) => {
            warn!("{}: compression failed, keeping original: {}", file.name(), error);
            (file, NormalizeOutcome::Fallback { error })
        }
    };

    Normalized {
        index,
        file,
        original_bytes,
        outcome,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// [`normalize_indexed`] wrapped in progress-callback events.
pub(crate) async fn normalize_tracked(
    index: usize,
    file: ImageFile,
    config: &NormalizerConfig,
) -> Normalized {
    if let Some(ref cb) = config.progress_callback {
        cb.on_file_start(index, file.name());
    }
    let result = normalize_indexed(index, file, config).await;
    if let Some(ref cb) = config.progress_callback {
        cb.on_file_complete(&result);
    }
    result
}

fn resolve_compressor(config: &NormalizerConfig) -> Arc<dyn Compressor> {
    match config.compressor {
        Some(ref c) => Arc::clone(c),
        None => Arc::new(ImageCompressor::default()),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// `out/photo.jpg` → `out/photo.jpg.tmp`
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
