//! Streaming batch API: emit normalized files as they complete.
//!
//! Unlike [`crate::normalize::normalize_all`], which returns only after
//! every file finishes and preserves input order, [`normalize_stream`]
//! yields each [`Normalized`] as soon as it is ready. Files may arrive out
//! of order; use `Normalized::index` to map them back to their inputs.

use crate::config::NormalizerConfig;
use crate::error::NormalizeError;
use crate::file::ImageFile;
use crate::normalize::normalize_tracked;
use crate::output::Normalized;
use crate::pipeline::input;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of normalized files.
pub type NormalizedStream = Pin<Box<dyn Stream<Item = Normalized> + Send>>;

/// Normalize `files` concurrently, streaming results in completion order.
///
/// Progress callbacks on `config` receive `on_file_start` and
/// `on_file_complete` events; batch start/complete events are left to the
/// consumer, which alone knows when it has drained the stream.
pub fn normalize_stream(files: Vec<ImageFile>, config: &NormalizerConfig) -> NormalizedStream {
    info!("Starting streaming normalization of {} file(s)", files.len());

    // `buffer_unordered(0)` never polls; a hand-built config may carry 0.
    let concurrency = config.concurrency.max(1);
    let config = config.clone();

    let s = stream::iter(files.into_iter().enumerate())
        .map(move |(index, file)| {
            let cfg = config.clone();
            async move { normalize_tracked(index, file, &cfg).await }
        })
        .buffer_unordered(concurrency);

    Box::pin(s)
}

/// Resolve every input (path or URL) first, then stream their normalization.
///
/// # Returns
/// - `Ok(NormalizedStream)` once all inputs were read
/// - `Err(NormalizeError)` for the first input that could not be resolved
pub async fn normalize_inputs_stream<I, S>(
    inputs: I,
    config: &NormalizerConfig,
) -> Result<NormalizedStream, NormalizeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut files = Vec::new();
    for input_str in inputs {
        files.push(input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?);
    }
    Ok(normalize_stream(files, config))
}
