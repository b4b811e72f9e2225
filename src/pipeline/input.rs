//! Input resolution: turn a user-supplied path or URL into an [`ImageFile`].
//!
//! Inputs are not validated as images here. A file that turns out not to be
//! a supported image still resolves; the normalizer's fallback then hands it
//! back unchanged, which is exactly what an upload pipeline wants.

use crate::error::NormalizeError;
use crate::file::{sniff_mime_type, ImageFile, OCTET_STREAM};
use std::path::Path;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to an in-memory [`ImageFile`].
///
/// If the input is a URL, download it. Otherwise read it as a local path.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ImageFile, NormalizeError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

/// Read a local file, tagging it by magic bytes then extension.
pub async fn read_local(path: &Path) -> Result<ImageFile, NormalizeError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => NormalizeError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => NormalizeError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => NormalizeError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    debug!("Read local file: {} ({} bytes)", path.display(), bytes.len());
    Ok(ImageFile::from_bytes(name, bytes))
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ImageFile, NormalizeError> {
    info!("Downloading image from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| NormalizeError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            NormalizeError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            NormalizeError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(NormalizeError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = filename_from_url(url);
    let header_mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(essence);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                NormalizeError::DownloadTimeout {
                    url: url.to_string(),
                    secs: timeout_secs,
                }
            } else {
                NormalizeError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?
        .to_vec();

    let sniffed = sniff_mime_type(&bytes, Some(&filename));
    let mime_type = match (sniffed, header_mime) {
        (OCTET_STREAM, Some(header)) => header,
        (sniffed, _) => sniffed.to_string(),
    };

    info!("Downloaded {} ({} bytes, {})", filename, bytes.len(), mime_type);
    Ok(ImageFile::new(filename, mime_type, bytes))
}

/// Strip parameters from a `Content-Type` value: `image/png; q=1` → `image/png`.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

/// Last non-empty URL path segment, or `downloaded`.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded".to_string()
}
