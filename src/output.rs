//! Result types describing what the normalizer did.
//!
//! The file itself is the contract; these types only report which path was
//! taken so callers and the CLI can log or display it.

use crate::error::CompressionError;
use crate::file::ImageFile;
use serde::{Deserialize, Serialize};

/// Which path a file took through the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NormalizeOutcome {
    /// At or below the threshold; returned untouched, compressor not called.
    Passthrough,
    /// The compressor succeeded and its output was returned.
    Compressed {
        original_bytes: u64,
        compressed_bytes: u64,
    },
    /// The compressor failed; the original file was returned.
    Fallback { error: CompressionError },
}

impl NormalizeOutcome {
    /// Short lowercase label for logs and tables.
    pub fn label(&self) -> &'static str {
        match self {
            NormalizeOutcome::Passthrough => "passthrough",
            NormalizeOutcome::Compressed { .. } => "compressed",
            NormalizeOutcome::Fallback { .. } => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, NormalizeOutcome::Fallback { .. })
    }
}

/// A normalized file plus the record of how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct Normalized {
    /// 0-based position in the batch input (0 for single-file calls).
    pub index: usize,
    /// The file to upload.
    pub file: ImageFile,
    /// Byte length of the input file.
    pub original_bytes: u64,
    pub outcome: NormalizeOutcome,
    /// Wall-clock time spent in the normalizer.
    pub duration_ms: u64,
}

impl Normalized {
    /// Take the output file, dropping the report.
    pub fn into_file(self) -> ImageFile {
        self.file
    }

    /// Bytes saved relative to the input (0 when nothing shrank).
    pub fn saved_bytes(&self) -> u64 {
        self.original_bytes.saturating_sub(self.file.len())
    }
}

/// Aggregate figures for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_files: usize,
    pub passthrough: usize,
    pub compressed: usize,
    pub fallback: usize,
    /// Sum of input sizes.
    pub bytes_in: u64,
    /// Sum of output sizes.
    pub bytes_out: u64,
    pub total_duration_ms: u64,
}

impl BatchStats {
    /// Tally a set of results. `total_duration_ms` is left for the caller.
    pub fn from_results(results: &[Normalized]) -> Self {
        let mut stats = BatchStats::default();
        for r in results {
            stats.record(r);
        }
        stats
    }

    pub fn record(&mut self, result: &Normalized) {
        self.total_files += 1;
        self.bytes_in += result.original_bytes;
        self.bytes_out += result.file.len();
        match result.outcome {
            NormalizeOutcome::Passthrough => self.passthrough += 1,
            NormalizeOutcome::Compressed { .. } => self.compressed += 1,
            NormalizeOutcome::Fallback { .. } => self.fallback += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: NormalizeOutcome, before: usize, after: usize) -> Normalized {
        Normalized {
            index: 0,
            file: ImageFile::new("x.jpg", "image/jpeg", vec![0; after]),
            original_bytes: before as u64,
            outcome,
            duration_ms: 1,
        }
    }

    #[test]
    fn stats_tally_each_outcome() {
        let results = vec![
            result(NormalizeOutcome::Passthrough, 10, 10),
            result(
                NormalizeOutcome::Compressed {
                    original_bytes: 500,
                    compressed_bytes: 300,
                },
                500,
                300,
            ),
            result(
                NormalizeOutcome::Fallback {
                    error: CompressionError::other("boom"),
                },
                400,
                400,
            ),
        ];
        let stats = BatchStats::from_results(&results);
        assert_eq!(stats.total_files, 3);
        assert_eq!(
            (stats.passthrough, stats.compressed, stats.fallback),
            (1, 1, 1)
        );
        assert_eq!(stats.bytes_in, 910);
        assert_eq!(stats.bytes_out, 710);
    }

    #[test]
    fn saved_bytes_saturates() {
        let r = result(NormalizeOutcome::Passthrough, 10, 12);
        assert_eq!(r.saved_bytes(), 0);
    }

    #[test]
    fn outcome_serialises_with_tag() {
        let json = serde_json::to_value(NormalizeOutcome::Fallback {
            error: CompressionError::other("boom"),
        })
        .unwrap();
        assert_eq!(json["outcome"], "fallback");
        assert_eq!(json["error"]["kind"], "other");
        assert_eq!(json["error"]["detail"], "boom");
    }
}
