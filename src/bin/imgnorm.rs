//! CLI binary for imgnorm.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `NormalizerConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use imgnorm::pipeline::input::resolve_input;
use imgnorm::{
    normalize_all, write_file_atomic, BatchStats, NormalizeOutcome, NormalizeProgressCallback,
    Normalized, NormalizerConfig, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar with one log line per finished file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Normalizing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl NormalizeProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.reset_eta();
    }

    fn on_file_start(&self, _index: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_file_complete(&self, result: &Normalized) {
        self.bar.println(format_line(result));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _stats: &BatchStats) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Report what would happen (nothing written)
  imgnorm photo.jpg

  # Normalize one file
  imgnorm photo.jpg -o upload.jpg

  # Normalize many files into a directory
  imgnorm shots/*.jpg -o upload/

  # Fetch from a URL, tighter limits
  imgnorm https://example.com/cat.png --max-size-mb 0.2 --max-dimension 800 -o cat.png

  # Machine-readable report
  imgnorm --json shots/*.png

POLICY (defaults):
  Files ≤ 100 KiB are passed through untouched.
  Larger files are compressed towards 0.4 MB and 1200 px on the longest
  edge, starting at quality 0.8. If compression fails for any reason the
  original file is kept. imgnorm never drops an image.

ENVIRONMENT VARIABLES:
  RUST_LOG                 Override log filter (e.g. imgnorm=debug)
  IMGNORM_*                Every flag has an IMGNORM_<FLAG> override
"#;

/// Shrink large images for upload, never failing on a bad one.
#[derive(Parser, Debug)]
#[command(
    name = "imgnorm",
    version,
    about = "Shrink large images for upload; fall back to the original on any failure",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local image paths or HTTP/HTTPS URLs.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (single input) or directory (several inputs).
    #[arg(short, long, env = "IMGNORM_OUTPUT")]
    output: Option<PathBuf>,

    /// Passthrough threshold in KiB; files at or below it are untouched.
    #[arg(long, env = "IMGNORM_THRESHOLD_KIB", default_value_t = 100)]
    threshold_kib: u64,

    /// Target maximum output size in MB.
    #[arg(long, env = "IMGNORM_MAX_SIZE_MB", default_value_t = 0.4)]
    max_size_mb: f64,

    /// Maximum width or height in pixels.
    #[arg(long, env = "IMGNORM_MAX_DIMENSION", default_value_t = 1200)]
    max_dimension: u32,

    /// Initial quality (0.0–1.0).
    #[arg(long, env = "IMGNORM_QUALITY", default_value_t = 0.8)]
    quality: f32,

    /// Compress on the calling task instead of the blocking thread pool.
    #[arg(long, env = "IMGNORM_NO_WORKER")]
    no_worker: bool,

    /// Number of files normalized at once.
    #[arg(short, long, env = "IMGNORM_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Output a JSON report instead of text.
    #[arg(long, env = "IMGNORM_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "IMGNORM_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMGNORM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMGNORM_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "IMGNORM_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(Serialize)]
struct Report<'a> {
    files: &'a [Normalized],
    stats: &'a BatchStats,
    written: &'a [PathBuf],
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar already reports each file; keep INFO logs out of it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn NormalizeProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Resolve inputs ───────────────────────────────────────────────────
    let mut files = Vec::with_capacity(cli.inputs.len());
    for input in &cli.inputs {
        let file = resolve_input(input, config.download_timeout_secs)
            .await
            .with_context(|| format!("Failed to read input '{input}'"))?;
        files.push(file);
    }

    // ── Normalize ────────────────────────────────────────────────────────
    let (results, stats) = normalize_all(files, &config).await;

    // ── Write outputs ────────────────────────────────────────────────────
    let mut written = Vec::new();
    if let Some(ref output) = cli.output {
        let targets = output_paths(output, &results)?;
        for (result, path) in results.iter().zip(targets) {
            write_file_atomic(&path, &result.file)
                .await
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            written.push(path);
        }
    }

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let report = Report {
            files: &results,
            stats: &stats,
            written: &written,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        if !show_progress {
            for result in &results {
                eprintln!("{}", format_line(result));
            }
        }
        eprintln!(
            "{} {} file(s)  {} → {}  {}ms{}",
            green("✔"),
            bold(&stats.total_files.to_string()),
            human_bytes(stats.bytes_in),
            human_bytes(stats.bytes_out),
            stats.total_duration_ms,
            if stats.fallback > 0 {
                format!("  ({} kept original)", yellow(&stats.fallback.to_string()))
            } else {
                String::new()
            },
        );
        if cli.output.is_none() {
            eprintln!("{}", dim("dry run: pass -o to write results"));
        }
    }

    Ok(())
}

/// Map CLI args to `NormalizerConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<NormalizerConfig> {
    let mut builder = NormalizerConfig::builder()
        .passthrough_threshold(cli.threshold_kib.saturating_mul(1024))
        .max_size_mb(cli.max_size_mb)
        .max_width_or_height(cli.max_dimension)
        .initial_quality(cli.quality)
        .use_web_worker(!cli.no_worker)
        .concurrency(cli.concurrency)
        .download_timeout_secs(cli.download_timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// One output path per result: `output` itself for a single input that is
/// not a directory, otherwise `output/<file name>`.
fn output_paths(output: &Path, results: &[Normalized]) -> Result<Vec<PathBuf>> {
    let is_dir = output.is_dir() || output.as_os_str().to_string_lossy().ends_with('/');
    if results.len() == 1 && !is_dir {
        return Ok(vec![output.to_path_buf()]);
    }
    if output.is_file() {
        anyhow::bail!(
            "'{}' is a file; several inputs need an output directory",
            output.display()
        );
    }

    let mut paths: Vec<PathBuf> = Vec::with_capacity(results.len());
    for result in results {
        let path = output.join(result.file.name());
        if paths.contains(&path) {
            anyhow::bail!("Two inputs share the file name '{}'", result.file.name());
        }
        paths.push(path);
    }
    Ok(paths)
}

fn format_line(result: &Normalized) -> String {
    let (mark, detail) = match &result.outcome {
        NormalizeOutcome::Passthrough => (dim("="), dim("passthrough")),
        NormalizeOutcome::Compressed { .. } => (
            green("✓"),
            format!("saved {}", human_bytes(result.saved_bytes())),
        ),
        NormalizeOutcome::Fallback { error } => (yellow("!"), yellow(&format!("kept original: {error}"))),
    };
    format!(
        "  {} {:<32} {:>9} → {:<9} {}  {}",
        mark,
        result.file.name(),
        human_bytes(result.original_bytes),
        human_bytes(result.file.len()),
        detail,
        dim(&format!("{}ms", result.duration_ms)),
    )
}

fn human_bytes(n: u64) -> String {
    const KIB: f64 = 1024.0;
    let n = n as f64;
    if n < KIB {
        format!("{n} B")
    } else if n < KIB * KIB {
        format!("{:.1} KiB", n / KIB)
    } else {
        format!("{:.2} MiB", n / (KIB * KIB))
    }
}
