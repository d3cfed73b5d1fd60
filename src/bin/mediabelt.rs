//! CLI binary for mediabelt.
//!
//! A thin shim over the library crate that maps subcommands to
//! [`Operation`]s, CLI flags to `BatchConfig`, and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mediabelt::{
    run, BatchConfig, BatchProgressCallback, DigestPair, Operation, OperationOutcome, PageLayout,
    PaperSize, ProgressCallback,
};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Terminal progress callback: a live bar plus one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Verb shown as the bar prefix ("Converting", "Merging", …).
    verb: &'static str,
    /// Start time of the file currently being processed.
    file_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Spinner-only until `on_batch_start` reports the batch size.
    fn new(verb: &'static str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading folder…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            verb,
            file_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(self.verb);
        self.bar.reset_eta();
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.activate_bar(total);
    }

    fn on_file_start(&self, _index: usize, _total: usize, path: &Path) {
        if let Ok(mut started) = self.file_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(file_name(path));
    }

    fn on_file_complete(&self, index: usize, total: usize, path: &Path) {
        let elapsed_ms = self
            .file_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            file_name(path),
            dim(&format!("{:.2}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, _output: Option<&Path>) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} file(s) processed",
            green("✔"),
            bold(&total.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Compare two downloads
  mediabelt hash-compare image.iso image-copy.iso

  # Convert every .webp in a folder to .jpg beside it
  mediabelt webp-to-jpg ~/Downloads/comic

  # One PDF page per image, pages sized to the images
  mediabelt images-to-doc scans/ scans.pdf

  # Same, but every page A4 with the image centred
  mediabelt images-to-doc --fit a4 scans/ scans.pdf

  # Concatenate every PDF in a folder
  mediabelt merge-docs chapters/ book.pdf

  # Stack images vertically into one PNG
  mediabelt merge-images --ext png strips/ strip.png

  # Pull embedded images out of a PDF
  mediabelt extract-images book.pdf images/

LEGACY FLAGS:
  -hash, -w, -p, -m, -mi and -extractImages are accepted in place of the
  subcommand names, e.g. `mediabelt -p scans/ scans.pdf`.

OUTPUT:
  Files are matched by extension (case-insensitive) and processed in name
  order. Outputs are written to a temporary file next to the destination
  and renamed into place, so a failed run never leaves a partial file.
"#;

/// Batch media assembly: hashes, conversions, PDFs and stitched images.
#[derive(Parser, Debug)]
#[command(
    name = "mediabelt",
    version,
    about = "Batch media assembly: hashes, conversions, PDFs and stitched images",
    arg_required_else_help = true,
    disable_help_subcommand = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// JPEG quality (1–100) for every JPEG written.
    #[arg(long, global = true, env = "MEDIABELT_QUALITY", default_value_t = mediabelt::config::DEFAULT_JPEG_QUALITY,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Print the operation report as JSON on stdout.
    #[arg(long, global = true, env = "MEDIABELT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "MEDIABELT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "MEDIABELT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, global = true, env = "MEDIABELT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare the SHA-256 hash of two files.
    HashCompare { file1: PathBuf, file2: PathBuf },

    /// Convert every WEBP image in a folder into JPG.
    WebpToJpg { folder: PathBuf },

    /// Put every image in a folder on its own page of a single PDF.
    ImagesToDoc {
        folder: PathBuf,
        /// Output file name (default: output.pdf).
        out_name: Option<String>,
        /// Fixed page size: a4, letter or <width>x<height> in points.
        #[arg(long)]
        fit: Option<PaperSize>,
        /// Image extension to collect.
        #[arg(long, default_value = "jpg")]
        ext: String,
    },

    /// Merge every PDF in a folder into a single PDF.
    MergeDocs {
        folder: PathBuf,
        /// Output file name (default: output.pdf).
        out_name: Option<String>,
    },

    /// Stack every image in a folder vertically into a single image.
    MergeImages {
        folder: PathBuf,
        /// Output file name (default: output.jpg); .jpg, .jpeg or .png.
        out_name: Option<String>,
        /// Image extension to collect.
        #[arg(long, default_value = "jpg")]
        ext: String,
    },

    /// Write the images embedded in a PDF to files.
    ExtractImages {
        pdf: PathBuf,
        /// Destination folder (default: the PDF's folder).
        out_dir: Option<PathBuf>,
    },

    /// Print usage.
    Help,
}

impl Command {
    fn into_operation(self) -> Operation {
        match self {
            Command::HashCompare { file1, file2 } => Operation::HashCompare {
                first: file1,
                second: file2,
            },
            Command::WebpToJpg { folder } => Operation::WebpToJpg { folder },
            Command::ImagesToDoc {
                folder,
                out_name,
                ext,
                ..
            } => Operation::ImagesToPdf {
                folder,
                output: out_name.unwrap_or_default(),
                extension: ext,
            },
            Command::MergeDocs { folder, out_name } => Operation::MergePdfs {
                folder,
                output: out_name.unwrap_or_default(),
            },
            Command::MergeImages {
                folder,
                out_name,
                ext,
            } => Operation::MergeImages {
                folder,
                output: out_name.unwrap_or_default(),
                extension: ext,
            },
            Command::ExtractImages { pdf, out_dir } => Operation::ExtractImages {
                pdf,
                output_dir: out_dir,
            },
            Command::Help => Operation::Help,
        }
    }
}

/// Replace a legacy flag in the operation position (`-p`, `-mi`, …) with its
/// subcommand name. `-h`/`--help` are left for clap.
fn rewrite_legacy_flags(mut argv: Vec<OsString>) -> Vec<OsString> {
    if let Some(first) = argv.get_mut(1) {
        if let Some(arg) = first.to_str() {
            if arg.starts_with('-') && arg != "-h" && arg != "--help" {
                if let Some(name) = Operation::canonical_name(arg) {
                    *first = OsString::from(name);
                }
            }
        }
    }
    argv
}

fn main() -> Result<()> {
    let cli = Cli::parse_from(rewrite_legacy_flags(std::env::args_os().collect()));
    let opts = &cli.global;

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !opts.quiet && !opts.no_progress && !opts.json;
    let filter = if opts.verbose {
        "debug"
    } else if opts.quiet || show_progress {
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
    let fit = match &cli.command {
        Command::ImagesToDoc { fit, .. } => *fit,
        _ => None,
    };
    let op = cli.command.into_operation();

    let verb = match &op {
        Operation::WebpToJpg { .. } => Some("Converting"),
        Operation::ImagesToPdf { .. } => Some("Assembling"),
        Operation::MergePdfs { .. } => Some("Merging"),
        Operation::MergeImages { .. } => Some("Stitching"),
        Operation::ExtractImages { .. } => Some("Extracting"),
        Operation::HashCompare { .. } | Operation::Help => None,
    };
    let cli_progress = verb.filter(|_| show_progress).map(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn BatchProgressCallback>);

    let config = build_config(opts, fit, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let outcome = run(&op, &config);
    // Empty batches and failures never reach on_batch_complete.
    if let Some(cb) = &cli_progress {
        cb.bar.finish_and_clear();
    }
    let outcome = outcome.with_context(|| format!("{} failed", op.name()))?;

    if opts.json {
        let json = serde_json::to_string_pretty(&outcome).context("Failed to serialise report")?;
        println!("{json}");
        return Ok(());
    }
    print_outcome(&outcome, opts.quiet);
    Ok(())
}

/// Map CLI args to `BatchConfig`.
fn build_config(
    opts: &GlobalOpts,
    fit: Option<PaperSize>,
    progress: Option<ProgressCallback>,
) -> Result<BatchConfig> {
    let layout = fit.map(PageLayout::Fit).unwrap_or_default();
    let mut builder = BatchConfig::builder()
        .page_layout(layout)
        .jpeg_quality(opts.quality);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

fn print_hash(pair: &DigestPair) {
    println!(
        "FILE 1: {}  Hash: {}",
        pair.first.path.display(),
        pair.first.hex
    );
    println!(
        "FILE 2: {}  Hash: {}",
        pair.second.path.display(),
        pair.second.hex
    );
    if pair.equal {
        println!("Hash Result: Hash Correct");
    } else {
        println!("Hash Result: File has been modified");
    }
}

fn print_written(label: &str, output: Option<&Path>, detail: String, quiet: bool) {
    let Some(path) = output else {
        if !quiet {
            eprintln!("{} {}", cyan("⚠"), dim("no matching files, nothing written"));
        }
        return;
    };
    println!("{}", path.display());
    if !quiet {
        eprintln!("{} {}  {}", green("✔"), bold(label), dim(&detail));
    }
}

fn print_outcome(outcome: &OperationOutcome, quiet: bool) {
    match outcome {
        OperationOutcome::Hash(pair) => print_hash(pair),
        OperationOutcome::Converted(report) => {
            for path in &report.written {
                println!("{}", path.display());
            }
            if !quiet {
                eprintln!(
                    "{} {} image(s) converted",
                    green("✔"),
                    bold(&report.written.len().to_string())
                );
            }
        }
        OperationOutcome::Assembled(report) | OperationOutcome::Merged(report) => print_written(
            "document written",
            report.output.as_deref(),
            format!("{} page(s)", report.pages),
            quiet,
        ),
        OperationOutcome::Stitched(report) => print_written(
            "image written",
            report.output.as_deref(),
            format!(
                "{} image(s), {}x{} px",
                report.images, report.width, report.height
            ),
            quiet,
        ),
        OperationOutcome::Extracted(report) => {
            for path in &report.written {
                println!("{}", path.display());
            }
            if !quiet {
                let skipped = if report.skipped > 0 {
                    red(&format!("{} skipped", report.skipped))
                } else {
                    dim("0 skipped")
                };
                eprintln!(
                    "{} {} image(s) extracted  {}",
                    green("✔"),
                    bold(&report.written.len().to_string()),
                    skipped
                );
            }
        }
        OperationOutcome::Help(usage) => print!("{usage}"),
    }
}
