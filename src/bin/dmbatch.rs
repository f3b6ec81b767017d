//! CLI binary for dmbatch.
//!
//! A thin shim over the library crate that maps subcommands and flags to
//! `BatchConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dmbatch::{
    decode_auto, encode_lines, export_entries, inspect, BatchConfig, CodeEntry,
    DecodeProgressCallback, LineStore, PageSelection, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
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

/// Terminal progress callback: renders a live progress bar and per-page log
/// lines using [indicatif]. Pages arrive strictly in order, one at a time.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of pages that produced a warning.
    warnings: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_decode_start` (called once the page count is known).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_decode_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            warnings: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Decoding");
        self.bar.reset_eta();
    }
}

impl DecodeProgressCallback for CliProgressCallback {
    fn on_decode_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Decoding {total_pages} page(s)…"))
        ));
    }

    fn on_page_start(&self, page: usize, _total_pages: usize) {
        self.bar.set_message(format!("page {page}"));
    }

    fn on_page_complete(&self, page: usize, total_pages: usize, payloads: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page,
            total_pages,
            dim(&format!("{payloads} payload(s)")),
        ));
        self.bar.inc(1);
    }

    fn on_page_warning(&self, page: usize, total_pages: usize, warning: &str) {
        self.warnings.fetch_add(1, Ordering::SeqCst);

        // Truncate very long warnings to keep the log tidy.
        let msg = if warning.chars().count() > 80 {
            let head: String = warning.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            warning.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page,
            total_pages,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_decode_complete(&self, total_pages: usize, total_payloads: usize) {
        let warned = self.warnings.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if warned == 0 {
            eprintln!(
                "{} {} payload(s) recovered from {} page(s)",
                green("✔"),
                bold(&total_payloads.to_string()),
                total_pages,
            );
        } else {
            eprintln!(
                "{} {} payload(s) recovered  ({} page(s) with warnings)",
                if total_payloads == 0 { red("✘") } else { cyan("⚠") },
                bold(&total_payloads.to_string()),
                red(&warned.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Generate one PNG per line of codes.txt into ./out/
  dmbatch generate codes.txt --out-dir out/

  # Generate from stdin, truncating lines to the 31-character limit first
  cat codes.txt | dmbatch generate --truncate --out-dir out/

  # Decode a scanned image
  dmbatch decode scan.png

  # Decode every page of a PDF, appending payloads to codes.txt
  dmbatch decode sheet.pdf --append codes.txt

  # Decode selected pages of an encrypted PDF
  dmbatch decode --pages 2-5 --password hunter2 sheet.pdf

  # Structured JSON output
  dmbatch decode sheet.pdf --json > result.json

  # Truncate a payload file in place of stdout
  dmbatch truncate codes.txt -o codes.txt

  # Inspect PDF metadata without decoding
  dmbatch inspect sheet.pdf

ENVIRONMENT VARIABLES:
  DMBATCH_OUTPUT_DIR       Default export directory for `generate`
  DMBATCH_PASSWORD         Default PDF password for `decode`
  DMBATCH_NO_PROGRESS      Disable the progress bar
  PDFIUM_DYNAMIC_LIB_PATH  Directory containing the PDFium shared library

SETUP:
  Decoding PDF pages needs the PDFium shared library (e.g. from
  bblanchon/pdfium-binaries) next to the binary, on the system library
  path, or pointed to by PDFIUM_DYNAMIC_LIB_PATH. Generation and plain
  image decoding work without it.
"#;

/// Batch-generate and batch-decode DataMatrix barcodes.
#[derive(Parser, Debug)]
#[command(
    name = "dmbatch",
    version,
    about = "Batch-generate and batch-decode DataMatrix barcodes",
    long_about = "Generate one DataMatrix PNG per text line, or recover payloads from \
images and PDF pages. Symbol encoding/decoding is delegated to the datamatrix and \
rxing crates; PDF rasterisation to PDFium.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DMBATCH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and payloads.
    #[arg(short, long, global = true, env = "DMBATCH_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one DataMatrix PNG per non-blank input line.
    Generate {
        /// Text file with one payload per line; reads stdin when omitted.
        input: Option<PathBuf>,

        /// Directory for the datamatrix_<line>.png files.
        #[arg(short, long, env = "DMBATCH_OUTPUT_DIR")]
        out_dir: Option<PathBuf>,

        /// Truncate every line to the 31-character payload limit first.
        #[arg(long)]
        truncate: bool,

        /// Pixel size of one DataMatrix module (1–64).
        #[arg(long, default_value_t = 5,
              value_parser = clap::value_parser!(u32).range(1..=64))]
        module_px: u32,

        /// White quiet-zone width around the symbol, in modules.
        #[arg(long, default_value_t = 2)]
        quiet_zone: u32,

        /// Print the generated entries as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Decode DataMatrix symbols from an image or from the pages of a PDF.
    Decode {
        /// Image (PNG/JPEG/BMP) or PDF file.
        input: PathBuf,

        /// Page selection for PDFs: all, 5, 3-15, or 1,3,5,7.
        #[arg(long, default_value = "all")]
        pages: String,

        /// PDF user password for encrypted documents.
        #[arg(long, env = "DMBATCH_PASSWORD")]
        password: Option<String>,

        /// Skip the contrast/grayscale/upscale enhancement for plain images.
        #[arg(long)]
        no_enhance: bool,

        /// Maximum rendered page dimension in pixels.
        #[arg(long, default_value_t = 2000)]
        max_pixels: u32,

        /// Append recovered payloads to this file instead of stdout.
        #[arg(short, long)]
        append: Option<PathBuf>,

        /// Exit non-zero when no payload is recovered.
        #[arg(long)]
        strict: bool,

        /// Output the full decode result (pages, warnings, stats) as JSON.
        #[arg(long)]
        json: bool,

        /// Disable the progress bar.
        #[arg(long, env = "DMBATCH_NO_PROGRESS")]
        no_progress: bool,
    },

    /// Truncate every line of a payload file to the 31-character limit.
    Truncate {
        /// Text file with one payload per line; reads stdin when omitted.
        input: Option<PathBuf>,

        /// Write the truncated lines here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print PDF metadata without decoding anything.
    Inspect {
        /// PDF file.
        input: PathBuf,

        /// Output metadata as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        match cli.command {
            Command::Decode { no_progress, json, .. } if no_progress || json => "info",
            Command::Decode { .. } => "error",
            _ => "info",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Generate {
            ref input,
            ref out_dir,
            truncate,
            module_px,
            quiet_zone,
            json,
        } => {
            run_generate(
                &cli,
                input.as_deref(),
                out_dir.as_deref(),
                truncate,
                module_px,
                quiet_zone,
                json,
            )
            .await
        }
        Command::Decode {
            ref input,
            ref pages,
            ref password,
            no_enhance,
            max_pixels,
            ref append,
            strict,
            json,
            no_progress,
        } => {
            run_decode(
                &cli,
                input,
                pages,
                password.as_deref(),
                no_enhance,
                max_pixels,
                append.as_deref(),
                strict,
                json,
                no_progress,
            )
            .await
        }
        Command::Truncate {
            ref input,
            ref output,
        } => run_truncate(input.as_deref(), output.as_deref()).await,
        Command::Inspect { ref input, json } => run_inspect(input, json).await,
    }
}

// ── Subcommand handlers ──────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
async fn run_generate(
    cli: &Cli,
    input: Option<&Path>,
    out_dir: Option<&Path>,
    truncate: bool,
    module_px: u32,
    quiet_zone: u32,
    json: bool,
) -> Result<()> {
    let text = read_text_input(input).await?;
    let mut store = LineStore::from_text(&text);

    if truncate {
        let changed = store.truncate_all();
        if changed > 0 && !cli.quiet {
            eprintln!(
                "{} Truncated {} line(s) to {} characters",
                cyan("⚠"),
                changed,
                dmbatch::PAYLOAD_LIMIT
            );
        }
    }

    let config = BatchConfig::builder()
        .module_px(module_px)
        .quiet_zone(quiet_zone)
        .build()
        .context("Invalid configuration")?;

    let entries = encode_lines(&store, &config).context("Generation failed")?;

    if json {
        let summary: Vec<serde_json::Value> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "line_number": e.line_number,
                    "text": e.text,
                    "file_name": e.file_name(),
                    "width": e.image.width(),
                    "height": e.image.height(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    match out_dir {
        Some(dir) => {
            let written = export_entries(&entries, dir).await.context("Export failed")?;
            if !cli.quiet {
                eprintln!(
                    "{} {} file(s) written to {}",
                    green("✔"),
                    bold(&written.len().to_string()),
                    bold(&dir.display().to_string()),
                );
            }
        }
        None => {
            // No directory chosen: report and no-op, matching the original
            // tool's behaviour when the save dialog was cancelled.
            if !cli.quiet && !json {
                eprintln!(
                    "{} {} code(s) generated  {}",
                    green("✔"),
                    bold(&entries.len().to_string()),
                    dim("(pass --out-dir to write PNG files)"),
                );
            }
        }
    }

    print_gallery_hint(cli, &entries);
    Ok(())
}

/// One line per entry so shell pipelines can pair numbers with payloads.
fn print_gallery_hint(cli: &Cli, entries: &[CodeEntry]) {
    if cli.quiet {
        return;
    }
    for entry in entries {
        eprintln!(
            "   {}  {}",
            dim(&format!("line {:>4}", entry.line_number)),
            entry.text
        );
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_decode(
    cli: &Cli,
    input: &Path,
    pages: &str,
    password: Option<&str>,
    no_enhance: bool,
    max_pixels: u32,
    append: Option<&Path>,
    strict: bool,
    json: bool,
    no_progress: bool,
) -> Result<()> {
    let selection = parse_pages(pages)?;
    let show_progress = !cli.quiet && !no_progress && !json && is_pdf_path(input);

    let mut builder = BatchConfig::builder()
        .pages(selection)
        .enhance(!no_enhance)
        .max_rendered_pixels(max_pixels);

    if let Some(pwd) = password {
        builder = builder.password(pwd);
    }
    if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        builder = builder.progress_callback(cb as ProgressCallback);
    }

    let config = builder.build().context("Invalid configuration")?;

    let output = decode_auto(input, &config).await.context("Decode failed")?;
    let output = if strict {
        output.require_payloads().context("Decode recovered nothing")?
    } else {
        output
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    // Per-page warnings (the progress callback already showed them live;
    // repeat on stderr only when the bar was off).
    if !show_progress && !cli.quiet {
        for warning in output.warnings() {
            eprintln!("{} {}", cyan("⚠"), warning);
        }
    }

    match append {
        Some(path) => {
            let mut text = output.payloads.join("\n");
            if !text.is_empty() {
                text.push('\n');
            }
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            tokio::io::AsyncWriteExt::write_all(&mut file, text.as_bytes())
                .await
                .with_context(|| format!("Failed to append to {}", path.display()))?;
            if !cli.quiet {
                eprintln!(
                    "{} {} payload(s) appended to {}",
                    green("✔"),
                    bold(&output.payloads.len().to_string()),
                    bold(&path.display().to_string()),
                );
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for payload in &output.payloads {
                writeln!(handle, "{payload}").context("Failed to write to stdout")?;
            }
        }
    }

    if !cli.quiet && !show_progress {
        eprintln!(
            "Recovered {} payload(s) from {}/{} page(s) in {}ms",
            output.stats.total_payloads,
            output.stats.decoded_pages,
            output.stats.selected_pages,
            output.stats.total_duration_ms,
        );
    }

    Ok(())
}

async fn run_truncate(input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let text = read_text_input(input).await?;
    let mut store = LineStore::from_text(&text);
    let changed = store.truncate_all();

    let mut result = store.lines().join("\n");
    if !result.is_empty() {
        result.push('\n');
    }

    match output {
        Some(path) => {
            tokio::fs::write(path, &result)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            io::stdout()
                .write_all(result.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }

    eprintln!("{changed} line(s) truncated");
    Ok(())
}

async fn run_inspect(input: &Path, json: bool) -> Result<()> {
    let meta = inspect(input).await.context("Failed to inspect PDF")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
        );
    } else {
        println!("File:         {}", input.display());
        if let Some(ref t) = meta.title {
            println!("Title:        {}", t);
        }
        if let Some(ref a) = meta.author {
            println!("Author:       {}", a);
        }
        if let Some(ref s) = meta.subject {
            println!("Subject:      {}", s);
        }
        println!("Pages:        {}", meta.page_count);
        println!("PDF Version:  {}", meta.pdf_version);
        println!("Encrypted:    {}", meta.is_encrypted);
        if let Some(ref p) = meta.producer {
            println!("Producer:     {}", p);
        }
        if let Some(ref c) = meta.creator {
            println!("Creator:      {}", c);
        }
    }
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Read the payload text from a file or, when no path is given, from stdin.
async fn read_text_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Cheap extension check used only to decide whether a progress bar makes
/// sense; the library re-checks the magic bytes regardless.
fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .context(format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        for &p in &pages {
            if p < 1 {
                anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
            }
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}
