//! CLI binary for qrcards.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `GenerationConfig`, prints the import preview and writes the document.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use qrcards::{
    generate_to_file, import_file, toggle_exclusion, GenerationConfig, GenerationProgressCallback,
    ImportOutput, LayoutPolicy, OutputFormat, ProgressCallback, Row,
};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
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
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar with one tick per finished page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-page wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    /// Create a spinner; `on_generation_start` turns it into a bar once the
    /// page count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Laying out cards…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_generation_start(&self, total_pages: usize, total_cards: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering {total_cards} cards on {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(page_num, Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, cards: usize) {
        let elapsed_ms = self
            .start_times
            .lock()
            .ok()
            .and_then(|mut times| times.remove(&page_num))
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{cards:>2} cards")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_generation_complete(&self, total_pages: usize, bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages rendered  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("{} KiB", bytes.div_ceil(1024)))
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Boards list, default settings → qrcards.pdf
  qrcards plyty.tsv

  # Worktops list as Word document
  qrcards --product-type blaty --format docx blaty.csv -o blaty.docx

  # Bigger codes, taller cards
  qrcards --qr-size 32 --card-height 56 plyty.tsv

  # Fixed 7-row grid (38.14 mm cards, no row gaps)
  qrcards --layout fixed plyty.tsv

  # Check the file without generating anything
  qrcards --preview-only plyty.tsv

  # Re-include rows 3 and 7 flagged as duplicates
  qrcards --exclude 3,7 plyty.tsv

  # Embed a TrueType font with Polish glyphs in the PDF
  qrcards --font /usr/share/fonts/truetype/dejavu/DejaVuSans.ttf plyty.tsv

PRODUCT TYPES:
  Id      Name col  Colour col  URL col
  ──────  ────────  ──────────  ───────
  plyty   1         4           5
  blaty   1         5           6

INPUT:
  Tab- or comma-separated text, UTF-8, no header row. The delimiter is a
  tab when the first line has more tabs than commas.

ENVIRONMENT VARIABLES:
  QRCARDS_PRODUCT_TYPE  Default product type
  QRCARDS_FORMAT        Default output format (pdf, docx)
  QRCARDS_QR_SIZE       Default QR size in mm
  QRCARDS_CARD_HEIGHT   Default card height in mm
  QRCARDS_FONT          TrueType font for PDF output
  RUST_LOG              Override log filter (e.g. qrcards=debug)
"#;

/// Generate printable QR cards from a product list.
#[derive(Parser, Debug)]
#[command(
    name = "qrcards",
    version,
    about = "Generate printable QR cards from a CSV/TSV product list",
    long_about = "Import a CSV or TSV product list, validate and deduplicate its rows, and lay \
out one QR card per product on A4 pages (3 columns), exported as PDF or DOCX.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// CSV or TSV product list.
    input: PathBuf,

    /// Product-type profile: plyty, blaty.
    #[arg(short = 't', long, env = "QRCARDS_PRODUCT_TYPE", default_value = "plyty")]
    product_type: String,

    /// Output document format.
    #[arg(short, long, env = "QRCARDS_FORMAT", value_enum, default_value = "pdf")]
    format: FormatArg,

    /// Output file. Default: qrcards.pdf / qrcards.docx in the current directory.
    #[arg(short, long, env = "QRCARDS_OUTPUT")]
    output: Option<PathBuf>,

    /// QR code size in mm (clamped to 20–40).
    #[arg(long, env = "QRCARDS_QR_SIZE", default_value_t = 24.0)]
    qr_size: f64,

    /// Card height in mm (clamped to 40–80; ignored by --layout fixed).
    #[arg(long, env = "QRCARDS_CARD_HEIGHT", default_value_t = 40.0)]
    card_height: f64,

    /// Row arrangement: gapped (rows fit to card height) or fixed (7 × 38.14 mm).
    #[arg(long, env = "QRCARDS_LAYOUT", value_enum, default_value = "gapped")]
    layout: LayoutArg,

    /// Toggle exclusion for these 1-based rows after import, e.g. 3,7.
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<usize>,

    /// TrueType font embedded in PDF output.
    #[arg(long, env = "QRCARDS_FONT")]
    font: Option<PathBuf>,

    /// Print the annotated rows and summary, generate nothing.
    #[arg(long)]
    preview_only: bool,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, env = "QRCARDS_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "QRCARDS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "QRCARDS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "QRCARDS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Pdf,
    Docx,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Pdf => OutputFormat::Pdf,
            FormatArg::Docx => OutputFormat::Docx,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LayoutArg {
    Gapped,
    Fixed,
}

impl From<LayoutArg> for LayoutPolicy {
    fn from(v: LayoutArg) -> Self {
        match v {
            LayoutArg::Gapped => LayoutPolicy::GappedRows,
            LayoutArg::Fixed => LayoutPolicy::fixed(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.preview_only;
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

    // ── Import ───────────────────────────────────────────────────────────
    let mut import = import_file(&cli.input, &cli.product_type)
        .with_context(|| format!("Failed to import {}", cli.input.display()))?;

    for &display_index in &cli.exclude {
        if display_index < 1 {
            anyhow::bail!("Rows are 1-indexed, minimum is 1 (got {display_index})");
        }
        toggle_exclusion(&mut import.rows, display_index - 1)
            .context("Invalid --exclude value")?;
    }
    import.summary = qrcards::RowSummary::of(&import.rows);

    if cli.preview_only {
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&import).context("Failed to serialise rows")?
            );
        } else {
            print_preview(&import);
        }
        return Ok(());
    }

    if !cli.quiet && !cli.json {
        print_summary(&import);
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.format.default_file_name()));

    // ── Generate ─────────────────────────────────────────────────────────
    let stats = generate_to_file(&import.rows, &output_path, &config)
        .context("Generation failed")?;

    if cli.json {
        let report = serde_json::json!({
            "output": output_path,
            "summary": import.summary,
            "stats": stats,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} cards  {} pages  {}ms  →  {}",
            green("✔"),
            stats.total_cards,
            stats.total_pages,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        if stats.skipped_rows > 0 {
            eprintln!(
                "   {} rows skipped (invalid or excluded)",
                dim(&stats.skipped_rows.to_string())
            );
        }
    }

    Ok(())
}

/// Map CLI args to `GenerationConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .product_type(cli.product_type.clone())
        .format(cli.format.into())
        .qr_size(cli.qr_size)
        .card_height(cli.card_height)
        .policy(cli.layout.into());

    if let Some(ref font) = cli.font {
        builder = builder.font_path(font.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Row state, padded before colouring so ANSI codes do not break alignment.
fn status(row: &Row) -> String {
    let (label, paint): (&str, fn(&str) -> String) = if !row.is_valid {
        ("invalid", red)
    } else if row.is_excluded {
        ("excluded", yellow)
    } else {
        ("ok", green)
    };
    paint(&format!("{label:<8}"))
}

/// Validation findings in red, duplicate findings in yellow.
fn findings(row: &Row) -> String {
    row.errors
        .iter()
        .map(|e| {
            if e.is_duplicate() {
                yellow(&e.to_string())
            } else {
                red(&e.to_string())
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 1).collect();
        format!("{head}\u{2026}")
    } else {
        s.to_string()
    }
}

fn print_summary(import: &ImportOutput) {
    let s = import.summary;
    eprintln!(
        "{} {} rows  {} valid  {} invalid  {} excluded",
        cyan("◆"),
        bold(&s.total.to_string()),
        green(&s.valid.to_string()),
        red(&s.invalid.to_string()),
        yellow(&s.excluded.to_string()),
    );
    if s.total > qrcards::row::LARGE_IMPORT_ROWS {
        eprintln!(
            "{} more than {} rows; generation may take a while",
            yellow("⚠"),
            qrcards::row::LARGE_IMPORT_ROWS
        );
    }
}

fn print_preview(import: &ImportOutput) {
    println!(
        "{:>5}  {:<8}  {:<10}  {:<32}  {:<40}  {}",
        "#", "status", "id", "product", "url", "findings"
    );
    for (i, row) in import.rows.iter().enumerate() {
        println!(
            "{:>5}  {}  {:<10}  {:<32}  {:<40}  {}",
            i + 1,
            status(row),
            truncate(&row.id, 10),
            truncate(&row.product_name, 32),
            truncate(&row.url, 40),
            findings(row),
        );
    }
    print_summary(import);
}
