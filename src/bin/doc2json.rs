//! CLI binary for doc2json.
//!
//! A thin shim over the library crate: one invocation is one upload event.
//! CLI flags map to `ExtractorConfig`; the resulting JSON panel (or the whole
//! display state) is printed to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use doc2json::{
    DisplayState, ExtractorConfig, FileKind, UploadOrchestrator, UploadProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner on stderr that follows the upload through its stages.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl UploadProgressCallback for CliProgressCallback {
    fn on_upload_start(&self, path: &Path, kind: FileKind) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(format!("{name} ({kind:?})"));
        if kind == FileKind::Pdf {
            self.bar.set_prefix("Rendering");
        }
    }

    fn on_rasterized(&self, raster_path: &Path) {
        self.bar.println(format!(
            "  {} page rendered  {}",
            green("✓"),
            dim(&raster_path.display().to_string())
        ));
    }

    fn on_analysis_start(&self, _image_path: &Path) {
        self.bar.set_prefix("Analysing");
    }

    fn on_upload_complete(&self, is_error: bool) {
        self.bar.finish_and_clear();
        if is_error {
            eprintln!("{} extraction failed", red("✘"));
        } else {
            eprintln!("{} extraction complete", green("✔"));
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract fields from a scanned PDF (first page)
  doc2json passport.pdf

  # Analyse the second page instead
  doc2json --page 1 statement.pdf

  # Images are sent as-is
  doc2json id_front.jpg

  # Print the full display state (preview + JSON panel + placeholders)
  doc2json --display invoice.png

  # Use another model on an OpenAI-compatible endpoint
  doc2json --model openai/gpt-4.1-mini receipt.png

ENVIRONMENT VARIABLES:
  API_KEY                 Bearer token for the inference endpoint (required)
  DOC2JSON_MODEL          Override model ID
  DOC2JSON_ENDPOINT       Override chat-completions URL
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, e.g. doc2json=debug

EXIT STATUS:
  0  extraction result or status printed
  1  the JSON panel holds an error record
"#;

/// Extract structured JSON from a scanned document using a vision model.
#[derive(Parser, Debug)]
#[command(
    name = "doc2json",
    version,
    about = "Extract structured JSON from a PDF or image using a Vision LLM",
    long_about = "Classify a scanned document (PDF or image) and extract all pertinent \
fields as a single JSON object using a Vision Language Model on any OpenAI-compatible \
chat-completions endpoint.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF, PNG, JPG, JPEG, BMP or GIF file. Omit to see the empty-upload status.
    input: Option<PathBuf>,

    /// API key for the inference endpoint.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Vision model ID.
    #[arg(long, env = "DOC2JSON_MODEL", default_value = doc2json::config::DEFAULT_MODEL)]
    model: String,

    /// Chat-completions endpoint URL.
    #[arg(long, env = "DOC2JSON_ENDPOINT", default_value = doc2json::config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Max tokens the model may generate.
    #[arg(long, env = "DOC2JSON_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: u32,

    /// Request timeout in seconds.
    #[arg(long, env = "DOC2JSON_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Rendering DPI for PDF pages (72–600).
    #[arg(long, env = "DOC2JSON_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// 0-based PDF page to analyse; clamps to the last page.
    #[arg(long, env = "DOC2JSON_PAGE", default_value_t = 0)]
    page: usize,

    /// Directory for the temporary page raster.
    #[arg(long, env = "DOC2JSON_WORK_DIR", default_value = ".")]
    work_dir: PathBuf,

    /// Path to a text file containing a custom extraction prompt.
    #[arg(long, env = "DOC2JSON_PROMPT")]
    prompt: Option<PathBuf>,

    /// Print the whole display state instead of only the JSON panel.
    #[arg(long)]
    display: bool,

    /// Print compact JSON.
    #[arg(long)]
    compact: bool,

    /// Disable the spinner.
    #[arg(long, env = "DOC2JSON_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2JSON_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2JSON_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the progress; keep library INFO logs off while it runs.
    let show_progress = !cli.quiet && !cli.no_progress;
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

    let config = build_config(&cli).await?;
    let mut orchestrator =
        UploadOrchestrator::from_config(config).context("Failed to initialise extractor")?;
    if show_progress && cli.input.is_some() {
        orchestrator = orchestrator.with_progress(CliProgressCallback::new());
    }

    let state = orchestrator.handle_upload(cli.input.as_deref()).await;
    print_state(&cli, &state)?;

    Ok(if state.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Map CLI args to `ExtractorConfig`.
async fn build_config(cli: &Cli) -> Result<ExtractorConfig> {
    let mut builder = ExtractorConfig::builder()
        .api_key(cli.api_key.clone().unwrap_or_default())
        .model(&cli.model)
        .endpoint(&cli.endpoint)
        .max_tokens(cli.max_tokens)
        .timeout_secs(cli.timeout)
        .dpi(cli.dpi)
        .page_index(cli.page)
        .work_dir(&cli.work_dir);

    if let Some(ref path) = cli.prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}

fn print_state(cli: &Cli, state: &DisplayState) -> Result<()> {
    let rendered = match (cli.display, cli.compact) {
        (true, true) => serde_json::to_string(state),
        (true, false) => serde_json::to_string_pretty(state),
        (false, true) => serde_json::to_string(&state.json),
        (false, false) => serde_json::to_string_pretty(&state.json),
    }
    .context("Failed to serialise output")?;
    println!("{rendered}");
    Ok(())
}
