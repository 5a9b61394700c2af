//! CLI binary for ink2text.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `CleanupConfig` and prints or saves results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ink2text::{clean, export, CleanupConfig, InputKind, OutputFormat};
use std::io::{self, Write};
use std::path::PathBuf;
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

const AFTER_HELP: &str = r#"EXAMPLES:
  # Clean a photo of handwritten notes (plain text to stdout)
  ink2text notes.jpg

  # Save the cleaned text to a file
  ink2text notes.jpg -o hasil_rapi.txt

  # Keep the light markup the model produces
  ink2text notes.jpg --format marked -o hasil_rapi.txt

  # Also save the raw OCR text before correction
  ink2text notes.jpg --raw-output hasil_ocr.txt -o hasil_rapi.txt

  # Start from a text file that already went through OCR elsewhere
  ink2text --text hasil_ocr.txt -o hasil_rapi.txt

  # Structured JSON with all three renditions and timings
  ink2text notes.jpg --json > result.json

ENVIRONMENT VARIABLES:
  GOOGLE_APPLICATION_CREDENTIALS_JSON  Service-account key JSON (inline blob)
  GOOGLE_APPLICATION_CREDENTIALS       Path to the service-account key file
  GEMINI_API_KEY                       Google Gemini API key

SETUP:
  1. Set credentials:  export GEMINI_API_KEY=...
                       export GOOGLE_APPLICATION_CREDENTIALS=key.json
  2. Clean a photo:    ink2text notes.jpg -o hasil_rapi.txt

  With --text only GEMINI_API_KEY is needed — the recognition stage is
  skipped entirely.
"#;

/// Turn images of handwritten notes into clean, corrected text.
#[derive(Parser, Debug)]
#[command(
    name = "ink2text",
    version,
    about = "Turn images of handwritten notes into clean, corrected text",
    long_about = "Recognize handwriting with Google Cloud Vision, rewrite the raw OCR text into \
corrected, numbered prose with Gemini, and strip the light markup for a plain-text rendition. \
Accepts photos/scans (PNG, JPEG, WEBP) or previously-OCR'd text files.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image file (PNG/JPEG/WEBP), or a text file when --text is given.
    input: String,

    /// Treat INPUT as previously-OCR'd text; skip the recognition stage.
    #[arg(long)]
    text: bool,

    /// Final text format.
    #[arg(long, env = "INK2TEXT_FORMAT", value_enum, default_value = "plain")]
    format: FormatArg,

    /// Write the final text to this file instead of stdout.
    #[arg(short, long, env = "INK2TEXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Also save the raw OCR text (before correction) to this file.
    #[arg(long, env = "INK2TEXT_RAW_OUTPUT")]
    raw_output: Option<PathBuf>,

    /// Generative model ID.
    #[arg(long, env = "INK2TEXT_MODEL")]
    model: Option<String>,

    /// Sampling temperature for the rewrite (0.0–2.0).
    #[arg(long, env = "INK2TEXT_TEMPERATURE")]
    temperature: Option<f32>,

    /// Max tokens the model may generate.
    #[arg(long, env = "INK2TEXT_MAX_TOKENS")]
    max_tokens: Option<u32>,

    /// Retries of the rewrite stage on transient failure.
    #[arg(long, env = "INK2TEXT_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Per-service-call timeout in seconds.
    #[arg(long, env = "INK2TEXT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Output structured JSON (all renditions + stats) instead of text.
    #[arg(long, env = "INK2TEXT_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "INK2TEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "INK2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the final text.
    #[arg(short, long, env = "INK2TEXT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Plain,
    Marked,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Plain => OutputFormat::Plain,
            FormatArg::Marked => OutputFormat::Marked,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // spinner provides all the feedback that matters to the user.
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
    let config = build_config(&cli)?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    let bar = if show_progress {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Cleaning");
        bar.set_message(if cli.text {
            "rewriting with Gemini…"
        } else {
            "recognizing handwriting, then rewriting…"
        });
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let result = clean(&cli.input, &config).await;

    if let Some(ref bar) = bar {
        bar.finish_and_clear();
    }

    let output = result.context("Cleanup failed")?;

    // ── Save the raw OCR text, if asked ──────────────────────────────────
    if let Some(ref raw_path) = cli.raw_output {
        export::write_text(raw_path, &output.raw_text)
            .await
            .context("Failed to save raw OCR text")?;
        if !cli.quiet {
            eprintln!(
                "{} raw OCR text → {}",
                green("✔"),
                bold(&raw_path.display().to_string())
            );
        }
    }

    // ── JSON mode: the structured output carries the diagnostic itself ───
    if cli.json {
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    // ── Nothing recognized: surface the diagnostic and stop ──────────────
    if output.raw_text.is_empty() {
        let reason = output
            .diagnostic
            .as_deref()
            .unwrap_or("the recognizer found no text in the image");
        eprintln!("{} No text recognized: {}", red("✘"), reason);
        std::process::exit(1);
    }

    let final_text = output.final_text(cli.format.into());

    if let Some(ref output_path) = cli.output {
        export::write_text(output_path, final_text)
            .await
            .context("Failed to save cleaned text")?;
        if !cli.quiet {
            eprintln!(
                "{} cleaned text → {}  {}",
                green("✔"),
                bold(&output_path.display().to_string()),
                dim(&format!(
                    "({}ms OCR, {}ms rewrite, {} retries)",
                    output.stats.ocr_duration_ms,
                    output.stats.rewrite_duration_ms,
                    output.stats.rewrite_retries
                )),
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(final_text.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure a trailing newline on stdout.
        if !final_text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        if !cli.quiet {
            eprintln!(
                "{}",
                dim(&format!(
                    "{}ms total ({}ms OCR, {}ms rewrite)",
                    output.stats.total_duration_ms,
                    output.stats.ocr_duration_ms,
                    output.stats.rewrite_duration_ms
                ))
            );
        }
    }

    Ok(())
}

/// Map CLI args to `CleanupConfig`.
fn build_config(cli: &Cli) -> Result<CleanupConfig> {
    let mut builder = CleanupConfig::builder()
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout)
        .input_kind(if cli.text {
            InputKind::PreRecognizedText
        } else {
            InputKind::Image
        });

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_output_tokens(n);
    }

    builder.build().context("Invalid configuration")
}
