//! CLI binary for the PDF translator.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `TranslationConfig`, writes `traduzido_<file>` and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use paperwork::{
    translate_file, DocumentStructure, FailedBlockPolicy, Language, ProgressCallback,
    StrategyKind, StrategyPreference, TranslationConfig, TranslationProgressCallback,
    DEFAULT_TRANSLATE_ENDPOINT,
};
use std::io;
use std::path::PathBuf;
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
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while the document is scanned, then one bar per strategy run.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Analysing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl TranslationProgressCallback for CliProgressCallback {
    fn on_analysis_complete(&self, s: &DocumentStructure) {
        self.bar.println(format!(
            "{} {} pages  {}",
            bold("◆"),
            s.page_count,
            dim(&format!(
                "tables={} images={} complex={} chars={}",
                s.has_tables, s.has_images, s.complex_layout, s.text_chars
            )),
        ));
    }

    fn on_strategy_start(&self, strategy: StrategyKind, total_units: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} units  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.errors.store(0, Ordering::SeqCst);
        self.bar.set_style(style);
        self.bar.set_length(total_units as u64);
        self.bar.set_position(0);
        self.bar.set_prefix(strategy.to_string());
        self.bar.reset_eta();
    }

    fn on_unit_complete(&self, _page: usize, _unit: usize, _total: usize) {
        self.bar.inc(1);
    }

    fn on_unit_error(&self, page: usize, unit: usize, _total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} page {:>3} unit {:<4} {}",
            red("✗"),
            page,
            unit,
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_strategy_failed(&self, strategy: StrategyKind, error: &str) {
        self.bar.println(format!(
            "{} {} failed: {}",
            yellow("⚠"),
            bold(&strategy.to_string()),
            error
        ));
    }

    fn on_translation_complete(&self, strategy: StrategyKind, translated: usize, failed: usize) {
        self.bar.finish_and_clear();
        let mark = if failed == 0 { green("✔") } else { yellow("⚠") };
        eprintln!(
            "{} {} units translated via {}{}",
            mark,
            bold(&translated.to_string()),
            strategy,
            if failed > 0 {
                format!("  ({} kept original text)", red(&failed.to_string()))
            } else {
                String::new()
            }
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Translate to English → traduzido_contrato.pdf next to the input
  pdftranslate contrato.pdf --target en

  # Explicit output, force the overlay strategy
  pdftranslate relatorio.pdf -t es --strategy overlay -o out/relatorio_es.pdf

  # JSON report on stdout
  pdftranslate tabela.pdf -t de --json

LANGUAGES:
  pt  Português     en  Inglês      es  Espanhol
  fr  Francês       de  Alemão      it  Italiano
  Names are accepted too: --target english, --target Alemão

ENVIRONMENT VARIABLES:
  PAPERWORK_TARGET        Default target language
  PAPERWORK_ENDPOINT      Translation endpoint URL
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, e.g. paperwork=debug
"#;

/// Translate a PDF into another language.
#[derive(Parser, Debug)]
#[command(
    name = "pdftranslate",
    version,
    about = "Translate the text of a PDF, keeping its layout where possible",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to translate.
    input: PathBuf,

    /// Target language: pt, en, es, fr, de, it (or its name).
    #[arg(short, long, env = "PAPERWORK_TARGET", default_value = "pt")]
    target: Language,

    /// Output file. Default: traduzido_<input> next to the input.
    #[arg(short, long, env = "PAPERWORK_OUTPUT")]
    output: Option<PathBuf>,

    /// Which strategy to try first.
    #[arg(long, env = "PAPERWORK_STRATEGY", value_enum, default_value = "auto")]
    strategy: StrategyArg,

    /// Font size of overlaid translations, in points (4–72).
    #[arg(long, env = "PAPERWORK_FONT_SIZE", default_value_t = 10.0)]
    font_size: f32,

    /// What to do with blocks whose translation failed.
    #[arg(long, env = "PAPERWORK_FAILED_BLOCKS", value_enum, default_value = "keep-original")]
    failed_blocks: FailedBlocksArg,

    /// Translation endpoint.
    #[arg(long, env = "PAPERWORK_ENDPOINT", default_value = DEFAULT_TRANSLATE_ENDPOINT)]
    endpoint: String,

    /// Per-request timeout in seconds. Default: none.
    #[arg(long, env = "PAPERWORK_TIMEOUT")]
    timeout: Option<u64>,

    /// Print the translation report as JSON on stdout.
    #[arg(long, env = "PAPERWORK_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PAPERWORK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAPERWORK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAPERWORK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Auto,
    Overlay,
    Conversion,
}

impl From<StrategyArg> for StrategyPreference {
    fn from(v: StrategyArg) -> Self {
        match v {
            StrategyArg::Auto => StrategyPreference::Auto,
            StrategyArg::Overlay => StrategyPreference::Overlay,
            StrategyArg::Conversion => StrategyPreference::Conversion,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FailedBlocksArg {
    KeepOriginal,
    Blank,
}

impl From<FailedBlocksArg> for FailedBlockPolicy {
    fn from(v: FailedBlocksArg) -> Self {
        match v {
            FailedBlocksArg::KeepOriginal => FailedBlockPolicy::KeepOriginal,
            FailedBlocksArg::Blank => FailedBlockPolicy::Blank,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; --verbose brings them back.
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
        Some(CliProgressCallback::new() as Arc<dyn TranslationProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run translation ──────────────────────────────────────────────────
    let (output, path) = translate_file(&cli.input, cli.output.as_deref(), cli.target, &config)
        .await
        .with_context(|| format!("Failed to translate {}", cli.input.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output.summary())
            .context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  {}/{} units  {}ms  →  {}",
            if output.warnings.is_empty() {
                green("✔")
            } else {
                yellow("⚠")
            },
            output.document.page_count(),
            output.stats.translated_units,
            output.stats.total_units,
            output.stats.duration_ms,
            bold(&path.display().to_string()),
        );
        if output.fallback_used {
            eprintln!("   {}", dim(&format!("fallback used: {}", output.strategy)));
        }
        if !show_progress {
            for w in &output.warnings {
                eprintln!("   {} {}", red("✗"), w);
            }
        }
    }

    Ok(())
}

/// Map CLI args to `TranslationConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<TranslationConfig> {
    let mut builder = TranslationConfig::builder()
        .endpoint(cli.endpoint.clone())
        .font_size(cli.font_size)
        .failed_blocks(cli.failed_blocks.into())
        .preference(cli.strategy.into());

    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
