//! CLI binary for the quote composer.
//!
//! Maps the form fields to a `QuoteRequest`, optionally loads a template
//! from JSON and writes `orcamento_<client>.pdf` into the output directory.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use paperwork::{compose_quote_to_dir, OverflowPolicy, QuoteRequest, QuoteTemplate};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Minimal quote → ./orcamento_Ana_Souza.pdf
  quote2pdf --client "Ana Souza" --value 1234,50

  # Full form with logo and banner
  quote2pdf --client "Ana Souza" --phone "(11) 99999-0000" \
      --address "Rua das Flores, 10" --deadline "15 dias" \
      --service "Demolição de muro e remoção de entulho" \
      --payment "50% na entrada, 50% na entrega" --value 8500 \
      --logo logo.png --header banner.jpg -o out/

  # Custom wording from a JSON template
  quote2pdf --client "Ana" --value 900 --template template.json

TEMPLATE JSON (every key optional):
  {"title": "...", "counterparty": "...", "footer": "...",
   "currency_symbol": "R$", "terms_heading": "...", "terms": ["a) ..."],
   "wrap_columns": 100, "line_pitch_cm": 0.5, "overflow": "paginate"}

ENVIRONMENT VARIABLES:
  PAPERWORK_TEMPLATE      Path to the template JSON
  PAPERWORK_OUTPUT_DIR    Output directory
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, e.g. paperwork=debug
"#;

/// Compose a demolition quote PDF.
#[derive(Parser, Debug)]
#[command(
    name = "quote2pdf",
    version,
    about = "Compose a one-page demolition quote as PDF",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Client name (required).
    #[arg(short, long)]
    client: String,

    /// Client phone.
    #[arg(long, default_value = "")]
    phone: String,

    /// Demolition address.
    #[arg(long, default_value = "")]
    address: String,

    /// Deadline, free text.
    #[arg(long, default_value = "")]
    deadline: String,

    /// Service description.
    #[arg(long = "service", default_value = "")]
    service_description: String,

    /// Payment terms.
    #[arg(long = "payment", default_value = "")]
    payment_terms: String,

    /// Agreed value; `1234.50`, `1.234,50` and `1,234.50` are accepted.
    #[arg(long, value_parser = parse_value, default_value = "0")]
    value: f64,

    /// Free-text observation.
    #[arg(long, default_value = "")]
    note: String,

    /// Logo image (JPEG or PNG), drawn top-left.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Banner image (JPEG or PNG), drawn across the top.
    #[arg(long)]
    header: Option<PathBuf>,

    /// Issue date, dd/mm/yyyy or yyyy-mm-dd. Default: today.
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Template JSON overriding title, terms and layout settings.
    #[arg(long, env = "PAPERWORK_TEMPLATE")]
    template: Option<PathBuf>,

    /// Override the template title.
    #[arg(long)]
    title: Option<String>,

    /// Override the counterparty printed on the second signature line.
    #[arg(long)]
    counterparty: Option<String>,

    /// Continue on a new page instead of clipping long content.
    #[arg(long, value_enum)]
    overflow: Option<OverflowArg>,

    /// Output directory.
    #[arg(short, long, env = "PAPERWORK_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAPERWORK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAPERWORK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OverflowArg {
    Paginate,
    Clip,
}

impl From<OverflowArg> for OverflowPolicy {
    fn from(v: OverflowArg) -> Self {
        match v {
            OverflowArg::Paginate => OverflowPolicy::Paginate,
            OverflowArg::Clip => OverflowPolicy::Clip,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
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

    let template = build_template(&cli)?;
    let request = QuoteRequest {
        client_name: cli.client.clone(),
        phone: cli.phone.clone(),
        address: cli.address.clone(),
        deadline: cli.deadline.clone(),
        service_description: cli.service_description.clone(),
        payment_terms: cli.payment_terms.clone(),
        agreed_value: cli.value,
        note: cli.note.clone(),
        logo: read_optional(cli.logo.as_deref()).await?,
        header_image: read_optional(cli.header.as_deref()).await?,
        issued_on: cli.date,
    };

    tokio::fs::create_dir_all(&cli.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", cli.output_dir.display()))?;

    let path = compose_quote_to_dir(&request, &template, &cli.output_dir)
        .await
        .context("Failed to compose quote")?;

    if !cli.quiet {
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(&path.display().to_string()),
            dim(&format!("client={}", request.client_name)),
        );
    }
    Ok(())
}

fn build_template(cli: &Cli) -> Result<QuoteTemplate> {
    let mut template = match cli.template {
        Some(ref path) => QuoteTemplate::from_json_file(path)
            .with_context(|| format!("Failed to load template {}", path.display()))?,
        None => QuoteTemplate::default(),
    };
    if let Some(ref title) = cli.title {
        template.title = title.clone();
    }
    if let Some(ref counterparty) = cli.counterparty {
        template.counterparty = counterparty.clone();
    }
    if let Some(overflow) = cli.overflow {
        template.overflow = overflow.into();
    }
    Ok(template)
}

async fn read_optional(path: Option<&Path>) -> Result<Option<Vec<u8>>> {
    match path {
        Some(p) => {
            let bytes = tokio::fs::read(p)
                .await
                .with_context(|| format!("Failed to read image {}", p.display()))?;
            Ok(Some(bytes))
        }
        None => Ok(None),
    }
}

/// Accept `1234.5`, `1234,50`, `1.234,50` and `1,234.50`.
///
/// The separator that appears last is the decimal point, unless it appears
/// more than once (`1.234.567`), in which case it groups thousands.
fn parse_value(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    let decimal = trimmed
        .chars()
        .rev()
        .find(|c| matches!(c, ',' | '.'))
        .filter(|sep| trimmed.matches(*sep).count() == 1);

    let normalised: String = trimmed
        .chars()
        .filter_map(|c| match c {
            ',' | '.' if Some(c) == decimal => Some('.'),
            ',' | '.' => None,
            _ => Some(c),
        })
        .collect();
    normalised
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("'{raw}' is not a number"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| format!("'{raw}' is not a date (use dd/mm/yyyy or yyyy-mm-dd)"))
}
