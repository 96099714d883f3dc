//! CLI binary for site2zip.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExportConfig`, resolves the destinations, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use site2zip::{
    export_to, Destination, ExportConfig, ExportProgressCallback, ProgressCallback,
    DEFAULT_CONSENT_SELECTOR,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

/// Terminal progress callback: one bar across all destinations plus a log
/// line per finished page.
struct CliProgressCallback {
    bar: ProgressBar,
    completed: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Exporting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            completed: AtomicUsize::new(0),
        })
    }
}

impl ExportProgressCallback for CliProgressCallback {
    fn on_export_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting export of {total} pages…"))
        ));
    }

    fn on_page_start(&self, _index: usize, _total: usize, url: &str) {
        self.bar.set_message(url.to_string());
    }

    fn on_page_complete(&self, index: usize, total: usize, url: &str, pdf_bytes: u64) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            url,
            dim(&format!("{pdf_bytes} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_export_complete(&self, total: usize, archive_bytes: u64) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages archived  {}",
            green("✔"),
            bold(&total.to_string()),
            dim(&format!("{archive_bytes} bytes")),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Discover pages from a listing API and export (prompts if no URL given)
  site2zip https://site-api.example.com

  # Pick the output archive path
  site2zip https://site-api.example.com -o export.zip

  # Capture specific URLs directly, skipping the listing API
  site2zip --url https://site.example.com/a --url https://site.example.com/b

  # Wider viewport, custom consent control
  site2zip --width 1920 --height 1080 --consent-selector '#accept-all' https://site-api.example.com

  # Machine-readable run summary
  site2zip --json https://site-api.example.com > run.json

THE LISTING API:
  GET {base}/api/pages?pagination[page]=1&pagination[pageSize]=100
  → { "data": [ { "attributes": { "slug": "/about" } }, ... ] }

  The rendered origin is the base URL with its first "-api" removed;
  each destination is that origin joined with the item's slug.

SETUP:
  A Chrome or Chromium installation is required. Point --chrome at the
  executable if it is not on the usual install paths.
"#;

/// Capture a site's pages as PDFs and bundle them into a zip archive.
#[derive(Parser, Debug)]
#[command(
    name = "site2zip",
    version,
    about = "Capture full-page screenshots of a site's pages as PDFs, bundled into a zip",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Base URL of the site's API host (e.g. https://site-api.example.com).
    /// Prompted for interactively when omitted and no --url is given.
    base_url: Option<String>,

    /// Capture this URL directly instead of querying the listing API.
    /// Repeatable; bypasses the base URL entirely.
    #[arg(long = "url")]
    urls: Vec<String>,

    /// Output archive path.
    #[arg(short, long, env = "SITE2ZIP_OUTPUT", default_value = "websites.zip")]
    output: PathBuf,

    /// Browser viewport width in pixels.
    #[arg(long, env = "SITE2ZIP_WIDTH", default_value_t = 1400)]
    width: u32,

    /// Browser viewport height in pixels.
    #[arg(long, env = "SITE2ZIP_HEIGHT", default_value_t = 800)]
    height: u32,

    /// Scroll sweep step in CSS pixels.
    #[arg(long, env = "SITE2ZIP_SCROLL_STEP", default_value_t = 100)]
    scroll_step: u32,

    /// Delay between sweep steps in milliseconds.
    #[arg(long, env = "SITE2ZIP_SCROLL_DELAY", default_value_t = 100)]
    scroll_delay: u64,

    /// Dwell at the bottom of the page in milliseconds.
    #[arg(long, env = "SITE2ZIP_DWELL", default_value_t = 1000)]
    dwell: u64,

    /// CSS selector of the cookie-consent control to dismiss.
    #[arg(long, env = "SITE2ZIP_CONSENT_SELECTOR", default_value = DEFAULT_CONSENT_SELECTOR)]
    consent_selector: String,

    /// How long to wait for the consent control, in milliseconds.
    #[arg(long, env = "SITE2ZIP_CONSENT_WAIT", default_value_t = 3000)]
    consent_wait: u64,

    /// Listing endpoint page size (only the first page is fetched).
    #[arg(long, env = "SITE2ZIP_PAGE_SIZE", default_value_t = 100)]
    page_size: usize,

    /// Chrome/Chromium executable to launch.
    #[arg(long, env = "SITE2ZIP_CHROME")]
    chrome: Option<PathBuf>,

    /// Output a structured JSON run summary instead of plain text.
    #[arg(long, env = "SITE2ZIP_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "SITE2ZIP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SITE2ZIP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SITE2ZIP_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar provides the feedback that matters.
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

    // ── Resolve destinations ─────────────────────────────────────────────
    let destinations: Vec<Destination> = if !cli.urls.is_empty() {
        cli.urls.iter().map(|url| Destination::new(url.as_str())).collect()
    } else {
        let base_url = match cli.base_url {
            Some(ref url) => url.trim().to_string(),
            None => prompt_for_base_url()?,
        };
        let client = reqwest::Client::new();
        site2zip::pipeline::source::resolve(&client, &base_url, cli.page_size).await
    };

    if destinations.is_empty() {
        println!("No valid URLs found.");
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExportProgressCallback>)
    } else {
        None
    };

    let mut builder = ExportConfig::builder()
        .viewport(cli.width, cli.height)
        .scroll_step(cli.scroll_step)
        .scroll_delay_ms(cli.scroll_delay)
        .bottom_dwell_ms(cli.dwell)
        .consent_selector(cli.consent_selector.as_str())
        .consent_wait_ms(cli.consent_wait)
        .listing_page_size(cli.page_size);
    if let Some(ref chrome) = cli.chrome {
        builder = builder.chrome_executable(chrome.as_path());
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run export ───────────────────────────────────────────────────────
    if !cli.quiet && !cli.json {
        println!("Starting export...");
    }
    let output = export_to(&destinations, &cli.output, &config)
        .await
        .context("Export failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        println!("Export completed.");
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            output.stats.captured,
            output.stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
    }

    Ok(())
}

/// Single blocking prompt for the base URL on stdin.
fn prompt_for_base_url() -> Result<String> {
    print!("Please enter the base URL: ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read base URL from stdin")?;
    Ok(line.trim().to_string())
}
