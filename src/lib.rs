//! # site2zip
//!
//! Capture full-page screenshots of a site's pages, convert each one to a
//! single-page PDF, and bundle the PDFs into a zip archive.
//!
//! The pages to capture are discovered through a paginated content API
//! (`{base}/api/pages`) on the site's API host, or supplied directly as
//! URLs. Each page is rendered in its own headless Chrome session, swept
//! top-to-bottom-to-top so lazy-loaded content is on screen before the
//! screenshot, then captured as a full-page PNG and re-emitted as a PDF
//! whose page size equals the screenshot's pixel size.
//!
//! ## Pipeline Overview
//!
//! ```text
//! base URL
//!  │
//!  ├─ 1. Source    query the listing endpoint, derive destination URLs
//!  ├─ 2. Capture   per URL: launch Chrome, navigate, dismiss consent,
//!  │               scroll sweep, full-page PNG (owned temp file)
//!  ├─ 3. Document  decode PNG → single-page PDF at 1 px = 1 pt
//!  ├─ 4. Archive   zip all PDFs, flattened to base names, deflate -9
//!  └─ 5. Cleanup   remove raster + staged PDFs; only the zip remains
//! ```
//!
//! Destinations are processed one at a time, in order; the first
//! unrecoverable failure aborts the run. The one tolerated failure is a
//! missing cookie-consent control, which is logged and skipped.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use site2zip::{export_site, ExportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig::default();
//!     let output = export_site("https://site-api.example.com", "websites.zip", &config).await?;
//!     match output.archive {
//!         Some(path) => println!("archived {} pages to {}", output.pages.len(), path.display()),
//!         None => println!("No valid URLs found."),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `site2zip` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! site2zip = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ErrorPolicy, ExportConfig, ExportConfigBuilder, DEFAULT_CONSENT_SELECTOR};
pub use error::ExportError;
pub use export::{
    export, export_site, export_to, ExportOutput, ExportStats, PageRecord, DEFAULT_ARCHIVE_NAME,
};
pub use pipeline::source::Destination;
pub use progress::{ExportProgressCallback, NoopProgressCallback, ProgressCallback};
