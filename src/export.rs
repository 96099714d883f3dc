//! Export orchestration: sequence the pipeline stages per destination and
//! finalize the archive.
//!
//! Destinations are processed strictly one at a time: capture → convert →
//! stage. The raster handle is closed as soon as its PDF exists, and a
//! close failure is fatal — the handle owns the file, so a vanished raster
//! means something else interfered with the run. After the loop the staged
//! PDFs are archived and then removed; only the archive survives.
//!
//! There is no retry and no partial-result recovery: the first propagated
//! error aborts the run (already-staged PDFs live in a temp directory that
//! is cleaned up on drop).

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::pipeline::{archive, capture, document, source};
use crate::pipeline::source::Destination;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Archive file name used by [`export`].
pub const DEFAULT_ARCHIVE_NAME: &str = "websites.zip";

/// One processed destination.
#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    /// The captured URL.
    pub url: String,
    /// Archive entry name of the staged document.
    pub document: String,
    /// Size of the staged PDF in bytes.
    pub pdf_bytes: u64,
    /// Wall-clock time for capture + conversion.
    pub duration_ms: u64,
}

/// Aggregate statistics for an export run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportStats {
    /// Destinations handed to the orchestrator.
    pub destinations: usize,
    /// Destinations captured and converted.
    pub captured: usize,
    /// Final archive size in bytes.
    pub archive_bytes: u64,
    /// Time spent capturing and converting pages.
    pub capture_duration_ms: u64,
    /// Time spent writing the archive.
    pub archive_duration_ms: u64,
    /// End-to-end run time.
    pub total_duration_ms: u64,
}

/// Result of an export run.
#[derive(Debug, Serialize)]
pub struct ExportOutput {
    /// Path of the finished archive; `None` when there was nothing to export.
    pub archive: Option<PathBuf>,
    /// Per-destination records, in processing order.
    pub pages: Vec<PageRecord>,
    pub stats: ExportStats,
}

impl ExportOutput {
    fn empty() -> Self {
        Self {
            archive: None,
            pages: Vec::new(),
            stats: ExportStats::default(),
        }
    }
}

/// Resolve a site's pages from its listing endpoint and export them.
///
/// Convenience wrapper: [`source::resolve`] + [`export_to`]. A failed
/// listing request yields an empty destination list, which exports nothing
/// and produces no archive.
pub async fn export_site(
    base_url: &str,
    archive_path: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportOutput, ExportError> {
    let client = reqwest::Client::new();
    let destinations = source::resolve(&client, base_url, config.listing_page_size).await;
    export_to(&destinations, archive_path, config).await
}

/// Export `destinations` into `websites.zip` in the working directory.
pub async fn export(
    destinations: &[Destination],
    config: &ExportConfig,
) -> Result<ExportOutput, ExportError> {
    export_to(destinations, DEFAULT_ARCHIVE_NAME, config).await
}

/// Export `destinations` into an archive at `archive_path`.
///
/// An empty destination list is not an error: nothing is captured, no
/// archive file is written, and the returned output has `archive: None`.
pub async fn export_to(
    destinations: &[Destination],
    archive_path: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportOutput, ExportError> {
    let total_start = Instant::now();
    let archive_path = archive_path.as_ref();

    if destinations.is_empty() {
        info!("No destinations to export");
        return Ok(ExportOutput::empty());
    }

    let total = destinations.len();
    info!("Exporting {total} destinations to {}", archive_path.display());
    if let Some(ref cb) = config.progress_callback {
        cb.on_export_start(total);
    }

    // Staged PDFs live here until archived; dropped (and removed) on any
    // abort path.
    let stage_dir = tempfile::tempdir()
        .map_err(|e| ExportError::Internal(format!("staging dir: {e}")))?;

    // ── Per destination: capture → convert → stage ───────────────────────
    let capture_start = Instant::now();
    let mut staged: Vec<PathBuf> = Vec::with_capacity(total);
    let mut pages: Vec<PageRecord> = Vec::with_capacity(total);

    for (i, dest) in destinations.iter().enumerate() {
        let page_start = Instant::now();
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(i + 1, total, dest.as_str());
        }

        info!("Capturing {dest}");
        let raster = capture::capture_page(dest, config).await?;

        let document_name = document::document_file_name(dest);
        let pdf_path = stage_dir.path().join(&document_name);
        info!("Converting screenshot to PDF for {dest}");
        document::convert(raster.path(), &pdf_path).await?;

        // The raster is consumed; deletion failure aborts the run.
        raster.close()?;

        let pdf_bytes = tokio::fs::metadata(&pdf_path)
            .await
            .map_err(|e| ExportError::Internal(format!("stat staged PDF: {e}")))?
            .len();

        staged.push(pdf_path);
        pages.push(PageRecord {
            url: dest.to_string(),
            document: document_name,
            pdf_bytes,
            duration_ms: page_start.elapsed().as_millis() as u64,
        });
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(i + 1, total, dest.as_str(), pdf_bytes);
        }
    }
    let capture_duration_ms = capture_start.elapsed().as_millis() as u64;

    // ── Finalize archive, then drop the intermediates ────────────────────
    let archive_start = Instant::now();
    let archive_bytes = archive::build(&staged, archive_path).await?;
    let archive_duration_ms = archive_start.elapsed().as_millis() as u64;

    for path in &staged {
        tokio::fs::remove_file(path)
            .await
            .map_err(|source| ExportError::Cleanup {
                path: path.clone(),
                source,
            })?;
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_export_complete(total, archive_bytes);
    }

    let stats = ExportStats {
        destinations: total,
        captured: pages.len(),
        archive_bytes,
        capture_duration_ms,
        archive_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Export complete: {}/{} pages, {} bytes, {}ms total",
        stats.captured, stats.destinations, stats.archive_bytes, stats.total_duration_ms
    );

    Ok(ExportOutput {
        archive: Some(archive_path.to_path_buf()),
        pages,
        stats,
    })
}
