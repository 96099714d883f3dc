//! Error types for the site2zip library.
//!
//! One fatal enum, [`ExportError`]: every failure it models terminates the
//! run. The single downgraded failure mode — the cookie-consent control not
//! being found or clickable — never becomes an `ExportError`; it is logged
//! inside the capture stage and the pipeline continues (governed by
//! [`crate::config::ErrorPolicy`]).
//!
//! A failed listing request is also not an error: the Source Resolver
//! returns an empty destination list and logs the cause, so callers see
//! "nothing to do" rather than a crash.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the site2zip library.
#[derive(Debug, Error)]
pub enum ExportError {
    // ── Browser errors ────────────────────────────────────────────────────
    /// The headless browser could not be launched or configured.
    #[error("Failed to launch headless browser: {detail}\nIs Chrome or Chromium installed and on PATH?")]
    BrowserLaunch { detail: String },

    /// Navigation to a destination failed.
    #[error("Navigation failed for '{url}': {detail}")]
    Navigation { url: String, detail: String },

    /// A script evaluated in the page context failed.
    #[error("Page script failed on '{url}': {detail}")]
    Script { url: String, detail: String },

    /// The full-page screenshot could not be taken or written.
    #[error("Screenshot capture failed for '{url}': {detail}")]
    Capture { url: String, detail: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// The raster file is corrupt or not a PNG.
    #[error("Failed to decode screenshot '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The single-page PDF could not be assembled.
    #[error("Failed to build PDF document for '{path}': {detail}")]
    DocumentBuild { path: PathBuf, detail: String },

    /// The PDF bytes could not be written to disk.
    #[error("Failed to write PDF '{path}': {source}")]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Archive errors ────────────────────────────────────────────────────
    /// The zip archive could not be written or finalized.
    #[error("Failed to write archive '{path}': {detail}")]
    Archive { path: PathBuf, detail: String },

    // ── Cleanup errors ────────────────────────────────────────────────────
    /// An intermediate artifact could not be removed.
    ///
    /// Deliberately fatal: the raster handle owns its temp file, so a
    /// deletion failure means something else touched our artifact.
    #[error("Failed to remove intermediate file '{path}': {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_display_names_url() {
        let e = ExportError::Navigation {
            url: "https://site.example.com/a".into(),
            detail: "net::ERR_NAME_NOT_RESOLVED".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("https://site.example.com/a"), "got: {msg}");
        assert!(msg.contains("ERR_NAME_NOT_RESOLVED"));
    }

    #[test]
    fn cleanup_display_names_path() {
        let e = ExportError::Cleanup {
            path: PathBuf::from("/tmp/shot.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(e.to_string().contains("/tmp/shot.png"));
    }

    #[test]
    fn decode_carries_source() {
        use std::error::Error as _;
        let img_err = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "truncated",
        ));
        let e = ExportError::Decode {
            path: PathBuf::from("shot.png"),
            source: img_err,
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn browser_launch_display_hints_at_chrome() {
        let e = ExportError::BrowserLaunch {
            detail: "no usable executable".into(),
        };
        assert!(e.to_string().contains("Chrome"));
    }
}
