//! Pipeline stages for the page-capture-to-archive export.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different browser backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ capture ──▶ scroll ──▶ document ──▶ archive
//! (listing)  (browser)   (sweep)    (PNG→PDF)    (zip)
//! ```
//!
//! 1. [`source`]   — query the listing endpoint and derive destinations
//! 2. [`capture`]  — one browser session per destination; full-page PNG
//!    into an owned temp-file raster
//! 3. [`scroll`]   — the in-page sweep that triggers lazy content before
//!    the screenshot (invoked by capture)
//! 4. [`document`] — decode the raster, emit a single-page PDF sized to
//!    its pixel dimensions
//! 5. [`archive`]  — bundle the staged PDFs into one zip, flattened to
//!    base names

pub mod archive;
pub mod capture;
pub mod document;
pub mod scroll;
pub mod source;
