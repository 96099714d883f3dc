//! Archive assembly: bundle the staged PDFs into one zip file.
//!
//! Entries are stored under their base name only — directory structure is
//! discarded, and same-named files from different directories will collide
//! (accepted, matching the reference builder). Deflate at maximum
//! compression; the archive is finalized only after every entry has been
//! queued, and any write error aborts the whole build.
//!
//! Zip writing is blocking I/O and runs under `spawn_blocking`.

use crate::error::ExportError;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write `paths` into a zip archive at `archive_path`.
///
/// Returns the total size of the finished archive in bytes.
pub async fn build(paths: &[PathBuf], archive_path: &Path) -> Result<u64, ExportError> {
    let paths = paths.to_vec();
    let archive = archive_path.to_path_buf();

    let bytes = tokio::task::spawn_blocking(move || build_blocking(&paths, &archive))
        .await
        .map_err(|e| ExportError::Internal(format!("Archive task panicked: {e}")))??;

    info!("Archive {} created, {bytes} total bytes", archive_path.display());
    Ok(bytes)
}

fn build_blocking(paths: &[PathBuf], archive_path: &Path) -> Result<u64, ExportError> {
    let archive_err = |detail: String| ExportError::Archive {
        path: archive_path.to_path_buf(),
        detail,
    };

    let file = File::create(archive_path).map_err(|e| archive_err(e.to_string()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    for path in paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| archive_err(format!("unusable file name: {}", path.display())))?;

        writer
            .start_file(name, options)
            .map_err(|e| archive_err(format!("entry '{name}': {e}")))?;
        let mut input = File::open(path)
            .map_err(|e| archive_err(format!("reading '{}': {e}", path.display())))?;
        std::io::copy(&mut input, &mut writer)
            .map_err(|e| archive_err(format!("entry '{name}': {e}")))?;
    }

    let file = writer
        .finish()
        .map_err(|e| archive_err(format!("finalize: {e}")))?;
    let bytes = file
        .metadata()
        .map_err(|e| archive_err(e.to_string()))?
        .len();
    Ok(bytes)
}
