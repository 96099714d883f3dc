//! Image-to-document conversion: one PNG raster → one single-page PDF.
//!
//! The page is sized to the raster's pixel dimensions exactly. We map
//! 1 px = 1 pt (72 dpi), so a 1400×9000 screenshot becomes a 1400×9000 pt
//! page with the image drawn at the origin covering the full page — no
//! scaling, no margins.
//!
//! The pixel data is fed to printpdf as a raw `ImageXObject` rather than
//! through its image feature, keeping a single version of the `image` crate
//! in the tree. Decode and serialization are CPU-bound and run under
//! `spawn_blocking`.

use crate::error::ExportError;
use crate::pipeline::source::Destination;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Pt, Px,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 1 px = 1 pt.
const RASTER_DPI: f32 = 72.0;

/// Page size in printpdf units for a raster of the given pixel dimensions.
pub fn page_size(width_px: u32, height_px: u32) -> (Mm, Mm) {
    (
        Mm::from(Pt(width_px as f32)),
        Mm::from(Pt(height_px as f32)),
    )
}

/// Derive the document file name from a destination URL: the last path
/// segment with every character outside `[A-Za-z0-9]` replaced by `_`,
/// plus the `.pdf` extension.
pub fn document_file_name(dest: &Destination) -> String {
    let trimmed = dest.as_str().trim_end_matches('/');
    let base = trimmed.rsplit('/').next().unwrap_or(trimmed);
    format!("{}.pdf", sanitize(base))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Convert the raster at `raster_path` into a single-page PDF at `pdf_path`.
///
/// Fails with a decode error if the raster is corrupt or not a PNG, and
/// with an I/O error if either file cannot be read or written.
pub async fn convert(raster_path: &Path, pdf_path: &Path) -> Result<(), ExportError> {
    let raster = raster_path.to_path_buf();
    let bytes = tokio::fs::read(&raster)
        .await
        .map_err(|e| ExportError::Decode {
            path: raster.clone(),
            source: image::ImageError::IoError(e),
        })?;

    let pdf_bytes = tokio::task::spawn_blocking(move || build_pdf(&bytes, &raster))
        .await
        .map_err(|e| ExportError::Internal(format!("Convert task panicked: {e}")))??;

    tokio::fs::write(pdf_path, &pdf_bytes)
        .await
        .map_err(|source| ExportError::DocumentWrite {
            path: pdf_path.to_path_buf(),
            source,
        })?;

    debug!(
        "Converted {} → {} ({} bytes)",
        raster_path.display(),
        pdf_path.display(),
        pdf_bytes.len()
    );
    Ok(())
}

/// Blocking implementation: decode, lay out the page, serialize.
fn build_pdf(png: &[u8], raster_path: &PathBuf) -> Result<Vec<u8>, ExportError> {
    let img = image::load_from_memory_with_format(png, image::ImageFormat::Png).map_err(
        |source| ExportError::Decode {
            path: raster_path.clone(),
            source,
        },
    )?;
    let (width, height) = (img.width(), img.height());
    debug!("Decoded raster {}x{} px", width, height);

    let (page_w, page_h) = page_size(width, height);
    let (doc, page_index, layer_index) = PdfDocument::new("captured page", page_w, page_h, "image");
    let layer = doc.get_page(page_index).get_layer(layer_index);

    let xobject = ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: img.to_rgb8().into_raw(),
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    };
    Image::from(xobject).add_to_layer(
        layer,
        ImageTransform {
            dpi: Some(RASTER_DPI),
            ..Default::default()
        },
    );

    doc.save_to_bytes().map_err(|e| ExportError::DocumentBuild {
        path: raster_path.clone(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_every_non_alphanumeric() {
        assert_eq!(sanitize("about-us?lang=en"), "about_us_lang_en");
        assert_eq!(sanitize("übersicht"), "_bersicht");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize("a/b.c d");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn file_name_uses_last_path_segment() {
        let dest = Destination::new("https://site.example.com/a");
        assert_eq!(document_file_name(&dest), "a.pdf");
    }

    #[test]
    fn file_name_for_bare_origin_uses_host() {
        let dest = Destination::new("https://x.y.com");
        assert_eq!(document_file_name(&dest), "x_y_com.pdf");
    }

    #[test]
    fn file_name_ignores_trailing_slash() {
        let dest = Destination::new("https://site.example.com/news/");
        assert_eq!(document_file_name(&dest), "news.pdf");
    }

    #[test]
    fn page_size_maps_one_px_to_one_pt() {
        // 72 px at 72 dpi is one inch, i.e. 25.4 mm.
        let (w, h) = page_size(72, 144);
        assert!((w.0 - 25.4).abs() < 1e-3, "got {}", w.0);
        assert!((h.0 - 50.8).abs() < 1e-3, "got {}", h.0);
    }

    #[test]
    fn build_pdf_round_trips_a_generated_png() {
        use image::{Rgba, RgbaImage};
        use std::io::Cursor;

        let img = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            10,
            20,
            Rgba([12, 34, 56, 255]),
        ));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let bytes = build_pdf(&png, &PathBuf::from("test.png")).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "output must be a PDF");
    }

    #[test]
    fn build_pdf_rejects_non_png_bytes() {
        let err = build_pdf(b"definitely not a png", &PathBuf::from("bad.png"));
        assert!(matches!(err, Err(ExportError::Decode { .. })));
    }
}
