//! PDF rasterisation: render one page to a PNG on disk via pdfium.
//!
//! ## Why a file, not an in-memory image?
//!
//! The derived raster is handed to the vision client exactly like an uploaded
//! image, by path. Its name is derived from the source file name and the page
//! index (`temp_page_<stem>_<page>.png`), so re-running on the same input
//! overwrites instead of piling up files. Two concurrent uploads sharing a
//! stem and page index do share that path.
//!
//! ## Blocking
//!
//! pdfium is synchronous and not async-safe. [`PageRasterizer::rasterize`] is
//! a plain blocking call; the orchestrator runs it inside `spawn_blocking`.

use crate::error::RasterError;
use image::ImageFormat;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Points per inch in PDF user space.
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Turns a page of a PDF into a raster image file.
pub trait PageRasterizer: Send + Sync {
    /// Render page `page_index` (0-based) of `pdf_path` and return the path
    /// of the written PNG.
    fn rasterize(&self, pdf_path: &Path, page_index: usize) -> Result<PathBuf, RasterError>;
}

/// [`PageRasterizer`] backed by pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    dpi: u32,
    work_dir: PathBuf,
}

impl PdfiumRasterizer {
    pub fn new(dpi: u32, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            dpi,
            work_dir: work_dir.into(),
        }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Where the raster for `pdf_path` / `page_index` is written.
    pub fn output_path(&self, pdf_path: &Path, page_index: usize) -> PathBuf {
        self.work_dir.join(temp_page_file_name(pdf_path, page_index))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_path: &Path, page_index: usize) -> Result<PathBuf, RasterError> {
        if !pdf_path.exists() {
            return Err(RasterError::NotFound {
                path: pdf_path.to_path_buf(),
            });
        }

        let conversion_error = |detail: String| RasterError::ConversionError {
            path: pdf_path.to_path_buf(),
            detail,
        };

        let pdfium = bind_pdfium().map_err(|e| conversion_error(format!("{e}")))?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| conversion_error(format!("{e:?}")))?;

        let pages = document.pages();
        let total = pages.len() as usize;
        info!("PDF loaded: {} pages", total);

        let index = match select_page(page_index, total) {
            Some(idx) => idx,
            None => {
                drop(document);
                return Err(RasterError::EmptyDocument {
                    path: pdf_path.to_path_buf(),
                });
            }
        };
        if index != page_index {
            warn!(
                "Requested page {} out of bounds; using last page ({})",
                page_number(page_index),
                index + 1
            );
        }

        let page = pages
            .get(index as u16)
            .map_err(|e| conversion_error(format!("page {}: {e:?}", index + 1)))?;

        let render_config =
            PdfRenderConfig::new().scale_page_by_factor(self.dpi as f32 / PDF_POINTS_PER_INCH);
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| conversion_error(format!("render page {}: {e:?}", index + 1)))?;
        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px at {} DPI",
            index + 1,
            image.width(),
            image.height(),
            self.dpi
        );

        let out = self.output_path(pdf_path, index);
        if let Err(e) = image.save_with_format(&out, ImageFormat::Png) {
            // Best effort: never leave a truncated PNG behind.
            let _ = std::fs::remove_file(&out);
            return Err(conversion_error(format!("write {}: {e}", out.display())));
        }

        info!("Page {} written to {}", index + 1, out.display());
        Ok(out)
    }
}

/// Clamp a requested page to the document. `None` when there are no pages.
pub fn select_page(requested: usize, total_pages: usize) -> Option<usize> {
    if total_pages == 0 {
        None
    } else {
        Some(requested.min(total_pages - 1))
    }
}

/// 1-based page number for messages. Saturates for any requested index.
fn page_number(page_index: usize) -> usize {
    page_index.saturating_add(1)
}

static RE_UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\-]").expect("valid regex"));

/// `temp_page_<sanitised stem>_<page_index>.png`.
///
/// Every character of the stem other than word characters and `-` becomes `_`.
pub fn temp_page_file_name(pdf_path: &Path, page_index: usize) -> String {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let safe = RE_UNSAFE_NAME_CHARS.replace_all(&stem, "_");
    format!("temp_page_{safe}_{page_index}.png")
}

/// Bind to a pdfium shared library.
///
/// Resolution order: `PDFIUM_LIB_PATH` (a library file or the directory
/// holding it), then the current directory, then the system library path.
pub fn bind_pdfium() -> Result<Pdfium, PdfiumError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => {
            let path = PathBuf::from(p);
            if path.is_dir() {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&path))
            } else {
                Pdfium::bind_to_library(&path)
            }
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }?;
    Ok(Pdfium::new(bindings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_page_to_last() {
        assert_eq!(select_page(5, 2), Some(1));
        assert_eq!(select_page(1, 2), Some(1));
        assert_eq!(select_page(0, 2), Some(0));
    }

    #[test]
    fn largest_requested_page_clamps_without_overflow() {
        assert_eq!(select_page(usize::MAX, 3), Some(2));
        assert_eq!(page_number(usize::MAX), usize::MAX);
        assert_eq!(page_number(0), 1);
    }

    #[test]
    fn empty_document_has_no_page() {
        assert_eq!(select_page(0, 0), None);
    }

    #[test]
    fn temp_name_is_sanitised_and_deterministic() {
        let p = Path::new("/uploads/My ID (front).pdf");
        assert_eq!(temp_page_file_name(p, 0), "temp_page_My_ID__front__0.png");
        assert_eq!(temp_page_file_name(p, 0), temp_page_file_name(p, 0));
    }

    #[test]
    fn temp_name_keeps_dashes_and_underscores() {
        let p = Path::new("bank-statement_2024.pdf");
        assert_eq!(temp_page_file_name(p, 3), "temp_page_bank-statement_2024_3.png");
    }

    #[test]
    fn different_inputs_do_not_collide() {
        let a = temp_page_file_name(Path::new("a.pdf"), 0);
        let b = temp_page_file_name(Path::new("b.pdf"), 0);
        let a1 = temp_page_file_name(Path::new("a.pdf"), 1);
        assert_ne!(a, b);
        assert_ne!(a, a1);
    }

    #[test]
    fn output_path_lives_in_work_dir() {
        let r = PdfiumRasterizer::new(200, "/tmp/work");
        assert_eq!(
            r.output_path(Path::new("x.pdf"), 0),
            PathBuf::from("/tmp/work/temp_page_x_0.png")
        );
    }

    #[test]
    fn missing_pdf_is_not_found() {
        let r = PdfiumRasterizer::new(200, std::env::temp_dir());
        let err = r
            .rasterize(Path::new("/definitely/not/here.pdf"), 0)
            .unwrap_err();
        assert!(matches!(err, RasterError::NotFound { .. }));
    }
}
