//! Upload handling: one file in, one [`DisplayState`] out.
//!
//! ```text
//! upload ─▶ classify ─┬─ pdf ───▶ rasterise page ─┐
//!                     ├─ image ───────────────────┼─▶ analyse ─▶ cleanup ─▶ DisplayState
//!                     └─ other ─▶ error record    │
//!                   (none) ─▶ status only         │
//! ```
//!
//! Every failure along the way is turned into a JSON error record in the
//! results panel; [`UploadOrchestrator::handle_upload`] itself cannot fail.
//! Each call is self-contained and strictly sequential. The only thing two
//! concurrent calls share is the derived raster path in the work directory.

use crate::config::ExtractorConfig;
use crate::display::{DisplayState, Preview};
use crate::error::{error_record, Doc2JsonError, ErrorKind, RasterError};
use crate::pipeline::input::{FileKind, UploadedFile};
use crate::pipeline::llm::{VisionAnalyzer, VisionClient};
use crate::pipeline::render::{PageRasterizer, PdfiumRasterizer};
use crate::progress::{NoopProgressCallback, ProgressCallback};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Status shown when the upload event carries no file.
pub const NO_DOCUMENT_STATUS: &str = "No document provided. Please upload a file.";

/// Status held by the JSON panel before an analysis result replaces it.
pub const AWAITING_STATUS: &str = "Awaiting document...";

/// Error shown for extensions outside the supported set.
pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Unsupported file format. Please upload PDF, PNG, JPG, JPEG, BMP, or GIF.";

/// Drives rasterisation and analysis for upload events.
pub struct UploadOrchestrator {
    rasterizer: Arc<dyn PageRasterizer>,
    analyzer: Arc<dyn VisionAnalyzer>,
    page_index: usize,
    progress: ProgressCallback,
}

impl UploadOrchestrator {
    pub fn new(
        rasterizer: Arc<dyn PageRasterizer>,
        analyzer: Arc<dyn VisionAnalyzer>,
        page_index: usize,
    ) -> Self {
        Self {
            rasterizer,
            analyzer,
            page_index,
            progress: Arc::new(NoopProgressCallback),
        }
    }

    /// pdfium rasteriser plus HTTP vision client, both from `config`.
    pub fn from_config(config: ExtractorConfig) -> Result<Self, Doc2JsonError> {
        let rasterizer = PdfiumRasterizer::new(config.dpi, config.work_dir.clone());
        let page_index = config.page_index;
        let client = VisionClient::new(config)?;
        Ok(Self::new(Arc::new(rasterizer), Arc::new(client), page_index))
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// Process one upload event and return what the results view should show.
    pub async fn handle_upload(&self, file: Option<&Path>) -> DisplayState {
        let Some(path) = file else {
            info!("Upload event without a file");
            let state = DisplayState::status(json!({ "status": NO_DOCUMENT_STATUS }));
            return self.finish(state);
        };

        let upload = UploadedFile::new(path);
        info!("Handling upload: {} ({:?})", upload.path.display(), upload.kind);
        self.progress.on_upload_start(&upload.path, upload.kind);

        let mut state = DisplayState::status(json!({ "status": AWAITING_STATUS }));

        let (image, derived) = match upload.kind {
            FileKind::Pdf => {
                state.show_preview(Preview::Pdf(upload.path.clone()));
                match self.rasterize(&upload.path).await {
                    Ok(raster) => {
                        self.progress.on_rasterized(&raster);
                        (raster, true)
                    }
                    Err(e) => {
                        error!("{}", e);
                        let mut record = error_record(
                            format!("Failed to convert PDF: {}.", upload.display_name()),
                            e.kind(),
                        );
                        record["detail"] = Value::String(e.to_string());
                        state.show_error(record);
                        return self.finish(state);
                    }
                }
            }
            FileKind::Image => {
                state.show_preview(Preview::Image(upload.path.clone()));
                (upload.path.clone(), false)
            }
            FileKind::Unsupported => {
                error!("{} ({})", UNSUPPORTED_FORMAT_MESSAGE, upload.display_name());
                state.show_error(error_record(
                    UNSUPPORTED_FORMAT_MESSAGE,
                    ErrorKind::UnsupportedFormat,
                ));
                return self.finish(state);
            }
        };

        self.progress.on_analysis_start(&image);
        match self.analyzer.analyze(&image).await {
            Ok(value) => state.show_json(value),
            Err(e) => {
                error!("Extraction failed for {}: {}", upload.display_name(), e);
                state.show_error(e.to_error_record());
            }
        }

        if derived {
            remove_derived_raster(&image, &upload.path);
        }

        self.finish(state)
    }

    /// Rasterise the configured page on the blocking pool.
    async fn rasterize(&self, pdf_path: &Path) -> Result<PathBuf, RasterError> {
        let rasterizer = Arc::clone(&self.rasterizer);
        let path = pdf_path.to_path_buf();
        let page_index = self.page_index;

        tokio::task::spawn_blocking(move || rasterizer.rasterize(&path, page_index))
            .await
            .unwrap_or_else(|e| {
                Err(RasterError::ConversionError {
                    path: pdf_path.to_path_buf(),
                    detail: format!("render task panicked: {e}"),
                })
            })
    }

    fn finish(&self, state: DisplayState) -> DisplayState {
        self.progress.on_upload_complete(state.is_error());
        state
    }
}

/// Delete a derived raster. Never touches the original upload; failures are
/// logged only.
fn remove_derived_raster(raster: &Path, original: &Path) {
    if raster == original || !raster.exists() {
        return;
    }
    match std::fs::remove_file(raster) {
        Ok(()) => info!("Temporary image '{}' deleted.", raster.display()),
        Err(e) => warn!("Error deleting temporary image '{}': {}", raster.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_never_removes_the_original() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("scan.png");
        std::fs::write(&original, b"png").unwrap();

        remove_derived_raster(&original, &original);
        assert!(original.exists());
    }

    #[test]
    fn cleanup_removes_derived_file() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("scan.pdf");
        let raster = dir.path().join("temp_page_scan_0.png");
        std::fs::write(&raster, b"png").unwrap();

        remove_derived_raster(&raster, &original);
        assert!(!raster.exists());
    }

    #[test]
    fn cleanup_of_missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        remove_derived_raster(&dir.path().join("gone.png"), &dir.path().join("a.pdf"));
    }
}
