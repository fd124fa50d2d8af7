//! Progress-callback trait for upload events.
//!
//! Inject an [`Arc<dyn UploadProgressCallback>`] via
//! [`crate::upload::UploadOrchestrator::with_progress`] to observe each stage
//! of an upload as it runs. The CLI uses it to drive a spinner; a server
//! could forward the same events to a WebSocket.

use crate::pipeline::input::FileKind;
use std::path::Path;
use std::sync::Arc;

/// Called by the orchestrator as an upload moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait UploadProgressCallback: Send + Sync {
    /// Called once the upload has been classified.
    fn on_upload_start(&self, path: &Path, kind: FileKind) {
        let _ = (path, kind);
    }

    /// Called after a PDF page has been written to `raster_path`.
    fn on_rasterized(&self, raster_path: &Path) {
        let _ = raster_path;
    }

    /// Called just before the image is sent to the vision model.
    fn on_analysis_start(&self, image_path: &Path) {
        let _ = image_path;
    }

    /// Called once with the final outcome.
    fn on_upload_complete(&self, is_error: bool) {
        let _ = is_error;
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl UploadProgressCallback for NoopProgressCallback {}

/// Convenience alias for the type held by the orchestrator.
pub type ProgressCallback = Arc<dyn UploadProgressCallback>;
