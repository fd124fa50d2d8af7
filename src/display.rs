//! What the results view shows after an upload.
//!
//! [`DisplayState`] is a pure projection of one upload's outcome: a preview
//! of the original file, the JSON panel, and the two placeholder messages.
//! The preview is a single enum, so a PDF preview and an image preview can
//! never be visible at the same time.

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Placeholder shown in the preview tab when there is nothing to preview.
pub const NO_PREVIEW_MESSAGE: &str = "Upload a document to see a preview.";

/// Placeholder shown in the JSON tab before any analysis has run.
pub const NO_JSON_MESSAGE: &str = "Analysis results will appear here.";

/// Preview of the original upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum Preview {
    None,
    Pdf(PathBuf),
    Image(PathBuf),
}

/// Everything the results view needs to render one upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub preview: Preview,
    /// Extraction result, error record, or status object.
    pub json: Value,
    pub json_visible: bool,
    /// Preview-tab placeholder; `None` when hidden.
    pub preview_placeholder: Option<&'static str>,
    /// JSON-tab placeholder; `None` when hidden.
    pub json_placeholder: Option<&'static str>,
    /// Set only when `json` is an error record built by the pipeline.
    #[serde(rename = "is_error")]
    failed: bool,
}

impl DisplayState {
    /// Status-only state: nothing previewed, JSON hidden, both placeholders shown.
    pub fn status(json: Value) -> Self {
        Self {
            preview: Preview::None,
            json,
            json_visible: false,
            preview_placeholder: Some(NO_PREVIEW_MESSAGE),
            json_placeholder: Some(NO_JSON_MESSAGE),
            failed: false,
        }
    }

    pub fn pdf_preview_visible(&self) -> bool {
        matches!(self.preview, Preview::Pdf(_))
    }

    pub fn image_preview_visible(&self) -> bool {
        matches!(self.preview, Preview::Image(_))
    }

    /// Path currently previewed, if any.
    pub fn preview_path(&self) -> Option<&Path> {
        match &self.preview {
            Preview::Pdf(p) | Preview::Image(p) => Some(p),
            Preview::None => None,
        }
    }

    /// Whether the JSON panel holds an error record.
    ///
    /// Extraction results pass through as-is and may carry their own
    /// `"error"` field; only [`Self::show_error`] marks the state as failed.
    pub fn is_error(&self) -> bool {
        self.failed
    }

    /// Show `preview` and hide the preview placeholder.
    pub(crate) fn show_preview(&mut self, preview: Preview) {
        self.preview = preview;
        self.preview_placeholder = None;
    }

    /// Put `json` in the panel, make it visible, and hide the JSON placeholder.
    pub(crate) fn show_json(&mut self, json: Value) {
        self.json = json;
        self.json_visible = true;
        self.json_placeholder = None;
    }

    /// Like [`Self::show_json`], for an error record.
    pub(crate) fn show_error(&mut self, record: Value) {
        self.show_json(record);
        self.failed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_state_hides_everything_but_placeholders() {
        let s = DisplayState::status(json!({"status": "waiting"}));
        assert!(!s.pdf_preview_visible());
        assert!(!s.image_preview_visible());
        assert!(!s.json_visible);
        assert_eq!(s.preview_placeholder, Some(NO_PREVIEW_MESSAGE));
        assert_eq!(s.json_placeholder, Some(NO_JSON_MESSAGE));
        assert!(!s.is_error());
    }

    #[test]
    fn showing_json_hides_placeholder() {
        let mut s = DisplayState::status(json!({}));
        s.show_json(json!({"document_type": "Invoice"}));
        assert!(s.json_visible);
        assert!(s.json_placeholder.is_none());
        assert!(!s.is_error());
    }

    #[test]
    fn error_flag_comes_from_show_error_not_the_payload() {
        let mut result = DisplayState::status(json!({}));
        result.show_json(json!({"document_type": "Incident report", "error": "E-42"}));
        assert!(!result.is_error());

        let mut failed = DisplayState::status(json!({}));
        failed.show_error(json!({"error": "boom", "kind": "Timeout"}));
        assert!(failed.json_visible);
        assert!(failed.json_placeholder.is_none());
        assert!(failed.is_error());
        assert_eq!(serde_json::to_value(&failed).unwrap()["is_error"], true);
    }

    #[test]
    fn preview_serialises_with_kind_tag() {
        let v = serde_json::to_value(Preview::Image(PathBuf::from("id.png"))).unwrap();
        assert_eq!(v, json!({"kind": "image", "path": "id.png"}));
        let v = serde_json::to_value(Preview::None).unwrap();
        assert_eq!(v, json!({"kind": "none"}));
    }
}
