//! Error types for the doc2json library.
//!
//! Two distinct failure modes:
//!
//! * [`Doc2JsonError`]: **Fatal**: the extractor cannot be constructed at all
//!   (missing API key, invalid settings, HTTP client unavailable). Returned
//!   as `Err(Doc2JsonError)` before any upload is handled.
//!
//! * [`RasterError`], [`ExtractError`], [`VisionError`]: **Per-upload**: one
//!   document failed somewhere along rasterise → call → extract. These never
//!   escape the upload handler; each is rendered into a JSON error record via
//!   `to_error_record()` and shown in the results panel.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors returned while building the extractor.
#[derive(Debug, Error)]
pub enum Doc2JsonError {
    /// Builder or environment validation failed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The HTTP client could not be initialised (TLS backend, etc.).
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Stable machine-readable name of every per-upload failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    EmptyDocument,
    ConversionError,
    InvalidInput,
    NoJsonFound,
    InvalidJson,
    ExtractionError,
    Timeout,
    NetworkError,
    ApiError,
    MalformedResponse,
    UnsupportedFormat,
}

// ── Rasterisation ────────────────────────────────────────────────────────

/// Failure converting a PDF page into a raster image.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("PDF file not found: '{}'", path.display())]
    NotFound { path: PathBuf },

    #[error("PDF '{}' has no pages", path.display())]
    EmptyDocument { path: PathBuf },

    #[error("Error converting PDF '{}' to image: {detail}", path.display())]
    ConversionError { path: PathBuf, detail: String },
}

impl RasterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RasterError::NotFound { .. } => ErrorKind::NotFound,
            RasterError::EmptyDocument { .. } => ErrorKind::EmptyDocument,
            RasterError::ConversionError { .. } => ErrorKind::ConversionError,
        }
    }
}

// ── JSON recovery ────────────────────────────────────────────────────────

/// Failure recovering a JSON object from free-form model output.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The value handed to the extractor was not text.
    #[error("Invalid input: text must be a string.")]
    InvalidInput,

    #[error("No JSON block or discernible JSON object found in response.")]
    NoJsonFound,

    /// A candidate was found but did not parse, even after normalisation.
    #[error("Invalid JSON in model response: {message}")]
    InvalidJson {
        message: String,
        candidate: String,
        raw: String,
    },

    #[error("An unexpected error occurred during JSON extraction: {message}")]
    ExtractionError { message: String, raw: String },
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::InvalidInput => ErrorKind::InvalidInput,
            ExtractError::NoJsonFound => ErrorKind::NoJsonFound,
            ExtractError::InvalidJson { .. } => ErrorKind::InvalidJson,
            ExtractError::ExtractionError { .. } => ErrorKind::ExtractionError,
        }
    }

    /// Render as a JSON error record for the results panel.
    pub fn to_error_record(&self) -> Value {
        let mut record = base_record(self.to_string(), self.kind());
        match self {
            ExtractError::InvalidJson { candidate, raw, .. } => {
                record.insert("problematic_snippet".into(), Value::String(candidate.clone()));
                record.insert("raw_output".into(), Value::String(raw.clone()));
            }
            ExtractError::ExtractionError { raw, .. } => {
                record.insert("raw_output".into(), Value::String(raw.clone()));
            }
            ExtractError::InvalidInput | ExtractError::NoJsonFound => {}
        }
        Value::Object(record)
    }
}

// ── Remote call ──────────────────────────────────────────────────────────

/// Failure analysing an image with the remote vision model.
#[derive(Debug, Error)]
pub enum VisionError {
    /// No image path was supplied, or nothing exists at it.
    #[error("Image file does not exist at path: '{}'", path.display())]
    NotFound { path: PathBuf },

    /// The image exists but could not be read.
    #[error("Failed to read image '{}': {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Network Error: request to the vision API timed out after {secs}s.")]
    Timeout { secs: u64 },

    #[error("Network Error: {0}")]
    NetworkError(String),

    /// The API answered with a non-success HTTP status.
    #[error("Vision API returned HTTP {status}")]
    ApiError { status: u16, body: String },

    /// The API answered 2xx but without `choices[0].message.content`.
    #[error("Unexpected API response format from vision model.")]
    MalformedResponse { body: Value },

    /// The model replied, but no JSON could be recovered from its text.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl VisionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VisionError::NotFound { .. } | VisionError::ImageRead { .. } => ErrorKind::NotFound,
            VisionError::Timeout { .. } => ErrorKind::Timeout,
            VisionError::NetworkError(_) => ErrorKind::NetworkError,
            VisionError::ApiError { .. } => ErrorKind::ApiError,
            VisionError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            VisionError::Extract(e) => e.kind(),
        }
    }

    /// Render as a JSON error record for the results panel.
    pub fn to_error_record(&self) -> Value {
        if let VisionError::Extract(e) = self {
            return e.to_error_record();
        }
        let mut record = base_record(self.to_string(), self.kind());
        match self {
            VisionError::ApiError { status, body } => {
                record.insert("status".into(), json!(status));
                record.insert("response_body".into(), Value::String(body.clone()));
            }
            VisionError::MalformedResponse { body } => {
                record.insert("raw_api_response".into(), body.clone());
            }
            _ => {}
        }
        Value::Object(record)
    }
}

fn base_record(message: String, kind: ErrorKind) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("error".into(), Value::String(message));
    record.insert("kind".into(), json!(kind));
    record
}

/// Build a bare `{error, kind}` record for failures that have no error type
/// of their own (unsupported uploads, failed PDF conversion).
pub fn error_record(message: impl Into<String>, kind: ErrorKind) -> Value {
    Value::Object(base_record(message.into(), kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_json_record_carries_diagnostics() {
        let e = ExtractError::InvalidJson {
            message: "expected value at line 1 column 2".into(),
            candidate: "{oops}".into(),
            raw: "here: {oops}".into(),
        };
        let rec = e.to_error_record();
        assert!(rec["error"].as_str().unwrap().contains("line 1 column 2"));
        assert_eq!(rec["kind"], "InvalidJson");
        assert_eq!(rec["problematic_snippet"], "{oops}");
        assert_eq!(rec["raw_output"], "here: {oops}");
    }

    #[test]
    fn extract_errors_forward_through_vision_error() {
        let e = VisionError::from(ExtractError::NoJsonFound);
        assert_eq!(e.kind(), ErrorKind::NoJsonFound);
        assert_eq!(e.to_error_record()["kind"], "NoJsonFound");
    }

    #[test]
    fn api_error_record_has_status() {
        let e = VisionError::ApiError {
            status: 401,
            body: "no auth".into(),
        };
        let rec = e.to_error_record();
        assert_eq!(rec["status"], 401);
        assert_eq!(rec["response_body"], "no auth");
        assert!(e.to_string().contains("401"));
    }

    #[test]
    fn malformed_response_keeps_raw_body() {
        let body = json!({"choices": []});
        let rec = VisionError::MalformedResponse { body: body.clone() }.to_error_record();
        assert_eq!(rec["raw_api_response"], body);
        assert_eq!(rec["kind"], "MalformedResponse");
    }

    #[test]
    fn raster_error_display() {
        let e = RasterError::EmptyDocument {
            path: PathBuf::from("blank.pdf"),
        };
        assert!(e.to_string().contains("blank.pdf"));
        assert_eq!(e.kind(), ErrorKind::EmptyDocument);
    }

    #[test]
    fn timeout_display_mentions_seconds() {
        let e = VisionError::Timeout { secs: 120 };
        assert!(e.to_string().contains("120s"));
    }
}
