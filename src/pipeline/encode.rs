//! Image encoding: file bytes → base64 `data:` URL.
//!
//! OpenAI-compatible chat APIs accept images inline as data URLs inside the
//! `image_url` content part. The bytes are sent untouched; only the MIME
//! type is inferred from the extension.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// MIME type used when the extension does not name an image type.
pub const FALLBACK_MIME: &str = "image/png";

/// Pick the image MIME type for `path`.
pub fn image_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

/// Wrap raw image bytes as `data:<mime>;base64,<payload>`.
pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded image → {} bytes base64", b64.len());
    format!("data:{mime};base64,{b64}")
}
