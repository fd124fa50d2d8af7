//! Pipeline stages for document-to-JSON extraction.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and swapped behind its trait without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ llm ──▶ extract
//! (kind)    (pdfium)   (data URL) (VLM)   (JSON recovery)
//! ```
//!
//! 1. [`input`]: classify the upload as PDF, image, or unsupported
//! 2. [`render`]: rasterise one PDF page to a PNG in the work directory
//! 3. [`encode`]: base64-wrap the image bytes as a data URL
//! 4. [`llm`]: the only stage with network I/O
//! 5. [`extract`]: recover a JSON object from the model's free text

pub mod encode;
pub mod extract;
pub mod input;
pub mod llm;
pub mod render;
