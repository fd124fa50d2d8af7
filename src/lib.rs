//! # doc2json
//!
//! Extract structured JSON from scanned documents using Vision Language
//! Models (VLMs).
//!
//! Upload a PDF or an image of an ID card, invoice, certificate or form; the
//! crate renders the first page (for PDFs), sends it to a vision model with an
//! instruction to classify the document and extract every field, and recovers
//! a JSON object from whatever text the model returns.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Classify  pdf / image / unsupported, by extension
//!  ├─ 2. Render    PDF page → temp_page_<name>_<n>.png via pdfium (spawn_blocking)
//!  ├─ 3. Encode    bytes → base64 data URL
//!  ├─ 4. VLM       one chat-completion call, 120 s timeout, no retries
//!  ├─ 5. Recover   fenced block / whole text / brace span → JSON object
//!  └─ 6. Display   preview + JSON panel (result or error record)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2json::{ExtractorConfig, UploadOrchestrator};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads the API key from API_KEY; fails fast if it is missing.
//!     let config = ExtractorConfig::from_env()?;
//!     let orchestrator = UploadOrchestrator::from_config(config)?;
//!     let state = orchestrator.handle_upload(Some(Path::new("passport.pdf"))).await;
//!     println!("{}", serde_json::to_string_pretty(&state.json)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2json` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractorConfig, ExtractorConfigBuilder};
pub use display::{DisplayState, Preview};
pub use error::{Doc2JsonError, ErrorKind, ExtractError, RasterError, VisionError};
pub use pipeline::extract::{extract, extract_value};
pub use pipeline::input::{FileKind, UploadedFile};
pub use pipeline::llm::{VisionAnalyzer, VisionClient};
pub use pipeline::render::{PageRasterizer, PdfiumRasterizer};
pub use progress::{NoopProgressCallback, ProgressCallback, UploadProgressCallback};
pub use upload::UploadOrchestrator;

/// Re-exported so [`VisionAnalyzer`] can be implemented outside the crate.
pub use async_trait::async_trait;
