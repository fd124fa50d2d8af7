//! Configuration for document extraction.
//!
//! Every knob the pipeline reads lives in [`ExtractorConfig`], built through
//! [`ExtractorConfigBuilder`]. The API key is validated when the config is
//! built, so a missing key fails at startup with
//! [`Doc2JsonError::Configuration`] instead of surfacing later as an opaque
//! 401 from the inference API.

use crate::error::Doc2JsonError;
use std::fmt;
use std::path::PathBuf;

/// Environment variable holding the inference API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Default vision model on the OpenRouter catalogue.
pub const DEFAULT_MODEL: &str = "opengvlab/internvl3-14b:free";

/// Default OpenAI-compatible chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Configuration for the vision extraction pipeline.
///
/// # Example
/// ```rust
/// use doc2json::ExtractorConfig;
///
/// let config = ExtractorConfig::builder()
///     .api_key("sk-or-test")
///     .dpi(150)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 4096);
/// ```
#[derive(Clone)]
pub struct ExtractorConfig {
    /// Bearer token sent with every request.
    pub api_key: String,

    /// Model identifier placed in the request body.
    pub model: String,

    /// Chat-completions URL.
    pub endpoint: String,

    /// Generation-length cap for the reply. Default: 4096.
    pub max_tokens: u32,

    /// Bounded wait for the whole HTTP exchange, in seconds. Default: 120.
    pub timeout_secs: u64,

    /// Rendering density for PDF pages. Default: 200.
    pub dpi: u32,

    /// 0-based PDF page to analyse. Out-of-range values clamp to the last page.
    pub page_index: usize,

    /// Directory receiving derived `temp_page_*.png` rasters. Default: `.`.
    pub work_dir: PathBuf,

    /// Instruction override. If None, uses [`crate::prompts::EXTRACTION_PROMPT`].
    pub prompt: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_tokens: 4096,
            timeout_secs: 120,
            dpi: 200,
            page_index: 0,
            work_dir: PathBuf::from("."),
            prompt: None,
        }
    }
}

impl fmt::Debug for ExtractorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("dpi", &self.dpi)
            .field("page_index", &self.page_index)
            .field("work_dir", &self.work_dir)
            .field("prompt", &self.prompt.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

impl ExtractorConfig {
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults plus the API key from [`API_KEY_ENV`].
    ///
    /// Fails with [`Doc2JsonError::Configuration`] when the variable is unset
    /// or blank.
    pub fn from_env() -> Result<Self, Doc2JsonError> {
        let key = std::env::var(API_KEY_ENV).unwrap_or_default();
        Self::builder().api_key(key).build()
    }

    /// The instruction sent with every image.
    pub fn prompt_text(&self) -> &str {
        self.prompt
            .as_deref()
            .unwrap_or(crate::prompts::EXTRACTION_PROMPT)
    }
}

/// Builder for [`ExtractorConfig`].
#[derive(Debug)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn page_index(mut self, idx: usize) -> Self {
        self.config.page_index = idx;
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = dir.into();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractorConfig, Doc2JsonError> {
        let c = &self.config;
        if c.api_key.trim().is_empty() {
            return Err(Doc2JsonError::Configuration(format!(
                "API key is missing. Set the {API_KEY_ENV} environment variable."
            )));
        }
        if c.model.trim().is_empty() {
            return Err(Doc2JsonError::Configuration("Model must not be empty".into()));
        }
        if !c.endpoint.starts_with("http://") && !c.endpoint.starts_with("https://") {
            return Err(Doc2JsonError::Configuration(format!(
                "Endpoint must be an HTTP(S) URL, got '{}'",
                c.endpoint
            )));
        }
        if c.dpi < 72 || c.dpi > 600 {
            return Err(Doc2JsonError::Configuration(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.max_tokens == 0 {
            return Err(Doc2JsonError::Configuration("max_tokens must be ≥ 1".into()));
        }
        if c.timeout_secs == 0 {
            return Err(Doc2JsonError::Configuration("Timeout must be ≥ 1s".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let c = ExtractorConfig::builder().api_key("k").build().unwrap();
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(c.max_tokens, 4096);
        assert_eq!(c.timeout_secs, 120);
        assert_eq!(c.dpi, 200);
        assert_eq!(c.page_index, 0);
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let err = ExtractorConfig::builder().build().unwrap_err();
        assert!(matches!(err, Doc2JsonError::Configuration(_)));
        assert!(err.to_string().contains(API_KEY_ENV));

        let err = ExtractorConfig::builder().api_key("   ").build().unwrap_err();
        assert!(matches!(err, Doc2JsonError::Configuration(_)));
    }

    #[test]
    fn rejects_out_of_range_dpi() {
        assert!(ExtractorConfig::builder().api_key("k").dpi(10).build().is_err());
        assert!(ExtractorConfig::builder().api_key("k").dpi(900).build().is_err());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let err = ExtractorConfig::builder()
            .api_key("k")
            .endpoint("ftp://example.org")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ftp://"));
    }

    #[test]
    fn debug_redacts_key() {
        let c = ExtractorConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn prompt_override() {
        let c = ExtractorConfig::builder()
            .api_key("k")
            .prompt("custom")
            .build()
            .unwrap();
        assert_eq!(c.prompt_text(), "custom");
    }
}
