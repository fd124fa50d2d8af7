//! VLM interaction: send one document image, recover JSON from the reply.
//!
//! The request is a single OpenAI-compatible chat completion with one user
//! turn: the extraction instruction as a text part followed by the image as
//! an inline `image_url` data URL. The reply's first choice is handed to
//! [`crate::pipeline::extract`].
//!
//! ## No retries
//!
//! A failed call (timeout, transport error, HTTP error status) is reported to
//! the caller as-is. The user re-triggers the upload if they want another try.

use crate::config::ExtractorConfig;
use crate::error::{Doc2JsonError, VisionError};
use crate::pipeline::{encode, extract};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Analyses a document image and returns the extracted JSON object.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    async fn analyze(&self, image_path: &Path) -> Result<Value, VisionError>;
}

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

/// `choices[0].message.content`, if the body has that shape and it is not null.
fn first_choice_content(body: &Value) -> Option<&Value> {
    let content = body
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?;
    (!content.is_null()).then_some(content)
}

// ── Client ───────────────────────────────────────────────────────────────────

/// HTTP client for an OpenAI-compatible vision endpoint.
pub struct VisionClient {
    http: reqwest::Client,
    config: ExtractorConfig,
}

impl VisionClient {
    /// Build a client whose every request is bounded by `config.timeout_secs`.
    pub fn new(config: ExtractorConfig) -> Result<Self, Doc2JsonError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("doc2json/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Doc2JsonError::HttpClient(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub(crate) fn build_request(&self, data_url: String) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: self.config.prompt_text(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> VisionError {
        if e.is_timeout() {
            warn!("Request to vision API timed out after {}s", self.config.timeout_secs);
            VisionError::Timeout {
                secs: self.config.timeout_secs,
            }
        } else {
            warn!("Network error calling vision API: {}", e);
            VisionError::NetworkError(e.to_string())
        }
    }
}

#[async_trait]
impl VisionAnalyzer for VisionClient {
    async fn analyze(&self, image_path: &Path) -> Result<Value, VisionError> {
        if image_path.as_os_str().is_empty() || !image_path.exists() {
            return Err(VisionError::NotFound {
                path: image_path.to_path_buf(),
            });
        }

        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|source| VisionError::ImageRead {
                path: image_path.to_path_buf(),
                source,
            })?;
        let data_url = encode::to_data_url(&bytes, &encode::image_mime(image_path));
        let request = self.build_request(data_url);

        info!(
            "Sending {} ({} bytes) to {} [{}]",
            image_path.display(),
            bytes.len(),
            self.config.endpoint,
            self.config.model
        );
        let start = Instant::now();

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to read error body for HTTP {}: {}", status, e);
                    format!("<failed to read response body: {e}>")
                }
            };
            warn!("Vision API returned HTTP {}", status);
            return Err(VisionError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.bytes().await.map_err(|e| self.transport_error(e))?;
        debug!(
            "Vision API replied in {:?} ({} bytes)",
            start.elapsed(),
            raw.len()
        );

        let body: Value = serde_json::from_slice(&raw).map_err(|_| VisionError::MalformedResponse {
            body: Value::String(String::from_utf8_lossy(&raw).into_owned()),
        })?;

        let Some(content) = first_choice_content(&body) else {
            warn!("Unexpected API response format: {}", body);
            return Err(VisionError::MalformedResponse { body });
        };

        Ok(extract::extract_value(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> VisionClient {
        let config = ExtractorConfig::builder()
            .api_key("test-key")
            .model("vendor/vision-model")
            .max_tokens(512)
            .prompt("Extract everything.")
            .build()
            .unwrap();
        VisionClient::new(config).unwrap()
    }

    #[test]
    fn request_body_shape() {
        let c = client();
        let body = serde_json::to_value(c.build_request("data:image/png;base64,AA==".into())).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "vendor/vision-model",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "Extract everything."},
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,AA=="}}
                    ]
                }],
                "max_tokens": 512
            })
        );
    }

    #[test]
    fn content_of_first_choice() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "{}"}}]});
        assert_eq!(first_choice_content(&body), Some(&json!("{}")));
    }

    #[test]
    fn malformed_shapes_have_no_content() {
        for body in [
            json!({}),
            json!({"choices": []}),
            json!({"choices": "nope"}),
            json!({"choices": [{}]}),
            json!({"choices": [{"message": {}}]}),
            json!({"choices": [{"message": {"content": null}}]}),
        ] {
            assert_eq!(first_choice_content(&body), None, "{body}");
        }
    }

    #[tokio::test]
    async fn missing_image_is_not_found() {
        let err = client()
            .analyze(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, VisionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn empty_path_is_not_found() {
        let err = client().analyze(Path::new("")).await.unwrap_err();
        assert!(matches!(err, VisionError::NotFound { .. }));
    }
}
