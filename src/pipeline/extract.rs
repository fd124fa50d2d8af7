//! JSON recovery: pull a single JSON object out of free-form model text.
//!
//! Even when told to answer with bare JSON, VLMs wrap it in ```json fences,
//! prepend a sentence, or leave a trailing comma before a closing brace.
//! Recovery is an ordered list of pure candidate strategies; the first one
//! that yields a `{...}` substring wins:
//!
//! 1. the first fenced block labelled `json` whose body is an object
//! 2. the whole (trimmed) text, when it is a single `{...}` object
//! 3. the span from the first `{` to the last `}`
//!
//! The winning candidate gets one trailing-comma normalisation pass and is
//! parsed with `serde_json`.

use crate::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

/// A candidate strategy: returns the substring to parse, if it finds one.
type Strategy = fn(&str) -> Option<&str>;

/// Strategies in priority order, with names for logging.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("fenced", fenced_json_block),
    ("whole", whole_object),
    ("span", brace_span),
];

/// Recover a JSON object from model output.
pub fn extract(text: &str) -> Result<Value, ExtractError> {
    let (strategy, candidate) = find_candidate(text).ok_or(ExtractError::NoJsonFound)?;
    debug!("JSON candidate found by '{}' strategy ({} bytes)", strategy, candidate.len());

    let normalised = strip_trailing_commas(candidate);
    let value: Value = serde_json::from_str(&normalised).map_err(|e| ExtractError::InvalidJson {
        message: e.to_string(),
        candidate: normalised.to_string(),
        raw: text.to_string(),
    })?;

    if !value.is_object() {
        return Err(ExtractError::ExtractionError {
            message: "recovered JSON is not an object".into(),
            raw: text.to_string(),
        });
    }
    Ok(value)
}

/// Like [`extract`], for callers holding an arbitrary JSON value (e.g. the
/// `content` field of a completion). Anything but a string is rejected.
pub fn extract_value(content: &Value) -> Result<Value, ExtractError> {
    match content {
        Value::String(text) => extract(text),
        _ => Err(ExtractError::InvalidInput),
    }
}

fn find_candidate(text: &str) -> Option<(&'static str, &str)> {
    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| strategy(text).map(|c| (*name, c)))
}

// ── Strategy 1: fenced ```json block ─────────────────────────────────────────

static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("valid regex"));

fn fenced_json_block(text: &str) -> Option<&str> {
    RE_JSON_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

// ── Strategy 2: the whole text is one object ─────────────────────────────────

fn whole_object(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (trimmed.len() >= 2 && trimmed.starts_with('{') && trimmed.ends_with('}')).then_some(trimmed)
}

// ── Strategy 3: first `{` .. last `}` ────────────────────────────────────────

fn brace_span(text: &str) -> Option<&str> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    (last > first).then(|| &text[first..=last])
}

// ── Normalisation ────────────────────────────────────────────────────────────

static RE_TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

/// Drop a comma sitting directly before `}` or `]`. Single pass.
fn strip_trailing_commas(candidate: &str) -> Cow<'_, str> {
    RE_TRAILING_COMMA.replace_all(candidate, "$1")
}
