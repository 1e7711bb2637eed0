//! Response parsing for structured (JSON mode) calls
//!
//! Providers asked for JSON do not always comply. Parsing never fails: when
//! the text cannot be read as JSON the trimmed text itself becomes the
//! message and callers decide what to do with it.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::warn;

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)\A```(?:json|JSON)?\s*\n(.*?)\n?```\z").expect("fence pattern is valid")
    })
}

/// Outcome of interpreting a provider's text as JSON
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// Text was valid JSON (possibly inside a markdown fence)
    Json(Value),
    /// Text was not JSON; carries the trimmed text
    Raw(String),
}

impl Parsed {
    pub fn into_value(self) -> Value {
        match self {
            Parsed::Json(value) => value,
            Parsed::Raw(text) => Value::String(text),
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Parsed::Json(_))
    }
}

/// Interpret provider text as JSON, falling back to the raw trimmed string
pub fn parse_structured(raw: &str) -> Parsed {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Parsed::Json(value);
    }

    // Models sometimes wrap the object in a ```json fence
    if let Some(inner) = fence_pattern()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
    {
        if let Ok(value) = serde_json::from_str::<Value>(inner.as_str().trim()) {
            return Parsed::Json(value);
        }
    }

    warn!(
        "JSON parsing failed, returning raw content ({} chars)",
        trimmed.len()
    );
    Parsed::Raw(trimmed.to_string())
}
