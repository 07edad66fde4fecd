//! Best-effort extraction of a JSON payload from free-form model output.
//!
//! Models are asked for bare JSON but routinely wrap it in markdown fences,
//! prepend a sentence of prose, or emit something that is almost-but-not-quite
//! valid. Every generation endpoint funnels the raw completion through
//! [`extract`], choosing the expected top-level shape and what should happen
//! when a strict parse fails.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

/// Message carried by the sentinel record.
pub const PARSE_FAILURE: &str = "Failed to parse AI response";

/// Top-level JSON shape the caller asked the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Object,
    Array,
}

impl Expected {
    fn delimiters(self) -> (char, char) {
        match self {
            Self::Object => ('{', '}'),
            Self::Array => ('[', ']'),
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

/// What to do when the candidate does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Split the text on commas into a flat list of strings. Only meaningful
    /// for flat string-list outputs such as domain names.
    SplitList,
    /// Return the sentinel error record.
    Sentinel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    /// Strict parse succeeded with the expected shape.
    Parsed(Value),
    /// Degraded comma-split recovery.
    Recovered(Vec<String>),
    /// `{"error": ..., "raw": ...}` placeholder.
    Sentinel(Value),
}

impl Extracted {
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel(_))
    }

    /// Flatten into a JSON value; recovered lists become string arrays.
    pub fn into_value(self) -> Value {
        match self {
            Self::Parsed(v) | Self::Sentinel(v) => v,
            Self::Recovered(items) => Value::Array(items.into_iter().map(Value::String).collect()),
        }
    }

    /// Parsed value if the model produced usable JSON, `None` for recovered
    /// lists and sentinels.
    pub fn parsed(self) -> Option<Value> {
        match self {
            Self::Parsed(v) => Some(v),
            _ => None,
        }
    }
}

fn fence_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // a line holding only an opening fence (optional language tag) or a closing fence
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_+.\-]*[ \t]*$").expect("valid fence line regex")
    })
}

fn fence_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // a language tag only follows a fence that opens the string
    RE.get_or_init(|| Regex::new(r"^[ \t]*```[A-Za-z0-9_+.\-]*|```").expect("valid fence token regex"))
}

/// Remove markdown fence lines and trim.
pub fn strip_fences(text: &str) -> String {
    fence_line_re().replace_all(text, "").trim().to_string()
}

/// First opening delimiter through the last closing one, inclusive.
///
/// Naive on purpose: a stray closing brace in trailing prose is captured too,
/// and the resulting candidate then fails to parse.
pub fn candidate(text: &str, expected: Expected) -> Option<&str> {
    let (open, close) = expected.delimiters();
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Lossy comma split used when strict parsing fails on a flat list.
pub fn recover_list(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '{' | '}' | '"' | '\''))
        .collect();
    cleaned
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

/// Normalize and parse a raw completion. Never fails: the result is either the
/// parsed value, a recovered list or the sentinel record.
pub fn extract(raw: &str, expected: Expected, recovery: Recovery) -> Extracted {
    log::debug!("AI raw response: {}", preview(raw, 500));

    let stripped = strip_fences(raw);
    let candidate = candidate(&stripped, expected).unwrap_or(&stripped);

    match serde_json::from_str::<Value>(candidate) {
        Ok(value) if expected.matches(&value) => return Extracted::Parsed(clean_value(value)),
        Ok(_) => log::warn!("AI response parsed but has the wrong shape (wanted {:?})", expected),
        Err(e) => log::warn!("AI response is not valid JSON: {}", e),
    }

    match recovery {
        Recovery::SplitList => Extracted::Recovered(
            recover_list(candidate)
                .into_iter()
                .map(|s| clean_string(&s))
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        Recovery::Sentinel => {
            log::warn!("Failed to parse AI response: {}", preview(raw, 300));
            Extracted::Sentinel(sentinel(raw))
        }
    }
}

/// The fixed error-shaped record returned instead of a parse failure.
pub fn sentinel(raw: &str) -> Value {
    json!({"error": PARSE_FAILURE, "raw": preview(raw, 300)})
}

fn clean_string(s: &str) -> String {
    if s.contains("```") {
        fence_token_re().replace_all(s, "").trim().to_string()
    } else {
        s.to_string()
    }
}

fn clean_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(clean_string(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(clean_value).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, clean_value(v))).collect()),
        other => other,
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
