//! Locate the JSON action array inside free-form model output.
//!
//! Strategies, first success wins:
//! 1. the whole text is JSON;
//! 2. a fenced ```` ```json ```` block containing a bracketed array;
//! 3. the first complete top-level array starting at a `[`, ignoring any
//!    trailing prose.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static RE_FENCED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```json\s*(\[.*?\])\s*```").unwrap());

/// Parse the model output into a JSON value, or return the underlying
/// parser error message of the last strategy attempted.
pub fn extract_json(text: &str) -> Result<Value, String> {
    let mut last_err = match serde_json::from_str::<Value>(text) {
        Ok(v) => return Ok(v),
        Err(e) => e.to_string(),
    };

    if let Some(span) = RE_FENCED.captures(text).and_then(|c| c.get(1)) {
        match serde_json::from_str::<Value>(span.as_str()) {
            Ok(v) => return Ok(v),
            Err(e) => last_err = e.to_string(),
        }
    }

    let mut first_err = None;
    for (start, _) in text.match_indices('[') {
        match first_array(&text[start..]) {
            Ok(v) => return Ok(v),
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
    }
    Err(first_err.unwrap_or(last_err))
}

/// Read exactly one JSON value from the head of `text`; it must be an array.
fn first_array(text: &str) -> Result<Value, String> {
    match serde_json::Deserializer::from_str(text).into_iter::<Value>().next() {
        Some(Ok(v @ Value::Array(_))) => Ok(v),
        Some(Ok(_)) => Err("bracketed span is not an array".into()),
        Some(Err(e)) => Err(e.to_string()),
        None => Err("empty bracketed span".into()),
    }
}
