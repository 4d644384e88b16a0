//! Lenient-about-fencing, strict-about-JSON parsing of model output.
//!
//! Models asked for JSON frequently wrap it in a markdown code fence. Fence
//! markers are removed wherever they appear; the remainder must be a single
//! valid JSON document of the expected shape.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```[ \t]*(?:json)?").expect("fence pattern is valid")
});

/// Remove every code-fence marker and surrounding whitespace.
pub fn strip_fences(text: &str) -> String {
    FENCE.replace_all(text, "").trim().to_string()
}

/// Parse `text` as `T` after stripping code fences. Returns `None` on any
/// parse failure; never partially parses.
pub fn parse_json_from_text<T: DeserializeOwned>(text: &str) -> Option<T> {
    let cleaned = strip_fences(text);
    match serde_json::from_str::<T>(&cleaned) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Failed to parse JSON from model output: {e}");
            None
        }
    }
}
