//! Best-effort recovery of a JSON object from free model output.
//!
//! Strategies run from strictest to loosest and the first one that yields an
//! object wins. None of them fail loudly: a `None` from every strategy means
//! the caller keeps the raw text.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;

pub type JsonObject = Map<String, Value>;

/// A named, pure parse attempt
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub apply: fn(&str) -> Option<JsonObject>,
}

/// Strategies in the order they are tried
pub const STRATEGIES: [Strategy; 3] = [
    Strategy {
        name: "strict",
        apply: strict,
    },
    Strategy {
        name: "brace_span",
        apply: brace_span,
    },
    Strategy {
        name: "normalized",
        apply: normalized,
    },
];

lazy_static! {
    /// `- `, `* `, `• `, `1. ` and `1) ` at the start of a line
    static ref LIST_MARKER: Regex =
        Regex::new(r"(?m)^([ \t]*)(?:[-*•‣◦]|\d{1,2}[.)])[ \t]+").unwrap();
}

/// Drop a leading list marker (`- `, `• `, `2. `, ...) from one line.
/// A dash glued to the text, as in `-5%`, is not a marker.
pub fn strip_list_marker(line: &str) -> Cow<'_, str> {
    LIST_MARKER.replace(line, "$1")
}

/// Try each strategy in turn, returning the object and the strategy that found it
pub fn extract_object(raw: &str) -> Option<(JsonObject, &'static str)> {
    STRATEGIES
        .iter()
        .find_map(|strategy| (strategy.apply)(raw).map(|obj| (obj, strategy.name)))
}

/// The whole output (minus a markdown code fence) is a JSON object
pub fn strict(raw: &str) -> Option<JsonObject> {
    parse_object(&strip_markdown_json(raw))
}

/// The text between the first `{` and the last `}` is a JSON object
pub fn brace_span(raw: &str) -> Option<JsonObject> {
    find_brace_span(raw).and_then(parse_object)
}

/// The brace span parses once list markers and unicode dashes are cleaned up
pub fn normalized(raw: &str) -> Option<JsonObject> {
    let span = find_brace_span(raw)?;
    parse_object(&normalize_text(span))
}

/// Slice from the first `{` through the last `}`, if they are in order
pub fn find_brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Drop leading list markers and map unicode dashes to `-`
pub fn normalize_text(text: &str) -> String {
    let collapsed = LIST_MARKER.replace_all(text, "$1");
    collapsed
        .chars()
        .map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' => '-',
            c => c,
        })
        .collect()
}

fn parse_object(text: &str) -> Option<JsonObject> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

/// Strip markdown code block wrappers from JSON response
fn strip_markdown_json(text: &str) -> String {
    let trimmed = text.trim();

    // Remove ```json ... ``` or ``` ... ```
    if let Some(rest) = trimmed.strip_prefix("```") {
        let without_prefix = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end_idx) = without_prefix.rfind("```") {
            return without_prefix[..end_idx].trim().to_string();
        }
    }

    trimmed.to_string()
}
