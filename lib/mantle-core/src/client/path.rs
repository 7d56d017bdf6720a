use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// Matches a whole path segment of the form `{name}`.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{(?<name>\w+)\}$").expect("a valid regex"));

/// Fills the `{name}` placeholders of a path template from the path bucket.
///
/// The template is split on `/`; segments wholly matching `{name}` are
/// replaced by the bucket value for `name`, other segments pass through
/// unchanged, and segments are rejoined with `/`.
///
/// A placeholder with no bucket value substitutes the empty string, leaving a
/// malformed path the caller can observe. Presence is deliberately not
/// enforced here; the validator upstream reports missing required parameters.
pub(super) fn template_path(template: &str, path_bucket: &IndexMap<String, Value>) -> String {
    let segments: Vec<String> = template
        .split('/')
        .map(|segment| fill_segment(segment, path_bucket))
        .collect();
    segments.join("/")
}

fn fill_segment(segment: &str, path_bucket: &IndexMap<String, Value>) -> String {
    let Some(name) = PLACEHOLDER
        .captures(segment)
        .and_then(|caps| caps.name("name"))
        .map(|matched| matched.as_str())
    else {
        return segment.to_string();
    };

    match path_bucket.get(name) {
        Some(value) => render_segment_value(value),
        None => {
            warn!(name, "path placeholder has no value");
            String::new()
        }
    }
}

// JSON strings render bare; everything else keeps its compact JSON form.
pub(super) fn render_segment_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
