//! File contents for metadata nodes

use std::collections::BTreeMap;

/// `key=value` per line, sorted by key, no trailing newline
pub fn render_contents(metadata: &BTreeMap<String, String>) -> String {
    metadata
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}
