use std::collections::BTreeMap;

/// Upstream rollup marker; meaningless once the rate is computed.
pub const ROLLUP_LABEL: &str = "__rollup__";
/// Longest tag the intake accepts, in characters.
pub const MAX_TAG_CHARS: usize = 200;

/// Renders labels as `key:value` tags in key order, skipping `exclude`.
#[must_use]
pub fn build_tags(labels: &BTreeMap<String, String>, exclude: Option<&str>) -> Vec<String> {
    labels
        .iter()
        .filter(|(key, _)| exclude != Some(key.as_str()))
        .map(|(key, value)| truncate_tag(&format!("{key}:{value}")))
        .collect()
}

fn truncate_tag(tag: &str) -> String {
    match tag.char_indices().nth(MAX_TAG_CHARS) {
        Some((cut, _)) => tag.get(..cut).unwrap_or(tag).to_owned(),
        None => tag.to_owned(),
    }
}
