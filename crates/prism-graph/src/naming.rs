// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Node names and the shortened labels drawn on nodes.

use regex::Regex;
use serde_json::Value;

use crate::model::Attrs;

/// Text form of an attribute value. Strings are used verbatim.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Value of the first attribute whose key matches `pattern`.
///
/// Arrays name the node by their first element.
pub fn node_name(attrs: &Attrs, pattern: Option<&Regex>) -> String {
    let Some(pattern) = pattern else {
        return String::new();
    };
    let Some(value) = attrs
        .iter()
        .find_map(|(key, value)| pattern.is_match(key).then_some(value))
    else {
        return String::new();
    };
    match value {
        Value::Array(items) => items.first().map(display_value).unwrap_or_default(),
        other => display_value(other),
    }
}

/// Collapse whitespace and cut to `max_chars`, marking the cut with `...`.
pub fn shorten_name(name: &str, max_chars: usize) -> String {
    let words = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if words.chars().count() <= max_chars {
        return words;
    }
    let mut cut: String = words.chars().take(max_chars.saturating_sub(3)).collect();
    if cut.ends_with(' ') {
        cut.pop();
    }
    cut.push_str("...");
    cut
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shorten_keeps_short_names_and_cuts_long_ones() {
        assert_eq!(shorten_name("  Alice   Smith ", 12), "Alice Smith");
        assert_eq!(shorten_name("The Empire Strikes Back", 12), "The Empir...");
        assert_eq!(shorten_name("Star Wars IV: A New Hope", 12), "Star Wars...");
        assert_eq!(shorten_name("Return of x", 8), "Retur...");
        assert_eq!(shorten_name("Hello wo", 7), "Hell...");
    }

    #[test]
    fn cut_drops_trailing_space_before_ellipsis() {
        assert_eq!(shorten_name("abcd efghijkl", 8), "abcd...");
    }

    #[test]
    fn name_uses_first_matching_key_and_array_head() {
        let re = Regex::new("(?i)name").unwrap();
        let mut attrs = Attrs::new();
        attrs.insert("age".into(), json!(31));
        attrs.insert("name".into(), json!(["Alice", "Ally"]));
        assert_eq!(node_name(&attrs, Some(&re)), "Alice");
        assert_eq!(node_name(&attrs, None), "");

        let mut attrs = Attrs::new();
        attrs.insert("Name".into(), json!("Bob"));
        assert_eq!(node_name(&attrs, Some(&re)), "Bob");
    }

    #[test]
    fn display_value_renders_scalars() {
        assert_eq!(display_value(&json!("x")), "x");
        assert_eq!(display_value(&json!(5)), "5");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(null)), "");
    }
}
