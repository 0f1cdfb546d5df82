//! Prefix template parsing and rendering.
//!
//! Nested resources sit behind a path prefix whose segments are filled in
//! at request time. A prefix template marks each substitutable segment with
//! a colon immediately followed by an identifier token, e.g.
//! `/posts/:post_id`. The same marker drives both placeholder extraction
//! and rendering.
//!
//! # Example
//!
//! ```rust
//! use restkit::rest::path::{placeholders, render};
//! use serde_json::{json, Map};
//!
//! let template = "/posts/:post_id/comments";
//! let names = placeholders(template);
//! assert!(names.contains("post_id"));
//!
//! let mut values = Map::new();
//! values.insert("post_id".to_string(), json!(5));
//! assert_eq!(render(template, &values), "/posts/5/comments");
//! ```

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::rest::options::literal;

/// The character that introduces a placeholder in a prefix template.
pub const PARAMETER_MARKER: char = ':';

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Answers the length of the identifier token at the start of `input`.
fn identifier_len(input: &str) -> usize {
    input
        .bytes()
        .position(|b| !is_identifier_byte(b))
        .unwrap_or(input.len())
}

/// Collects the distinct placeholder names in a template.
///
/// A single scan, no side effects. Each name appears exactly once in the
/// result no matter how often it repeats in the template. A marker that is
/// not followed by an identifier token contributes nothing.
#[must_use]
pub fn placeholders(template: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut rest = template;
    while let Some(pos) = rest.find(PARAMETER_MARKER) {
        let after = &rest[pos + 1..];
        let len = identifier_len(after);
        if len > 0 {
            names.insert(after[..len].to_string());
        }
        rest = &after[len..];
    }
    names
}

/// Renders a template by substituting placeholder values.
///
/// Each placeholder occurrence is replaced by the string form of its value
/// in `values`. An empty value mapping returns the template unchanged. A
/// placeholder with no matching value stays in the output verbatim, marker
/// and all; a caller that forgot a value gets a visibly malformed path it
/// can diagnose rather than a crash.
#[must_use]
pub fn render(template: &str, values: &Map<String, Value>) -> String {
    if values.is_empty() {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find(PARAMETER_MARKER) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let len = identifier_len(after);
        if len == 0 {
            out.push(PARAMETER_MARKER);
            rest = after;
            continue;
        }
        let name = &after[..len];
        match values.get(name) {
            Some(value) => out.push_str(&literal(value)),
            None => {
                out.push(PARAMETER_MARKER);
                out.push_str(name);
            }
        }
        rest = &after[len..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_placeholders_extracts_names() {
        let names = placeholders("/posts/:post_id/comments/:id");
        assert_eq!(names.len(), 2);
        assert!(names.contains("post_id"));
        assert!(names.contains("id"));
    }

    #[test]
    fn test_placeholders_deduplicates_repeats() {
        let names = placeholders("/:id/copies/:id");
        assert_eq!(names.len(), 1);
        assert!(names.contains("id"));
    }

    #[test]
    fn test_placeholders_of_plain_template_is_empty() {
        assert!(placeholders("/v1/widgets").is_empty());
    }

    #[test]
    fn test_bare_marker_contributes_nothing() {
        assert!(placeholders("/a/:/b").is_empty());
        assert!(placeholders("/a/:").is_empty());
    }

    #[test]
    fn test_render_substitutes_values() {
        let rendered = render(
            "/posts/:post_id/comments",
            &values(&[("post_id", json!(5))]),
        );
        assert_eq!(rendered, "/posts/5/comments");
    }

    #[test]
    fn test_render_with_string_value() {
        let rendered = render("/tenants/:tenant", &values(&[("tenant", json!("acme"))]));
        assert_eq!(rendered, "/tenants/acme");
    }

    #[test]
    fn test_render_with_empty_values_returns_template() {
        let template = "/posts/:post_id/comments";
        assert_eq!(render(template, &Map::new()), template);
    }

    #[test]
    fn test_render_leaves_unmatched_placeholders_in_place() {
        let rendered = render(
            "/posts/:post_id/comments/:id",
            &values(&[("id", json!(9))]),
        );
        assert_eq!(rendered, "/posts/:post_id/comments/9");
    }

    #[test]
    fn test_render_substitutes_every_occurrence() {
        let rendered = render("/:id/copies/:id", &values(&[("id", json!(3))]));
        assert_eq!(rendered, "/3/copies/3");
    }

    #[test]
    fn test_render_preserves_non_ascii_literals() {
        let rendered = render("/café/:id", &values(&[("id", json!(1))]));
        assert_eq!(rendered, "/café/1");
    }

    #[test]
    fn test_render_with_bare_marker_keeps_it() {
        let rendered = render("/a/:/b", &values(&[("id", json!(1))]));
        assert_eq!(rendered, "/a/:/b");
    }
}
