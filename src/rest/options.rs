//! Option partitioning and query-string building.
//!
//! Callers pass a single flat mapping of options to every find-style
//! operation. Keys that name a placeholder in the service's current prefix
//! template are prefix options and fill in path segments; everything else
//! is a query option and lands in the query string. [`split_options`]
//! performs that partition; [`query_string`] serializes the query half.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

/// A flat mapping of option keys to values, in insertion order.
pub type Options = Map<String, Value>;

/// The unquoted string form of a scalar option value.
///
/// Strings render without quotes; other values use their JSON form.
pub(crate) fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Splits options into prefix options and query options.
///
/// A key routes to the prefix half iff it is a member of `parameters`, the
/// current template's placeholder set. The two halves are a total
/// partition of the input: every key appears in exactly one of them, and
/// reassembling both recovers the input.
#[must_use]
pub fn split_options(options: &Options, parameters: &BTreeSet<String>) -> (Options, Options) {
    let mut prefix_options = Options::new();
    let mut query_options = Options::new();
    for (key, value) in options {
        if parameters.contains(key) {
            prefix_options.insert(key.clone(), value.clone());
        } else {
            query_options.insert(key.clone(), value.clone());
        }
    }
    (prefix_options, query_options)
}

/// Builds an ordered, percent-encoded query string.
///
/// Pairs appear in the order the options were supplied, joined by `&`.
/// Empty input yields an empty string. Array values expand to repeated
/// `key[]=value` pairs and nested mappings flatten by bracketed key
/// composition (`key[sub]=value`, recursively); both conventions match
/// what bracket-aware servers expect. Keys and values are percent-encoded
/// individually so the brackets stay visible.
#[must_use]
pub fn query_string(options: &Options) -> String {
    let mut pairs = Vec::new();
    for (key, value) in options {
        append_pairs(&mut pairs, &urlencoding::encode(key), value);
    }
    pairs.join("&")
}

fn append_pairs(pairs: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            let item_key = format!("{key}[]");
            for item in items {
                append_pairs(pairs, &item_key, item);
            }
        }
        Value::Object(map) => {
            for (sub_key, sub_value) in map {
                let nested_key = format!("{key}[{}]", urlencoding::encode(sub_key));
                append_pairs(pairs, &nested_key, sub_value);
            }
        }
        Value::Null => pairs.push(format!("{key}=")),
        other => pairs.push(format!("{key}={}", urlencoding::encode(&literal(other)))),
    }
}
