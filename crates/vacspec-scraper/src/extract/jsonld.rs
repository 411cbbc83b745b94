//! schema.org JSON-LD extraction.
//!
//! Reads `additionalProperty` name/value pairs from the `Product` node of
//! every `<script type="application/ld+json">` block on the page.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use vacspec_core::{SpecField, SpecValues};

use crate::text::{canonicalize_suction, collapse_whitespace, contains_keyword};

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid json-ld script regex")
});

/// Extracts spec fields from structured data. Fields that are not present
/// stay `None`; blocks that fail to parse are skipped.
#[must_use]
pub fn extract_jsonld_specs(html: &str) -> SpecValues {
    let mut values = SpecValues::default();

    for cap in SCRIPT_RE.captures_iter(html) {
        let raw = cap.get(1).map_or("", |m| m.as_str()).trim();
        if raw.is_empty() {
            continue;
        }
        let block = match serde_json::from_str::<Value>(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed JSON-LD block");
                continue;
            }
        };

        let Some(node) = select_product_node(&block) else {
            continue;
        };
        let properties = additional_properties(node);
        if properties.is_empty() {
            continue;
        }

        for field in SpecField::ALL {
            if values.get(field).is_some() {
                continue;
            }
            if let Some(value) = property_value_for(field, &properties) {
                values.set_if_absent(field, value);
            }
        }

        if values.is_complete() {
            break;
        }
    }

    values
}

/// Flattens top-level arrays and `@graph` containers into candidate nodes.
fn candidate_nodes(block: &Value) -> Vec<&Value> {
    let mut nodes: Vec<&Value> = match block {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut expanded = Vec::new();
    for node in &nodes {
        if let Some(graph) = node.get("@graph").and_then(Value::as_array) {
            expanded.extend(graph.iter());
        }
    }
    nodes.extend(expanded);
    nodes
}

/// The node typed `Product`, or the whole block when no node declares it.
fn select_product_node(block: &Value) -> Option<&Value> {
    let product = candidate_nodes(block)
        .into_iter()
        .find(|node| is_product_type(node.get("@type")));
    match product {
        Some(node) => Some(node),
        None if block.is_object() => Some(block),
        None => None,
    }
}

fn is_product_type(node_type: Option<&Value>) -> bool {
    match node_type {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("product"),
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.eq_ignore_ascii_case("product")),
        _ => false,
    }
}

/// `(name, value)` pairs from `additionalProperty`, accepting either an
/// array or a single object.
fn additional_properties(node: &Value) -> Vec<(String, String)> {
    let entries: Vec<&Value> = match node.get("additionalProperty") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(obj @ Value::Object(_)) => vec![obj],
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            let name = entry.get("name").and_then(Value::as_str)?;
            let value = scalar_text(entry.get("value")?)?;
            Some((name.to_lowercase(), value))
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => collapse_whitespace(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn property_value_for(field: SpecField, properties: &[(String, String)]) -> Option<String> {
    for keyword in field.keywords() {
        let hit = properties
            .iter()
            .find(|(name, _)| contains_keyword(name, keyword));
        let Some((_, value)) = hit else {
            continue;
        };
        if field == SpecField::Suction {
            // An unparseable suction value does not block later keywords.
            if let Some(canonical) = canonicalize_suction(value) {
                return Some(canonical);
            }
            continue;
        }
        return Some(value.clone());
    }
    None
}
