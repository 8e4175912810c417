//! Structured data extraction.
//!
//! This module extracts structured data from HTML documents including:
//! - JSON-LD (application/ld+json)
//! - Open Graph meta tags (og:*)
//! - Schema.org types

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::utils::{compile_regex_unsafe, parse_selector_unsafe};

// Matches both quote styles and any attribute order/case
static JSON_LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(
        r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#,
        "JSON_LD_RE",
    )
});

static OPEN_GRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(r#"meta[property^="og:"]"#, "OPEN_GRAPH_SELECTOR"));

/// Structured data extracted from HTML
#[derive(Debug, Clone, Default)]
pub struct StructuredData {
    /// JSON-LD objects; top-level arrays and `@graph` members are flattened
    pub json_ld: Vec<serde_json::Value>,
    /// Open Graph meta tags (og:*)
    pub open_graph: BTreeMap<String, String>,
    /// Schema.org types detected (from JSON-LD @type), first-seen order
    pub schema_types: Vec<String>,
}

impl StructuredData {
    /// Name of the first JSON-LD object typed `Organization` (or a subtype
    /// commonly used for companies).
    pub fn organization_name(&self) -> Option<String> {
        const ORG_TYPES: &[&str] = &["Organization", "Corporation", "LocalBusiness", "Company"];
        self.json_ld.iter().find_map(|value| {
            let types = type_names(value);
            if types.iter().any(|t| ORG_TYPES.contains(&t.as_str())) {
                value
                    .get("name")
                    .and_then(|n| n.as_str())
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
            } else {
                None
            }
        })
    }
}

fn type_names(value: &serde_json::Value) -> Vec<String> {
    match value.get("@type") {
        Some(serde_json::Value::String(t)) => vec![t.clone()],
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|t| t.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Extracts structured data from an HTML document.
///
/// `html` is the raw source; JSON-LD is pulled out with a regex because script
/// bodies are easier to take verbatim than through the DOM.
pub fn extract_structured_data(document: &Html, html: &str) -> StructuredData {
    let json_ld = extract_json_ld(html);

    let mut schema_types: Vec<String> = Vec::new();
    for value in &json_ld {
        for t in type_names(value) {
            if !schema_types.contains(&t) {
                schema_types.push(t);
            }
        }
    }

    StructuredData {
        json_ld,
        open_graph: extract_open_graph(document),
        schema_types,
    }
}

fn extract_json_ld(html: &str) -> Vec<serde_json::Value> {
    let mut values = Vec::new();

    for cap in JSON_LD_RE.captures_iter(html) {
        let Some(content) = cap.get(1) else { continue };
        let json_str = content.as_str().trim();
        match serde_json::from_str::<serde_json::Value>(json_str) {
            Ok(serde_json::Value::Array(items)) => values.extend(items),
            Ok(value) => {
                // {"@context": ..., "@graph": [...]} wraps several objects
                if let Some(graph) = value.get("@graph").and_then(|g| g.as_array()) {
                    values.extend(graph.iter().cloned());
                } else {
                    values.push(value);
                }
            }
            Err(e) => log::debug!("Skipping malformed JSON-LD block: {}", e),
        }
    }

    values
}

fn extract_open_graph(document: &Html) -> BTreeMap<String, String> {
    let mut og_tags = BTreeMap::new();
    for element in document.select(&OPEN_GRAPH_SELECTOR) {
        if let (Some(property), Some(content)) = (
            element.value().attr("property"),
            element.value().attr("content"),
        ) {
            og_tags
                .entry(property.to_string())
                .or_insert_with(|| content.trim().to_string());
        }
    }
    og_tags
}
