//! On-page SEO analysis.
//!
//! Checks the usual on-page basics (title, description, headings, image alt
//! text, viewport, canonical, lang, Open Graph, JSON-LD) and subtracts a fixed
//! penalty per problem from 100.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use super::page::FetchedPage;
use crate::parse::extract_structured_data;
use crate::utils::parse_selector_unsafe;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("title", "TITLE_SELECTOR"));
static META_DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe(r#"meta[name="description"]"#, "META_DESCRIPTION_SELECTOR")
});
static H1_SELECTOR: LazyLock<Selector> = LazyLock::new(|| parse_selector_unsafe("h1", "H1_SELECTOR"));
static H2_SELECTOR: LazyLock<Selector> = LazyLock::new(|| parse_selector_unsafe("h2", "H2_SELECTOR"));
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("img", "IMG_SELECTOR"));
static VIEWPORT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(r#"meta[name="viewport"]"#, "VIEWPORT_SELECTOR"));
static CANONICAL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe(r#"link[rel="canonical"][href]"#, "CANONICAL_SELECTOR")
});
static HTML_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("html", "HTML_SELECTOR"));

pub const TITLE_MAX_LENGTH: usize = 60;
pub const TITLE_MIN_LENGTH: usize = 10;
pub const META_DESCRIPTION_MAX_LENGTH: usize = 160;

// Issue texts. The recommendation rules match on these substrings.
pub const ISSUE_MISSING_TITLE: &str = "Missing title tag";
pub const ISSUE_TITLE_TOO_LONG: &str = "Title too long (over 60 characters)";
pub const ISSUE_TITLE_TOO_SHORT: &str = "Title too short (under 10 characters)";
pub const ISSUE_MISSING_META_DESCRIPTION: &str = "Missing meta description";
pub const ISSUE_META_DESCRIPTION_TOO_LONG: &str = "Meta description too long (over 160 characters)";
pub const ISSUE_MISSING_H1: &str = "Missing H1 heading";
pub const ISSUE_MULTIPLE_H1: &str = "Multiple H1 headings";
pub const ISSUE_IMAGES_MISSING_ALT: &str = "Images missing alt text";
pub const ISSUE_MISSING_VIEWPORT: &str = "Missing viewport meta tag";
pub const ISSUE_MISSING_CANONICAL: &str = "Missing canonical URL";
pub const ISSUE_NO_STRUCTURED_DATA: &str = "No structured data (JSON-LD) found";
pub const ISSUE_MISSING_OPEN_GRAPH: &str = "Missing Open Graph tags";
pub const ISSUE_MISSING_LANG: &str = "Missing lang attribute";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoReport {
    /// 100 minus the penalties of the issues found, floored at 0
    pub score: u32,
    pub title: Option<String>,
    pub title_length: usize,
    pub meta_description: Option<String>,
    pub meta_description_length: usize,
    pub h1_count: usize,
    pub h2_count: usize,
    pub images_total: usize,
    pub images_missing_alt: usize,
    pub has_viewport: bool,
    pub canonical_url: Option<String>,
    pub lang: Option<String>,
    pub open_graph: BTreeMap<String, String>,
    pub has_structured_data: bool,
    pub schema_types: Vec<String>,
    pub issues: Vec<String>,
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn first_attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .find_map(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Analyzes a fetched page for on-page SEO.
pub fn analyze_seo(page: &FetchedPage) -> SeoReport {
    let document = page.document();
    let structured = extract_structured_data(&document, &page.body);

    let title = first_text(&document, &TITLE_SELECTOR);
    let meta_description = first_attr(&document, &META_DESCRIPTION_SELECTOR, "content");
    let images_missing_alt = document
        .select(&IMG_SELECTOR)
        .filter(|img| {
            img.value()
                .attr("alt")
                .map(|alt| alt.trim().is_empty())
                .unwrap_or(true)
        })
        .count();

    let mut report = SeoReport {
        title_length: title.as_deref().map(|t| t.chars().count()).unwrap_or(0),
        title,
        meta_description_length: meta_description
            .as_deref()
            .map(|d| d.chars().count())
            .unwrap_or(0),
        meta_description,
        h1_count: document.select(&H1_SELECTOR).count(),
        h2_count: document.select(&H2_SELECTOR).count(),
        images_total: document.select(&IMG_SELECTOR).count(),
        images_missing_alt,
        has_viewport: document.select(&VIEWPORT_SELECTOR).next().is_some(),
        canonical_url: first_attr(&document, &CANONICAL_SELECTOR, "href"),
        lang: first_attr(&document, &HTML_SELECTOR, "lang"),
        has_structured_data: !structured.json_ld.is_empty(),
        schema_types: structured.schema_types,
        open_graph: structured.open_graph,
        ..Default::default()
    };

    let mut issues: Vec<String> = Vec::new();
    let mut penalty: u32 = 0;
    let mut flag = |issue: &str, points: u32| {
        issues.push(issue.to_string());
        penalty += points;
    };

    match report.title_length {
        0 => flag(ISSUE_MISSING_TITLE, 20),
        n if n > TITLE_MAX_LENGTH => flag(ISSUE_TITLE_TOO_LONG, 5),
        n if n < TITLE_MIN_LENGTH => flag(ISSUE_TITLE_TOO_SHORT, 5),
        _ => {}
    }
    match report.meta_description_length {
        0 => flag(ISSUE_MISSING_META_DESCRIPTION, 15),
        n if n > META_DESCRIPTION_MAX_LENGTH => flag(ISSUE_META_DESCRIPTION_TOO_LONG, 5),
        _ => {}
    }
    match report.h1_count {
        0 => flag(ISSUE_MISSING_H1, 15),
        1 => {}
        _ => flag(ISSUE_MULTIPLE_H1, 5),
    }
    if report.images_missing_alt > 0 {
        flag(ISSUE_IMAGES_MISSING_ALT, 10);
    }
    if !report.has_viewport {
        flag(ISSUE_MISSING_VIEWPORT, 10);
    }
    if report.canonical_url.is_none() {
        flag(ISSUE_MISSING_CANONICAL, 5);
    }
    if !report.has_structured_data {
        flag(ISSUE_NO_STRUCTURED_DATA, 5);
    }
    if report.open_graph.is_empty() {
        flag(ISSUE_MISSING_OPEN_GRAPH, 5);
    }
    if report.lang.is_none() {
        flag(ISSUE_MISSING_LANG, 5);
    }

    report.issues = issues;
    report.score = 100u32.saturating_sub(penalty);
    report
}
