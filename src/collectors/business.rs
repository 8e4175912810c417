//! Business intelligence extraction.
//!
//! Pulls contact details and company identity out of the home page:
//! - Emails (mailto links and plain text)
//! - Phone numbers (tel links)
//! - Social media profiles
//! - Company name (JSON-LD Organization, then og:site_name, then application-name)
//! - Contact page link

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use super::page::FetchedPage;
use crate::parse::{extract_social_profiles, extract_structured_data, SocialProfile};
use crate::utils::{compile_regex_unsafe, parse_selector_unsafe};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(
        r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b",
        "EMAIL_RE",
    )
});

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("a[href]", "ANCHOR_SELECTOR"));
static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("body", "BODY_SELECTOR"));
static APPLICATION_NAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe(r#"meta[name="application-name"]"#, "APPLICATION_NAME_SELECTOR")
});

/// File suffixes that look like an email domain but belong to asset names
/// such as `logo@2x.png`.
const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".css", ".js"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessReport {
    pub company_name: Option<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub social_profiles: Vec<SocialProfile>,
    /// Absolute URL of the first link that looks like a contact page
    pub contact_page: Option<String>,
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn is_plausible_email(candidate: &str) -> bool {
    let lower = candidate.to_ascii_lowercase();
    !ASSET_SUFFIXES.iter().any(|s| lower.ends_with(s)) && !lower.contains("example.")
}

fn extract_emails(document: &Html) -> Vec<String> {
    let mut emails = Vec::new();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else { continue };
        if let Some(rest) = href.trim().strip_prefix("mailto:") {
            let address = rest.split('?').next().unwrap_or_default().trim().to_ascii_lowercase();
            if EMAIL_RE.is_match(&address) {
                push_unique(&mut emails, address);
            }
        }
    }

    if let Some(body) = document.select(&BODY_SELECTOR).next() {
        let text = body.text().collect::<Vec<_>>().join(" ");
        for m in EMAIL_RE.find_iter(&text) {
            if is_plausible_email(m.as_str()) {
                push_unique(&mut emails, m.as_str().to_ascii_lowercase());
            }
        }
    }

    emails
}

fn extract_phones(document: &Html) -> Vec<String> {
    let mut phones = Vec::new();
    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else { continue };
        if let Some(rest) = href.trim().strip_prefix("tel:") {
            let phone: String = rest
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect();
            if phone.chars().filter(char::is_ascii_digit).count() >= 6 {
                push_unique(&mut phones, phone);
            }
        }
    }
    phones
}

fn find_contact_page(document: &Html, base: Option<&Url>) -> Option<String> {
    document.select(&ANCHOR_SELECTOR).find_map(|element| {
        let href = element.value().attr("href")?.trim();
        if href.starts_with("mailto:") || href.starts_with("tel:") || href.starts_with('#') {
            return None;
        }
        let text = element.text().collect::<String>().to_lowercase();
        let lower_href = href.to_lowercase();
        if !(lower_href.contains("contact") || text.contains("contact")) {
            return None;
        }
        match base {
            Some(base) => base.join(href).ok().map(|u| u.to_string()),
            None => Some(href.to_string()),
        }
    })
}

/// Extracts business details from a fetched page.
pub fn extract_business_info(page: &FetchedPage) -> BusinessReport {
    let document = page.document();
    let structured = extract_structured_data(&document, &page.body);
    let base = Url::parse(&page.final_url).ok();

    let company_name = structured
        .organization_name()
        .or_else(|| structured.open_graph.get("og:site_name").cloned())
        .or_else(|| {
            document
                .select(&APPLICATION_NAME_SELECTOR)
                .find_map(|el| el.value().attr("content"))
                .map(|c| c.trim().to_string())
        })
        .filter(|name| !name.is_empty());

    BusinessReport {
        company_name,
        emails: extract_emails(&document),
        phones: extract_phones(&document),
        social_profiles: extract_social_profiles(&document),
        contact_page: find_contact_page(&document, base.as_ref()),
    }
}
