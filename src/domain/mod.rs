//! Domain cleaning and validation.
//!
//! Every public entry point (scan, compare, bulk) runs user-supplied domains
//! through [`clean_domain`] before use:
//! - lowercase and trim
//! - strip the scheme (`https://`), then everything from the first `/`, `?` or `#`
//! - strip a port and a trailing root dot
//! - validate as `label(.label)*.tld` where the TLD has at least two letters

use std::sync::LazyLock;

use regex::Regex;

use crate::config::MAX_DOMAIN_LENGTH;
use crate::utils::compile_regex_unsafe;

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(
        r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$",
        "DOMAIN_RE",
    )
});

/// Normalizes and validates a single domain.
///
/// Returns `None` if the input is not a syntactically valid domain name after
/// cleaning. IP addresses are rejected (the TLD must be alphabetic).
///
/// # Examples
///
/// ```
/// use domain_insight::domain::clean_domain;
///
/// assert_eq!(clean_domain("HTTPS://Example.com/path?q=1").as_deref(), Some("example.com"));
/// assert_eq!(clean_domain("not a domain"), None);
/// ```
pub fn clean_domain(input: &str) -> Option<String> {
    let lowered = input.trim().to_lowercase();

    let without_scheme = match lowered.find("://") {
        Some(idx) => &lowered[idx + 3..],
        None => lowered.as_str(),
    };

    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    // Drop userinfo if someone pasted a full URL
    let host = host.rsplit('@').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    let host = host.trim_end_matches('.');

    if host.is_empty() || host.len() > MAX_DOMAIN_LENGTH {
        return None;
    }

    DOMAIN_RE.is_match(host).then(|| host.to_string())
}

/// Cleans a list of domains, dropping invalid entries and duplicates.
///
/// Order is preserved; the first occurrence of a duplicate wins.
pub fn clean_domain_list<I, S>(domains: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cleaned: Vec<String> = Vec::new();
    for raw in domains {
        match clean_domain(raw.as_ref()) {
            Some(domain) if !cleaned.contains(&domain) => cleaned.push(domain),
            Some(_) => {}
            None => log::debug!("Dropping invalid domain {:?}", raw.as_ref()),
        }
    }
    cleaned
}

/// The URL page-based collectors fetch for a cleaned domain.
pub fn domain_url(domain: &str) -> String {
    format!("https://{}", domain)
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
