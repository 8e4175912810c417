//! Social media profile extraction.
//!
//! Finds links to company profiles on the common networks and reports one
//! entry per platform+identifier.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::utils::{compile_regex_unsafe, parse_selector_unsafe};

// Regex patterns for social media links
const LINKEDIN_URL_PATTERN: &str = r"^(?:https?:)?//(?:[a-z]{2,3}\.)?linkedin\.com/(?:company|in|school)/([^/?#]+)";
const TWITTER_URL_PATTERN: &str = r"^(?:https?:)?//(?:www\.|mobile\.)?(?:twitter\.com|x\.com)/([^/?#]+)";
const FACEBOOK_URL_PATTERN: &str = r"^(?:https?:)?//(?:www\.|m\.)?(?:facebook\.com|fb\.com)/([^/?#]+)";
const INSTAGRAM_URL_PATTERN: &str = r"^(?:https?:)?//(?:www\.)?instagram\.com/([^/?#]+)";
const YOUTUBE_URL_PATTERN: &str = r"^(?:https?:)?//(?:www\.)?youtube\.com/((?:channel/|c/|user/)?@?[^/?#]+)";
const GITHUB_URL_PATTERN: &str = r"^(?:https?:)?//(?:www\.)?github\.com/([^/?#]+)";
const TIKTOK_URL_PATTERN: &str = r"^(?:https?:)?//(?:www\.)?tiktok\.com/@([^/?#]+)";
const PINTEREST_URL_PATTERN: &str = r"^(?:https?:)?//(?:[a-z]{2,3}\.)?pinterest\.(?:com|co\.uk)/([^/?#]+)";

static LINKEDIN_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(LINKEDIN_URL_PATTERN, "LINKEDIN_RE"));
static TWITTER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(TWITTER_URL_PATTERN, "TWITTER_RE"));
static FACEBOOK_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(FACEBOOK_URL_PATTERN, "FACEBOOK_RE"));
static INSTAGRAM_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(INSTAGRAM_URL_PATTERN, "INSTAGRAM_RE"));
static YOUTUBE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(YOUTUBE_URL_PATTERN, "YOUTUBE_RE"));
static GITHUB_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(GITHUB_URL_PATTERN, "GITHUB_RE"));
static TIKTOK_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(TIKTOK_URL_PATTERN, "TIKTOK_RE"));
static PINTEREST_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(PINTEREST_URL_PATTERN, "PINTEREST_RE"));

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("a[href]", "ANCHOR_SELECTOR"));

/// Path segments that are site navigation, not an account.
const NON_PROFILE_SEGMENTS: &[&str] = &[
    "share",
    "sharer",
    "sharer.php",
    "intent",
    "home",
    "login",
    "signup",
    "watch",
    "hashtag",
    "search",
    "p",
    "explore",
];

/// A link to a social media profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialProfile {
    pub platform: String,
    pub url: String,
    /// Username, handle or page ID taken from the URL
    pub handle: String,
}

/// Extracts social media profile links from an HTML document.
///
/// Supported platforms: LinkedIn, Twitter/X, Facebook, Instagram, YouTube,
/// GitHub, TikTok, Pinterest. Share buttons and relative links are ignored.
pub fn extract_social_profiles(document: &Html) -> Vec<SocialProfile> {
    let patterns: [(&LazyLock<Regex>, &str); 8] = [
        (&LINKEDIN_RE, "LinkedIn"),
        (&TWITTER_RE, "Twitter"),
        (&FACEBOOK_RE, "Facebook"),
        (&INSTAGRAM_RE, "Instagram"),
        (&YOUTUBE_RE, "YouTube"),
        (&GITHUB_RE, "GitHub"),
        (&TIKTOK_RE, "TikTok"),
        (&PINTEREST_RE, "Pinterest"),
    ];

    let mut profiles: Vec<SocialProfile> = Vec::new();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        let lowered = href.to_ascii_lowercase();

        for (re, platform) in &patterns {
            let Some(caps) = re.captures(&lowered) else {
                continue;
            };
            let Some(handle) = caps.get(1).map(|m| m.as_str().trim_start_matches('@')) else {
                break;
            };
            if handle.is_empty() || NON_PROFILE_SEGMENTS.contains(&handle) {
                break;
            }

            let url = if href.starts_with("//") {
                format!("https:{}", href)
            } else {
                href.to_string()
            };

            let duplicate = profiles
                .iter()
                .any(|p| p.platform == *platform && p.handle == handle);
            if !duplicate {
                profiles.push(SocialProfile {
                    platform: platform.to_string(),
                    url,
                    handle: handle.to_string(),
                });
            }
            break;
        }
    }

    profiles
}
