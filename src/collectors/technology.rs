//! Technology detection.
//!
//! Matches a built-in signature table against the fetched page. Each
//! signature looks at one source (a response header, the meta generator tag,
//! script URLs, the raw HTML, or cookie names) and carries a confidence; a
//! technology's confidence is the sum of its matching signatures, capped at
//! 100. The first capture group of a matching pattern, if any, is the version.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use super::page::FetchedPage;
use crate::config::HEADER_SET_COOKIE;
use crate::utils::{compile_regex_unsafe, parse_selector_unsafe};

pub const CATEGORY_CDN: &str = "CDN";
pub const CATEGORY_ANALYTICS: &str = "Analytics";
pub const CATEGORY_CMS: &str = "CMS";
pub const CATEGORY_JS_FRAMEWORKS: &str = "JavaScript frameworks";
pub const CATEGORY_JS_LIBRARIES: &str = "JavaScript libraries";
pub const CATEGORY_WEB_SERVERS: &str = "Web servers";
pub const CATEGORY_PROGRAMMING_LANGUAGES: &str = "Programming languages";
pub const CATEGORY_ECOMMERCE: &str = "Ecommerce";
pub const CATEGORY_FONT_SCRIPTS: &str = "Font scripts";
pub const CATEGORY_TAG_MANAGERS: &str = "Tag managers";

#[derive(Debug, Clone, Copy)]
enum Source {
    /// Lowercased header name; an empty pattern matches on presence
    Header(&'static str),
    MetaGenerator,
    Script,
    Html,
    Cookie,
}

struct Signature {
    name: &'static str,
    category: &'static str,
    source: Source,
    pattern: &'static str,
    confidence: u32,
}

const fn sig(
    name: &'static str,
    category: &'static str,
    source: Source,
    pattern: &'static str,
    confidence: u32,
) -> Signature {
    Signature {
        name,
        category,
        source,
        pattern,
        confidence,
    }
}

use Source::{Cookie, Header, Html, MetaGenerator, Script};

static SIGNATURES: &[Signature] = &[
    // CDN
    sig("Cloudflare", CATEGORY_CDN, Header("server"), r"^cloudflare", 100),
    sig("Cloudflare", CATEGORY_CDN, Header("cf-ray"), "", 100),
    sig("Fastly", CATEGORY_CDN, Header("x-fastly-request-id"), "", 100),
    sig("Fastly", CATEGORY_CDN, Header("x-served-by"), r"cache-", 50),
    sig("Amazon CloudFront", CATEGORY_CDN, Header("x-amz-cf-id"), "", 100),
    sig("Amazon CloudFront", CATEGORY_CDN, Header("via"), r"cloudfront", 100),
    sig("Akamai", CATEGORY_CDN, Header("x-akamai-transformed"), "", 100),
    sig("jsDelivr", CATEGORY_CDN, Script, r"cdn\.jsdelivr\.net", 100),
    sig("cdnjs", CATEGORY_CDN, Script, r"cdnjs\.cloudflare\.com", 100),
    // Analytics
    sig("Google Analytics", CATEGORY_ANALYTICS, Script, r"google-analytics\.com/(?:ga|analytics)\.js", 100),
    sig("Google Analytics", CATEGORY_ANALYTICS, Script, r"googletagmanager\.com/gtag/js", 100),
    sig("Google Analytics", CATEGORY_ANALYTICS, Html, r#"gtag\(\s*['"]config['"]\s*,\s*['"](?:G|UA)-"#, 50),
    sig("Hotjar", CATEGORY_ANALYTICS, Script, r"static\.hotjar\.com", 100),
    sig("Hotjar", CATEGORY_ANALYTICS, Html, r"hotjar\.com/c/hotjar-", 100),
    sig("Plausible", CATEGORY_ANALYTICS, Script, r"plausible\.io/js", 100),
    sig("Matomo Analytics", CATEGORY_ANALYTICS, Script, r"(?:matomo|piwik)\.js", 100),
    sig("Facebook Pixel", CATEGORY_ANALYTICS, Script, r"connect\.facebook\.net/[^/]+/fbevents\.js", 100),
    sig("Facebook Pixel", CATEGORY_ANALYTICS, Html, r"fbq\(\s*['\x22]init", 50),
    // Tag managers
    sig("Google Tag Manager", CATEGORY_TAG_MANAGERS, Script, r"googletagmanager\.com/gtm\.js", 100),
    sig("Google Tag Manager", CATEGORY_TAG_MANAGERS, Html, r"googletagmanager\.com/(?:gtm\.js|ns\.html)", 100),
    // CMS
    sig("WordPress", CATEGORY_CMS, MetaGenerator, r"^WordPress ?([\d.]+)?", 100),
    sig("WordPress", CATEGORY_CMS, Html, r"/wp-content/", 50),
    sig("WordPress", CATEGORY_CMS, Html, r"/wp-includes/", 50),
    sig("Drupal", CATEGORY_CMS, MetaGenerator, r"^Drupal ?([\d.]+)?", 100),
    sig("Drupal", CATEGORY_CMS, Header("x-generator"), r"^Drupal ?([\d.]+)?", 100),
    sig("Joomla", CATEGORY_CMS, MetaGenerator, r"^Joomla!? ?([\d.]+)?", 100),
    sig("Wix", CATEGORY_CMS, MetaGenerator, r"Wix\.com", 100),
    sig("Wix", CATEGORY_CMS, Header("x-wix-request-id"), "", 100),
    sig("Squarespace", CATEGORY_CMS, Html, r"static1?\.squarespace\.com", 100),
    sig("Ghost", CATEGORY_CMS, MetaGenerator, r"^Ghost ?([\d.]+)?", 100),
    // Ecommerce
    sig("Shopify", CATEGORY_ECOMMERCE, Header("x-shopid"), "", 100),
    sig("Shopify", CATEGORY_ECOMMERCE, Script, r"cdn\.shopify\.com", 100),
    sig("WooCommerce", CATEGORY_ECOMMERCE, Html, r"/wp-content/plugins/woocommerce/", 100),
    sig("WooCommerce", CATEGORY_ECOMMERCE, MetaGenerator, r"^WooCommerce ?([\d.]+)?", 100),
    sig("Magento", CATEGORY_ECOMMERCE, Html, r"Mage\.Cookies", 100),
    sig("Magento", CATEGORY_ECOMMERCE, Script, r"/static/version\d+/frontend/", 100),
    sig("PrestaShop", CATEGORY_ECOMMERCE, MetaGenerator, r"PrestaShop", 100),
    // JavaScript frameworks
    sig("React", CATEGORY_JS_FRAMEWORKS, Html, r"data-reactroot", 100),
    sig("React", CATEGORY_JS_FRAMEWORKS, Script, r"react(?:-dom)?(?:\.production)?(?:\.min)?\.js", 100),
    sig("Vue.js", CATEGORY_JS_FRAMEWORKS, Html, r"data-v-[0-9a-f]{8}", 100),
    sig("Vue.js", CATEGORY_JS_FRAMEWORKS, Script, r"vue(?:\.runtime)?(?:\.global)?(?:\.min)?\.js", 100),
    sig("Angular", CATEGORY_JS_FRAMEWORKS, Html, r#"ng-version="([\d.]+)""#, 100),
    sig("Next.js", CATEGORY_JS_FRAMEWORKS, Html, r"__NEXT_DATA__", 100),
    sig("Next.js", CATEGORY_JS_FRAMEWORKS, Header("x-powered-by"), r"^Next\.js ?([\d.]+)?", 100),
    sig("Nuxt.js", CATEGORY_JS_FRAMEWORKS, Html, r"__NUXT__", 100),
    sig("Svelte", CATEGORY_JS_FRAMEWORKS, Html, r#"class="[^"]*svelte-[a-z0-9]+"#, 50),
    // JavaScript libraries
    sig("jQuery", CATEGORY_JS_LIBRARIES, Script, r"jquery[.-]?(\d+(?:\.\d+)+)?(?:\.slim)?(?:\.min)?\.js", 100),
    sig("Bootstrap", CATEGORY_JS_LIBRARIES, Script, r"bootstrap(?:\.bundle)?(?:\.min)?\.js", 100),
    sig("Lodash", CATEGORY_JS_LIBRARIES, Script, r"lodash(?:\.min)?\.js", 100),
    sig("Alpine.js", CATEGORY_JS_LIBRARIES, Html, r"\bx-data=", 50),
    // Web servers
    sig("Nginx", CATEGORY_WEB_SERVERS, Header("server"), r"^nginx(?:/([\d.]+))?", 100),
    sig("Apache HTTP Server", CATEGORY_WEB_SERVERS, Header("server"), r"^Apache(?:/([\d.]+))?", 100),
    sig("Microsoft IIS", CATEGORY_WEB_SERVERS, Header("server"), r"^Microsoft-IIS(?:/([\d.]+))?", 100),
    sig("LiteSpeed", CATEGORY_WEB_SERVERS, Header("server"), r"^LiteSpeed", 100),
    sig("Caddy", CATEGORY_WEB_SERVERS, Header("server"), r"^Caddy", 100),
    // Programming languages
    sig("PHP", CATEGORY_PROGRAMMING_LANGUAGES, Header("x-powered-by"), r"^PHP(?:/([\d.]+))?", 100),
    sig("PHP", CATEGORY_PROGRAMMING_LANGUAGES, Cookie, r"^PHPSESSID$", 75),
    sig("ASP.NET", CATEGORY_PROGRAMMING_LANGUAGES, Header("x-powered-by"), r"^ASP\.NET", 100),
    sig("ASP.NET", CATEGORY_PROGRAMMING_LANGUAGES, Header("x-aspnet-version"), r"^([\d.]+)", 100),
    sig("ASP.NET", CATEGORY_PROGRAMMING_LANGUAGES, Cookie, r"^ASP\.NET_SessionId$", 75),
    sig("Java", CATEGORY_PROGRAMMING_LANGUAGES, Cookie, r"^JSESSIONID$", 75),
    sig("Node.js", CATEGORY_PROGRAMMING_LANGUAGES, Header("x-powered-by"), r"^Express", 100),
    // Font scripts
    sig("Google Font API", CATEGORY_FONT_SCRIPTS, Html, r"fonts\.(?:googleapis|gstatic)\.com", 100),
    sig("Font Awesome", CATEGORY_FONT_SCRIPTS, Html, r"font-?awesome(?:[./-](\d+(?:\.\d+)+))?", 100),
    sig("Adobe Fonts", CATEGORY_FONT_SCRIPTS, Html, r"use\.typekit\.net", 100),
];

static COMPILED: LazyLock<Vec<Option<Regex>>> = LazyLock::new(|| {
    SIGNATURES
        .iter()
        .map(|s| {
            if s.pattern.is_empty() {
                None
            } else {
                Some(compile_regex_unsafe(&format!("(?i){}", s.pattern), s.name))
            }
        })
        .collect()
});

static SCRIPT_SRC_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("script[src]", "SCRIPT_SRC_SELECTOR"));
static META_GENERATOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe(r#"meta[name="generator"]"#, "META_GENERATOR_SELECTOR")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    pub category: String,
    /// 0-100
    pub confidence: u32,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologiesReport {
    /// In signature-table order
    pub technologies: Vec<Technology>,
    pub count: usize,
}

impl TechnologiesReport {
    pub fn has_category(&self, category: &str) -> bool {
        self.technologies
            .iter()
            .any(|t| t.category.eq_ignore_ascii_case(category))
    }

    pub fn get(&self, name: &str) -> Option<&Technology> {
        self.technologies.iter().find(|t| t.name == name)
    }
}

/// Cookie names from the `Set-Cookie` header lines.
fn cookie_names(page: &FetchedPage) -> Vec<String> {
    page.header(HEADER_SET_COOKIE)
        .map(|raw| {
            raw.lines()
                .filter_map(|line| line.split_once('=').map(|(name, _)| name.trim().to_string()))
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Returns `Some(version)` on a match; the inner option is the captured version.
fn match_pattern(re: Option<&Regex>, value: &str) -> Option<Option<String>> {
    match re {
        None => Some(None),
        Some(re) => re.captures(value).map(|caps| {
            caps.get(1)
                .map(|m| m.as_str().to_string())
                .filter(|v| !v.is_empty())
        }),
    }
}

/// Detects technologies on a fetched page.
pub fn detect_technologies(page: &FetchedPage) -> TechnologiesReport {
    let document = page.document();
    let scripts: Vec<String> = document
        .select(&SCRIPT_SRC_SELECTOR)
        .filter_map(|el| el.value().attr("src").map(str::to_string))
        .collect();
    let generators: Vec<String> = document
        .select(&META_GENERATOR_SELECTOR)
        .filter_map(|el| el.value().attr("content").map(|c| c.trim().to_string()))
        .collect();
    let cookies = cookie_names(page);

    let mut technologies: Vec<Technology> = Vec::new();

    for (signature, re) in SIGNATURES.iter().zip(COMPILED.iter()) {
        let re = re.as_ref();
        let matched: Option<Option<String>> = match signature.source {
            Header(name) => page.header(name).and_then(|v| match_pattern(re, v)),
            MetaGenerator => generators.iter().find_map(|g| match_pattern(re, g)),
            Script => scripts.iter().find_map(|s| match_pattern(re, s)),
            Html => match_pattern(re, &page.body),
            Cookie => cookies.iter().find_map(|c| match_pattern(re, c)),
        };
        let Some(version) = matched else { continue };

        match technologies.iter_mut().find(|t| t.name == signature.name) {
            Some(existing) => {
                existing.confidence = (existing.confidence + signature.confidence).min(100);
                if existing.version.is_none() {
                    existing.version = version;
                }
            }
            None => technologies.push(Technology {
                name: signature.name.to_string(),
                category: signature.category.to_string(),
                confidence: signature.confidence.min(100),
                version,
            }),
        }
    }

    log::debug!(
        "Detected {} technologies on {}",
        technologies.len(),
        page.final_url
    );

    TechnologiesReport {
        count: technologies.len(),
        technologies,
    }
}
