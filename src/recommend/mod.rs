//! Recommendation synthesis.
//!
//! Walks an assembled scan and turns known problem patterns into prioritized
//! actions. Rules only look at sections that were collected; a failed section
//! produces no recommendation except for SSL, where a missing certificate
//! report is itself the problem.

use serde::{Deserialize, Serialize};

use crate::collectors::{
    CATEGORY_ANALYTICS, CATEGORY_CDN, ISSUE_MISSING_VIEWPORT, ISSUE_NO_STRUCTURED_DATA,
};
use crate::scan::ScanResult;

/// Performance scores below this get an important recommendation.
pub const PERFORMANCE_THRESHOLD: u32 = 70;

/// Remediation text for SEO issues, matched by substring.
const SEO_REMEDIATIONS: &[(&str, &str)] = &[
    (
        "Missing title",
        "Add a unique, descriptive <title> of 50-60 characters to every page",
    ),
    (
        "Title too long",
        "Shorten the title to 60 characters or fewer so search results do not truncate it",
    ),
    (
        "Title too short",
        "Expand the title so it describes the page and its main keyword",
    ),
    (
        "Missing meta description",
        "Write a meta description of 150-160 characters summarizing the page",
    ),
    (
        "Meta description too long",
        "Trim the meta description to 160 characters or fewer",
    ),
    (
        "Missing H1",
        "Add a single H1 heading that states the topic of the page",
    ),
    (
        "Multiple H1",
        "Keep one H1 per page and demote the other headings to H2",
    ),
    (
        "Images missing alt",
        "Add descriptive alt text to every meaningful image",
    ),
    (
        "Missing canonical",
        "Add a canonical link to consolidate duplicate URLs",
    ),
    (
        "Missing Open Graph",
        "Add og:title, og:description and og:image for richer social previews",
    ),
    (
        "Missing lang",
        "Declare the page language on the <html> element",
    ),
];
const GENERIC_REMEDIATION: &str = "Review and fix this issue";

/// SEO issues owned by a dedicated rule rather than the generic SEO loop.
const DEDICATED_SEO_ISSUES: &[&str] = &[ISSUE_MISSING_VIEWPORT, ISSUE_NO_STRUCTURED_DATA];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub issue: String,
    pub recommendation: String,
    pub impact: String,
    pub effort: String,
}

impl Recommendation {
    fn new(category: &str, issue: impl Into<String>, recommendation: &str, impact: &str, effort: &str) -> Self {
        Self {
            category: category.to_string(),
            issue: issue.into(),
            recommendation: recommendation.to_string(),
            impact: impact.to_string(),
            effort: effort.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub critical: Vec<Recommendation>,
    pub important: Vec<Recommendation>,
    pub suggested: Vec<Recommendation>,
    pub total_recommendations: usize,
}

impl Recommendations {
    /// All recommendations, most urgent first.
    pub fn iter(&self) -> impl Iterator<Item = &Recommendation> {
        self.critical
            .iter()
            .chain(self.important.iter())
            .chain(self.suggested.iter())
    }
}

pub fn seo_remediation(issue: &str) -> &'static str {
    SEO_REMEDIATIONS
        .iter()
        .find(|(needle, _)| issue.contains(needle))
        .map(|(_, text)| *text)
        .unwrap_or(GENERIC_REMEDIATION)
}

fn is_critical_seo_issue(issue: &str) -> bool {
    issue.contains("Missing title") || issue.contains("Missing H1")
}

/// Builds the prioritized recommendation list for a scan.
pub fn recommend(result: &ScanResult) -> Recommendations {
    let mut out = Recommendations::default();

    // SSL
    if !result.ssl_valid() {
        let issue = match (result.ssl.collected(), result.ssl.error()) {
            (Some(ssl), _) => match &ssl.validation_error {
                Some(reason) => format!("SSL certificate is invalid: {}", reason),
                None => "SSL certificate is invalid".to_string(),
            },
            (None, Some(error)) => format!("SSL certificate could not be verified: {}", error),
            (None, None) => "SSL certificate is missing".to_string(),
        };
        out.critical.push(Recommendation::new(
            "Security",
            issue,
            "Install a valid SSL/TLS certificate from a trusted authority and redirect all HTTP traffic to HTTPS",
            "High",
            "Low",
        ));
    }

    // SEO issues
    if let Some(seo) = result.seo.collected() {
        for issue in &seo.issues {
            if DEDICATED_SEO_ISSUES.contains(&issue.as_str()) {
                continue;
            }
            let rec = Recommendation::new("SEO", issue.clone(), seo_remediation(issue), "High", "Low");
            if is_critical_seo_issue(issue) {
                out.critical.push(rec);
            } else {
                out.important.push(Recommendation {
                    impact: "Medium".to_string(),
                    ..rec
                });
            }
        }
    }

    // Security headers
    if let Some(headers) = result.security_headers.collected() {
        if !headers.missing.is_empty() {
            out.important.push(Recommendation::new(
                "Security",
                format!("Missing security headers: {}", headers.missing.join(", ")),
                "Configure the web server to send the missing security headers",
                "High",
                "Low",
            ));
        }
    }

    // Performance
    if let Some(performance) = result.performance.collected() {
        if performance.score < PERFORMANCE_THRESHOLD {
            out.important.push(Recommendation::new(
                "Performance",
                format!("Performance score is {} (below {})", performance.score, PERFORMANCE_THRESHOLD),
                "Reduce server response time, enable caching and compress or defer heavy assets",
                "High",
                "Medium",
            ));
        }
    }

    // Mobile
    if let Some(seo) = result.seo.collected() {
        if !seo.has_viewport {
            out.important.push(Recommendation::new(
                "Mobile",
                ISSUE_MISSING_VIEWPORT,
                "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"> for mobile rendering",
                "High",
                "Low",
            ));
        }
    }

    // Technology gaps
    if let Some(technologies) = result.technologies.collected() {
        if !technologies.has_category(CATEGORY_CDN) {
            out.suggested.push(Recommendation::new(
                "Performance",
                "No CDN detected",
                "Serve static assets through a CDN to cut latency for distant visitors",
                "Medium",
                "Medium",
            ));
        }
        if !technologies.has_category(CATEGORY_ANALYTICS) {
            out.suggested.push(Recommendation::new(
                "Analytics",
                "No analytics tool detected",
                "Install an analytics tool to measure traffic and conversions",
                "Medium",
                "Low",
            ));
        }
    }

    // Structured data
    if let Some(seo) = result.seo.collected() {
        if !seo.has_structured_data {
            out.suggested.push(Recommendation::new(
                "SEO",
                ISSUE_NO_STRUCTURED_DATA,
                "Add JSON-LD structured data (Organization, WebSite) to qualify for rich results",
                "Medium",
                "Medium",
            ));
        }
    }

    out.total_recommendations = out.critical.len() + out.important.len() + out.suggested.len();
    out
}
