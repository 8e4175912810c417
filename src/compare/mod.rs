//! Competitive comparison.
//!
//! Scans two or more domains independently and lines them up: ranked
//! overall scores, per-category facts, a technology matrix, per-category
//! winners and gap-based insights for each domain.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::MAX_OPPORTUNITIES;
use crate::domain::clean_domain_list;
use crate::error_handling::ScanError;
use crate::scan::{ScanOrchestrator, ScanResult};
use crate::scoring::{business_score, Breakdown, Grade};

/// Score line in the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub domain: String,
    pub score: f64,
    pub grade: Grade,
    pub breakdown: Breakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoFacts {
    pub score: Option<u32>,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_count: Option<usize>,
    pub issues_count: Option<usize>,
    pub has_structured_data: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyUsage {
    pub detected: bool,
    pub confidence: u32,
    pub version: Option<String>,
}

/// One row of the technology matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyComparison {
    pub name: String,
    pub category: String,
    /// Every compared domain has an entry, detected or not
    pub usage: BTreeMap<String, TechnologyUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityFacts {
    pub ssl_valid: bool,
    pub blacklisted: Option<bool>,
    pub headers_score: Option<u32>,
    pub headers_present: usize,
    /// `30 * ssl_valid + 20 * not_blacklisted + 5 * headers_present`
    pub security_score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceFacts {
    pub score: Option<u32>,
    pub ttfb_ms: Option<u64>,
    pub load_time_ms: Option<u64>,
    pub page_size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessFacts {
    pub company_name: Option<String>,
    pub emails: usize,
    pub social_profiles: usize,
    pub has_contact_page: bool,
    pub score: f64,
}

/// Domain leading each category; `None` when no domain had data for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winners {
    pub overall: Option<String>,
    pub seo: Option<String>,
    pub security: Option<String>,
    pub technology: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub strengths: BTreeMap<String, Vec<String>>,
    pub weaknesses: BTreeMap<String, Vec<String>>,
    pub opportunities: BTreeMap<String, Vec<String>>,
    pub recommendations: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Cleaned domains in input order
    pub domains: Vec<String>,
    /// Highest score first; equal scores keep input order
    pub overall_scores: Vec<DomainScore>,
    pub seo: BTreeMap<String, SeoFacts>,
    /// Technologies in first-seen order
    pub technologies: Vec<TechnologyComparison>,
    pub security: BTreeMap<String, SecurityFacts>,
    pub performance: BTreeMap<String, PerformanceFacts>,
    pub business: BTreeMap<String, BusinessFacts>,
    pub winner: Winners,
    pub insights: Insights,
    /// Domains whose scan task died, with the reason
    pub failures: BTreeMap<String, String>,
}

/// Runs comparisons on top of a scan orchestrator.
#[derive(Clone)]
pub struct CompetitiveAnalyzer {
    orchestrator: Arc<ScanOrchestrator>,
}

impl CompetitiveAnalyzer {
    pub fn new(orchestrator: Arc<ScanOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Compares two or more domains.
    ///
    /// # Errors
    ///
    /// `ScanError::Validation` when fewer than two distinct valid domains
    /// remain after cleaning.
    pub async fn compare<S: AsRef<str>>(&self, domains: &[S]) -> Result<ComparisonReport, ScanError> {
        let domains = clean_domain_list(domains);
        if domains.len() < 2 {
            return Err(ScanError::Validation(format!(
                "At least 2 valid domains are required for comparison, got {}",
                domains.len()
            )));
        }

        log::info!("Comparing {} domains: {}", domains.len(), domains.join(", "));

        let handles: Vec<_> = domains
            .iter()
            .map(|domain| {
                let orchestrator = Arc::clone(&self.orchestrator);
                let domain = domain.clone();
                tokio::spawn(async move { orchestrator.scan(&domain).await })
            })
            .collect();

        let mut scans = Vec::with_capacity(domains.len());
        let mut failures = BTreeMap::new();
        for (domain, handle) in domains.iter().zip(handles) {
            match handle.await {
                Ok(result) => scans.push(result),
                Err(e) => {
                    log::warn!("Scan task for {} failed: {}", domain, e);
                    failures.insert(domain.clone(), e.to_string());
                }
            }
        }

        let mut report = build_comparison(domains, &scans);
        report.failures = failures;
        Ok(report)
    }
}

fn seo_facts(result: &ScanResult) -> SeoFacts {
    match result.seo.collected() {
        Some(seo) => SeoFacts {
            score: Some(seo.score),
            title: seo.title.clone(),
            meta_description: seo.meta_description.clone(),
            h1_count: Some(seo.h1_count),
            issues_count: Some(seo.issues.len()),
            has_structured_data: seo.has_structured_data,
        },
        None => SeoFacts::default(),
    }
}

fn security_facts(result: &ScanResult) -> SecurityFacts {
    let ssl_valid = result.ssl_valid();
    let blacklisted = result.blacklist.collected().map(|b| b.blacklisted);
    let headers = result.security_headers.collected();
    let headers_present = headers.map(|h| h.present.len()).unwrap_or(0);

    let mut security_score = 0;
    if ssl_valid {
        security_score += 30;
    }
    if blacklisted == Some(false) {
        security_score += 20;
    }
    security_score += 5 * headers_present as u32;

    SecurityFacts {
        ssl_valid,
        blacklisted,
        headers_score: headers.map(|h| h.score),
        headers_present,
        security_score,
    }
}

fn performance_facts(result: &ScanResult) -> PerformanceFacts {
    match result.performance.collected() {
        Some(p) => PerformanceFacts {
            score: Some(p.score),
            ttfb_ms: Some(p.ttfb_ms),
            load_time_ms: Some(p.load_time_ms),
            page_size_bytes: Some(p.page_size_bytes),
        },
        None => PerformanceFacts::default(),
    }
}

fn business_facts(result: &ScanResult) -> BusinessFacts {
    match result.business_intelligence.collected() {
        Some(b) => BusinessFacts {
            company_name: b.company_name.clone(),
            emails: b.emails.len(),
            social_profiles: b.social_profiles.len(),
            has_contact_page: b.contact_page.is_some(),
            score: business_score(b),
        },
        None => BusinessFacts::default(),
    }
}

/// Union of detected technologies, first-seen order. Category comes from the
/// first domain that detected it.
fn technology_matrix(scans: &[ScanResult]) -> Vec<TechnologyComparison> {
    let mut matrix: Vec<TechnologyComparison> = Vec::new();

    for result in scans {
        let Some(technologies) = result.technologies.collected() else {
            continue;
        };
        for tech in &technologies.technologies {
            if !matrix.iter().any(|row| row.name == tech.name) {
                matrix.push(TechnologyComparison {
                    name: tech.name.clone(),
                    category: tech.category.clone(),
                    usage: BTreeMap::new(),
                });
            }
        }
    }

    for row in &mut matrix {
        for result in scans {
            let usage = result
                .technologies
                .collected()
                .and_then(|t| t.get(&row.name))
                .map(|t| TechnologyUsage {
                    detected: true,
                    confidence: t.confidence,
                    version: t.version.clone(),
                })
                .unwrap_or_default();
            row.usage.insert(result.domain.clone(), usage);
        }
    }

    matrix
}

/// First domain holding the strict maximum, in input order.
fn leader<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut best: Option<(&str, f64)> = None;
    for (domain, value) in candidates {
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((domain, value)),
        }
    }
    best.map(|(domain, _)| domain.to_string())
}

fn category_label(category: &str) -> &'static str {
    match category {
        "seo" => "SEO",
        "security" => "Security",
        "performance" => "Performance",
        "technologies" => "Technologies",
        "ssl" => "SSL",
        "business" => "Business",
        _ => "Other",
    }
}

/// Builds the comparison tables from finished scans (input order).
pub fn build_comparison(domains: Vec<String>, scans: &[ScanResult]) -> ComparisonReport {
    let mut report = ComparisonReport {
        domains,
        ..Default::default()
    };

    let mut ranking: Vec<DomainScore> = scans
        .iter()
        .map(|r| DomainScore {
            domain: r.domain.clone(),
            score: r.overall_score.score,
            grade: r.overall_score.grade,
            breakdown: r.overall_score.breakdown.clone(),
        })
        .collect();
    // sort_by is stable, so ties keep input order
    ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
    report.overall_scores = ranking;

    for result in scans {
        report.seo.insert(result.domain.clone(), seo_facts(result));
        report
            .security
            .insert(result.domain.clone(), security_facts(result));
        report
            .performance
            .insert(result.domain.clone(), performance_facts(result));
        report
            .business
            .insert(result.domain.clone(), business_facts(result));
    }
    report.technologies = technology_matrix(scans);

    report.winner = Winners {
        overall: leader(scans.iter().map(|r| (r.domain.as_str(), r.overall_score.score))),
        seo: leader(scans.iter().filter_map(|r| {
            r.seo
                .collected()
                .map(|s| (r.domain.as_str(), f64::from(s.score)))
        })),
        security: leader(scans.iter().map(|r| {
            (
                r.domain.as_str(),
                f64::from(security_facts(r).security_score),
            )
        })),
        technology: leader(scans.iter().map(|r| {
            (
                r.domain.as_str(),
                r.technologies.collected().map(|t| t.count).unwrap_or(0) as f64,
            )
        })),
    };

    report.insights = build_insights(scans, &report.technologies, &report.winner);
    report
}

fn build_insights(
    scans: &[ScanResult],
    matrix: &[TechnologyComparison],
    winner: &Winners,
) -> Insights {
    let mut insights = Insights::default();

    for result in scans {
        let domain = &result.domain;
        let breakdown = &result.overall_score.breakdown;

        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();
        for (category, score, _) in breakdown.weighted() {
            if score >= 80.0 {
                strengths.push(format!("Strong {} ({})", category_label(category), score));
            } else if score < 50.0 {
                weaknesses.push(format!("Weak {} ({})", category_label(category), score));
            }
        }
        for (category, leader) in [
            ("overall score", &winner.overall),
            ("SEO", &winner.seo),
            ("security", &winner.security),
            ("technology adoption", &winner.technology),
        ] {
            if leader.as_deref() == Some(domain.as_str()) {
                strengths.push(format!("Leads in {}", category));
            }
        }

        let opportunities: Vec<String> = matrix
            .iter()
            .filter(|row| !row.usage.get(domain).map(|u| u.detected).unwrap_or(false))
            .filter_map(|row| {
                scans
                    .iter()
                    .find(|other| {
                        other.domain != *domain
                            && row.usage.get(&other.domain).map(|u| u.detected).unwrap_or(false)
                    })
                    .map(|other| format!("Consider adopting {} (used by {})", row.name, other.domain))
            })
            .take(MAX_OPPORTUNITIES)
            .collect();

        let mut recommendations = Vec::new();
        if result.overall_score.score < 70.0 {
            recommendations.push(
                "Improve overall website quality: work through the critical and important items of the full scan"
                    .to_string(),
            );
        }
        if breakdown.seo.map(|s| s < 60.0).unwrap_or(false) {
            recommendations.push(
                "Invest in SEO: fix titles, meta descriptions and headings to close the gap with competitors"
                    .to_string(),
            );
        }
        if !result.ssl_valid() {
            recommendations
                .push("Urgent: install a valid SSL certificate before competing on trust".to_string());
        }

        insights.strengths.insert(domain.clone(), strengths);
        insights.weaknesses.insert(domain.clone(), weaknesses);
        insights.opportunities.insert(domain.clone(), opportunities);
        insights
            .recommendations
            .insert(domain.clone(), recommendations);
    }

    insights
}
