//! The per-domain result envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collectors::{
    BlacklistReport, BusinessReport, DnsReport, PerformanceReport, SecurityHeadersReport,
    SeoReport, SslReport, TechnologiesReport, WhoisReport,
};
use crate::error_handling::CollectorError;
use crate::recommend::Recommendations;
use crate::scoring::{Grade, OverallScore};

/// One category of a scan: the collector's report, or why it is missing.
///
/// Serialized untagged, so JSON shows either the report object or
/// `{"error": "..."}`. No report type has a top-level `error` field, which
/// keeps deserialization unambiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section<T> {
    Failed { error: String },
    Collected(T),
}

impl<T> Section<T> {
    /// The report, or `None` if the collector failed. This is the only way
    /// scoring and recommendations reach collector fields.
    pub fn collected(&self) -> Option<&T> {
        match self {
            Section::Collected(report) => Some(report),
            Section::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Section::Failed { error } => Some(error),
            Section::Collected(_) => None,
        }
    }

    pub fn is_collected(&self) -> bool {
        matches!(self, Section::Collected(_))
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Section::Failed {
            error: error.into(),
        }
    }
}

impl<T> From<Result<T, CollectorError>> for Section<T> {
    fn from(result: Result<T, CollectorError>) -> Self {
        match result {
            Ok(report) => Section::Collected(report),
            Err(e) => Section::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Score of a competitor scanned alongside the main domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorBenchmark {
    pub domain: String,
    pub score: f64,
    pub grade: Grade,
}

/// Everything known about one domain after a complete scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub domain: String,
    pub url: String,
    pub scan_date: DateTime<Utc>,
    pub scan_id: String,
    pub dns: Section<DnsReport>,
    pub whois: Section<WhoisReport>,
    pub ssl: Section<SslReport>,
    pub blacklist: Section<BlacklistReport>,
    pub security_headers: Section<SecurityHeadersReport>,
    pub seo: Section<SeoReport>,
    pub technologies: Section<TechnologiesReport>,
    pub business_intelligence: Section<BusinessReport>,
    pub performance: Section<PerformanceReport>,
    #[serde(default)]
    pub competitors: Vec<CompetitorBenchmark>,
    pub recommendations: Recommendations,
    pub overall_score: OverallScore,
    /// Wall-clock seconds, two decimals
    pub execution_time: f64,
}

impl ScanResult {
    /// `(category, error)` for every category whose collector failed.
    pub fn failed_categories(&self) -> Vec<(&'static str, &str)> {
        let sections: [(&'static str, Option<&str>); 9] = [
            ("dns", self.dns.error()),
            ("whois", self.whois.error()),
            ("ssl", self.ssl.error()),
            ("blacklist", self.blacklist.error()),
            ("security_headers", self.security_headers.error()),
            ("seo", self.seo.error()),
            ("technologies", self.technologies.error()),
            ("business_intelligence", self.business_intelligence.error()),
            ("performance", self.performance.error()),
        ];
        sections
            .into_iter()
            .filter_map(|(name, error)| error.map(|e| (name, e)))
            .collect()
    }

    /// SSL collected and the certificate verified.
    pub fn ssl_valid(&self) -> bool {
        self.ssl.collected().map(|s| s.valid).unwrap_or(false)
    }
}
