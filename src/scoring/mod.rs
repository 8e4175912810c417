//! Overall score calculation.
//!
//! Each category yields a 0-100 sub-score. SEO, security, performance and
//! technologies are left out of the average when their collector failed; SSL
//! and business are always present (0 when their collector failed). The
//! overall score is the weighted mean over the categories present, so a
//! missing category re-normalizes the weights instead of counting as 0.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::collectors::BusinessReport;
use crate::config::{
    TECHNOLOGY_SATURATION_COUNT, WEIGHT_BUSINESS, WEIGHT_PERFORMANCE, WEIGHT_SECURITY, WEIGHT_SEO,
    WEIGHT_SSL, WEIGHT_TECHNOLOGIES,
};
use crate::scan::ScanResult;
use crate::utils::round2;

/// Letter grade derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Grade {
    #[serde(rename = "A+")]
    #[strum(serialize = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    #[strum(serialize = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    #[strum(serialize = "C+")]
    CPlus,
    C,
    #[serde(rename = "D+")]
    #[strum(serialize = "D+")]
    DPlus,
    D,
    F,
}

/// Inclusive lower bounds, highest first.
const GRADE_THRESHOLDS: &[(f64, Grade)] = &[
    (90.0, Grade::APlus),
    (85.0, Grade::A),
    (80.0, Grade::BPlus),
    (75.0, Grade::B),
    (70.0, Grade::CPlus),
    (65.0, Grade::C),
    (60.0, Grade::DPlus),
    (55.0, Grade::D),
];

const INTERPRETATIONS: &[(f64, &str)] = &[
    (
        90.0,
        "Excellent. The website follows best practices in nearly every area.",
    ),
    (
        80.0,
        "Very good. The website is well optimized with a few areas left to polish.",
    ),
    (
        70.0,
        "Good. The fundamentals are in place but several improvements are available.",
    ),
    (60.0, "Fair. The website needs attention in multiple areas."),
    (
        50.0,
        "Poor. Significant improvements are needed to compete effectively.",
    ),
];
const INTERPRETATION_CRITICAL: &str =
    "Critical. The website has serious issues that need immediate attention.";

/// Per-category sub-scores, 0-100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seo: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub security: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub performance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub technologies: Option<f64>,
    pub ssl: f64,
    pub business: f64,
}

impl Breakdown {
    /// `(category, score, weight)` for the categories present, in weight order.
    pub fn weighted(&self) -> Vec<(&'static str, f64, f64)> {
        [
            ("seo", self.seo, WEIGHT_SEO),
            ("security", self.security, WEIGHT_SECURITY),
            ("performance", self.performance, WEIGHT_PERFORMANCE),
            ("technologies", self.technologies, WEIGHT_TECHNOLOGIES),
            ("ssl", Some(self.ssl), WEIGHT_SSL),
            ("business", Some(self.business), WEIGHT_BUSINESS),
        ]
        .into_iter()
        .filter_map(|(name, score, weight)| score.map(|s| (name, s, weight)))
        .collect()
    }

    /// Weighted mean over the present categories, rounded to two decimals.
    pub fn overall(&self) -> f64 {
        let entries = self.weighted();
        let total_weight: f64 = entries.iter().map(|(_, _, w)| w).sum();
        if total_weight == 0.0 {
            return 0.0;
        }
        let weighted_sum: f64 = entries.iter().map(|(_, s, w)| s * w).sum();
        round2(weighted_sum / total_weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallScore {
    pub score: f64,
    pub grade: Grade,
    pub breakdown: Breakdown,
    pub interpretation: String,
}

impl OverallScore {
    pub fn from_breakdown(breakdown: Breakdown) -> Self {
        let score = breakdown.overall();
        Self {
            score,
            grade: grade_for(score),
            interpretation: interpretation_for(score).to_string(),
            breakdown,
        }
    }
}

pub fn grade_for(score: f64) -> Grade {
    GRADE_THRESHOLDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::F)
}

pub fn interpretation_for(score: f64) -> &'static str {
    INTERPRETATIONS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, text)| *text)
        .unwrap_or(INTERPRETATION_CRITICAL)
}

/// `min(100, count / 15 * 100)`, unrounded.
pub fn technology_score(count: usize) -> f64 {
    (count as f64 * 100.0 / TECHNOLOGY_SATURATION_COUNT).min(100.0)
}

/// +30 for an email, +30 for a social profile, +40 for a company name.
pub fn business_score(report: &BusinessReport) -> f64 {
    let mut score = 0.0;
    if !report.emails.is_empty() {
        score += 30.0;
    }
    if !report.social_profiles.is_empty() {
        score += 30.0;
    }
    if report.company_name.is_some() {
        score += 40.0;
    }
    score
}

/// Sub-scores for an assembled scan.
pub fn breakdown(result: &ScanResult) -> Breakdown {
    Breakdown {
        seo: result.seo.collected().map(|s| f64::from(s.score)),
        security: result.security_headers.collected().map(|s| f64::from(s.score)),
        performance: result.performance.collected().map(|p| f64::from(p.score)),
        technologies: result
            .technologies
            .collected()
            .map(|t| technology_score(t.count)),
        ssl: if result.ssl_valid() { 100.0 } else { 0.0 },
        business: result
            .business_intelligence
            .collected()
            .map(business_score)
            .unwrap_or(0.0),
    }
}

/// Scores an assembled scan. The envelope's own `overall_score` is ignored.
pub fn score(result: &ScanResult) -> OverallScore {
    OverallScore::from_breakdown(breakdown(result))
}
