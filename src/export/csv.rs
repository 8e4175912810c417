//! CSV export.
//!
//! A scan becomes one row per category (`category, status, score, detail`).
//! A comparison becomes one row per domain with its sub-scores. Bulk results
//! become one row per task.

use anyhow::{Context, Result};
use ::csv::Writer;

use crate::bulk::BulkJobResults;
use crate::compare::ComparisonReport;
use crate::scan::{Section, ScanResult};

const STATUS_OK: &str = "ok";
const STATUS_ERROR: &str = "error";

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn opt_number<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// `(status, score, detail)` for one section.
fn section_row<T>(
    section: &Section<T>,
    score: impl Fn(&T) -> String,
    detail: impl Fn(&T) -> String,
) -> (&'static str, String, String) {
    match section {
        Section::Collected(report) => (STATUS_OK, score(report), detail(report)),
        Section::Failed { error } => (STATUS_ERROR, String::new(), error.clone()),
    }
}

pub fn scan_to_csv(result: &ScanResult) -> Result<String> {
    let breakdown = &result.overall_score.breakdown;
    let rows = [
        (
            "dns",
            section_row(
                &result.dns,
                |_| String::new(),
                |d| {
                    format!(
                        "{} A, {} AAAA, {} MX, {} NS; SPF {}; DMARC {}",
                        d.a_records.len(),
                        d.aaaa_records.len(),
                        d.mx_records.len(),
                        d.ns_records.len(),
                        yes_no(d.spf_record.is_some()),
                        yes_no(d.dmarc_record.is_some())
                    )
                },
            ),
        ),
        (
            "whois",
            section_row(
                &result.whois,
                |_| String::new(),
                |w| {
                    format!(
                        "registrar: {}; age: {} days; expires in: {} days",
                        w.registrar.as_deref().unwrap_or("unknown"),
                        opt_number(w.domain_age_days),
                        opt_number(w.days_until_expiry)
                    )
                },
            ),
        ),
        (
            "ssl",
            section_row(
                &result.ssl,
                |_| breakdown.ssl.to_string(),
                |s| match &s.validation_error {
                    Some(reason) => format!("invalid: {}", reason),
                    None => format!(
                        "valid: {}; issuer: {}; expires in: {} days",
                        yes_no(s.valid),
                        s.issuer.as_deref().unwrap_or("unknown"),
                        opt_number(s.days_until_expiry)
                    ),
                },
            ),
        ),
        (
            "blacklist",
            section_row(
                &result.blacklist,
                |_| String::new(),
                |b| {
                    if b.blacklisted {
                        format!("listed on {}", b.listed_on.join(", "))
                    } else {
                        format!("not listed ({} lists checked)", b.checked.len())
                    }
                },
            ),
        ),
        (
            "security_headers",
            section_row(
                &result.security_headers,
                |h| h.score.to_string(),
                |h| {
                    if h.missing.is_empty() {
                        "all headers present".to_string()
                    } else {
                        format!("missing: {}", h.missing.join(", "))
                    }
                },
            ),
        ),
        (
            "seo",
            section_row(
                &result.seo,
                |s| s.score.to_string(),
                |s| s.issues.join("; "),
            ),
        ),
        (
            "technologies",
            section_row(
                &result.technologies,
                |_| opt_number(breakdown.technologies),
                |t| {
                    t.technologies
                        .iter()
                        .map(|tech| tech.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                },
            ),
        ),
        (
            "business_intelligence",
            section_row(
                &result.business_intelligence,
                |_| breakdown.business.to_string(),
                |b| {
                    format!(
                        "company: {}; {} emails; {} phones; {} social profiles",
                        b.company_name.as_deref().unwrap_or("unknown"),
                        b.emails.len(),
                        b.phones.len(),
                        b.social_profiles.len()
                    )
                },
            ),
        ),
        (
            "performance",
            section_row(
                &result.performance,
                |p| p.score.to_string(),
                |p| {
                    format!(
                        "TTFB {} ms; load {} ms; {} bytes",
                        p.ttfb_ms, p.load_time_ms, p.page_size_bytes
                    )
                },
            ),
        ),
    ];

    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["category", "status", "score", "detail"])?;
    for (category, (status, score, detail)) in &rows {
        writer.write_record([*category, *status, score.as_str(), detail.as_str()])?;
    }
    let overall_score = result.overall_score.score.to_string();
    let overall_detail = format!(
        "grade {}; {} recommendations",
        result.overall_score.grade, result.recommendations.total_recommendations
    );
    writer.write_record([
        "overall",
        STATUS_OK,
        overall_score.as_str(),
        overall_detail.as_str(),
    ])?;
    finish(writer)
}

/// One row per domain, in ranking order.
pub fn comparison_to_csv(report: &ComparisonReport) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record([
        "rank",
        "domain",
        "score",
        "grade",
        "seo",
        "security",
        "performance",
        "technologies",
        "ssl",
        "business",
    ])?;
    for (index, entry) in report.overall_scores.iter().enumerate() {
        let b = &entry.breakdown;
        writer.write_record([
            (index + 1).to_string(),
            entry.domain.clone(),
            entry.score.to_string(),
            entry.grade.to_string(),
            opt_number(b.seo),
            opt_number(b.security),
            opt_number(b.performance),
            opt_number(b.technologies),
            b.ssl.to_string(),
            b.business.to_string(),
        ])?;
    }
    finish(writer)
}

/// One row per task. `score` is filled for complete scans only.
pub fn bulk_results_to_csv(results: &BulkJobResults) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["job_id", "domain", "status", "score", "grade", "error"])?;
    for task in &results.tasks {
        let overall = task.result.as_ref().and_then(|r| r.get("overall_score"));
        let score = overall
            .and_then(|o| o.get("score"))
            .and_then(|s| s.as_f64())
            .map(|s| s.to_string())
            .unwrap_or_default();
        let grade = overall
            .and_then(|o| o.get("grade"))
            .and_then(|g| g.as_str())
            .unwrap_or_default();
        let status = task.status.to_string();
        writer.write_record([
            task.job_id.as_str(),
            task.domain.as_str(),
            status.as_str(),
            score.as_str(),
            grade,
            task.error.as_deref().unwrap_or_default(),
        ])?;
    }
    finish(writer)
}
