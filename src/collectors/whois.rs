//! WHOIS registration lookup.
//!
//! Lookups go through the `whois-service` crate, which tries RDAP first,
//! falls back to WHOIS, and discovers the authoritative server through the
//! IANA bootstrap. Its parsed record is mapped into a [`WhoisReport`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use whois_service::WhoisResponse;

use crate::config::WHOIS_TIMEOUT_SECS;
use crate::error_handling::CollectorError;

/// Registration data for a domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoisReport {
    pub registrar: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub updated_date: Option<DateTime<Utc>>,
    pub name_servers: Vec<String>,
    pub status: Vec<String>,
    pub registrant_organization: Option<String>,
    pub registrant_country: Option<String>,
    /// Days since creation, at collection time
    pub domain_age_days: Option<i64>,
    /// Days until expiry (negative when expired), at collection time
    pub days_until_expiry: Option<i64>,
}

/// Registration fields as the lookup service reports them, before
/// normalization.
#[derive(Debug, Default)]
struct RawRegistration {
    registrar: Option<String>,
    creation_date: Option<String>,
    expiration_date: Option<String>,
    updated_date: Option<String>,
    registrant_name: Option<String>,
    status: Vec<String>,
    name_servers: Vec<String>,
}

/// WHOIS/RDAP client with an overall deadline per lookup.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    pub timeout: Duration,
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(WHOIS_TIMEOUT_SECS),
        }
    }
}

impl WhoisClient {
    /// Looks up a domain's registration record.
    pub async fn lookup(&self, domain: &str) -> Result<WhoisReport, CollectorError> {
        match tokio::time::timeout(self.timeout, lookup_inner(domain)).await {
            Ok(result) => result,
            Err(_) => Err(CollectorError::network(format!(
                "WHOIS lookup timed out for {} ({}s)",
                domain,
                self.timeout.as_secs()
            ))),
        }
    }
}

async fn lookup_inner(domain: &str) -> Result<WhoisReport, CollectorError> {
    log::debug!("Starting WHOIS lookup for domain: {}", domain);

    // Lightweight; built per lookup
    let client = whois_service::WhoisClient::new()
        .await
        .map_err(|e| CollectorError::network(format!("Failed to create WHOIS client: {}", e)))?;

    let response = client.lookup(domain).await.map_err(|e| {
        let message = e.to_string();
        if message.to_ascii_lowercase().contains("not found") {
            CollectorError::no_data(format!("No WHOIS record found for {}", domain))
        } else {
            CollectorError::network(format!("WHOIS lookup failed for {}: {}", domain, message))
        }
    })?;

    let mut report = convert_response(domain, &response)?;
    derive_ages(&mut report, Utc::now());
    Ok(report)
}

fn convert_response(domain: &str, response: &WhoisResponse) -> Result<WhoisReport, CollectorError> {
    let parsed = response.parsed_data.as_ref().ok_or_else(|| {
        CollectorError::parse(format!("WHOIS response for {} could not be parsed", domain))
    })?;

    let raw = RawRegistration {
        registrar: parsed.registrar.clone(),
        creation_date: parsed.creation_date.clone(),
        expiration_date: parsed.expiration_date.clone(),
        updated_date: parsed.updated_date.clone(),
        registrant_name: parsed.registrant_name.clone(),
        status: parsed.status.clone(),
        name_servers: parsed.name_servers.clone(),
    };
    build_report(domain, raw)
}

fn build_report(domain: &str, raw: RawRegistration) -> Result<WhoisReport, CollectorError> {
    let mut name_servers: Vec<String> = Vec::new();
    for value in &raw.name_servers {
        // Some registries list several servers in one entry
        for ns in value.split_whitespace() {
            let ns = ns.trim_end_matches('.').to_ascii_lowercase();
            if ns.contains('.') && !name_servers.contains(&ns) {
                name_servers.push(ns);
            }
        }
    }

    let mut status: Vec<String> = Vec::new();
    for value in &raw.status {
        // "clientTransferProhibited https://icann.org/epp#..." -> first token
        if let Some(code) = value.split_whitespace().next() {
            if !status.iter().any(|s| s == code) {
                status.push(code.to_string());
            }
        }
    }

    let report = WhoisReport {
        registrar: non_empty(raw.registrar),
        creation_date: raw.creation_date.as_deref().and_then(parse_date_string),
        expiration_date: raw.expiration_date.as_deref().and_then(parse_date_string),
        updated_date: raw.updated_date.as_deref().and_then(parse_date_string),
        name_servers,
        status,
        registrant_organization: non_empty(raw.registrant_name),
        // not provided by the lookup service
        registrant_country: None,
        domain_age_days: None,
        days_until_expiry: None,
    };

    if report.registrar.is_none()
        && report.creation_date.is_none()
        && report.expiration_date.is_none()
    {
        return Err(CollectorError::parse(format!(
            "WHOIS response for {} had no recognizable fields",
            domain
        )));
    }
    Ok(report)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fills `domain_age_days` and `days_until_expiry` relative to `now`.
pub fn derive_ages(report: &mut WhoisReport, now: DateTime<Utc>) {
    report.domain_age_days = report.creation_date.map(|d| (now - d).num_days());
    report.days_until_expiry = report.expiration_date.map(|d| (d - now).num_days());
}

/// Attempts to parse a date string in the formats registries commonly use.
fn parse_date_string(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d",
        "%d-%b-%Y",
        "%d/%m/%Y",
    ];

    for format in &formats {
        if let Ok(dt) = DateTime::parse_from_str(date_str, format) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive_dt) = chrono::NaiveDateTime::parse_from_str(date_str, format) {
            return Some(naive_dt.and_utc());
        }
        if let Ok(naive_date) = chrono::NaiveDate::parse_from_str(date_str, format) {
            return Some(naive_date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    // "2024-01-15 10:30:45 UTC" and similar trailing zone names
    let without_zone = date_str
        .rsplit_once(' ')
        .filter(|(_, zone)| zone.chars().all(|c| c.is_ascii_alphabetic()))
        .map(|(rest, _)| rest);
    without_zone.and_then(parse_date_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_registration() -> RawRegistration {
        RawRegistration {
            registrar: Some("RESERVED-Internet Assigned Numbers Authority".into()),
            creation_date: Some("1995-08-14T04:00:00Z".into()),
            expiration_date: Some("2025-08-13T04:00:00Z".into()),
            updated_date: Some("2024-08-14T07:01:34Z".into()),
            registrant_name: None,
            status: vec![
                "clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited".into(),
                "clientTransferProhibited https://icann.org/epp#clientTransferProhibited".into(),
                "clientDeleteProhibited".into(),
            ],
            name_servers: vec!["A.IANA-SERVERS.NET".into(), "B.IANA-SERVERS.NET.".into()],
        }
    }

    #[test]
    fn test_build_report_normalizes_fields() {
        let report = build_report("example.com", example_registration()).unwrap();
        assert_eq!(
            report.registrar.as_deref(),
            Some("RESERVED-Internet Assigned Numbers Authority")
        );
        assert_eq!(
            report.creation_date.unwrap().format("%Y-%m-%d").to_string(),
            "1995-08-14"
        );
        assert_eq!(
            report.expiration_date.unwrap().format("%Y-%m-%d").to_string(),
            "2025-08-13"
        );
        assert_eq!(
            report.updated_date.unwrap().format("%Y-%m-%d").to_string(),
            "2024-08-14"
        );
        assert_eq!(
            report.name_servers,
            vec!["a.iana-servers.net", "b.iana-servers.net"]
        );
        assert_eq!(
            report.status,
            vec!["clientDeleteProhibited", "clientTransferProhibited"]
        );
        assert_eq!(report.domain_age_days, None);
    }

    #[test]
    fn test_build_report_splits_multi_server_entries() {
        let raw = RawRegistration {
            registrar: Some("RU-CENTER-RU".into()),
            name_servers: vec!["ns1.example.ru. ns2.example.ru.".into()],
            registrant_name: Some("  Example LLC ".into()),
            ..Default::default()
        };
        let report = build_report("example.ru", raw).unwrap();
        assert_eq!(report.name_servers, vec!["ns1.example.ru", "ns2.example.ru"]);
        assert_eq!(report.registrant_organization.as_deref(), Some("Example LLC"));
        assert_eq!(report.registrant_country, None);
    }

    #[test]
    fn test_build_report_without_core_fields_is_parse_error() {
        let raw = RawRegistration {
            registrar: Some("   ".into()),
            creation_date: Some("sometime last year".into()),
            name_servers: vec!["ns1.example.com".into()],
            ..Default::default()
        };
        let err = build_report("example.com", raw).unwrap_err();
        assert!(matches!(err, CollectorError::Parse(ref m) if m.contains("example.com")));
    }

    #[test]
    fn test_derive_ages() {
        let mut report = WhoisReport {
            creation_date: parse_date_string("2020-01-01"),
            expiration_date: parse_date_string("2030-01-01"),
            ..Default::default()
        };
        let now = parse_date_string("2025-01-01").unwrap();
        derive_ages(&mut report, now);
        assert_eq!(report.domain_age_days, Some(1827));
        assert_eq!(report.days_until_expiry, Some(1826));
    }

    #[test]
    fn test_derive_ages_expired_is_negative() {
        let mut report = WhoisReport {
            expiration_date: parse_date_string("2024-12-22"),
            ..Default::default()
        };
        derive_ages(&mut report, parse_date_string("2025-01-01").unwrap());
        assert_eq!(report.domain_age_days, None);
        assert_eq!(report.days_until_expiry, Some(-10));
    }

    #[test]
    fn test_parse_date_string_formats() {
        for input in [
            "2024-01-15T10:30:45.123Z",
            "2024-01-15T10:30:45Z",
            "2024-01-15T10:30:45+00:00",
            "2024-01-15 10:30:45",
            "2024-01-15",
            "15-Jan-2024",
            "15/01/2024",
            "2024-01-15 10:30:45 UTC",
        ] {
            let parsed = parse_date_string(input);
            assert!(parsed.is_some(), "failed to parse {input}");
            assert_eq!(parsed.unwrap().format("%Y-%m-%d").to_string(), "2024-01-15");
        }
    }

    #[test]
    fn test_parse_date_string_invalid() {
        assert!(parse_date_string("not a date").is_none());
        assert!(parse_date_string("").is_none());
    }
}
