//! DNS record collection (A, AAAA, MX, NS, TXT, SPF, DMARC).

use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use serde::{Deserialize, Serialize};

use crate::error_handling::CollectorError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    pub priority: u16,
    pub exchange: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsReport {
    pub a_records: Vec<String>,
    pub aaaa_records: Vec<String>,
    /// Sorted by priority (lowest first)
    pub mx_records: Vec<MxRecord>,
    pub ns_records: Vec<String>,
    pub txt_records: Vec<String>,
    pub spf_record: Option<String>,
    pub dmarc_record: Option<String>,
}

impl DnsReport {
    pub fn has_mail(&self) -> bool {
        !self.mx_records.is_empty()
    }
}

/// Runs one lookup, mapping "no records" answers to an empty list.
///
/// Timeouts and server failures are errors; the caller decides whether the
/// whole category failed.
async fn lookup_rdata(
    resolver: &TokioAsyncResolver,
    name: &str,
    record_type: RecordType,
) -> Result<Vec<RData>, String> {
    match resolver.lookup(name, record_type).await {
        Ok(lookup) => Ok(lookup.iter().cloned().collect()),
        Err(e) => {
            let error_msg = e.to_string();
            // Missing records are expected for many names
            if error_msg.contains("no records found") || error_msg.contains("NXDomain") {
                Ok(Vec::new())
            } else {
                if error_msg.contains("timeout") || error_msg.contains("timed out") {
                    log::warn!("{record_type} lookup timed out for {name}: {e}");
                } else {
                    log::warn!("Failed to lookup {record_type} records for {name}: {e}");
                }
                Err(format!("{} lookup failed: {}", record_type, e))
            }
        }
    }
}

fn txt_strings(rdata: &[RData]) -> Vec<String> {
    rdata
        .iter()
        .filter_map(|r| {
            if let RData::TXT(txt) = r {
                // TXT records can carry several strings; they form one value
                Some(
                    txt.iter()
                        .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                        .collect::<Vec<String>>()
                        .join(""),
                )
            } else {
                None
            }
        })
        .collect()
}

fn trim_root(name: String) -> String {
    name.trim_end_matches('.').to_string()
}

/// Picks the SPF policy out of a domain's TXT records.
pub fn extract_spf(txt_records: &[String]) -> Option<String> {
    txt_records
        .iter()
        .find(|r| r.to_ascii_lowercase().starts_with("v=spf1"))
        .cloned()
}

/// Picks the DMARC policy out of `_dmarc.<domain>` TXT records.
pub fn extract_dmarc(txt_records: &[String]) -> Option<String> {
    txt_records
        .iter()
        .find(|r| r.to_ascii_uppercase().starts_with("V=DMARC1"))
        .cloned()
}

/// Collects the DNS profile of a domain.
///
/// Individual lookups that fail are logged and left empty. The category fails
/// only when every lookup failed, which means the resolver is unreachable or
/// the domain does not exist at all.
pub async fn collect_dns(
    resolver: &TokioAsyncResolver,
    domain: &str,
) -> Result<DnsReport, CollectorError> {
    let dmarc_name = format!("_dmarc.{}", domain);
    let (a, aaaa, mx, ns, txt, dmarc) = tokio::join!(
        lookup_rdata(resolver, domain, RecordType::A),
        lookup_rdata(resolver, domain, RecordType::AAAA),
        lookup_rdata(resolver, domain, RecordType::MX),
        lookup_rdata(resolver, domain, RecordType::NS),
        lookup_rdata(resolver, domain, RecordType::TXT),
        lookup_rdata(resolver, &dmarc_name, RecordType::TXT),
    );

    let results = [&a, &aaaa, &mx, &ns, &txt, &dmarc];
    if results.iter().all(|r| r.is_err()) {
        let first = results
            .iter()
            .find_map(|r| r.as_ref().err().cloned())
            .unwrap_or_default();
        return Err(CollectorError::network(format!(
            "DNS lookups failed for {}: {}",
            domain, first
        )));
    }

    let a = a.unwrap_or_default();
    let aaaa = aaaa.unwrap_or_default();
    let mx = mx.unwrap_or_default();
    let ns = ns.unwrap_or_default();
    let txt = txt.unwrap_or_default();
    let dmarc = dmarc.unwrap_or_default();

    let a_records = a
        .iter()
        .filter_map(|r| match r {
            RData::A(addr) => Some(addr.0.to_string()),
            _ => None,
        })
        .collect();
    let aaaa_records = aaaa
        .iter()
        .filter_map(|r| match r {
            RData::AAAA(addr) => Some(addr.0.to_string()),
            _ => None,
        })
        .collect();

    let mut mx_records: Vec<MxRecord> = mx
        .iter()
        .filter_map(|r| match r {
            RData::MX(mx) => Some(MxRecord {
                priority: mx.preference(),
                exchange: trim_root(mx.exchange().to_utf8()),
            }),
            _ => None,
        })
        .collect();
    // Lower preference = higher priority
    mx_records.sort_by_key(|r| r.priority);

    let ns_records = ns
        .iter()
        .filter_map(|r| match r {
            RData::NS(ns) => Some(trim_root(ns.0.to_utf8())),
            _ => None,
        })
        .collect();

    let txt_records = txt_strings(&txt);
    let spf_record = extract_spf(&txt_records);
    let dmarc_record = extract_dmarc(&txt_strings(&dmarc));

    Ok(DnsReport {
        a_records,
        aaaa_records,
        mx_records,
        ns_records,
        txt_records,
        spf_record,
        dmarc_record,
    })
}
