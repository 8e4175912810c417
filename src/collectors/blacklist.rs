//! DNS blocklist (DNSBL) checks.
//!
//! Each IPv4 address of the domain is reversed and looked up under the IP
//! zones; the domain itself is looked up under the domain zones. An A answer
//! inside 127.0.0.0/8 means listed. NXDomain means not listed.

use std::net::Ipv4Addr;

use hickory_resolver::TokioAsyncResolver;
use serde::{Deserialize, Serialize};

use crate::error_handling::CollectorError;

/// Zones queried with reversed IPv4 addresses.
pub const IP_BLOCKLISTS: &[&str] = &[
    "zen.spamhaus.org",
    "bl.spamcop.net",
    "b.barracudacentral.org",
    "dnsbl.sorbs.net",
];

/// Zones queried with the domain name.
pub const DOMAIN_BLOCKLISTS: &[&str] = &["dbl.spamhaus.org"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistReport {
    pub blacklisted: bool,
    /// Zones that listed the domain or one of its addresses
    pub listed_on: Vec<String>,
    /// Zones that answered (listed or not)
    pub checked: Vec<String>,
    pub ip_addresses: Vec<String>,
}

/// `1.2.3.4` -> `4.3.2.1.<zone>`
pub fn reversed_query(ip: Ipv4Addr, zone: &str) -> String {
    let [a, b, c, d] = ip.octets();
    format!("{}.{}.{}.{}.{}", d, c, b, a, zone)
}

/// Whether a DNSBL answer signals a listing.
///
/// Spamhaus answers 127.255.255.x for query errors (public resolver, rate
/// limit); those are not listings.
pub fn is_listing(answer: Ipv4Addr) -> bool {
    let [a, b, _, _] = answer.octets();
    a == 127 && b != 255
}

enum ZoneAnswer {
    Listed,
    NotListed,
    Failed(String),
}

async fn query_zone(resolver: &TokioAsyncResolver, name: &str) -> ZoneAnswer {
    match resolver.ipv4_lookup(name).await {
        Ok(lookup) => {
            if lookup.iter().any(|a| is_listing(a.0)) {
                ZoneAnswer::Listed
            } else {
                ZoneAnswer::NotListed
            }
        }
        Err(e) => {
            let error_msg = e.to_string();
            if error_msg.contains("no records found") || error_msg.contains("NXDomain") {
                ZoneAnswer::NotListed
            } else {
                ZoneAnswer::Failed(error_msg)
            }
        }
    }
}

/// Checks a domain and its IPv4 addresses against the blocklists.
///
/// Fails if the domain has no IPv4 address or if no zone answered at all.
pub async fn check_blacklists(
    resolver: &TokioAsyncResolver,
    domain: &str,
) -> Result<BlacklistReport, CollectorError> {
    let ips: Vec<Ipv4Addr> = resolver
        .ipv4_lookup(domain)
        .await
        .map_err(|e| CollectorError::network(format!("Failed to resolve {}: {}", domain, e)))?
        .iter()
        .map(|a| a.0)
        .collect();

    if ips.is_empty() {
        return Err(CollectorError::no_data(format!("{} has no IPv4 address", domain)));
    }

    let mut queries: Vec<(&str, String)> = Vec::new();
    for ip in &ips {
        for zone in IP_BLOCKLISTS {
            queries.push((*zone, reversed_query(*ip, zone)));
        }
    }
    for zone in DOMAIN_BLOCKLISTS {
        queries.push((*zone, format!("{}.{}", domain, zone)));
    }

    let answers = futures::future::join_all(
        queries
            .iter()
            .map(|(_, name)| query_zone(resolver, name)),
    )
    .await;

    let mut report = BlacklistReport {
        ip_addresses: ips.iter().map(Ipv4Addr::to_string).collect(),
        ..Default::default()
    };
    let mut last_failure = None;

    for ((zone, name), answer) in queries.iter().zip(answers) {
        let zone = zone.to_string();
        match answer {
            ZoneAnswer::Listed => {
                log::info!("{} is listed on {} ({})", domain, zone, name);
                if !report.listed_on.contains(&zone) {
                    report.listed_on.push(zone.clone());
                }
            }
            ZoneAnswer::NotListed => {}
            ZoneAnswer::Failed(e) => {
                log::debug!("DNSBL query {} failed: {}", name, e);
                last_failure = Some(e);
                continue;
            }
        }
        if !report.checked.contains(&zone) {
            report.checked.push(zone);
        }
    }

    if report.checked.is_empty() {
        return Err(CollectorError::network(format!(
            "No blocklist answered for {}: {}",
            domain,
            last_failure.unwrap_or_default()
        )));
    }

    report.blacklisted = !report.listed_on.is_empty();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_query() {
        assert_eq!(
            reversed_query(Ipv4Addr::new(192, 0, 2, 1), "zen.spamhaus.org"),
            "1.2.0.192.zen.spamhaus.org"
        );
    }

    #[test]
    fn test_is_listing() {
        assert!(is_listing(Ipv4Addr::new(127, 0, 0, 2)));
        assert!(is_listing(Ipv4Addr::new(127, 0, 1, 4)));
        assert!(!is_listing(Ipv4Addr::new(127, 255, 255, 254)));
        assert!(!is_listing(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn test_zone_lists_are_disjoint() {
        for zone in DOMAIN_BLOCKLISTS {
            assert!(!IP_BLOCKLISTS.contains(zone));
        }
    }
}
