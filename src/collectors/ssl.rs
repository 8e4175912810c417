//! TLS certificate inspection.
//!
//! Connects to port 443, performs a verified rustls handshake against the
//! webpki roots and extracts certificate details from the leaf:
//! - subject, issuer and SANs
//! - validity window and days until expiry
//! - negotiated protocol, cipher suite and key algorithm
//!
//! A handshake the verifier rejects (expired, self-signed, wrong name) is not a
//! collector failure: it yields `valid: false` with the reason. Only failing to
//! reach the server at all is an error.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustls::pki_types::ServerName;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use x509_parser::extensions::{GeneralName, ParsedExtension};

use crate::config::{TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS};
use crate::error_handling::CollectorError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SslReport {
    /// Chain verified and the current time is inside the validity window
    pub valid: bool,
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub days_until_expiry: Option<i64>,
    pub san: Vec<String>,
    pub protocol: Option<String>,
    pub cipher_suite: Option<String>,
    pub key_algorithm: Option<String>,
    /// Why the certificate was rejected, when `valid` is false
    pub validation_error: Option<String>,
}

/// Builds the rustls client config used for inspection.
fn client_config() -> ClientConfig {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

/// Inspects the certificate served on `domain:port`.
pub async fn inspect_certificate(domain: &str, port: u16) -> Result<SslReport, CollectorError> {
    log::debug!("Inspecting TLS certificate for {domain}:{port}");

    let server_name = ServerName::try_from(domain.to_string())
        .map_err(|e| CollectorError::parse(format!("Invalid domain name {}: {}", domain, e)))?;

    let sock = match tokio::time::timeout(
        Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
        TcpStream::connect((domain, port)),
    )
    .await
    {
        Ok(Ok(sock)) => sock,
        Ok(Err(e)) => {
            log::warn!("Failed to connect to {domain}:{port} - {e}");
            return Err(CollectorError::network(format!(
                "Failed to connect to {}:{} - {}",
                domain, port, e
            )));
        }
        Err(_) => {
            return Err(CollectorError::network(format!(
                "TCP connection timeout for {}:{} ({}s)",
                domain, port, TCP_CONNECT_TIMEOUT_SECS
            )));
        }
    };

    let connector = TlsConnector::from(Arc::new(client_config()));
    let tls_stream = match tokio::time::timeout(
        Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        connector.connect(server_name, sock),
    )
    .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            // The server answered; the certificate (or protocol) was refused
            log::info!("TLS verification failed for {domain}: {e}");
            return Ok(SslReport {
                valid: false,
                validation_error: Some(e.to_string()),
                ..Default::default()
            });
        }
        Err(_) => {
            return Err(CollectorError::network(format!(
                "TLS handshake timeout for {} ({}s)",
                domain, TLS_HANDSHAKE_TIMEOUT_SECS
            )));
        }
    };

    let connection = tls_stream.get_ref().1;
    let protocol = connection.protocol_version().map(|v| format!("{v:?}"));
    let cipher_suite = connection
        .negotiated_cipher_suite()
        .map(|cs| format!("{:?}", cs.suite()));

    let leaf = connection
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or_else(|| CollectorError::no_data(format!("{} sent no certificate", domain)))?;

    let mut report = parse_certificate(leaf.as_ref(), Utc::now())?;
    report.protocol = protocol;
    report.cipher_suite = cipher_suite;
    Ok(report)
}

/// Extracts report fields from a DER-encoded certificate.
///
/// `valid` is set from the validity window only; chain verification is the
/// handshake's job.
pub fn parse_certificate(der: &[u8], now: DateTime<Utc>) -> Result<SslReport, CollectorError> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| CollectorError::parse(format!("Failed to parse certificate: {}", e)))?;
    let tbs_cert = &cert.tbs_certificate;

    let valid_from = DateTime::from_timestamp(tbs_cert.validity.not_before.timestamp(), 0);
    let valid_to = DateTime::from_timestamp(tbs_cert.validity.not_after.timestamp(), 0);

    let in_window = match (valid_from, valid_to) {
        (Some(from), Some(to)) => from <= now && now <= to,
        _ => false,
    };

    Ok(SslReport {
        valid: in_window,
        subject: Some(tbs_cert.subject.to_string()),
        issuer: Some(tbs_cert.issuer.to_string()),
        valid_from,
        valid_to,
        days_until_expiry: valid_to.map(|to| (to - now).num_days()),
        san: extract_certificate_sans(&cert),
        protocol: None,
        cipher_suite: None,
        key_algorithm: Some(key_algorithm_name(
            &tbs_cert.subject_pki.algorithm.algorithm.to_string(),
        )),
        validation_error: (!in_window).then(|| "Certificate is outside its validity period".to_string()),
    })
}

/// Maps a public key algorithm OID to its common name.
fn key_algorithm_name(oid: &str) -> String {
    match oid {
        "1.2.840.113549.1.1.1" => "RSA".to_string(),
        "1.2.840.10045.2.1" => "ECDSA".to_string(),
        "1.3.101.112" => "Ed25519".to_string(),
        "1.3.101.113" => "Ed448".to_string(),
        other => other.to_string(),
    }
}

/// DNS names from the Subject Alternative Name extension.
fn extract_certificate_sans(cert: &x509_parser::certificate::X509Certificate<'_>) -> Vec<String> {
    let mut sans = Vec::new();
    for ext in cert.extensions() {
        if let ParsedExtension::SubjectAlternativeName(san) = ext.parsed_extension() {
            for general_name in &san.general_names {
                if let GeneralName::DNSName(dns_name) = general_name {
                    sans.push(dns_name.to_string());
                }
            }
        }
    }
    sans
}
