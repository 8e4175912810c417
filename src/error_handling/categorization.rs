//! Error categorization and retry strategy.
//!
//! This module provides functions to turn transport errors into collector
//! errors and to configure retry strategies.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::CollectorError;

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR` (doubles delay each retry)
/// - Maximum attempts: `RETRY_MAX_ATTEMPTS`
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(2))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Whether a `reqwest::Error` is worth another attempt.
///
/// Only connect failures and timeouts are retried; HTTP status errors and
/// body/decode failures will not change on a second try.
pub fn is_retriable(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

/// Categorizes a `reqwest::Error` into a `CollectorError` with a short,
/// human-readable message.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> CollectorError {
    if let Some(status) = error.status() {
        let message = match status.as_u16() {
            400 => "Bad Request (400)".to_string(),
            401 => "Unauthorized (401)".to_string(),
            403 => "Bot detection (403 Forbidden)".to_string(),
            404 => "Not Found (404)".to_string(),
            429 => "Too many requests (429)".to_string(),
            500 => "Internal Server Error (500)".to_string(),
            502 => "Bad Gateway (502)".to_string(),
            503 => "Service Unavailable (503)".to_string(),
            504 => "Gateway Timeout (504)".to_string(),
            code => format!("HTTP status {}", code),
        };
        return CollectorError::Network(message);
    }

    let kind = if error.is_builder() {
        "HTTP request builder error"
    } else if error.is_redirect() {
        "HTTP request redirect error"
    } else if error.is_timeout() {
        "HTTP request timeout error"
    } else if error.is_connect() {
        "HTTP request connect error"
    } else if error.is_body() {
        "HTTP request body error"
    } else if error.is_decode() {
        "HTTP request decode error"
    } else if error.is_request() {
        "HTTP request error"
    } else {
        "HTTP request other error"
    };
    CollectorError::Network(format!("{}: {}", kind, error))
}
