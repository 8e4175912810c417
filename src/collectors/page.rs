//! Page fetching shared by the HTTP-based collectors.
//!
//! Security headers, SEO, technology, business intelligence and performance
//! are all derived from one GET of the site's home page. The fetch records
//! time to first byte and total load time so the performance collector can
//! reuse it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use scraper::Html;

use crate::config::MAX_RESPONSE_BODY_SIZE;
use crate::error_handling::{
    categorize_reqwest_error, get_retry_strategy, is_retriable, CollectorError,
};
use crate::utils::duration_to_ms;

/// A fetched page with lowercased response headers.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,
    /// URL after redirects
    pub final_url: String,
    pub status: u16,
    /// Response headers; names lowercased, repeated headers joined with `\n`
    pub headers: HashMap<String, String>,
    /// Body decoded as UTF-8 (lossy), capped at `MAX_RESPONSE_BODY_SIZE`
    pub body: String,
    /// Bytes received before truncation
    pub size_bytes: u64,
    pub ttfb: Duration,
    pub load_time: Duration,
}

impl FetchedPage {
    /// Builds a page from already-available parts (tests and offline analysis).
    pub fn from_parts(url: &str, headers: &[(&str, &str)], body: &str) -> Self {
        let mut map: HashMap<String, String> = HashMap::new();
        for (name, value) in headers {
            insert_header(&mut map, &name.to_ascii_lowercase(), value);
        }
        Self {
            url: url.to_string(),
            final_url: url.to_string(),
            status: 200,
            headers: map,
            body: body.to_string(),
            size_bytes: body.len() as u64,
            ttfb: Duration::ZERO,
            load_time: Duration::ZERO,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn ttfb_ms(&self) -> u64 {
        duration_to_ms(self.ttfb)
    }

    pub fn load_time_ms(&self) -> u64 {
        duration_to_ms(self.load_time)
    }

    /// Parses the body. `Html` is not `Send`, so callers parse inside a
    /// synchronous analysis function and never hold it across an await.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

fn insert_header(map: &mut HashMap<String, String>, name: &str, value: &str) {
    map.entry(name.to_string())
        .and_modify(|existing| {
            existing.push('\n');
            existing.push_str(value);
        })
        .or_insert_with(|| value.to_string());
}

/// Fetches a page, retrying connect failures and timeouts.
///
/// HTTP error statuses (4xx/5xx) are failures; the page collectors have
/// nothing meaningful to analyze on an error page.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<FetchedPage, CollectorError> {
    log::debug!("Fetching {}", url);

    let result = tokio_retry::RetryIf::spawn(
        get_retry_strategy(),
        || fetch_once(client, url),
        |e: &reqwest::Error| {
            let retry = is_retriable(e);
            if retry {
                log::debug!("Retrying {} after error: {}", url, e);
            }
            retry
        },
    )
    .await;

    result.map_err(|e| {
        let err = categorize_reqwest_error(&e);
        log::warn!("Failed to fetch {}: {}", url, err);
        err
    })
}

async fn fetch_once(client: &reqwest::Client, url: &str) -> Result<FetchedPage, reqwest::Error> {
    let start = Instant::now();
    let mut response = client.get(url).send().await?.error_for_status()?;
    let ttfb = start.elapsed();

    let status = response.status().as_u16();
    let final_url = response.url().to_string();

    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            insert_header(&mut headers, name.as_str(), value);
        }
    }

    let mut body: Vec<u8> = Vec::new();
    let mut size_bytes: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        size_bytes += chunk.len() as u64;
        let remaining = MAX_RESPONSE_BODY_SIZE.saturating_sub(body.len());
        if remaining > 0 {
            body.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
        }
    }
    let load_time = start.elapsed();

    if size_bytes as usize > MAX_RESPONSE_BODY_SIZE {
        log::debug!(
            "Truncated body of {} from {} to {} bytes",
            url,
            size_bytes,
            MAX_RESPONSE_BODY_SIZE
        );
    }

    Ok(FetchedPage {
        url: url.to_string(),
        final_url,
        status,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
        size_bytes,
        ttfb,
        load_time,
    })
}
