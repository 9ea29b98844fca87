//! JSON-tolerant HTTP fetch
//!
//! Upstream producers occasionally write `NaN` and `Infinity` as bare
//! numeric literals. Strict parsing is tried first; on failure those tokens
//! are replaced with `null` and the body is parsed once more.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parl_common::{Error, Result};
use regex::Regex;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde_json::Value;
use tracing::debug;

const USER_AGENT: &str = concat!("parl-viewer/", env!("CARGO_PKG_VERSION"));

static NAN_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bNaN\b").unwrap());
static INFINITY_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?Infinity\b").unwrap());

/// Source of JSON documents addressed by URL
///
/// The HTTP implementation is [`HttpSource`]; tests substitute in-memory
/// sources.
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Fetch and parse the document at `url`.
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// Fetches documents over HTTP, always asking the server for a fresh copy
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        // No request timeout: a slow document stalls only the worker fetching it.
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl JsonSource for HttpSource {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        if url.starts_with("file:") {
            return Err(Error::LocalFile(url.to_string()));
        }

        debug!(url = %url, "Fetching JSON document");

        let transport = |message: String| Error::Transport {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| transport(e.to_string()))?;

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or_default();
            return Err(transport(
                format!("HTTP {} {}", status.as_u16(), reason).trim_end().to_string(),
            ));
        }

        parse_tolerant(&body).map_err(|message| Error::Parse {
            url: url.to_string(),
            message,
        })
    }
}

/// Replaces bare `NaN`, `Infinity` and `-Infinity` tokens with `null`.
pub fn sanitize_non_finite(body: &str) -> String {
    let without_nan = NAN_TOKEN.replace_all(body, "null");
    INFINITY_TOKEN.replace_all(&without_nan, "null").into_owned()
}

/// Strict parse, then one sanitized retry. The error is the retry's parser message.
pub fn parse_tolerant(body: &str) -> std::result::Result<Value, String> {
    if let Ok(value) = serde_json::from_str(body) {
        return Ok(value);
    }

    let sanitized = sanitize_non_finite(body);
    serde_json::from_str(&sanitized).map_err(|e| e.to_string())
}
