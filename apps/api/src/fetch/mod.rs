//! Page fetching: the only place the service touches the network.
//!
//! Failures are classified but never retried; callers surface them as-is.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

/// Response headers keyed by lowercased name.
pub type ResponseHeaders = HashMap<String, String>;

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Request timeout - page took too long to load")]
    Timeout,

    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Network error - could not reach the URL")]
    NetworkUnreachable,

    #[error("Failed to fetch URL: {0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            }
        } else if e.is_connect() || e.is_request() {
            FetchError::NetworkUnreachable
        } else {
            FetchError::Other(e.to_string())
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub body: String,
    pub headers: ResponseHeaders,
}

/// Swappable fetch backend. Carried by the service as `Arc<dyn PageFetcher>`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// `reqwest`-backed fetcher: follows redirects, applies a timeout and user agent.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let headers = collect_headers(response.headers());
        let body = response.text().await?;

        debug!("Fetched {url}: {} bytes, status {}", body.len(), status);

        Ok(FetchedPage { body, headers })
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> ResponseHeaders {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}
