//! Single-attempt HTTP GET with a browser-like identity.
//!
//! Discovery is opportunistic: there are no retries and no backoff. A
//! failed fetch is returned as a [`FetchError`] and the caller treats the
//! page or strategy as empty.

use crate::config::Config;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use tracing::{debug, instrument};

/// Raw response of one GET.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

/// Anything that can GET a URL. Implemented by [`HttpFetcher`] and by the
/// in-memory fetcher used in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// reqwest-backed fetcher with fixed headers and timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build the client with the configured identity headers and timeout.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies `user_agent`, `accept_language` and the timeout
    ///
    /// # Returns
    ///
    /// The fetcher, or [`FetchError::Http`] when a header value is not a
    /// valid HTTP header or the client cannot be built.
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| FetchError::Http(format!("invalid user agent: {e}")))?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| FetchError::Http(format!("invalid accept-language: {e}")))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "Fetched");
        Ok(FetchResponse { status, body })
    }
}

/// Fetch and return the body only for a non-empty 200 response.
///
/// # Arguments
///
/// * `fetcher` - Transport to use
/// * `url` - Absolute URL to GET
///
/// # Returns
///
/// The body, [`FetchError::Status`] for any other status, or
/// [`FetchError::EmptyBody`] for a blank 200.
pub async fn fetch_ok(fetcher: &dyn Fetch, url: &str) -> Result<String, FetchError> {
    let response = fetcher.fetch(url).await?;
    if response.status != 200 {
        return Err(FetchError::Status(response.status));
    }
    if response.body.trim().is_empty() {
        return Err(FetchError::EmptyBody);
    }
    Ok(response.body)
}
