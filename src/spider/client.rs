//! Blocking HTTP transport with cookie reuse, and the page fetcher that retries a transient status once.

use crate::model::FetchResult;
use crate::spider::SpiderError;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// Anything that can perform a GET and report status plus body.
///
/// Implemented by [HttpClient] for real downloads and by scripted transports in tests.
pub trait Transport {
    fn get(&mut self, url: &str) -> Result<FetchResult, SpiderError>;
}

/// Blocking reqwest client with a cookie store, shared across every request of a download.
#[derive(Debug)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }
}

impl Transport for HttpClient {
    fn get(&mut self, url: &str) -> Result<FetchResult, SpiderError> {
        let response = self
            .inner
            .get(url)
            .send()
            .map_err(|e| SpiderError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status().as_u16();
        if status != 200 {
            return Ok(FetchResult::status(status));
        }
        let body = response.text().map_err(|e| SpiderError::BodyRead {
            url: url.to_string(),
            source: e,
        })?;
        Ok(FetchResult::ok(body))
    }
}

/// Builder for HttpClient with optional User-Agent and timeout.
#[derive(Debug)]
pub struct HttpClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set per-request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<HttpClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(HttpClient { inner })
    }
}

/// Single-page fetcher. A response whose status equals `retry_status` gets exactly one more GET.
pub struct PageFetcher<'a> {
    transport: &'a mut dyn Transport,
    retry_status: Option<u16>,
}

impl<'a> PageFetcher<'a> {
    pub fn new(transport: &'a mut dyn Transport, retry_status: Option<u16>) -> Self {
        Self {
            transport,
            retry_status,
        }
    }

    /// GET `url`, retrying once on the transient status. The second result is returned as-is.
    pub fn fetch(&mut self, url: &str) -> Result<FetchResult, SpiderError> {
        debug!(url, "GET");
        let result = self.transport.get(url)?;
        match self.retry_status {
            Some(code) if result.status_code == code => {
                warn!(url, status = code, "transient status, retrying once");
                self.transport.get(url)
            }
            _ => Ok(result),
        }
    }
}
