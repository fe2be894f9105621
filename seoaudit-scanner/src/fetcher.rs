use crate::error::{Result, ScanError};
use crate::response::FetchResponse;
use reqwest::Client;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_USER_AGENT: &str = concat!("seoaudit/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a URL into a status code and body.
///
/// A response with any HTTP status is `Ok`; `Err` means the transfer itself
/// failed (DNS, connection, timeout, invalid URL).
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse>> + Send;
}

pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        Self::with_settings(timeout_secs, DEFAULT_USER_AGENT)
    }

    pub fn with_settings(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn map_error(&self, err: reqwest::Error) -> ScanError {
        if err.is_timeout() {
            ScanError::Timeout(self.timeout_secs)
        } else if err.is_builder() {
            ScanError::InvalidUrl(err.to_string())
        } else {
            ScanError::HttpError(err)
        }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await.map_err(|e| self.map_error(e))?;
        let response_time = start.elapsed();

        debug!(
            "Fetched {} -> {} ({} bytes in {:?})",
            url,
            status_code,
            body.len(),
            response_time
        );

        Ok(FetchResponse {
            url: url.to_string(),
            final_url,
            status_code,
            content_type,
            body,
            response_time,
        })
    }
}
