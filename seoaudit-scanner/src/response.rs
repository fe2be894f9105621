use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub url: String,
    /// URL after redirects were followed.
    pub final_url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub response_time: Duration,
}

impl FetchResponse {
    pub fn new(url: String, status_code: u16, body: String) -> Self {
        Self {
            final_url: url.clone(),
            url,
            status_code,
            content_type: None,
            body,
            response_time: Duration::from_secs(0),
        }
    }

    /// 2xx and 3xx responses count as a successful fetch.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status_code)
    }
}
