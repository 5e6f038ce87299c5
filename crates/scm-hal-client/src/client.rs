//! Reqwest-backed line fetcher for a HAL backend.

use crate::links::resolve_line_range;
use async_trait::async_trait;
use log::debug;
use scm_diff_expand::{split_payload, FetchError, LineBound, LineFetcher};

/// Fetches line ranges from the backend's templated `lines` endpoint.
///
/// The client performs a plain GET per request and leaves timeout and
/// retry policy to the embedding application's `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HalLineClient {
    http: reqwest::Client,
}

impl HalLineClient {
    /// Create a client with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client reusing an existing HTTP client (connection
    /// pooling, auth headers, timeouts).
    pub fn with_http(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl LineFetcher for HalLineClient {
    async fn fetch_lines(
        &self,
        link: &str,
        start: u32,
        end: LineBound,
    ) -> Result<Vec<String>, FetchError> {
        let url = resolve_line_range(link, start, end);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let lines = split_payload(&body);
        debug!("{} returned {} lines", url, lines.len());
        Ok(lines)
    }
}
