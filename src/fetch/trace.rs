//! CI job trace fetching.
//!
//! A single blocking GET with a fixed timeout and no retry. Failure is
//! reported to the caller, which falls back to user-supplied log content.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client for a CI platform's job trace endpoint.
pub struct TraceClient {
    http_client: reqwest::Client,
    timeout_seconds: u64,
}

impl TraceClient {
    /// Build a client with the given request timeout.
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            timeout_seconds,
        })
    }

    /// Fetch raw log text from `url`.
    ///
    /// `private_token` is sent as the `PRIVATE-TOKEN` header when present.
    /// Non-2xx responses are errors; there is no retry.
    pub async fn fetch_job_trace(&self, url: &str, private_token: Option<&str>) -> Result<String> {
        info!("Fetching CI job trace: {}", url);

        let mut request = self.http_client.get(url);
        if let Some(token) = private_token {
            request = request.header("PRIVATE-TOKEN", token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                anyhow::anyhow!(
                    "Trace request timed out after {}s",
                    self.timeout_seconds
                )
            } else if e.is_connect() {
                anyhow::anyhow!("Cannot connect to trace endpoint at {}", url)
            } else {
                anyhow::anyhow!("Failed to send trace request: {}", e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Trace endpoint returned {}: {}",
                status,
                body
            ));
        }

        let trace = response
            .text()
            .await
            .context("Failed to read trace response body")?;

        debug!("Fetched {} bytes of job trace", trace.len());
        Ok(trace)
    }
}
