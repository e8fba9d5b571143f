//! reqwest-backed implementation of the `Upstream` port.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use tracing::{debug, info_span, Instrument};

use crate::domain::ports::{Upstream, UpstreamError, UpstreamResponse};

/// HTTP/1.1 client used to reach mini-applications.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    /// Build a client whose own timeouts match the per-attempt budget.
    ///
    /// # Errors
    /// Returns the reqwest error if the TLS backend cannot be initialised.
    pub fn new(attempt_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(attempt_timeout)
            .timeout(attempt_timeout)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn post_json(&self, url: &str, body: Bytes) -> Result<UpstreamResponse, UpstreamError> {
        let start = Instant::now();

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .instrument(info_span!("upstream_request", %url))
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout
            } else {
                UpstreamError::Transport(format!("failed to read response body: {e}"))
            }
        })?;

        debug!(
            status,
            body_size = body.len(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "upstream response received"
        );

        Ok(UpstreamResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else if e.is_connect() {
        UpstreamError::Connect(e.to_string())
    } else {
        UpstreamError::Transport(e.to_string())
    }
}
