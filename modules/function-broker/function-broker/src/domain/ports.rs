//! Output ports (interfaces) for the dispatcher.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// A response that was received in full.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Transport-level failure of a single attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("connection error: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    /// Failure after connecting, including a body that was cut short.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Port for sending one JSON body to one candidate URL.
///
/// Implementations must only return `Ok` once the whole response body has
/// been read.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn post_json(&self, url: &str, body: Bytes) -> Result<UpstreamResponse, UpstreamError>;
}
