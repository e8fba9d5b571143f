//! HTTP client for the broker gateway.
//!
//! Mini-applications use it to register themselves and to call functions of
//! other mini-applications through the broker.

use std::time::Duration;

use broker_errors::Problem;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::BrokerError;
use crate::models::{CallRequest, ListResponse, RegisterResponse, Registration};
use crate::retry::RegistrationRetry;

/// Overall timeout for one gateway exchange. A call may fan out over several
/// candidate addresses on the broker side, so this is generous.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the broker's REST surface.
#[derive(Debug, Clone)]
pub struct BrokerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BrokerClient {
    /// Create a client for the gateway at `base_url` (e.g. `http://localhost:3000`).
    ///
    /// # Errors
    /// Returns `BrokerError::InvalidUrl` if `base_url` does not parse and
    /// `BrokerError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, BrokerError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Same as [`BrokerClient::new`] with a custom per-exchange timeout.
    ///
    /// # Errors
    /// See [`BrokerClient::new`].
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, BrokerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BrokerError::Transport)?;

        // Url::join replaces the last segment unless the base ends with '/'.
        let mut base = base_url.to_owned();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Register (or re-register) a mini-application.
    ///
    /// # Errors
    /// Returns `BrokerError::Api` with the `BROKER_INVALID_REGISTRATION` code
    /// when the gateway rejects the declaration, or a transport/decode error.
    #[instrument(skip(self, registration), fields(app = %registration.application_id))]
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<RegisterResponse, BrokerError> {
        let body = serde_json::to_vec(registration).map_err(BrokerError::Encoding)?;
        let url = self.base_url.join("register")?;
        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(BrokerError::Transport)?;
        read_json(resp).await
    }

    /// Register with a bounded number of attempts and a fixed delay in between.
    ///
    /// Gives up early on errors that a retry cannot fix (4xx, encoding).
    ///
    /// # Errors
    /// Returns the last error once attempts are exhausted. Callers are expected
    /// to log it and keep serving.
    pub async fn register_with_retry(
        &self,
        registration: &Registration,
        retry: RegistrationRetry,
    ) -> Result<RegisterResponse, BrokerError> {
        let max_attempts = retry.attempts();
        let mut attempt = 1;
        loop {
            match self.register(registration).await {
                Ok(ack) => {
                    info!(
                        app = %registration.application_id,
                        attempt,
                        "Registered with broker"
                    );
                    return Ok(ack);
                }
                Err(e) if attempt < max_attempts && e.is_retryable() => {
                    warn!(
                        app = %registration.application_id,
                        attempt,
                        max_attempts,
                        backoff_ms = u64::try_from(retry.backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "Registration failed, retrying"
                    );
                    tokio::time::sleep(retry.backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Fetch the broker's registry snapshot.
    ///
    /// # Errors
    /// Returns a transport or decode error.
    pub async fn list(&self) -> Result<ListResponse, BrokerError> {
        let url = self.base_url.join("list")?;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(BrokerError::Transport)?;
        read_json(resp).await
    }

    /// Call `function_name` on `target_app` through the broker.
    ///
    /// # Errors
    /// Returns `BrokerError::Encoding` if `payload` cannot be serialized, and
    /// `BrokerError::Api` for broker-side failures (unknown target, upstream
    /// unreachable, malformed upstream response).
    pub async fn call_function<P: Serialize>(
        &self,
        caller: &str,
        target_app: &str,
        function_name: &str,
        payload: Option<&P>,
    ) -> Result<Value, BrokerError> {
        self.call(&CallRequest::new(caller, target_app, function_name, payload))
            .await
    }

    /// Send a fully built call request (e.g. one carrying a `url` override).
    ///
    /// # Errors
    /// See [`BrokerClient::call_function`].
    #[instrument(skip(self, request), fields(
        caller = %request.caller,
        target_app = %request.target_application,
        function = %request.function_name
    ))]
    pub async fn call<P: Serialize>(&self, request: &CallRequest<P>) -> Result<Value, BrokerError> {
        let body = serde_json::to_vec(request).map_err(BrokerError::Encoding)?;
        let url = self.base_url.join("call-function")?;
        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(BrokerError::Transport)?;
        read_json(resp).await
    }
}

impl BrokerError {
    /// Whether repeating the same request could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Decode { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Encoding(_) | Self::InvalidUrl(_) => false,
        }
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, BrokerError> {
    let status = resp.status();
    let bytes = resp.bytes().await.map_err(BrokerError::Transport)?;

    if status.is_success() {
        return serde_json::from_slice(&bytes).map_err(|e| BrokerError::decode(e.to_string()));
    }

    match serde_json::from_slice::<Problem>(&bytes) {
        Ok(problem) => Err(BrokerError::from_problem(problem)),
        Err(_) => Err(BrokerError::Api {
            status: status.as_u16(),
            code: String::new(),
            title: status.canonical_reason().unwrap_or_default().to_owned(),
            detail: String::from_utf8_lossy(&bytes).into_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_keeps_path_prefix() {
        let client = BrokerClient::new("http://localhost:3000/api").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:3000/api/");
        assert_eq!(
            client.base_url().join("register").unwrap().as_str(),
            "http://localhost:3000/api/register"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = BrokerClient::new("not a url").unwrap_err();
        assert!(matches!(err, BrokerError::InvalidUrl(_)));
    }

    #[test]
    fn only_server_side_api_errors_are_retryable() {
        let api = |status| BrokerError::Api {
            status,
            code: String::new(),
            title: String::new(),
            detail: String::new(),
        };
        assert!(api(503).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(BrokerError::decode("eof").is_retryable());
    }
}
