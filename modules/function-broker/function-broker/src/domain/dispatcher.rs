//! Call dispatch: target validation, candidate resolution, ordered failover.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use function_broker_sdk::{CallRequest, Registration};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::error::{CallOutcome, DomainError, MissingTarget};
use super::ports::Upstream;
use super::registry::Registry;

/// Forwards calls to registered mini-applications.
pub struct Dispatcher {
    registry: Arc<Registry>,
    upstream: Arc<dyn Upstream>,
    attempt_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<Registry>,
        upstream: Arc<dyn Upstream>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            upstream,
            attempt_timeout,
        }
    }

    /// Forward `request` and return the first complete response body.
    ///
    /// # Errors
    /// - `TargetNotFound` when the application or function is unknown
    /// - `PayloadEncoding` when the payload cannot be serialized
    /// - `UpstreamUnreachable` when every candidate fails to answer
    /// - `MalformedUpstreamResponse` when the first answer is not a JSON object or `null`
    #[instrument(
        skip_all,
        fields(
            caller = %request.caller,
            target_app = %request.target_application,
            function = %request.function_name,
        )
    )]
    pub async fn dispatch<P: Serialize>(&self, request: &CallRequest<P>) -> CallOutcome {
        let registration = self.resolve_target(request)?;

        let body = serde_json::to_vec(&request.payload)
            .map(Bytes::from)
            .map_err(DomainError::PayloadEncoding)?;

        let candidates = resolve_candidates(
            request.url.as_deref(),
            &registration.addresses,
            &request.function_name,
        );

        let mut last_error = String::new();
        for (index, candidate) in candidates.iter().enumerate() {
            let attempt = index + 1;
            debug!(%candidate, attempt, "forwarding call");

            match tokio::time::timeout(
                self.attempt_timeout,
                self.upstream.post_json(candidate, body.clone()),
            )
            .await
            {
                Ok(Ok(response)) => {
                    info!(%candidate, attempt, status = response.status, "call answered");
                    return parse_body(candidate, &response.body);
                }
                Ok(Err(e)) => {
                    warn!(%candidate, attempt, error = %e, "candidate failed");
                    last_error = e.to_string();
                }
                Err(_) => {
                    let timeout_ms =
                        u64::try_from(self.attempt_timeout.as_millis()).unwrap_or(u64::MAX);
                    warn!(%candidate, attempt, timeout_ms, "candidate timed out");
                    last_error = format!("{candidate}: no response within {timeout_ms}ms");
                }
            }
        }

        Err(DomainError::UpstreamUnreachable {
            attempts: candidates.len(),
            last_error,
        })
    }

    fn resolve_target<P>(&self, request: &CallRequest<P>) -> Result<Arc<Registration>, DomainError> {
        let target = &request.target_application;
        let function = &request.function_name;

        let Some(registration) = self.registry.lookup(target) else {
            return Err(DomainError::target_not_found(
                target,
                function,
                MissingTarget::Application,
            ));
        };
        if !registration.exposes(function) {
            return Err(DomainError::target_not_found(
                target,
                function,
                MissingTarget::Function,
            ));
        }
        Ok(registration)
    }
}

/// Ordered, de-duplicated candidate URLs: the override first, then the
/// registered addresses. Each is `<base>/<function>` with trailing `/`
/// stripped from the base.
pub fn resolve_candidates(
    override_url: Option<&str>,
    addresses: &[String],
    function_name: &str,
) -> Vec<String> {
    let overrides = override_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .into_iter();

    let mut bases: Vec<&str> = Vec::with_capacity(addresses.len() + 1);
    for base in overrides.chain(addresses.iter().map(String::as_str)) {
        let base = base.trim_end_matches('/');
        if !bases.contains(&base) {
            bases.push(base);
        }
    }

    bases
        .into_iter()
        .map(|base| format!("{base}/{function_name}"))
        .collect()
}

/// The body must be a JSON object, or `null` for functions with nothing to say.
fn parse_body(candidate: &str, body: &[u8]) -> CallOutcome {
    let malformed = |source: serde_json::Error| {
        warn!(%candidate, error = %source, "upstream body is not a JSON object");
        DomainError::MalformedUpstreamResponse {
            url: candidate.to_owned(),
            source,
        }
    };

    match serde_json::from_slice::<Value>(body).map_err(malformed)? {
        value @ (Value::Object(_) | Value::Null) => Ok(value),
        other => Err(malformed(serde::de::Error::custom(format!(
            "expected an object or null, found {}",
            json_kind(&other)
        )))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
