//! REST error mapping for the broker.

use broker_errors::{Problem, catalog};

use crate::domain::error::DomainError;

/// Convert DomainError to Problem for REST responses.
impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        let trace_id = tracing::Span::current()
            .id()
            .map(|id| id.into_u64().to_string());

        let def = match &e {
            DomainError::InvalidRegistration { .. } => catalog::INVALID_REGISTRATION,
            DomainError::InvalidRequest { .. } => catalog::INVALID_REQUEST,
            DomainError::TargetNotFound { .. } => catalog::TARGET_NOT_FOUND,
            DomainError::PayloadEncoding(_) => catalog::PAYLOAD_ENCODING,
            DomainError::UpstreamUnreachable { .. } => catalog::UPSTREAM_UNREACHABLE,
            DomainError::MalformedUpstreamResponse { .. } => {
                catalog::MALFORMED_UPSTREAM_RESPONSE
            }
        };

        if def.status >= 500 {
            tracing::error!(error = %e, code = def.code, "call failed");
        } else {
            tracing::debug!(error = %e, code = def.code, "request rejected");
        }

        let problem = def.as_problem(e.to_string());
        match trace_id {
            Some(id) => problem.with_trace_id(id),
            None => problem,
        }
    }
}
