//! Domain errors for the broker.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Result of dispatching one call.
pub type CallOutcome = Result<Value, DomainError>;

/// Which half of the `(application, function)` target was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingTarget {
    Application,
    Function,
}

impl fmt::Display for MissingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application => f.write_str("application is not registered"),
            Self::Function => f.write_str("function is not exposed by the application"),
        }
    }
}

/// Domain-level errors for broker operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Registration rejected before the registry was touched.
    #[error("invalid registration: {message}")]
    InvalidRegistration { message: String },

    /// Call body could not be understood.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("{target_app}/{function}: {missing}")]
    TargetNotFound {
        target_app: String,
        function: String,
        missing: MissingTarget,
    },

    #[error("error encoding payload: {0}")]
    PayloadEncoding(#[source] serde_json::Error),

    /// Every candidate failed at the transport level.
    #[error("all {attempts} candidate address(es) failed, last error: {last_error}")]
    UpstreamUnreachable { attempts: usize, last_error: String },

    /// The first complete response was not a JSON object or `null`.
    #[error("response from {url} is not a JSON object: {source}")]
    MalformedUpstreamResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DomainError {
    pub fn invalid_registration(message: impl Into<String>) -> Self {
        Self::InvalidRegistration {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn target_not_found(target_app: &str, function: &str, missing: MissingTarget) -> Self {
        Self::TargetNotFound {
            target_app: target_app.to_owned(),
            function: function.to_owned(),
            missing,
        }
    }
}
