//! Client-side error type for broker calls.

use broker_errors::{ErrDef, Problem, catalog};
use thiserror::Error;

/// Error returned by `BrokerClient` operations.
#[derive(Error, Debug)]
pub enum BrokerError {
    /// The request body could not be serialized.
    #[error("error encoding request JSON: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The gateway could not be reached or the exchange broke off.
    #[error("error calling broker: {0}")]
    Transport(#[source] reqwest::Error),

    /// The gateway answered with something that is not the expected JSON.
    #[error("error decoding response JSON: {message}")]
    Decode { message: String },

    /// The gateway answered with an error status.
    #[error("broker returned {status}: {detail}")]
    Api {
        status: u16,
        code: String,
        title: String,
        detail: String,
    },

    /// The gateway URL is not usable.
    #[error("invalid broker url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl BrokerError {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub(crate) fn from_problem(problem: Problem) -> Self {
        Self::Api {
            status: problem.status.as_u16(),
            code: problem.code,
            title: problem.title,
            detail: problem.detail,
        }
    }

    /// Catalog entry matching the gateway's error code, if any.
    #[must_use]
    pub fn catalog_entry(&self) -> Option<&'static ErrDef> {
        match self {
            Self::Api { code, .. } => ErrDef::by_code(code),
            _ => None,
        }
    }

    /// Whether the target application or function is unknown to the broker.
    #[must_use]
    pub fn is_target_not_found(&self) -> bool {
        self.catalog_entry()
            .is_some_and(|def| def.code == catalog::TARGET_NOT_FOUND.code)
    }

    /// Whether the broker could not reach any address of the target.
    #[must_use]
    pub fn is_upstream_unreachable(&self) -> bool {
        self.catalog_entry()
            .is_some_and(|def| def.code == catalog::UPSTREAM_UNREACHABLE.code)
    }
}
