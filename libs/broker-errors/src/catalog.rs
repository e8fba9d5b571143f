//! Static error catalog for the broker's wire errors.
//!
//! The gateway renders these into `Problem` bodies; the SDK matches the
//! `code` field to turn a response back into a typed error.

use crate::problem::Problem;
use http::StatusCode;

const TYPE_BASE: &str = "https://errors.function-broker.dev";

/// Static error definition from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
}

impl ErrDef {
    /// Convert this error definition into a Problem with the given detail.
    pub fn as_problem(&self, detail: impl Into<String>) -> Problem {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Problem::new(status, self.title, detail.into())
            .with_code(self.code)
            .with_type(format!("{TYPE_BASE}/{}", self.code))
    }

    /// Look up a catalog entry by its machine-readable code.
    #[must_use]
    pub fn by_code(code: &str) -> Option<&'static ErrDef> {
        ALL.iter().copied().find(|def| def.code == code)
    }
}

pub const INVALID_REGISTRATION: ErrDef = ErrDef {
    status: 400,
    title: "Invalid registration",
    code: "BROKER_INVALID_REGISTRATION",
};

pub const INVALID_REQUEST: ErrDef = ErrDef {
    status: 400,
    title: "Invalid request",
    code: "BROKER_INVALID_REQUEST",
};

pub const TARGET_NOT_FOUND: ErrDef = ErrDef {
    status: 404,
    title: "Function not found",
    code: "BROKER_TARGET_NOT_FOUND",
};

pub const PAYLOAD_ENCODING: ErrDef = ErrDef {
    status: 500,
    title: "Error encoding payload",
    code: "BROKER_PAYLOAD_ENCODING",
};

pub const UPSTREAM_UNREACHABLE: ErrDef = ErrDef {
    status: 500,
    title: "Error forwarding request",
    code: "BROKER_UPSTREAM_UNREACHABLE",
};

pub const MALFORMED_UPSTREAM_RESPONSE: ErrDef = ErrDef {
    status: 500,
    title: "Error parsing response",
    code: "BROKER_MALFORMED_UPSTREAM_RESPONSE",
};

static ALL: &[&ErrDef] = &[
    &INVALID_REGISTRATION,
    &INVALID_REQUEST,
    &TARGET_NOT_FOUND,
    &PAYLOAD_ENCODING,
    &UPSTREAM_UNREACHABLE,
    &MALFORMED_UPSTREAM_RESPONSE,
];
