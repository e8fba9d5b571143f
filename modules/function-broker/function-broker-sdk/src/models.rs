//! Models shared by the broker and its clients.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A mini-application's declaration: who it is, what it exposes, where to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "appName")]
    pub application_id: String,
    pub functions: BTreeSet<String>,
    /// Candidate base URLs, tried in this order.
    pub addresses: Vec<String>,
}

impl Registration {
    pub fn new<F, A>(application_id: impl Into<String>, functions: F, addresses: A) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            application_id: application_id.into(),
            functions: functions.into_iter().map(Into::into).collect(),
            addresses: addresses.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn exposes(&self, function_name: &str) -> bool {
        self.functions.contains(function_name)
    }
}

/// One cross-application call.
///
/// `P` is the payload type; the gateway works with raw JSON values while
/// in-process callers may pass any `Serialize` type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest<P = Value> {
    pub caller: String,
    #[serde(rename = "targetApp")]
    pub target_application: String,
    pub function_name: String,
    /// Forwarded verbatim; `None` goes out as JSON `null`.
    #[serde(default)]
    pub payload: Option<P>,
    /// Per-call address override, tried before the registered addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl<P> CallRequest<P> {
    pub fn new(
        caller: impl Into<String>,
        target_application: impl Into<String>,
        function_name: impl Into<String>,
        payload: Option<P>,
    ) -> Self {
        Self {
            caller: caller.into(),
            target_application: target_application.into(),
            function_name: function_name.into(),
            payload,
            url: None,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Acknowledgement returned by `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
}

/// Snapshot returned by `GET /list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub mini_apps: BTreeMap<String, Vec<String>>,
}
