//! Wire DTOs for the gateway endpoints.

use std::collections::{BTreeMap, BTreeSet};

use function_broker_sdk::{CallRequest, ListResponse, Registration};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /register`. `addresses` may be omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub app_name: String,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Registration::new(req.app_name, req.functions, req.addresses)
    }
}

/// Body of `POST /call-function`. `payload` must be an object when present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionRequest {
    pub caller: String,
    pub target_app: String,
    pub function_name: String,
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
    #[serde(default)]
    pub url: Option<String>,
}

impl From<CallFunctionRequest> for CallRequest {
    fn from(req: CallFunctionRequest) -> Self {
        let call = CallRequest::new(
            req.caller,
            req.target_app,
            req.function_name,
            req.payload.map(Value::Object),
        );
        match req.url {
            Some(url) => call.with_url(url),
            None => call,
        }
    }
}

pub const REGISTERED_MESSAGE: &str = "Mini-App registered successfully!";

pub fn list_response(snapshot: BTreeMap<String, BTreeSet<String>>) -> ListResponse {
    ListResponse {
        mini_apps: snapshot
            .into_iter()
            .map(|(app, functions)| (app, functions.into_iter().collect()))
            .collect(),
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub registered_apps: usize,
}
