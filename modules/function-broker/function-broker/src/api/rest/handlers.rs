//! REST handlers for the broker.
//!
//! Handlers are thin: parse input, call the domain service, map errors to Problem.
//! Bodies are parsed from raw bytes so any content type carrying JSON is accepted.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::Extension;
use axum::http::Uri;
use broker_errors::Problem;
use function_broker_sdk::{CallRequest, ListResponse, RegisterResponse, Registration};
use serde_json::Value;

use super::ApiResult;
use super::dto::{
    CallFunctionRequest, HealthResponse, REGISTERED_MESSAGE, RegisterRequest, list_response,
};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// POST /register - Add or replace a mini-app registration.
#[tracing::instrument(skip_all)]
pub async fn register(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    body: Bytes,
) -> ApiResult<Json<RegisterResponse>> {
    let req: RegisterRequest = serde_json::from_slice(&body).map_err(|e| {
        problem_at(
            DomainError::invalid_registration(format!("invalid request format: {e}")),
            &uri,
        )
    })?;

    svc.register(Registration::from(req))
        .map_err(|e| problem_at(e, &uri))?;

    Ok(Json(RegisterResponse {
        message: REGISTERED_MESSAGE.to_owned(),
    }))
}

/// GET /list - Snapshot of registered mini-apps and their functions.
#[tracing::instrument(skip_all)]
pub async fn list(Extension(svc): Extension<Arc<Service>>) -> Json<ListResponse> {
    Json(list_response(svc.list()))
}

/// POST /call-function - Forward a call and relay the upstream JSON.
#[tracing::instrument(skip_all)]
pub async fn call_function(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let req: CallFunctionRequest = serde_json::from_slice(&body).map_err(|e| {
        problem_at(
            DomainError::invalid_request(format!("invalid request format: {e}")),
            &uri,
        )
    })?;

    let call = CallRequest::from(req);
    let body = svc.call(&call).await.map_err(|e| problem_at(e, &uri))?;
    Ok(Json(body))
}

/// GET /health - Liveness check.
pub async fn health(Extension(svc): Extension<Arc<Service>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        registered_apps: svc.registered_apps(),
    })
}

fn problem_at(err: DomainError, uri: &Uri) -> Problem {
    Problem::from(err).with_instance(uri.path())
}
