//! REST route registration for the broker.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};

use super::handlers;
use crate::domain::service::Service;

/// Register all broker REST routes on `router`.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route("/register", post(handlers::register))
        .route("/list", get(handlers::list))
        .route("/call-function", post(handlers::call_function))
        .route("/health", get(handlers::health))
        .layer(Extension(service))
}
