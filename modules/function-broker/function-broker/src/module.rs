//! Broker wiring: builds the registry, dispatcher, and service from config.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::rest::routes;
use crate::config::BrokerConfig;
use crate::domain::dispatcher::Dispatcher;
use crate::domain::ports::Upstream;
use crate::domain::registry::Registry;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::upstream::HttpUpstream;

/// A fully wired broker instance.
#[derive(Clone)]
pub struct FunctionBroker {
    registry: Arc<Registry>,
    service: Arc<Service>,
}

impl FunctionBroker {
    /// Build a broker that reaches mini-apps over HTTP.
    ///
    /// # Errors
    /// Returns an error if the outbound HTTP client cannot be built.
    pub fn new(config: &BrokerConfig) -> Result<Self, reqwest::Error> {
        let upstream = HttpUpstream::new(config.attempt_timeout)?;
        Ok(Self::with_upstream(config, Arc::new(upstream)))
    }

    /// Build a broker around a custom `Upstream`.
    pub fn with_upstream(config: &BrokerConfig, upstream: Arc<dyn Upstream>) -> Self {
        let registry = Arc::new(Registry::new());
        let dispatcher = Dispatcher::new(registry.clone(), upstream, config.attempt_timeout);
        let service = Arc::new(Service::new(
            registry.clone(),
            dispatcher,
            ServiceConfig::from(config),
        ));

        info!(
            attempt_timeout_ms =
                u64::try_from(config.attempt_timeout.as_millis()).unwrap_or(u64::MAX),
            default_addresses = config.default_addresses.len(),
            "function broker initialized"
        );

        Self { registry, service }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    /// Gateway router with request tracing.
    pub fn router(&self) -> Router {
        routes::register_routes(Router::new(), self.service.clone()).layer(TraceLayer::new_for_http())
    }
}
