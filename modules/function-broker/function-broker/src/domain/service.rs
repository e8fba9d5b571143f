//! Domain service: the single entry point the REST layer talks to.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use function_broker_sdk::{CallRequest, Registration};
use serde::Serialize;

use super::dispatcher::Dispatcher;
use super::error::{CallOutcome, DomainError};
use super::registry::Registry;
use crate::config::BrokerConfig;

/// Service configuration extracted from module config.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub default_addresses: Vec<String>,
}

impl From<&BrokerConfig> for ServiceConfig {
    fn from(cfg: &BrokerConfig) -> Self {
        Self {
            default_addresses: cfg.default_addresses.clone(),
        }
    }
}

pub struct Service {
    registry: Arc<Registry>,
    dispatcher: Dispatcher,
    config: ServiceConfig,
}

impl Service {
    pub fn new(registry: Arc<Registry>, dispatcher: Dispatcher, config: ServiceConfig) -> Self {
        Self {
            registry,
            dispatcher,
            config,
        }
    }

    /// Register a mini-app, filling in the configured default addresses when
    /// the registration carries none.
    ///
    /// # Errors
    /// `DomainError::InvalidRegistration` if the registration is rejected.
    pub fn register(&self, mut registration: Registration) -> Result<(), DomainError> {
        if registration.addresses.is_empty() {
            registration
                .addresses
                .clone_from(&self.config.default_addresses);
        }
        self.registry.register(registration)
    }

    pub fn list(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.registry.list()
    }

    pub async fn call<P: Serialize + Sync>(&self, request: &CallRequest<P>) -> CallOutcome {
        self.dispatcher.dispatch(request).await
    }

    pub fn registered_apps(&self) -> usize {
        self.registry.len()
    }
}
