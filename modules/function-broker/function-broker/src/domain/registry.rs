//! In-memory registry of mini-applications.
//!
//! Writes replace a whole entry under the write lock; reads clone an `Arc`
//! out and release the lock immediately, so no guard ever crosses an await.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use function_broker_sdk::Registration;
use parking_lot::RwLock;
use tracing::{debug, info};
use url::Url;

use super::error::DomainError;

/// Process-wide registry, shared as `Arc<Registry>`.
#[derive(Debug, Default)]
pub struct Registry {
    entries: RwLock<HashMap<String, Arc<Registration>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace the entry for `registration.application_id`.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidRegistration` when the id is empty, a
    /// function name is empty or contains `/`, the address list is empty, or
    /// an address is not an absolute http(s) URL with a host. The registry is
    /// left untouched in that case.
    pub fn register(&self, registration: Registration) -> Result<(), DomainError> {
        validate(&registration)?;

        let application_id = registration.application_id.clone();
        let functions = registration.functions.len();
        let addresses = registration.addresses.len();
        let previous = self
            .entries
            .write()
            .insert(application_id.clone(), Arc::new(registration));

        info!(
            app = %application_id,
            functions,
            addresses,
            replaced = previous.is_some(),
            "mini-app registered"
        );
        Ok(())
    }

    /// Current registration for `application_id`, if any.
    pub fn lookup(&self, application_id: &str) -> Option<Arc<Registration>> {
        let found = self.entries.read().get(application_id).cloned();
        if found.is_none() {
            debug!(app = %application_id, "lookup miss");
        }
        found
    }

    /// Snapshot of `application id -> functions`, taken under one read lock.
    pub fn list(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.entries
            .read()
            .iter()
            .map(|(id, reg)| (id.clone(), reg.functions.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn validate(registration: &Registration) -> Result<(), DomainError> {
    if registration.application_id.trim().is_empty() {
        return Err(DomainError::invalid_registration("appName must not be empty"));
    }

    for function in &registration.functions {
        if function.trim().is_empty() {
            return Err(DomainError::invalid_registration(
                "function names must not be empty",
            ));
        }
        if function.contains('/') {
            return Err(DomainError::invalid_registration(format!(
                "function name '{function}' must not contain '/'"
            )));
        }
    }

    if registration.addresses.is_empty() {
        return Err(DomainError::invalid_registration(
            "at least one address is required",
        ));
    }
    for address in &registration.addresses {
        validate_address(address)?;
    }

    Ok(())
}

fn validate_address(address: &str) -> Result<(), DomainError> {
    let url = Url::parse(address).map_err(|e| {
        DomainError::invalid_registration(format!("address '{address}' is not a valid URL: {e}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DomainError::invalid_registration(format!(
            "address '{address}' must use http or https"
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(DomainError::invalid_registration(format!(
            "address '{address}' has no host"
        )));
    }
    Ok(())
}
