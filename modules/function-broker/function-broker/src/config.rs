//! Broker module configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Broker module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    /// Upper bound for a single forwarding attempt: connect, send, and
    /// receive the full response.
    #[serde(with = "humantime_serde")]
    pub attempt_timeout: Duration,

    /// Addresses used for registrations that arrive without any. An empty
    /// list makes `addresses` mandatory on registration.
    pub default_addresses: Vec<String>,
}

/// Where a mini-app listens when it runs next to the broker, either on the
/// same host or in a container reaching back to it.
pub const DEFAULT_ADDRESSES: [&str; 2] = [
    "http://localhost:3001",
    "http://host.docker.internal:3001",
];

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(5),
            default_addresses: Vec::from(DEFAULT_ADDRESSES.map(str::to_owned)),
        }
    }
}
