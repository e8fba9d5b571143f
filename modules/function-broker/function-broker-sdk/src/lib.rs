//! Function Broker SDK
//!
//! Everything a mini-application needs to talk to the broker:
//!
//! - `Registration` and `CallRequest`, the shapes exchanged with the gateway
//! - `BrokerClient`, the caller stub (register, list, call)
//! - `RegistrationRetry`, the bounded startup registration policy
//! - `BrokerError`, the client-side error type
//!
//! The broker module depends on this crate for its domain models.

pub mod client;
pub mod error;
pub mod models;
pub mod retry;

pub use client::BrokerClient;
pub use error::BrokerError;
pub use models::{CallRequest, ListResponse, RegisterResponse, Registration};
pub use retry::RegistrationRetry;
