//! Domain layer: registry, dispatch, and the ports they depend on.

pub mod dispatcher;
pub mod error;
pub mod ports;
pub mod registry;
pub mod service;
