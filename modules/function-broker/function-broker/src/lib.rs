#![allow(clippy::must_use_candidate)]

//! Function broker module.
//!
//! Mini-applications register the functions they expose together with the
//! base URLs they can be reached at. Callers address a function by
//! `(application, function)` and the broker forwards the call to the first
//! reachable address, returning the upstream JSON unchanged.
//!
//! ## Architecture
//!
//! ```text
//!            Caller (SDK / HTTP)
//!                   │
//!                   ▼
//! ┌────────────────────────────────────┐
//! │  REST (/register /list /call-...)  │
//! └────────────────────────────────────┘
//!                   │
//!                   ▼
//! ┌────────────────────────────────────┐
//! │  Service                           │
//! │   ├─ Registry   (RwLock<HashMap>)  │
//! │   └─ Dispatcher (ordered failover) │
//! └────────────────────────────────────┘
//!                   │ Upstream port
//!                   ▼
//!        POST <address>/<functionName>
//! ```

// === PUBLIC API (from SDK) ===
pub use function_broker_sdk::{CallRequest, ListResponse, RegisterResponse, Registration};

// === MODULE DEFINITION ===
pub mod module;
pub use module::FunctionBroker;

pub mod config;
pub use config::BrokerConfig;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
