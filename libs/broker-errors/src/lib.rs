//! Error types shared across the function broker.
//!
//! Pure data, no HTTP framework unless the `axum` feature is enabled:
//! - RFC 9457 Problem Details (`Problem`)
//! - The broker's error catalog (`ErrDef` and the `catalog` constants)

pub mod catalog;
pub mod problem;

pub use catalog::ErrDef;
pub use problem::{APPLICATION_PROBLEM_JSON, Problem};
