//! Infrastructure adapters.

pub mod upstream;
