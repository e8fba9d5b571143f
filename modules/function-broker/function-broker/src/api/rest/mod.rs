//! REST surface of the broker.

use broker_errors::Problem;

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub type ApiResult<T> = Result<T, Problem>;
