//! HTTP API for the identity reconciliation service

pub mod error;
pub mod handlers;

pub use error::{ApiError, ApiResult};
pub use handlers::{health_check, identify};
