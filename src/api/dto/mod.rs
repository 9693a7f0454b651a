//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `callable` - Callable protocol request/response envelopes
//! - `error` - Common error response DTOs
//! - `health` - Health probe responses

mod callable;
mod error;
mod health;

pub use callable::{CallableError, CallableErrorBody, CallableRequest, CallableResponse, CallableStatus};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
