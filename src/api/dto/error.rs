//! Error response DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Body given to error statuses that carry no JSON of their own
/// (unknown routes, unsupported media types, failed middleware).
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "code": "NOT_FOUND",
    "message": "The requested resource was not found",
    "request_id": "2b1c0b9e-4d3a-4c55-9f0e-5d8b1d7c6a10"
}))]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response with code and message.
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        }
    }

    /// Adds request ID to the error response for correlation.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}
