//! Callable protocol DTOs.
//!
//! Callable functions take `{"data": ...}` and answer `{"result": ...}`.
//! Protocol failures use `{"error": {"status", "message"}}` with a canonical
//! status name.

use crate::models::RelayResult;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Request body of a callable invocation
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "data": {"token": "fcm-registration-token", "title": "Hi", "body": "There"}
}))]
pub struct CallableRequest {
    /// Invocation argument, either `{token, title, body}` or
    /// `{data: {token, title, body}}`
    #[schema(value_type = Object)]
    pub data: Value,
}

/// Response body of a completed invocation
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "result": {"success": true, "response": "projects/demo/messages/0:1700000000000000"}
}))]
pub struct CallableResponse {
    #[schema(value_type = Object)]
    pub result: RelayResult,
}

impl From<RelayResult> for CallableResponse {
    fn from(result: RelayResult) -> Self {
        Self { result }
    }
}

/// Canonical callable error status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallableStatus {
    InvalidArgument,
}

impl CallableStatus {
    pub fn http_status(self) -> StatusCode {
        match self {
            CallableStatus::InvalidArgument => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CallableErrorBody {
    pub status: CallableStatus,
    pub message: String,
}

/// Protocol-level failure of a callable invocation
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "error": {"status": "INVALID_ARGUMENT", "message": "Bad Request"}
}))]
pub struct CallableError {
    pub error: CallableErrorBody,
}

impl CallableError {
    pub fn new(status: CallableStatus, message: impl Into<String>) -> Self {
        Self {
            error: CallableErrorBody {
                status,
                message: message.into(),
            },
        }
    }

    /// Body is not JSON or lacks the `data` field
    pub fn bad_request() -> Self {
        Self::new(CallableStatus::InvalidArgument, "Bad Request")
    }
}

impl IntoResponse for CallableError {
    fn into_response(self) -> Response {
        (self.error.status.http_status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_wraps_result() {
        let response = CallableResponse::from(RelayResult::Failed {
            error: Some(json!("bad-token")),
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"result": {"success": false, "error": "bad-token"}})
        );
    }

    #[test]
    fn test_bad_request_shape() {
        assert_eq!(
            serde_json::to_value(CallableError::bad_request()).unwrap(),
            json!({"error": {"status": "INVALID_ARGUMENT", "message": "Bad Request"}})
        );
        assert_eq!(
            CallableError::bad_request().into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
