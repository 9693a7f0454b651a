//! Callable function handler.
//!
//! Speaks the callable protocol over HTTP: the invocation argument arrives
//! under `data` and the relay result goes back under `result`.

use crate::api::doc::CALLABLE_TAG;
use crate::api::dto::{CallableError, CallableRequest, CallableResponse};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::Value;

/// Path the handler is documented under; the router mounts it at the
/// configured function name.
pub const DEFAULT_FUNCTION_PATH: &str = "/sendNotification";

/// POST /{function_name} - Relay one push notification
///
/// Delivery failures are reported inside `result` with a 200 status. Only a
/// body that is not JSON or has no `data` field is rejected.
#[utoipa::path(
    post,
    path = "/sendNotification",
    tag = CALLABLE_TAG,
    request_body = CallableRequest,
    responses(
        (status = 200, description = "Invocation completed", body = CallableResponse),
        (status = 400, description = "Malformed callable request", body = CallableError)
    )
)]
pub async fn send_notification(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CallableResponse>, CallableError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Rejected callable request");
        CallableError::bad_request()
    })?;

    let data = match body {
        Value::Object(mut fields) => fields.remove("data"),
        _ => None,
    }
    .ok_or_else(|| {
        tracing::warn!("Callable request without data field");
        CallableError::bad_request()
    })?;

    let result = state.services.relay.invoke_value(data).await;
    Ok(Json(CallableResponse::from(result)))
}
