//! Health check endpoint handlers.
//!
//! This module provides health check functionality for monitoring
//! and load balancer health checks. Readiness depends on the messaging
//! provider being able to obtain credentials.

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use std::collections::HashMap;
use std::time::Instant;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health` - Basic health check
/// - `GET /health/ready` - Readiness probe
/// - `GET /health/live` - Liveness probe
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(readiness_check))
        .routes(routes!(liveness_check))
}

/// Basic health check endpoint.
///
/// Returns health information including messaging provider status.
///
/// # Example Response
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "timestamp": "2024-01-01T12:00:00Z",
///   "checks": {
///     "messaging": {
///       "status": "healthy",
///       "message": "fcm credentials usable",
///       "response_time_ms": 42
///     }
///   }
/// }
/// ```
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = HashMap::new();
    checks.insert("messaging".to_string(), check_messaging(&state).await);

    let response = HealthResponse::from_checks(crate::pkg_version().to_string(), checks);

    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(response))
}

/// Readiness probe endpoint.
///
/// Ready once the provider configuration is valid and credentials work.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    let provider = state.services.relay.provider();

    if let Err(e) = provider.validate_config().await {
        tracing::warn!(error = %e, provider = provider.name(), "Provider configuration invalid");
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    match check_messaging(&state).await.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded | HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Liveness probe endpoint.
///
/// This is a lightweight check that doesn't test external dependencies.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_messaging(state: &AppState) -> ComponentHealth {
    let provider = state.services.relay.provider();
    let start_time = Instant::now();

    match provider.health_check().await {
        Ok(()) => ComponentHealth::healthy(
            format!("{} credentials usable", provider.name()),
            start_time.elapsed().as_millis() as u64,
        ),
        Err(e) => {
            tracing::warn!(error = %e, provider = provider.name(), "Messaging health check failed");
            ComponentHealth::unhealthy(
                format!("{} unavailable: {}", provider.name(), e),
                start_time.elapsed().as_millis() as u64,
            )
        }
    }
}
