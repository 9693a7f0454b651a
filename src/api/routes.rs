//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use axum::{Json, Router, middleware, routing::{get, post}};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiDocument;
use utoipa_axum::router::OpenApiRouter;

use crate::api::doc::ApiDoc;
use crate::api::dto::CallableError;
use crate::api::handlers;
use crate::api::handlers::callable::DEFAULT_FUNCTION_PATH;
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::config::ServerConfig;
use crate::state::AppState;

/// Path of the generated OpenAPI document
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. CORS (when enabled) and compression
/// 2. Request ID middleware - generates/propagates request IDs
/// 3. Logging middleware - logs requests with request IDs
/// 4. Error handler - gives bare error statuses a JSON body
///
/// # Routes
/// - `POST /{function_name}` - Callable notification relay; other methods
///   get the callable `INVALID_ARGUMENT` error
/// - `/health`, `/health/ready`, `/health/live` - Probes
/// - `GET /api-docs/openapi.json` - OpenAPI document
///
/// # Example
/// ```ignore
/// let state = AppState::new(messaging()?);
/// let router = create_router(state, &settings.server);
/// ```
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let function_path = server.function_path();

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(handlers::health::health_routes())
        .route(
            &function_path,
            post(handlers::callable::send_notification)
                .fallback(|| async { CallableError::bad_request() }),
        )
        .split_for_parts();

    let api = document_function_path(api, &function_path);

    let mut router = router
        .route(OPENAPI_PATH, get(move || async move { Json(api) }))
        // Middleware is applied in reverse order - last added runs first
        // So logging runs after request_id has set the ID
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new());

    if server.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

/// Moves the callable's documented path to the configured function name.
fn document_function_path(mut api: OpenApiDocument, function_path: &str) -> OpenApiDocument {
    if function_path != DEFAULT_FUNCTION_PATH
        && let Some(item) = api.paths.paths.remove(DEFAULT_FUNCTION_PATH)
    {
        api.paths.paths.insert(function_path.to_string(), item);
    }
    api
}
