use utoipa::OpenApi;

pub const CALLABLE_TAG: &str = "Callable";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "push-relay",
        description = "Callable push-notification relay backed by Firebase Cloud Messaging",
    ),
    paths(crate::api::handlers::callable::send_notification),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::api::dto::CallableStatus,
            crate::api::dto::CallableErrorBody,
        )
    ),
    tags(
        (name = CALLABLE_TAG, description = "Callable function invocation"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
