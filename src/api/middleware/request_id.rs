//! `x-request-id` propagation.
//!
//! The id tags the request span, the error bodies and the response headers.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Caller ids longer than this are replaced
const MAX_CALLER_ID_LEN: usize = 128;

/// Id of the current request, in the request extensions
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Usable caller-supplied id: short, visible ASCII only
fn caller_id(request: &Request) -> Option<String> {
    let value = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let usable = !value.is_empty()
        && value.len() <= MAX_CALLER_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic());
    usable.then(|| value.to_string())
}

/// Keeps a usable caller id or mints a UUID v4, and echoes it on the response
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = caller_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());
    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}
