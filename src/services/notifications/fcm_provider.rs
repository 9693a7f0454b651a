//! Firebase Cloud Messaging provider (HTTP v1 API).
//!
//! Posts `{"message": ...}` to `/v1/projects/{project_id}/messages:send` with
//! an OAuth2 bearer token and returns the `name` FCM assigns to the message.

use super::provider::{DeliveryError, NotificationProvider};
use crate::config::MessagingConfig;
use crate::error::{AppError, AppResult};
use crate::external::client::HTTP_CLIENT;
use crate::external::google_auth::{self, AccessTokenProvider, CredentialSource};
use crate::models::NotificationMessage;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Firebase Cloud Messaging provider
///
/// # Example
/// ```ignore
/// let provider = FcmProvider::from_config(&settings.messaging).await?;
/// let id = provider.send(&message).await?;
/// // id == "projects/my-project/messages/0:1700000000000000%abcdef"
/// ```
pub struct FcmProvider {
    project_id: String,
    endpoint: String,
    validate_only: bool,
    tokens: AccessTokenProvider,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    validate_only: bool,
    message: &'a NotificationMessage,
}

#[derive(Deserialize)]
struct SendResponse {
    #[serde(default)]
    name: Option<String>,
}

/// Google API error envelope: `{"error": {code, message, status, details}}`
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

impl FcmProvider {
    /// Creates a provider for `project_id`
    ///
    /// # Arguments
    /// * `project_id` - Firebase project that owns the registration tokens
    /// * `endpoint` - API base URL, normally `https://fcm.googleapis.com`
    /// * `tokens` - Source of bearer tokens
    pub fn new(
        project_id: impl Into<String>,
        endpoint: impl Into<String>,
        tokens: AccessTokenProvider,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            validate_only: false,
            tokens,
            client: HTTP_CLIENT.clone(),
        }
    }

    /// Ask FCM to validate messages without delivering them
    pub fn with_validate_only(mut self, validate_only: bool) -> Self {
        self.validate_only = validate_only;
        self
    }

    /// Builds the provider from messaging settings.
    ///
    /// Resolves the credential source and the project id; the latter may need
    /// a round trip to the metadata server.
    pub async fn from_config(config: &MessagingConfig) -> AppResult<Self> {
        let source = CredentialSource::from_config(config)
            .map_err(|e| AppError::configuration("messaging.credentials_file", e))?;
        let project_id = google_auth::resolve_project_id(config, &source)
            .await
            .map_err(|e| AppError::configuration("messaging.project_id", e))?;

        tracing::info!(
            project_id = %project_id,
            credentials = source.kind(),
            endpoint = %config.endpoint,
            validate_only = config.validate_only,
            "Messaging provider configured"
        );

        Ok(
            Self::new(project_id, config.endpoint.clone(), AccessTokenProvider::new(source))
                .with_validate_only(config.validate_only),
        )
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Full `messages:send` URL
    pub fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.project_id
        )
    }

    fn api_error(http_status: u16, body: &str) -> DeliveryError {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => DeliveryError::Api {
                http_status,
                status: envelope.error.status,
                error_code: envelope
                    .error
                    .details
                    .into_iter()
                    .find_map(|detail| detail.error_code),
                message: envelope.error.message,
            },
            Err(_) => DeliveryError::Api {
                http_status,
                status: None,
                error_code: None,
                message: body.to_string(),
            },
        }
    }
}

#[async_trait]
impl NotificationProvider for FcmProvider {
    /// Sends one message through `messages:send`
    ///
    /// # Returns
    /// The message name, e.g. `projects/{project_id}/messages/{id}`
    async fn send(&self, message: &NotificationMessage) -> Result<String, DeliveryError> {
        let access_token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&SendRequest {
                validate_only: self.validate_only,
                message,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), &body));
        }

        serde_json::from_str::<SendResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.name)
            .ok_or_else(|| DeliveryError::Decode(format!("missing message name in '{}'", body)))
    }

    fn name(&self) -> &'static str {
        "fcm"
    }

    /// Checks that the endpoint is an http(s) URL and the project id is set
    async fn validate_config(&self) -> AppResult<()> {
        let url = Url::parse(&self.endpoint).map_err(|_| AppError::Validation {
            field: "messaging.endpoint".to_string(),
            reason: "Invalid URL format".to_string(),
        })?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(AppError::Validation {
                field: "messaging.endpoint".to_string(),
                reason: "Only HTTP(S) URLs are allowed".to_string(),
            });
        }

        if self.project_id.trim().is_empty() {
            return Err(AppError::Validation {
                field: "messaging.project_id".to_string(),
                reason: "Project id must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Succeeds when an access token can be obtained
    async fn health_check(&self) -> AppResult<()> {
        self.tokens
            .access_token()
            .await
            .map(|_| ())
            .map_err(|e| AppError::Internal { source: e.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorded {
        requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
    }

    /// Fake FCM that records every request and answers with `reply`
    async fn spawn_fcm(reply: (StatusCode, Value)) -> (String, Recorded) {
        let recorded = Recorded::default();
        let app = Router::new()
            .route(
                "/v1/projects/{project}/messages:send",
                post(
                    move |State(recorded): State<Recorded>,
                          Path(project): Path<String>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let auth = headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            recorded.requests.lock().unwrap().push((project, auth, body));
                            (reply.0, Json(reply.1))
                        }
                    },
                ),
            )
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{}", addr), recorded)
    }

    fn provider(endpoint: &str) -> FcmProvider {
        FcmProvider::new(
            "demo-project",
            endpoint,
            AccessTokenProvider::new(CredentialSource::Static("test-token".to_string())),
        )
    }

    fn message() -> NotificationMessage {
        NotificationMessage::from(&crate::models::NotificationRequest::new("abc", "Hi", "There"))
    }

    #[test]
    fn test_send_url() {
        let provider = provider("https://fcm.googleapis.com/");
        assert_eq!(
            provider.send_url(),
            "https://fcm.googleapis.com/v1/projects/demo-project/messages:send"
        );
        assert_eq!(provider.name(), "fcm");
        assert_eq!(provider.project_id(), "demo-project");
    }

    #[tokio::test]
    async fn test_send_posts_message_with_bearer_token() {
        let (endpoint, recorded) = spawn_fcm((
            StatusCode::OK,
            json!({"name": "projects/demo-project/messages/0:123"}),
        ))
        .await;

        let id = provider(&endpoint).send(&message()).await.unwrap();
        assert_eq!(id, "projects/demo-project/messages/0:123");

        let requests = recorded.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (project, auth, body) = &requests[0];
        assert_eq!(project, "demo-project");
        assert_eq!(auth.as_deref(), Some("Bearer test-token"));
        assert_eq!(
            body,
            &json!({"message": {"notification": {"title": "Hi", "body": "There"}, "token": "abc"}})
        );
    }

    #[tokio::test]
    async fn test_validate_only_flag_is_sent() {
        let (endpoint, recorded) = spawn_fcm((
            StatusCode::OK,
            json!({"name": "projects/demo-project/messages/fake_message_id"}),
        ))
        .await;

        provider(&endpoint)
            .with_validate_only(true)
            .send(&message())
            .await
            .unwrap();

        let requests = recorded.requests.lock().unwrap();
        assert_eq!(requests[0].2["validate_only"], json!(true));
    }

    #[tokio::test]
    async fn test_api_error_envelope_is_parsed() {
        let (endpoint, _) = spawn_fcm((
            StatusCode::NOT_FOUND,
            json!({
                "error": {
                    "code": 404,
                    "message": "Requested entity was not found.",
                    "status": "NOT_FOUND",
                    "details": [{
                        "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                        "errorCode": "UNREGISTERED"
                    }]
                }
            }),
        ))
        .await;

        match provider(&endpoint).send(&message()).await {
            Err(DeliveryError::Api {
                http_status,
                status,
                error_code,
                message,
            }) => {
                assert_eq!(http_status, 404);
                assert_eq!(status.as_deref(), Some("NOT_FOUND"));
                assert_eq!(error_code.as_deref(), Some("UNREGISTERED"));
                assert_eq!(message, "Requested entity was not found.");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_error_body_is_kept() {
        let (endpoint, _) = spawn_fcm((StatusCode::BAD_GATEWAY, json!("upstream down"))).await;

        match provider(&endpoint).send(&message()).await {
            Err(DeliveryError::Api {
                http_status,
                status,
                message,
                ..
            }) => {
                assert_eq!(http_status, 502);
                assert!(status.is_none());
                assert_eq!(message, "\"upstream down\"");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_without_name_is_a_decode_error() {
        let (endpoint, _) = spawn_fcm((StatusCode::OK, json!({}))).await;

        let result = provider(&endpoint).send(&message()).await;
        assert!(matches!(result, Err(DeliveryError::Decode(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = provider(&format!("http://{}", addr)).send(&message()).await;
        assert!(matches!(result, Err(DeliveryError::Transport(_))));
    }

    #[tokio::test]
    async fn test_validate_config() {
        assert!(provider("https://fcm.googleapis.com").validate_config().await.is_ok());

        let err = provider("ftp://fcm.googleapis.com").validate_config().await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "messaging.endpoint"));

        let err = provider("not a url").validate_config().await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "messaging.endpoint"));

        let blank = FcmProvider::new(
            " ",
            "https://fcm.googleapis.com",
            AccessTokenProvider::new(CredentialSource::Static("t".to_string())),
        );
        let err = blank.validate_config().await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "messaging.project_id"));
    }

    #[tokio::test]
    async fn test_health_check_with_static_token() {
        assert!(provider("https://fcm.googleapis.com").health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_from_config_with_static_token() {
        let config = MessagingConfig {
            project_id: Some("configured-project".to_string()),
            access_token: Some("static".to_string()),
            endpoint: "http://127.0.0.1:9099".to_string(),
            validate_only: true,
            ..Default::default()
        };

        let provider = FcmProvider::from_config(&config).await.unwrap();
        assert_eq!(
            provider.send_url(),
            "http://127.0.0.1:9099/v1/projects/configured-project/messages:send"
        );
        assert!(provider.validate_only);
    }
}
