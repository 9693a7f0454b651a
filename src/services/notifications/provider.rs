//! Core notification provider trait and delivery errors.
//!
//! A provider submits one normalized message to a push-messaging backend and
//! reports the backend's message identifier.

use crate::error::AppResult;
use crate::external::AuthError;
use crate::models::NotificationMessage;
use async_trait::async_trait;
use thiserror::Error;

/// Why a message was not delivered.
///
/// The relay reports every variant to the caller the same way; the detail
/// only reaches the logs.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No usable access token
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The request never got an HTTP response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the message
    #[error("messaging API returned {http_status}: {message}")]
    Api {
        http_status: u16,
        /// Canonical status such as `INVALID_ARGUMENT`
        status: Option<String>,
        /// FCM specific code such as `UNREGISTERED`
        error_code: Option<String>,
        message: String,
    },

    /// A success response without a usable message identifier
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Trait for push-messaging backends
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// Providers are shared as `Arc<dyn NotificationProvider>` and must be safe
/// for concurrent use.
///
/// # Example Implementation
/// ```ignore
/// use async_trait::async_trait;
///
/// pub struct LoopbackProvider;
///
/// #[async_trait]
/// impl NotificationProvider for LoopbackProvider {
///     async fn send(&self, _message: &NotificationMessage) -> Result<String, DeliveryError> {
///         Ok("loopback/0".to_string())
///     }
///
///     fn name(&self) -> &'static str {
///         "loopback"
///     }
/// }
/// ```
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Submits a message for delivery
    ///
    /// # Arguments
    /// * `message` - The normalized `{notification: {title, body}, token}` message
    ///
    /// # Returns
    /// The backend's identifier for the accepted message
    async fn send(&self, message: &NotificationMessage) -> Result<String, DeliveryError>;

    /// Returns the provider name for logging/debugging
    fn name(&self) -> &'static str;

    /// Validates provider configuration (optional, default no-op)
    async fn validate_config(&self) -> AppResult<()> {
        Ok(())
    }

    /// Checks the backend is reachable with the configured credentials
    /// (optional, default no-op)
    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = DeliveryError::Api {
            http_status: 404,
            status: Some("NOT_FOUND".to_string()),
            error_code: Some("UNREGISTERED".to_string()),
            message: "Requested entity was not found.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "messaging API returned 404: Requested entity was not found."
        );
    }

    #[test]
    fn test_auth_error_converts() {
        let err: DeliveryError = AuthError::Credentials("no key".to_string()).into();
        assert!(matches!(err, DeliveryError::Auth(_)));
        assert_eq!(
            err.to_string(),
            "authentication failed: invalid credentials: no key"
        );
    }
}
