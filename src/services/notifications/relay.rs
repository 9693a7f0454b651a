//! Notification relay.
//!
//! Turns one invocation argument into one provider call and reports the
//! outcome as a [`RelayResult`]. Delivery failures never escape as errors.

use super::provider::NotificationProvider;
use crate::models::{NotificationMessage, RelayRequest, RelayResult, json_kind};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// Token as it should read in a log line: strings unquoted, other JSON as
/// text, a missing token as `undefined`
fn token_for_log(token: Option<&Value>) -> Cow<'_, str> {
    match token {
        Some(Value::String(s)) => Cow::Borrowed(s),
        Some(other) => Cow::Owned(other.to_string()),
        None => Cow::Borrowed("undefined"),
    }
}

/// Relays notification requests to a messaging provider
///
/// Cloning is cheap; every clone shares the same provider.
#[derive(Clone)]
pub struct NotificationRelay {
    provider: Arc<dyn NotificationProvider>,
}

impl NotificationRelay {
    /// Creates a new NotificationRelay
    ///
    /// # Arguments
    /// * `provider` - Backend used for every delivery
    pub fn new(provider: Arc<dyn NotificationProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn NotificationProvider> {
        &self.provider
    }

    /// Sends one notification and reports the outcome.
    ///
    /// Fields are forwarded without validation. Each call is a separate
    /// delivery; repeating a request sends it again.
    ///
    /// # Returns
    /// `Delivered` with the provider's message identifier, or `Failed`
    /// carrying the request token
    pub async fn invoke(&self, request: RelayRequest) -> RelayResult {
        let enveloped = request.is_enveloped();
        let request = request.into_effective();

        tracing::info!(
            token = %token_for_log(request.token.as_ref()),
            token_type = json_kind(request.token.as_ref()),
            enveloped,
            provider = self.provider.name(),
            "Relaying notification"
        );

        let message = NotificationMessage::from(&request);

        match self.provider.send(&message).await {
            Ok(response) => {
                tracing::info!(message_id = %response, "Notification sent");
                RelayResult::Delivered { response }
            }
            Err(e) => {
                tracing::error!(error = %e, "Notification delivery failed");
                RelayResult::Failed {
                    error: request.token,
                }
            }
        }
    }

    /// Resolves the `data` envelope of a raw argument, then relays it
    pub async fn invoke_value(&self, value: Value) -> RelayResult {
        self.invoke(RelayRequest::from_value(&value)).await
    }
}
