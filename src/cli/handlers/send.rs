//! Send command handler
//!
//! Performs a single relay invocation from the command line and prints the
//! result as JSON.

use crate::config::Settings;
use crate::error::AppResult;
use crate::models::RelayResult;
use crate::services::notifications::{
    FcmProvider, NotificationProvider, NotificationRelay, initialize_messaging, messaging,
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Handler for the send command
pub struct SendCommandHandler {
    config: Settings,
}

impl SendCommandHandler {
    /// Create a new send command handler
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Builds the invocation argument from CLI arguments.
    ///
    /// A raw `payload` is used as given. Otherwise the individual fields form
    /// `{token, title, body}`, leaving out the ones that were not passed.
    pub fn invocation_argument(
        token: Option<&str>,
        title: Option<&str>,
        body: Option<&str>,
        payload: Option<&Value>,
    ) -> Value {
        if let Some(payload) = payload {
            return payload.clone();
        }

        let mut fields = Map::new();
        for (key, value) in [("token", token), ("title", title), ("body", body)] {
            if let Some(value) = value {
                fields.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
        Value::Object(fields)
    }

    /// Initializes messaging from configuration, relays `argument` once and
    /// prints the result
    ///
    /// # Errors
    /// Only setup failures (credentials, project id, double initialization).
    /// A failed delivery is printed, not returned.
    pub async fn execute(&self, argument: Value) -> AppResult<()> {
        let provider = FcmProvider::from_config(&self.config.messaging).await?;
        provider.validate_config().await?;
        initialize_messaging(Arc::new(provider))?;

        let relay = NotificationRelay::new(messaging()?);
        let result = relay.invoke_value(argument).await;

        println!("{}", Self::render(&result)?);
        Ok(())
    }

    /// Pretty-printed JSON form of a result
    pub fn render(result: &RelayResult) -> AppResult<String> {
        serde_json::to_string_pretty(result).map_err(|e| anyhow::Error::from(e).into())
    }

    /// Get the configuration
    pub fn config(&self) -> &Settings {
        &self.config
    }
}
