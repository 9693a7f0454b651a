//! Process-wide messaging provider.
//!
//! Set once during startup and read by every invocation afterwards. There is
//! no teardown; the handle lives until the process exits.

use super::provider::NotificationProvider;
use crate::error::{AppError, AppResult};
use std::sync::{Arc, OnceLock};

static MESSAGING: OnceLock<Arc<dyn NotificationProvider>> = OnceLock::new();

const COMPONENT: &str = "messaging";

/// Installs the process-wide provider
///
/// # Errors
/// `AlreadyInitialized` if a provider was installed before
pub fn initialize_messaging(provider: Arc<dyn NotificationProvider>) -> AppResult<()> {
    let name = provider.name();
    MESSAGING
        .set(provider)
        .map_err(|_| AppError::AlreadyInitialized {
            component: COMPONENT.to_string(),
        })?;

    tracing::info!(provider = name, "Messaging initialized");
    Ok(())
}

/// Returns the process-wide provider
///
/// # Errors
/// `NotInitialized` before [`initialize_messaging`] succeeds
pub fn messaging() -> AppResult<Arc<dyn NotificationProvider>> {
    MESSAGING
        .get()
        .cloned()
        .ok_or_else(|| AppError::NotInitialized {
            component: COMPONENT.to_string(),
        })
}

pub fn is_initialized() -> bool {
    MESSAGING.get().is_some()
}
