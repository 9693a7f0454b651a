//! Application state for Axum web framework.
//!
//! Contains shared services that are accessible across all request handlers.

use crate::services::{NotificationProvider, Services};
use std::sync::Arc;

/// Application state containing all shared services.
///
/// This struct is designed to be used with Axum's State extractor.
/// Cloning is cheap since the provider sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
}

impl AppState {
    /// Creates a new AppState around the messaging provider.
    ///
    /// # Example
    /// ```ignore
    /// let provider = messaging()?;
    /// let state = AppState::new(provider);
    /// ```
    pub fn new(provider: Arc<dyn NotificationProvider>) -> Self {
        Self {
            services: Services::new(provider),
        }
    }
}
