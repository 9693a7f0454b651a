//! Service layer.
//!
//! Services hold the business logic and sit between handlers and the
//! external clients.

pub mod notifications;

pub use notifications::{NotificationProvider, NotificationRelay};

use std::sync::Arc;

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since the provider sits behind an `Arc`.
#[derive(Clone)]
pub struct Services {
    pub relay: NotificationRelay,
}

impl Services {
    /// Creates a new Services instance around a messaging provider.
    pub fn new(provider: Arc<dyn NotificationProvider>) -> Self {
        Self {
            relay: NotificationRelay::new(provider),
        }
    }
}
