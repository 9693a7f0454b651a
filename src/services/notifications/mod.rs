//! Notification relay with a pluggable messaging provider.
//!
//! `NotificationProvider` abstracts the push-messaging backend; `FcmProvider`
//! is the Firebase Cloud Messaging implementation and `NotificationRelay`
//! drives one provider per process.

mod fcm_provider;
mod messaging;
mod provider;
mod relay;

pub use fcm_provider::FcmProvider;
pub use messaging::{initialize_messaging, is_initialized, messaging};
pub use provider::{DeliveryError, NotificationProvider};
pub use relay::NotificationRelay;

#[cfg(test)]
pub(crate) use relay::tests::FakeProvider;
