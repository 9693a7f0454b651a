//! Outbound integrations: the shared HTTP client and Google OAuth2 credentials

pub mod client;
pub mod google_auth;

pub use client::HTTP_CLIENT;
pub use google_auth::{AccessTokenProvider, AuthError, CredentialSource, ServiceAccountKey};
