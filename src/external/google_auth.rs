//! Google OAuth2 access tokens for the FCM HTTP v1 API.
//!
//! Credentials come from, in order: a static token in configuration, a
//! service-account key file, or the compute metadata server.

use std::path::Path;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::MessagingConfig;
use crate::external::client::HTTP_CLIENT;

/// OAuth2 scope required by `messages:send`
pub const FIREBASE_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Environment variable naming a service-account key file
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Environment variables consulted for the project id
pub const PROJECT_ID_ENVS: &[&str] = &["GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";
const METADATA_PROJECT_PATH: &str = "/computeMetadata/v1/project/project-id";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials: {0}")]
    Credentials(String),

    #[error("failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("unable to determine project id: {0}")]
    ProjectId(String),
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service-account JSON key this crate uses
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        serde_json::from_str(json)
            .map_err(|e| AuthError::Credentials(format!("malformed service account key: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AuthError::Credentials(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

// Keeps the private key out of logs
impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: i64,
}

/// Where access tokens come from
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Pre-issued token, used as-is and never refreshed
    Static(String),
    ServiceAccount(Arc<ServiceAccountKey>),
    MetadataServer { endpoint: String },
}

impl CredentialSource {
    /// Picks the source for `config`, consulting `GOOGLE_APPLICATION_CREDENTIALS`
    pub fn from_config(config: &MessagingConfig) -> Result<Self, AuthError> {
        Self::select(config, std::env::var(CREDENTIALS_ENV).ok())
    }

    fn select(config: &MessagingConfig, env_credentials: Option<String>) -> Result<Self, AuthError> {
        if let Some(token) = &config.access_token {
            return Ok(CredentialSource::Static(token.clone()));
        }

        let key_file = config
            .credentials_file
            .clone()
            .or(env_credentials.filter(|path| !path.trim().is_empty()));
        if let Some(path) = key_file {
            let key = ServiceAccountKey::from_file(Path::new(&path))?;
            return Ok(CredentialSource::ServiceAccount(Arc::new(key)));
        }

        Ok(CredentialSource::MetadataServer {
            endpoint: config.metadata_endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CredentialSource::Static(_) => "static",
            CredentialSource::ServiceAccount(_) => "service_account",
            CredentialSource::MetadataServer { .. } => "metadata_server",
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Timestamp,
}

impl CachedToken {
    fn is_fresh(&self, now: Timestamp) -> bool {
        now.checked_add(SignedDuration::from_secs(EXPIRY_MARGIN_SECS))
            .is_ok_and(|deadline| deadline < self.expires_at)
    }
}

/// Issues and caches OAuth2 access tokens.
///
/// Concurrent callers share one refresh: the cache lock is held across the
/// token request.
pub struct AccessTokenProvider {
    source: CredentialSource,
    cache: Mutex<Option<CachedToken>>,
    client: reqwest::Client,
}

impl AccessTokenProvider {
    pub fn new(source: CredentialSource) -> Self {
        Self::with_client(source, HTTP_CLIENT.clone())
    }

    pub fn with_client(source: CredentialSource, client: reqwest::Client) -> Self {
        Self {
            source,
            cache: Mutex::new(None),
            client,
        }
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    /// Returns a bearer token, fetching a new one when the cached token is
    /// missing or within a minute of expiry.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref()
            && cached.is_fresh(Timestamp::now())
        {
            return Ok(cached.access_token.clone());
        }

        let response = match &self.source {
            CredentialSource::Static(token) => return Ok(token.clone()),
            CredentialSource::ServiceAccount(key) => self.exchange_assertion(key).await?,
            CredentialSource::MetadataServer { endpoint } => {
                self.fetch_from_metadata(endpoint).await?
            }
        };

        let expires_at = Timestamp::now()
            .checked_add(SignedDuration::from_secs(response.expires_in))
            .unwrap_or(Timestamp::MAX);
        tracing::debug!(
            source = self.source.kind(),
            expires_at = %expires_at,
            "Fetched access token"
        );

        *cache = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at,
        });
        Ok(response.access_token)
    }

    async fn exchange_assertion(&self, key: &ServiceAccountKey) -> Result<TokenResponse, AuthError> {
        let assertion = sign_assertion(key, Timestamp::now())?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)];

        let response = self.client.post(&key.token_uri).form(&params).send().await?;
        read_token_response(response).await
    }

    async fn fetch_from_metadata(&self, endpoint: &str) -> Result<TokenResponse, AuthError> {
        let response = self
            .client
            .get(format!("{}{}", endpoint, METADATA_TOKEN_PATH))
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;
        read_token_response(response).await
    }
}

async fn read_token_response(response: reqwest::Response) -> Result<TokenResponse, AuthError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::TokenEndpoint {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

/// Signs the RS256 JWT assertion exchanged for an access token
pub(crate) fn sign_assertion(key: &ServiceAccountKey, now: Timestamp) -> Result<String, AuthError> {
    let iat = now.as_second();
    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        scope: FIREBASE_MESSAGING_SCOPE.to_string(),
        aud: key.token_uri.clone(),
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(encode(&header, &claims, &encoding_key)?)
}

/// Resolves the Firebase project id.
///
/// Order: configuration, the service-account key, `GOOGLE_CLOUD_PROJECT` /
/// `GCLOUD_PROJECT`, then the metadata server when that is the credential
/// source.
pub async fn resolve_project_id(
    config: &MessagingConfig,
    source: &CredentialSource,
) -> Result<String, AuthError> {
    resolve_project_id_with(config, source, |name| std::env::var(name).ok(), &HTTP_CLIENT).await
}

pub(crate) async fn resolve_project_id_with(
    config: &MessagingConfig,
    source: &CredentialSource,
    env: impl Fn(&str) -> Option<String>,
    client: &reqwest::Client,
) -> Result<String, AuthError> {
    if let Some(project_id) = &config.project_id {
        return Ok(project_id.clone());
    }

    if let CredentialSource::ServiceAccount(key) = source
        && let Some(project_id) = key.project_id.as_ref().filter(|id| !id.is_empty())
    {
        return Ok(project_id.clone());
    }

    if let Some(project_id) = PROJECT_ID_ENVS
        .iter()
        .find_map(|name| env(name).filter(|value| !value.trim().is_empty()))
    {
        return Ok(project_id);
    }

    if let CredentialSource::MetadataServer { endpoint } = source {
        let response = client
            .get(format!("{}{}", endpoint, METADATA_PROJECT_PATH))
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() && !body.trim().is_empty() {
            return Ok(body.trim().to_string());
        }
        return Err(AuthError::ProjectId(format!(
            "metadata server returned {}",
            status.as_u16()
        )));
    }

    Err(AuthError::ProjectId(
        "set messaging.project_id or GOOGLE_CLOUD_PROJECT".to_string(),
    ))
}
