//! Typed view of the merged configuration layers.
//!
//! Every section is `#[serde(default)]`, so a layer only has to mention the
//! keys it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub name: String,
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "push-relay".to_string(),
            version: crate::pkg_version().to_string(),
        }
    }
}

/// HTTP listener and callable route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Served at `POST /{function_name}`
    pub function_name: String,
    /// Permissive CORS, callables are usually invoked from browsers
    pub cors_enabled: bool,
}

impl ServerConfig {
    /// `host:port` for the listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn function_path(&self) -> String {
        format!("/{}", self.function_name)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            function_name: "sendNotification".to_string(),
            cors_enabled: true,
        }
    }
}

/// Firebase Cloud Messaging (HTTP v1) backend.
///
/// Credentials are taken from `access_token`, then `credentials_file` or
/// `GOOGLE_APPLICATION_CREDENTIALS`, then the metadata server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Derived from the credentials or the environment when unset
    pub project_id: Option<String>,
    /// Service account key file
    pub credentials_file: Option<String>,
    /// Pre-issued OAuth2 token, for emulators and local runs
    pub access_token: Option<String>,
    pub endpoint: String,
    pub metadata_endpoint: String,
    /// Ask FCM to check messages without delivering them
    pub validate_only: bool,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            credentials_file: None,
            access_token: None,
            endpoint: "https://fcm.googleapis.com".to_string(),
            metadata_endpoint: "http://metadata.google.internal".to_string(),
            validate_only: false,
        }
    }
}

/// Line format of the log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    Compact,
    #[default]
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    pub enabled: bool,
    /// ANSI colors, only honored when stdout is a terminal
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub enabled: bool,
    pub path: PathBuf,
    pub append: bool,
    pub format: LogFormat,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("logs/push-relay.log"),
            append: true,
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    /// A level (`info`) or any `EnvFilter` directive (`info,push_relay=debug`)
    pub level: String,
    pub console: ConsoleSettings,
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub application: ApplicationConfig,
    pub server: ServerConfig,
    pub logger: LoggerSettings,
    pub messaging: MessagingConfig,
}
