//! Errors raised while assembling `Settings`

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `default.toml` or an explicitly chosen file is missing or unreadable
    #[error("cannot read config file {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    /// `RELAY_CONFIG_DIR` and `RELAY_CONFIG_FILE` were both set
    #[error("RELAY_CONFIG_DIR and RELAY_CONFIG_FILE are mutually exclusive; set only one")]
    AmbiguousSource,

    /// `RELAY_APP_ENV` or `--env` named no known environment
    #[error("unknown environment '{0}' (expected development, test, staging or production)")]
    UnknownEnvironment(String),

    /// A setting is present but unusable
    #[error("{key}: {reason}")]
    Invalid { key: String, reason: String },

    /// The merged layers do not parse or do not fit `Settings`
    #[error(transparent)]
    Layers(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ConfigError::Unreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Dotted key of the offending setting, if the error is about one
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_source() {
        let err = ConfigError::unreadable("/etc/relay/default.toml", "not found");
        assert_eq!(
            err.to_string(),
            "cannot read config file /etc/relay/default.toml: not found"
        );

        let err = ConfigError::invalid("messaging.endpoint", "must be an http(s) URL");
        assert_eq!(err.to_string(), "messaging.endpoint: must be an http(s) URL");
        assert_eq!(err.key(), Some("messaging.endpoint"));

        assert_eq!(ConfigError::AmbiguousSource.key(), None);
    }
}
