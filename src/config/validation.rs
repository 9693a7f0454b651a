//! Checks run on the merged settings before anything is started.

use reqwest::Url;
use tracing_subscriber::EnvFilter;

use crate::config::error::ConfigError;
use crate::config::settings::{LoggerSettings, MessagingConfig, ServerConfig, Settings};

fn require(ok: bool, key: &str, reason: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, reason()))
    }
}

fn require_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let usable = Url::parse(value)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host());
    require(usable, key, || format!("'{}' is not an http(s) URL", value))
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(self.port != 0, "server.port", || "port 0 is not allowed".to_string())?;

        let name = self.function_name.as_str();
        require(!name.trim().is_empty(), "server.function_name", || {
            "function name is empty".to_string()
        })?;
        // Mounted as a single literal route segment
        require(
            !name.contains(['/', '{', '}']) && !name.contains(char::is_whitespace),
            "server.function_name",
            || format!("'{}' must be a single path segment", name),
        )
    }
}

impl MessagingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_http_url("messaging.endpoint", &self.endpoint)?;
        require_http_url("messaging.metadata_endpoint", &self.metadata_endpoint)?;

        for (key, value) in [
            ("messaging.project_id", &self.project_id),
            ("messaging.credentials_file", &self.credentials_file),
            ("messaging.access_token", &self.access_token),
        ] {
            require(
                value.as_deref().is_none_or(|v| !v.trim().is_empty()),
                key,
                || "blank value, remove the key instead".to_string(),
            )?;
        }
        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = EnvFilter::builder().parse(&self.level) {
            return Err(ConfigError::invalid(
                "logger.level",
                format!("'{}' is not a level or filter directive: {}", self.level, e),
            ));
        }
        require(
            self.console.enabled || self.file.enabled,
            "logger",
            || "console and file output are both disabled".to_string(),
        )?;
        require(
            !self.file.enabled || !self.file.path.as_os_str().is_empty(),
            "logger.file.path",
            || "file output is enabled without a path".to_string(),
        )
    }
}

impl Settings {
    /// Validates every section, stopping at the first problem
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logger.validate()?;
        self.messaging.validate()
    }
}
