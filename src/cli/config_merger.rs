//! Applies command-line overrides on top of the loaded settings

use super::parser::{Cli, Commands};
use crate::config::{ConfigError, ConfigLoader, Environment, Settings};
use std::path::Path;

/// Loaded settings waiting for CLI overrides
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads settings from `--config` (single file) or the layered directory,
    /// with `--env` taking the place of `RELAY_APP_ENV`
    pub fn from_config_path(
        config_path: Option<&Path>,
        environment: Option<Environment>,
    ) -> Result<Self, ConfigError> {
        let mut loader = match config_path {
            Some(path) => {
                std::fs::File::open(path).map_err(|e| ConfigError::unreadable(path, e))?;
                ConfigLoader::from_file(path)
            }
            None => ConfigLoader::new()?,
        };
        if let Some(env) = environment {
            loader = loader.with_environment(env);
        }

        loader.load().map(Self::new)
    }

    /// Settings with CLI flags applied, validated again.
    ///
    /// Precedence: `serve --log-level`, then `--verbose`/`--quiet`, then
    /// the loaded value.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut settings = self.base_config.clone();

        if cli.verbose {
            settings.logger.level = "debug".to_string();
        } else if cli.quiet {
            settings.logger.level = "error".to_string();
        }

        match &cli.command {
            Some(Commands::Serve {
                host,
                port,
                log_level,
                ..
            }) => {
                if let Some(host) = host {
                    settings.server.host.clone_from(host);
                }
                if let Some(port) = port {
                    settings.server.port = *port;
                }
                if let Some(level) = log_level {
                    settings.logger.level = level.as_directive().to_string();
                }
            }
            Some(Commands::Send { validate_only, .. }) => {
                settings.messaging.validate_only |= *validate_only;
            }
            None => {}
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::tests::{ENV_MUTEX, EnvGuard, clear_relay_env};
    use clap::Parser;

    fn merged(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(Settings::default())
            .merge_cli_args(&cli)
            .unwrap()
    }

    #[test]
    fn test_global_level_flags() {
        assert_eq!(merged(&["push-relay"]).logger.level, "info");
        assert_eq!(merged(&["push-relay", "--verbose"]).logger.level, "debug");
        assert_eq!(merged(&["push-relay", "--quiet"]).logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let settings = merged(&["push-relay", "serve", "--host", "0.0.0.0", "--port", "9000"]);
        assert_eq!(settings.server.address(), "0.0.0.0:9000");

        let settings = merged(&["push-relay", "--verbose", "serve", "--log-level", "warn"]);
        assert_eq!(settings.logger.level, "warn");
    }

    #[test]
    fn test_send_validate_only() {
        assert!(merged(&["push-relay", "send", "--token", "abc", "--validate-only"])
            .messaging
            .validate_only);

        // The flag only ever switches validation on
        let mut base = Settings::default();
        base.messaging.validate_only = true;
        let cli = Cli::try_parse_from(["push-relay", "send", "--token", "abc"]).unwrap();
        let settings = ConfigurationMerger::new(base).merge_cli_args(&cli).unwrap();
        assert!(settings.messaging.validate_only);
    }

    #[test]
    fn test_merged_settings_are_validated() {
        let mut base = Settings::default();
        base.server.function_name = "send notification".to_string();
        let merger = ConfigurationMerger::new(base.clone());

        let cli = Cli::try_parse_from(["push-relay", "serve"]).unwrap();
        let err = merger.merge_cli_args(&cli).unwrap_err();
        assert_eq!(err.key(), Some("server.function_name"));
        assert_eq!(merger.config(), &base);
    }

    #[test]
    fn test_from_config_path_reads_single_file() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut guard = EnvGuard::new();
        clear_relay_env(&mut guard);

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("relay.toml");
        std::fs::write(
            &file,
            "[server]\nport = 9100\nfunction_name = \"notify\"\n\n[messaging]\nproject_id = \"demo\"\n",
        )
        .unwrap();

        let merger =
            ConfigurationMerger::from_config_path(Some(&file), Some(Environment::Production))
                .unwrap();

        assert_eq!(merger.config().server.port, 9100);
        assert_eq!(merger.config().server.function_path(), "/notify");
        assert_eq!(merger.config().messaging.project_id.as_deref(), Some("demo"));
    }

    #[test]
    fn test_from_config_path_missing_file() {
        let missing = Path::new("/definitely/not/here.toml");
        assert!(matches!(
            ConfigurationMerger::from_config_path(Some(missing), None),
            Err(ConfigError::Unreadable { ref path, .. }) if path == missing
        ));
    }
}
