//! Command line of the `push-relay` binary

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

use crate::config::Environment;

/// Push-notification relay exposed as a callable function
#[derive(Parser, Debug)]
#[command(name = "push-relay")]
#[command(about = "Push-notification relay exposed as a callable function")]
#[command(long_about = "
push-relay accepts callable invocations carrying a registration token, a title
and a body, forwards them to Firebase Cloud Messaging and answers with
{success, response} or {success, error}.

EXAMPLES:
    # Start the server with default configuration
    push-relay serve

    # Start server on custom host and port
    push-relay serve --host 0.0.0.0 --port 8080

    # Use custom configuration file
    push-relay --config /path/to/config.toml serve

    # Check configuration and credentials without starting the server
    push-relay serve --dry-run

    # Send a single notification and print the result
    push-relay send --token <REGISTRATION_TOKEN> --title Hi --body There

    # Send a raw callable argument, envelope included
    push-relay send --payload '{\"data\": {\"token\": \"abc\", \"title\": \"Hi\", \"body\": \"There\"}}'

For more information about configuration options, see config/default.toml.
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load a single TOML file instead of the layered config directory.
    /// `RELAY_*` environment variables still override it.
    ///
    /// Example: --config /etc/push-relay/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::parse_config_file)]
    pub config: Option<PathBuf>,

    /// Environment layer to load, in place of `RELAY_APP_ENV`
    ///
    /// development (dev), test, staging (stage) or production (prod)
    #[arg(short, long, value_name = "NAME", value_parser = super::validation::parse_environment)]
    pub env: Option<Environment>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the callable function (the default command)
    ///
    /// Sets up FCM credentials, then serves `POST /{function_name}`, the
    /// health endpoints and the OpenAPI document.
    Serve {
        /// Bind address, `server.host` otherwise
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::parse_host)]
        host: Option<String>,

        /// Listen port, `server.port` otherwise
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::parse_port)]
        port: Option<u16>,

        /// Wins over `logger.level`, --verbose and --quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Check settings and credentials, then exit without binding
        #[arg(long)]
        dry_run: bool,
    },
    /// Relay a single notification and print the result as JSON
    ///
    /// Runs exactly one invocation through the same relay the server uses.
    /// Delivery failures are part of the printed result, not an exit error.
    ///
    /// Examples:
    ///   push-relay send --token abc --title Hi --body There
    ///   push-relay send --payload '{"token": "abc", "title": "Hi", "body": "There"}'
    ///   push-relay send --token abc --title Hi --body There --validate-only
    Send {
        /// Registration token of the target device
        #[arg(long, conflicts_with = "payload")]
        token: Option<String>,

        /// Notification title
        #[arg(long, conflicts_with = "payload")]
        title: Option<String>,

        /// Notification body
        #[arg(long, conflicts_with = "payload")]
        body: Option<String>,

        /// Raw invocation argument as JSON
        ///
        /// Either `{token, title, body}` or `{data: {token, title, body}}`.
        #[arg(long, value_name = "JSON", value_parser = super::validation::parse_json_argument)]
        payload: Option<Value>,

        /// Ask FCM to validate the message without delivering it
        #[arg(long)]
        validate_only: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive accepted by `logger.level`
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Cli {
    /// Validate CLI arguments beyond what clap checks
    pub fn validate(&self) -> Result<(), String> {
        if let Some(Commands::Send {
            token,
            title,
            body,
            payload,
            ..
        }) = &self.command
            && payload.is_none()
            && token.is_none()
            && title.is_none()
            && body.is_none()
        {
            return Err(
                "send needs --payload or at least one of --token, --title and --body".to_string(),
            );
        }

        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_flag() {
        let err = Cli::try_parse_from(["push-relay", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["push-relay", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_behavior() {
        let cli = Cli::try_parse_from(["push-relay"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
        assert!(cli.env.is_none());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_serve_command() {
        let cli =
            Cli::try_parse_from(["push-relay", "serve", "--host", "0.0.0.0", "--port", "8080"])
                .unwrap();
        if let Some(Commands::Serve {
            host,
            port,
            log_level: _,
            dry_run,
        }) = cli.command
        {
            assert_eq!(host, Some("0.0.0.0".to_string()));
            assert_eq!(port, Some(8080));
            assert!(!dry_run);
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn test_send_with_fields() {
        let cli = Cli::try_parse_from([
            "push-relay", "send", "--token", "abc", "--title", "Hi", "--body", "There",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Send {
                token,
                title,
                body,
                payload,
                validate_only,
            }) => {
                assert_eq!(token.as_deref(), Some("abc"));
                assert_eq!(title.as_deref(), Some("Hi"));
                assert_eq!(body.as_deref(), Some("There"));
                assert!(payload.is_none());
                assert!(!validate_only);
            }
            other => panic!("Expected Send command, got {other:?}"),
        }
    }

    #[test]
    fn test_send_with_payload() {
        let cli = Cli::try_parse_from([
            "push-relay",
            "send",
            "--payload",
            r#"{"data": {"token": "abc"}}"#,
            "--validate-only",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Send {
                payload,
                validate_only,
                ..
            }) => {
                assert_eq!(payload, Some(json!({"data": {"token": "abc"}})));
                assert!(validate_only);
            }
            other => panic!("Expected Send command, got {other:?}"),
        }
    }

    #[test]
    fn test_send_payload_conflicts_with_fields() {
        let err = Cli::try_parse_from([
            "push-relay", "send", "--payload", "{}", "--token", "abc",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_send_without_arguments_fails_validation() {
        let cli = Cli::try_parse_from(["push-relay", "send"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_env_names() {
        let cli = Cli::try_parse_from(["push-relay", "--env", "prod"]).unwrap();
        assert_eq!(cli.env, Some(Environment::Production));
        let cli = Cli::try_parse_from(["push-relay", "-e", "Stage"]).unwrap();
        assert_eq!(cli.env, Some(Environment::Staging));

        let err = Cli::try_parse_from(["push-relay", "--env", "qa"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_log_level_values() {
        let cli = Cli::try_parse_from(["push-relay", "serve", "--log-level", "warning"]).unwrap();
        match cli.command {
            Some(Commands::Serve { log_level, .. }) => {
                assert_eq!(log_level.map(LogLevel::as_directive), Some("warn"));
            }
            other => panic!("Expected Serve command, got {other:?}"),
        }
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["push-relay", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
