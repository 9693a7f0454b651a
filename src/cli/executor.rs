//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::{SendCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::{AppError, AppResult};

/// Execute a CLI command with the given settings
///
/// No subcommand means `serve`.
///
/// # Arguments
/// * `cli` - Parsed CLI arguments
/// * `settings` - Merged and validated settings
///
/// # Errors
/// Returns errors from command handlers or validation failures
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    validate_command_args(cli, &settings)?;

    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
        Some(Commands::Send {
            token,
            title,
            body,
            payload,
            validate_only: _,
        }) => {
            let argument = SendCommandHandler::invocation_argument(
                token.as_deref(),
                title.as_deref(),
                body.as_deref(),
                payload.as_ref(),
            );
            SendCommandHandler::new(settings).execute(argument).await
        }
    }
}

/// Validate command arguments and configuration before execution
fn validate_command_args(cli: &Cli, settings: &Settings) -> AppResult<()> {
    cli.validate().map_err(|msg| AppError::Validation {
        field: "cli_arguments".to_string(),
        reason: msg,
    })?;

    if let Some(Commands::Serve {
        host: Some(host_addr),
        port: Some(port_num),
        ..
    }) = &cli.command
        && *port_num < 1024
        && host_addr == "0.0.0.0"
    {
        tracing::warn!(
            port = port_num,
            "Binding to 0.0.0.0 on a privileged port typically requires root privileges"
        );
    }

    if let Some(Commands::Send { .. }) = &cli.command
        && settings.messaging.validate_only
    {
        tracing::info!("Validate-only mode: the message will not be delivered");
    }

    Ok(())
}
