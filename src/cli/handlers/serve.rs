//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server startup.

use crate::config::Settings;
use crate::error::AppResult;
use crate::server::Server;
use crate::services::notifications::{FcmProvider, NotificationProvider};

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    /// Create a new serve command handler
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Execute the serve command with optional dry-run support
    ///
    /// # Arguments
    /// * `dry_run` - If true, validates configuration and credentials and exits without starting server
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Credential errors
    /// - Server startup errors (if not dry-run)
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            self.validate_only().await
        } else {
            Server::new(self.config).run().await.map_err(Into::into)
        }
    }

    /// Validate configuration and credentials without starting the server
    pub async fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;
        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!(
            "✓ Callable function path: {}",
            self.config.server.function_path()
        );

        let provider = FcmProvider::from_config(&self.config.messaging).await?;
        provider.validate_config().await?;
        println!("✓ Messaging project: {}", provider.project_id());
        println!("✓ Messaging endpoint: {}", provider.send_url());

        provider.health_check().await?;
        println!("✓ Access token obtained");

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &Settings {
        &self.config
    }
}
