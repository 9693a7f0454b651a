//! Server module for managing HTTP server lifecycle
//!
//! This module handles messaging initialization, server startup, and
//! graceful shutdown.

use crate::api::routes::create_router;
use crate::config::{Environment, Settings};
use crate::services::notifications::{
    FcmProvider, NotificationProvider, initialize_messaging, messaging,
};
use crate::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

impl Server {
    /// Create a new server with the given settings
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until shutdown signal
    ///
    /// This method:
    /// 1. Logs startup information
    /// 2. Builds and installs the process-wide messaging provider
    /// 3. Creates application state
    /// 4. Binds to configured address
    /// 5. Starts the HTTP server with graceful shutdown
    ///
    /// # Errors
    /// - Credential or project id resolution errors
    /// - Messaging already initialized in this process
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %Environment::from_env().as_str(),
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            function = %self.settings.server.function_path(),
            cors_enabled = %self.settings.server.cors_enabled,
            "Server configuration loaded"
        );

        tracing::info!(
            level = %self.settings.logger.level,
            console_enabled = %self.settings.logger.console.enabled,
            file_enabled = %self.settings.logger.file.enabled,
            "Logger configuration loaded"
        );

        // Secrets are reported by presence only
        tracing::info!(
            project_id = ?self.settings.messaging.project_id,
            credentials_file = ?self.settings.messaging.credentials_file,
            access_token_configured = %self.settings.messaging.access_token.is_some(),
            endpoint = %self.settings.messaging.endpoint,
            validate_only = %self.settings.messaging.validate_only,
            "Messaging configuration loaded"
        );

        let provider = FcmProvider::from_config(&self.settings.messaging).await?;
        provider.validate_config().await.map_err(|e| {
            tracing::error!(error = %e, "Messaging configuration validation failed");
            anyhow::anyhow!("Messaging configuration validation failed: {}", e)
        })?;

        initialize_messaging(Arc::new(provider))?;

        let state = AppState::new(messaging()?);
        tracing::info!("Application state created");

        let router = create_router(state, &self.settings.server);
        tracing::info!("Router configured");

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
///
/// If a handler cannot be installed that branch waits forever, leaving the
/// other signal in charge.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
