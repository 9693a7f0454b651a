//! Console and file logging driven by `LoggerSettings`.
//!
//! The filter sits behind a reload layer so the level can change while the
//! relay is serving.

pub mod error;
pub(crate) mod writer;

#[cfg(test)]
mod tests;

pub use error::LoggerError;

use std::io::IsTerminal;
use std::sync::Arc;

use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, reload};
use writer::LogFileWriter;

use crate::config::{FileSettings, LogFormat, LoggerSettings};

type FilteredRegistry = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Handle for changing the active log filter at runtime
#[derive(Clone)]
pub struct LogLevelHandle {
    pub(crate) inner: Arc<reload::Handle<EnvFilter, Registry>>,
}

impl LogLevelHandle {
    /// Replace the active filter.
    ///
    /// Accepts a plain level (`debug`) or any `EnvFilter` directive
    /// (`info,push_relay::services=trace`).
    pub fn set_level(&self, level: &str) -> Result<(), LoggerError> {
        let filter = EnvFilter::try_new(level)
            .map_err(|e| LoggerError::filter(format!("invalid filter '{}': {}", level, e)))?;
        self.inner
            .reload(filter)
            .map_err(|e| LoggerError::filter(e.to_string()))
    }

    /// The active filter rendered as a directive string
    pub fn current_level(&self) -> Option<String> {
        self.inner.with_current(|filter| filter.to_string()).ok()
    }
}

impl std::fmt::Debug for LogLevelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogLevelHandle")
            .field("level", &self.current_level())
            .finish()
    }
}

/// Installs the global subscriber for the `[logger]` section
///
/// # Errors
/// Fails on settings that do not validate, an unopenable log file, or when a
/// global subscriber is already installed.
pub fn init_logger(settings: &LoggerSettings) -> Result<LogLevelHandle, LoggerError> {
    settings
        .validate()
        .map_err(|e| LoggerError::config(e.to_string()))?;

    let filter =
        EnvFilter::try_new(&settings.level).map_err(|e| LoggerError::filter(e.to_string()))?;
    let (filter_layer, reload_handle) = reload::Layer::new(filter);
    let layers = build_layers(settings)?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(layers)
        .try_init()
        .map_err(|e| LoggerError::AlreadyInitialized {
            message: e.to_string(),
        })?;

    Ok(LogLevelHandle {
        inner: Arc::new(reload_handle),
    })
}

/// Output layers for the enabled sinks.
///
/// The file layer comes first so console ANSI settings never leak into
/// file output (tokio-rs/tracing#1817).
fn build_layers(settings: &LoggerSettings) -> Result<Vec<BoxedLayer>, LoggerError> {
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);

    if settings.file.enabled {
        layers.push(file_layer(&settings.file)?);
    }

    if settings.console.enabled {
        let use_ansi = settings.console.colored && std::io::stdout().is_terminal();
        layers.push(
            fmt::layer()
                .with_ansi(use_ansi)
                .with_target(true)
                .with_level(true)
                .boxed(),
        );
    }

    Ok(layers)
}

fn file_layer(file: &FileSettings) -> Result<BoxedLayer, LoggerError> {
    let writer = LogFileWriter::new(file)?;

    let layer = match file.format {
        LogFormat::Full => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .compact()
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .boxed(),
    };

    Ok(layer)
}
