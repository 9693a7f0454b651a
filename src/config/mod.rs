//! Settings for push-relay.
//!
//! `ConfigLoader` merges `config/default.toml`, `config/{environment}.toml`,
//! `config/local.toml` and `RELAY_*` environment variables into `Settings`,
//! which is validated before use.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ConsoleSettings, FileSettings, LogFormat, LoggerSettings, MessagingConfig, ServerConfig,
    Settings,
};
