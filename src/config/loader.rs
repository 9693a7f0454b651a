//! Layered settings loading.
//!
//! Layers, lowest priority first:
//! 1. `default.toml` (required)
//! 2. `{environment}.toml`
//! 3. `local.toml`
//! 4. `RELAY_*` environment variables, `__` between nested keys
//!
//! `RELAY_CONFIG_FILE` (or `--config`) replaces the three file layers with a
//! single file; environment variables still apply on top of it.

use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};

use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_VAR: &str = "RELAY_CONFIG_DIR";
const CONFIG_FILE_VAR: &str = "RELAY_CONFIG_FILE";
const DEFAULT_CONFIG_DIR: &str = "config";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Layered { dir: PathBuf },
    Single { file: PathBuf },
}

#[derive(Debug)]
pub struct ConfigLoader {
    source: Source,
    environment: Environment,
}

impl ConfigLoader {
    /// Loader driven by `RELAY_CONFIG_DIR`, `RELAY_CONFIG_FILE` and `RELAY_APP_ENV`
    ///
    /// # Errors
    /// `AmbiguousSource` when both the directory and the file variable are set.
    pub fn new() -> Result<Self, ConfigError> {
        let dir = std::env::var_os(CONFIG_DIR_VAR);
        let file = std::env::var_os(CONFIG_FILE_VAR);

        let source = match (dir, file) {
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousSource),
            (_, Some(file)) => Source::Single { file: file.into() },
            (dir, None) => Source::Layered {
                dir: dir.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR), PathBuf::from),
            },
        };

        Ok(Self {
            source,
            environment: Environment::from_env(),
        })
    }

    /// Loader for one explicit file
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Single { file: path.into() },
            environment: Environment::from_env(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Directory of the layered files, `None` in single-file mode
    pub fn config_dir(&self) -> Option<&Path> {
        match &self.source {
            Source::Layered { dir } => Some(dir),
            Source::Single { .. } => None,
        }
    }

    /// Merges all layers into validated `Settings`
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();

        match &self.source {
            Source::Single { file } => {
                builder = builder.add_source(required_file(file)?);
            }
            Source::Layered { dir } => {
                builder = builder
                    .add_source(required_file(&dir.join("default.toml"))?)
                    .add_source(optional_file(&dir.join(self.environment.file_name())))
                    .add_source(optional_file(&dir.join("local.toml")));
            }
        }

        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix("RELAY")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}

fn required_file(path: &Path) -> Result<File<config::FileSourceFile, FileFormat>, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::unreadable(path, "no such file"));
    }
    Ok(File::from(path).format(FileFormat::Toml).required(true))
}

fn optional_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml).required(false)
}
