use std::path::PathBuf;

use crate::config::{ConsoleSettings, FileSettings, LogFormat, LoggerSettings};

mod init_tests {
    use super::*;
    use crate::logger::{LoggerError, init_logger};

    // Rejected settings fail before a global subscriber is installed
    #[test]
    fn test_invalid_settings_are_rejected_up_front() {
        let silent = LoggerSettings {
            console: ConsoleSettings {
                enabled: false,
                colored: false,
            },
            ..LoggerSettings::default()
        };
        assert!(matches!(init_logger(&silent), Err(LoggerError::Config { .. })));

        let garbled = LoggerSettings {
            level: "info,push_relay=loudest".to_string(),
            ..LoggerSettings::default()
        };
        let err = init_logger(&garbled).unwrap_err();
        assert!(err.to_string().contains("logger.level"), "{err}");
    }
}

mod dynamic_level_tests {
    use crate::logger::LogLevelHandle;
    use proptest::prelude::*;
    use std::sync::Arc;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, reload};

    /// Runs `f` with a handle whose subscriber is the thread default
    fn with_test_handle<F, R>(initial_level: &str, f: F) -> R
    where
        F: FnOnce(&LogLevelHandle) -> R,
    {
        let filter = EnvFilter::try_new(initial_level).unwrap_or_else(|_| EnvFilter::new("info"));
        let (filter_layer, reload_handle) = reload::Layer::new(filter);

        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::sink));

        let handle = LogLevelHandle {
            inner: Arc::new(reload_handle),
        };

        tracing::subscriber::with_default(subscriber, || f(&handle))
    }

    #[test]
    fn test_set_level_rejects_garbage() {
        with_test_handle("info", |handle| {
            assert!(handle.set_level("info,push_relay=loudest").is_err());
            assert_eq!(handle.current_level().as_deref(), Some("info"));
        });
    }

    proptest! {
        #[test]
        fn property_valid_level_update(level_idx in 0usize..5usize) {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            let new_level = valid_levels[level_idx];
            let initial_level = if level_idx == 0 { "info" } else { "trace" };

            with_test_handle(initial_level, |handle| {
                let result = handle.set_level(new_level);
                prop_assert!(result.is_ok(), "Setting '{}' should succeed, got: {:?}", new_level, result);

                let current = handle.current_level().unwrap_or_default();
                prop_assert!(
                    current.to_lowercase().contains(new_level),
                    "Current level '{}' should contain '{}'", current, new_level
                );
                Ok(())
            })?;
        }

        #[test]
        fn property_envfilter_directives_accepted(
            base_level_idx in 0usize..5usize,
            module_level_idx in 0usize..5usize
        ) {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            let directive = format!(
                "{},push_relay::services={}",
                valid_levels[base_level_idx], valid_levels[module_level_idx]
            );

            with_test_handle("info", |handle| {
                let result = handle.set_level(&directive);
                prop_assert!(result.is_ok(), "Directive '{}' should be accepted, got: {:?}", directive, result);
                Ok(())
            })?;
        }
    }
}

mod file_output_tests {
    use super::*;
    use crate::logger::build_layers;
    use crate::logger::writer::LogFileWriter;
    use std::io::Write;
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, reload};

    fn file_only(path: PathBuf, format: LogFormat) -> LoggerSettings {
        LoggerSettings {
            console: ConsoleSettings {
                enabled: false,
                colored: false,
            },
            file: FileSettings {
                enabled: true,
                path,
                append: true,
                format,
            },
            ..LoggerSettings::default()
        }
    }

    #[test]
    fn test_writer_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("logs").join("relay.log");
        let file = FileSettings {
            enabled: true,
            path: path.clone(),
            ..FileSettings::default()
        };

        let writer = LogFileWriter::new(&file).unwrap();
        let mut guard = tracing_subscriber::fmt::MakeWriter::make_writer(&writer);
        guard.write_all(b"hello\n").unwrap();
        guard.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_writer_truncates_without_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("relay.log");
        std::fs::write(&path, "old contents\n").unwrap();

        let file = FileSettings {
            enabled: true,
            path: path.clone(),
            append: false,
            format: LogFormat::Full,
        };
        let writer = LogFileWriter::new(&file).unwrap();
        let mut guard = tracing_subscriber::fmt::MakeWriter::make_writer(&writer);
        guard.write_all(b"new\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn test_json_file_layer_writes_structured_events() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("relay.json");
        let settings = file_only(path.clone(), LogFormat::Json);

        let (filter_layer, _handle) = reload::Layer::new(EnvFilter::new("info"));
        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(build_layers(&settings).unwrap());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(token = "abc", "Relaying notification");
            tracing::debug!("filtered out");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);

        let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event["level"], "INFO");
        assert_eq!(event["fields"]["message"], "Relaying notification");
        assert_eq!(event["fields"]["token"], "abc");
    }

    #[test]
    fn test_compact_file_layer_has_no_ansi() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("relay.log");
        let settings = file_only(path.clone(), LogFormat::Compact);

        let (filter_layer, _handle) = reload::Layer::new(EnvFilter::new("info"));
        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(build_layers(&settings).unwrap());

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(status = 503, "Upstream unavailable");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Upstream unavailable"));
        assert!(contents.contains("status=503"));
        assert!(!contents.contains('\u{1b}'));
    }

    #[test]
    fn test_build_layers_counts_enabled_outputs() {
        let dir = tempdir().unwrap();
        let mut settings = file_only(dir.path().join("relay.log"), LogFormat::Full);
        assert_eq!(build_layers(&settings).unwrap().len(), 1);

        settings.console.enabled = true;
        assert_eq!(build_layers(&settings).unwrap().len(), 2);

        settings.file.enabled = false;
        assert_eq!(build_layers(&settings).unwrap().len(), 1);
    }
}
