//! `value_parser` functions for arguments clap cannot check by type alone

use std::net::IpAddr;
use std::path::PathBuf;

use serde_json::Value;

use crate::config::{ConfigError, Environment};

/// Listener port, 0 is refused because the relay must be reachable
pub fn parse_port(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(0) => Err("port 0 is not allowed".to_string()),
        Ok(port) => Ok(port),
        Err(_) => Err(format!("'{}' is not a port between 1 and 65535", value)),
    }
}

/// Bind address: an IP literal or a DNS hostname
pub fn parse_host(value: &str) -> Result<String, String> {
    let host = value.trim();
    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }
    // Dotted digits that failed to parse are a mistyped IPv4 address
    if !host.is_empty() && host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(format!("'{}' is not a valid IPv4 address", value));
    }

    let label_ok = |label: &str| {
        (1..=63).contains(&label.len())
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    };
    if host.len() <= 253 && host.split('.').all(label_ok) {
        Ok(host.to_string())
    } else {
        Err(format!("'{}' is neither an IP address nor a hostname", value))
    }
}

/// `--env`: canonical names and their short aliases, any case
pub fn parse_environment(value: &str) -> Result<Environment, ConfigError> {
    value.parse()
}

/// `--config`: must name an existing, readable file
pub fn parse_config_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.is_file() {
        return Err(format!("'{}' is not a config file", value));
    }
    std::fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("cannot read '{}': {}", value, e))
}

/// `send --payload`: the raw callable argument
pub fn parse_json_argument(value: &str) -> Result<Value, String> {
    serde_json::from_str(value).map_err(|e| format!("argument is not JSON: {}", e))
}
