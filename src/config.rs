//! Server configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML
//! file, `SKIRMISH_*` environment variables (a `.env` file is loaded by the
//! binary), then command-line flags.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Listening address, routes and turn clock of the game server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    host: String,

    /// TCP port to bind; 0 picks a free port.
    port: u16,

    /// Route that classifies a connection as a spectator.
    spectator_path: String,

    /// Seconds a side may think before its turn passes; 0 disables the clock.
    turn_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            spectator_path: "/spectator".to_string(),
            turn_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys keep their defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        config.validate()?;
        Ok(config)
    }

    /// Applies `SKIRMISH_HOST`, `SKIRMISH_PORT`, `SKIRMISH_SPECTATOR_PATH`
    /// and `SKIRMISH_TURN_TIMEOUT` through `lookup`.
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup("SKIRMISH_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("SKIRMISH_PORT") {
            self.port = port
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid SKIRMISH_PORT '{}': {}", port, e)))?;
        }
        if let Some(path) = lookup("SKIRMISH_SPECTATOR_PATH") {
            self.spectator_path = path;
        }
        if let Some(secs) = lookup("SKIRMISH_TURN_TIMEOUT") {
            self.turn_timeout_secs = secs.parse().map_err(|e| {
                ConfigError::new(format!("Invalid SKIRMISH_TURN_TIMEOUT '{}': {}", secs, e))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        turn_timeout_secs: Option<u64>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(secs) = turn_timeout_secs {
            self.turn_timeout_secs = secs;
        }
        self
    }

    /// Checks that the spectator route is usable next to the player route.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.spectator_path.starts_with('/') || self.spectator_path == "/" {
            return Err(ConfigError::new(format!(
                "spectator_path must start with '/' and differ from '/', got '{}'",
                self.spectator_path
            )));
        }
        // Route syntax; a literal path must not capture or glob.
        if self.spectator_path.contains([':', '{', '}', '*']) {
            return Err(ConfigError::new(format!(
                "spectator_path must be a literal path without ':', '{{', '}}' or '*', got '{}'",
                self.spectator_path
            )));
        }
        Ok(())
    }

    /// The turn clock, or `None` when disabled.
    pub fn turn_timeout(&self) -> Option<Duration> {
        (self.turn_timeout_secs > 0).then(|| Duration::from_secs(self.turn_timeout_secs))
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.spectator_path(), "/spectator");
        assert_eq!(config.turn_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 9001\nturn_timeout_secs = 0").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(*config.port(), 9001);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.turn_timeout(), None);
    }

    #[test]
    fn test_bad_file_reports_location() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"eighty\"").unwrap();

        let err = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(err.message.starts_with("Failed to parse config"));
        assert!(err.file.ends_with("config.rs"));

        let missing = ServerConfig::from_file("/nonexistent/skirmish.toml").unwrap_err();
        assert!(missing.message.starts_with("Failed to read config file"));
    }

    #[test]
    fn test_env_then_flags() {
        let env: HashMap<&str, &str> =
            HashMap::from([("SKIRMISH_PORT", "7000"), ("SKIRMISH_HOST", "0.0.0.0")]);
        let config = ServerConfig::default()
            .with_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap()
            .with_overrides(None, Some(7100), Some(5));

        assert_eq!(config.bind_address(), "0.0.0.0:7100");
        assert_eq!(config.turn_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_invalid_env_and_paths() {
        assert!(
            ServerConfig::default()
                .with_env(|key| (key == "SKIRMISH_PORT").then(|| "x".to_string()))
                .is_err()
        );
        assert!(
            ServerConfig::default()
                .with_env(|key| (key == "SKIRMISH_SPECTATOR_PATH").then(|| "watch".to_string()))
                .is_err()
        );
        for path in ["/:watch", "/{room}", "/watch/*rest", "/{*rest}"] {
            assert!(
                ServerConfig::default()
                    .with_env(|key| (key == "SKIRMISH_SPECTATOR_PATH").then(|| path.to_string()))
                    .is_err(),
                "{path}"
            );
        }
        assert!(
            ServerConfig::default()
                .with_env(|key| (key == "SKIRMISH_SPECTATOR_PATH").then(|| "/watch/live".to_string()))
                .is_ok()
        );
    }
}
