use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the refnorm crate.
///
/// Per-file failures are not errors of the batch; they are logged and
/// counted in the report instead.
#[derive(Debug, Error)]
pub enum RefnormError {
  #[error("Path does not exist: {}", .0.display())]
  RootNotFound(PathBuf),

  #[error("{count} file(s) are not normalized")]
  CheckFailed { count: usize },
}

/// Error type for loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Failed to read config file {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse JSON config {}: {source}", path.display())]
  Serde {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to parse TOML config {}: {source}", path.display())]
  Toml {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },
}
