//! Error types for file-level normalization.
use std::{io, path::PathBuf};

/// Result type for file-level normalization.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Errors that can occur while normalizing a file on disk.
///
/// The passes themselves never fail; only reading and writing can.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
  #[error("Failed to read {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("Failed to write {}: {source}", path.display())]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
}

impl NormalizeError {
  /// The file the error refers to.
  #[must_use]
  pub fn path(&self) -> &std::path::Path {
    match self {
      Self::Read { path, .. } | Self::Write { path, .. } => path,
    }
  }
}
