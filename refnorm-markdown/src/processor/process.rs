//! File-level processing functions.
use std::{fs, path::Path};

use log::{debug, trace};

use super::types::Normalizer;
use crate::error::{NormalizeError, NormalizeResult};

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
  /// The file was already canonical.
  Unchanged,
  /// The file was rewritten, or would be in check mode.
  Changed,
}

/// Normalize the file at `path` in place.
///
/// The file is read fully and written at most once, and only when the
/// normalized content differs. With `write` unset nothing is written and the
/// outcome reports whether a write would have happened.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn normalize_file(
  normalizer: &Normalizer,
  path: &Path,
  write: bool,
) -> NormalizeResult<FileOutcome> {
  let content =
    fs::read_to_string(path).map_err(|source| NormalizeError::Read {
      path: path.to_path_buf(),
      source,
    })?;

  let normalized = normalizer.normalize(&content);
  if normalized == content {
    trace!("{} is already canonical", path.display());
    return Ok(FileOutcome::Unchanged);
  }

  if write {
    fs::write(path, &normalized).map_err(|source| NormalizeError::Write {
      path: path.to_path_buf(),
      source,
    })?;
    debug!("Rewrote {}", path.display());
  }
  Ok(FileOutcome::Changed)
}
