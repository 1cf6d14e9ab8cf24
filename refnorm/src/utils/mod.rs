//! The batch driver: resolve the target paths, then normalize every file on
//! the rayon pool.
use std::path::PathBuf;

use log::{error, info};
use rayon::prelude::*;
use refnorm_markdown::{FileOutcome, Normalizer, collect_document_files, normalize_file};

use crate::error::RefnormError;

/// Totals for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
  /// Files that were read and normalized.
  pub processed: usize,
  /// Files whose content changed, or would in check mode.
  pub changed:   usize,
  /// Files that could not be read or written.
  pub failed:    usize,
}

impl BatchReport {
  /// `None` stands for a file that failed.
  const fn record(mut self, outcome: Option<FileOutcome>) -> Self {
    match outcome {
      Some(FileOutcome::Unchanged) => self.processed += 1,
      Some(FileOutcome::Changed) => {
        self.processed += 1;
        self.changed += 1;
      },
      None => self.failed += 1,
    }
    self
  }

  const fn merge(self, other: Self) -> Self {
    Self {
      processed: self.processed + other.processed,
      changed:   self.changed + other.changed,
      failed:    self.failed + other.failed,
    }
  }
}

/// Expand every target into the files to normalize.
///
/// # Errors
///
/// Returns [`RefnormError::RootNotFound`] for the first target that does not
/// exist. Nothing has been processed at that point.
pub fn resolve_files(
  targets: &[PathBuf],
  extension: &str,
) -> Result<Vec<PathBuf>, RefnormError> {
  if let Some(missing) = targets.iter().find(|target| !target.exists()) {
    return Err(RefnormError::RootNotFound(missing.clone()));
  }

  let mut files = Vec::new();
  for target in targets {
    let found = collect_document_files(target, extension);
    info!("Found {} files under {}", found.len(), target.display());
    files.extend(found);
  }
  files.sort();
  files.dedup();
  Ok(files)
}

/// Normalize `files` in parallel.
///
/// A file that fails is logged and counted; the rest of the batch carries on.
/// With `check` set nothing is written.
#[must_use]
pub fn normalize_files(
  normalizer: &Normalizer,
  files: &[PathBuf],
  check: bool,
) -> BatchReport {
  files
    .par_iter()
    .map(|path| {
      let outcome = normalize_file(normalizer, path, !check)
        .inspect_err(|e| error!("{e}"))
        .ok();
      if check && outcome == Some(FileOutcome::Changed) {
        info!("Would rewrite {}", path.display());
      }
      BatchReport::default().record(outcome)
    })
    .reduce(BatchReport::default, BatchReport::merge)
}

#[cfg(test)]
mod tests {
  use std::fs;

  use refnorm_markdown::NormalizerOptions;

  use super::*;

  #[test]
  fn test_missing_root_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let targets = vec![dir.path().to_path_buf(), dir.path().join("missing")];
    let err = resolve_files(&targets, "mdx").expect_err("missing root");
    assert!(matches!(err, RefnormError::RootNotFound(path) if path.ends_with("missing")));
  }

  #[test]
  fn test_report_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.mdx"), "## Returns\n").expect("write");
    fs::write(dir.path().join("b.mdx"), "#### Returns\n").expect("write");

    let files = resolve_files(&[dir.path().to_path_buf()], "mdx").expect("files");
    let normalizer = Normalizer::new(NormalizerOptions::default());
    let report = normalize_files(&normalizer, &files, false);
    assert_eq!(report, BatchReport {
      processed: 2,
      changed:   1,
      failed:    0,
    });
  }
}
