//! Title and output file name derivation for declaration pages.
//!
//! Both derivations consult an override table first and fall back to a
//! purely mechanical rule, so they are pure functions of the name and the
//! tables handed to [`NamingTables`] at construction.
use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::compile_or_never;

/// Extension every derived file name ends with.
pub const DEFAULT_EXTENSION: &str = "mdx";

/// Extensions that are replaced when forcing the canonical one.
const KNOWN_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];

static LOWER_UPPER_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never("LOWER_UPPER_RE", r"([a-z])([A-Z])")
});
static ACRONYM_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never("ACRONYM_WORD_RE", r"([A-Z])([A-Z][a-z])")
});
static DIGIT_LETTER_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never("DIGIT_LETTER_RE", r"([0-9])([A-Za-z])")
});

/// Override tables and the canonical extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingTables {
  /// Declaration name to display title.
  pub titles:    HashMap<String, String>,
  /// Declaration name to output file name.
  pub filenames: HashMap<String, String>,
  /// Canonical extension, without the leading dot.
  pub extension: String,
}

impl Default for NamingTables {
  fn default() -> Self {
    let titles = [("LspServer", "LSP Server"), ("Workspace", "Sandbox")];
    let filenames =
      [("LspServer", "lsp-server.mdx"), ("Workspace", "sandbox.mdx")];

    Self {
      titles:    titles
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
      filenames: filenames
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
      extension: DEFAULT_EXTENSION.to_string(),
    }
  }
}

impl NamingTables {
  /// Create tables from explicit overrides.
  #[must_use]
  pub fn new(
    titles: HashMap<String, String>,
    filenames: HashMap<String, String>,
    extension: &str,
  ) -> Self {
    Self {
      titles,
      filenames,
      extension: extension.trim_start_matches('.').to_string(),
    }
  }

  /// Merge extra overrides on top of these tables; later entries win.
  #[must_use]
  pub fn with_overrides(
    mut self,
    titles: HashMap<String, String>,
    filenames: HashMap<String, String>,
  ) -> Self {
    self.titles.extend(titles);
    self.filenames.extend(filenames);
    self
  }

  /// Human title for a declaration.
  #[must_use]
  pub fn title_for(&self, name: &str) -> String {
    if let Some(title) = self.titles.get(name) {
      return title.clone();
    }
    spaced_title(name)
  }

  /// Output file name for a declaration.
  #[must_use]
  pub fn filename_for(&self, name: &str) -> String {
    if let Some(filename) = self.filenames.get(name) {
      return filename.clone();
    }

    let hyphenated = LOWER_UPPER_RE.replace_all(name, "$1-$2");
    let hyphenated = ACRONYM_WORD_RE.replace_all(&hyphenated, "$1-$2");
    let hyphenated = DIGIT_LETTER_RE.replace_all(&hyphenated, "$1-$2");
    self.with_extension(&hyphenated.to_lowercase())
  }

  fn with_extension(&self, stem: &str) -> String {
    let stem = stem
      .rsplit_once('.')
      .filter(|(_, ext)| KNOWN_EXTENSIONS.contains(ext))
      .map_or(stem, |(base, _)| base);
    format!("{stem}.{}", self.extension)
  }
}

/// Insert a space before every uppercase letter that does not already follow
/// whitespace, then trim.
fn spaced_title(name: &str) -> String {
  let mut title = String::with_capacity(name.len() + 4);
  let mut previous: Option<char> = None;
  for c in name.chars() {
    if c.is_uppercase() && previous.is_some_and(|p| !p.is_whitespace()) {
      title.push(' ');
    }
    title.push(c);
    previous = Some(c);
  }
  title.trim().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_filename_generic_rule() {
    let tables = NamingTables::default();
    assert_eq!(tables.filename_for("FileSystem"), "file-system.mdx");
    assert_eq!(tables.filename_for("HTTPServer"), "http-server.mdx");
    assert_eq!(tables.filename_for("Base64Encoder"), "base64-encoder.mdx");
    assert_eq!(tables.filename_for("Daytona"), "daytona.mdx");
  }

  #[test]
  fn test_filename_override_wins() {
    let tables = NamingTables::default();
    assert_eq!(tables.filename_for("Workspace"), "sandbox.mdx");
  }

  #[test]
  fn test_filename_is_idempotent() {
    let tables = NamingTables::default();
    for name in ["FileSystem", "HTTPServer", "Process2Runner", "Workspace"] {
      let once = tables.filename_for(name);
      assert_eq!(tables.filename_for(&once), once, "{name}");
    }
    assert_eq!(tables.filename_for("file-system.md"), "file-system.mdx");
  }

  #[test]
  fn test_title_generic_and_override() {
    let tables = NamingTables::default();
    assert_eq!(tables.title_for("FileSystem"), "File System");
    assert_eq!(tables.title_for("LspServer"), "LSP Server");
    assert_eq!(tables.title_for("File System"), "File System");
    assert_eq!(tables.title_for("git"), "git");
  }

  #[test]
  fn test_custom_extension() {
    let tables = NamingTables::new(HashMap::new(), HashMap::new(), ".md");
    assert_eq!(tables.filename_for("FileSystem"), "file-system.md");
  }
}
