//! Type definitions for the normalizer.
//!
//! Contains the configuration (`NormalizerOptions`), the `Normalizer`
//! itself, and the `AstTransformer` trait implemented by every structural
//! pass.
//!
//! # Examples
//!
//! ```
//! use refnorm_markdown::{NormalizerOptions, Normalizer};
//!
//! let normalizer = Normalizer::new(NormalizerOptions::default());
//! let out = normalizer.normalize("### Parameters\n");
//! assert_eq!(out, "#### Arguments\n");
//! ```

use comrak::nodes::AstNode;

use crate::{
  naming::NamingTables,
  types::{HeadingRule, default_heading_rules},
};

/// Headings the text pass re-canonicalizes.
pub const TEXT_PASS_HEADINGS: &[&str] =
  &["Example", "Examples", "Parameters", "Returns", "Throws"];

/// Options for configuring the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerOptions {
  /// Ordered heading table shared by the structural and the text pass.
  pub heading_rules: Vec<HeadingRule>,

  /// Title and file name override tables.
  pub naming: NamingTables,

  /// Canonical heading whose duplicates are merged per parent section.
  pub collapse_heading: String,

  /// Link text of the marker that replaces `Defined in:` citations.
  pub source_label: String,
}

impl Default for NormalizerOptions {
  fn default() -> Self {
    Self {
      heading_rules:    default_heading_rules(),
      naming:           NamingTables::default(),
      collapse_heading: "Throws".to_string(),
      source_label:     "source".to_string(),
    }
  }
}

impl NormalizerOptions {
  /// The subset of heading rules re-applied by the text pass.
  #[must_use]
  pub fn text_pass_rules(&self) -> Vec<HeadingRule> {
    self
      .heading_rules
      .iter()
      .filter(|rule| {
        TEXT_PASS_HEADINGS
          .iter()
          .any(|name| name.eq_ignore_ascii_case(&rule.match_name))
      })
      .cloned()
      .collect()
  }
}

/// Normalizes generated API-reference markdown into the canonical dialect.
///
/// Holds only immutable configuration, so one instance can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct Normalizer {
  pub(crate) options:    NormalizerOptions,
  pub(crate) text_rules: Vec<HeadingRule>,
}

/// Parses a markdown fragment into the arena of the tree being transformed.
///
/// Structural passes use it to build new nodes without naming the arena.
pub type FragmentParser<'p, 'a> = dyn Fn(&str) -> &'a AstNode<'a> + 'p;

/// Trait for structural passes over the parsed tree.
pub trait AstTransformer {
  fn transform<'a>(&self, root: &'a AstNode<'a>, parse: &FragmentParser<'_, 'a>);
}

/// Builder for constructing `NormalizerOptions` with method chaining.
#[derive(Debug, Clone, Default)]
pub struct NormalizerOptionsBuilder {
  options: NormalizerOptions,
}

impl NormalizerOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the heading table.
  #[must_use]
  pub fn heading_rules(mut self, rules: Vec<HeadingRule>) -> Self {
    self.options.heading_rules = rules;
    self
  }

  /// Replace the naming tables.
  #[must_use]
  pub fn naming(mut self, naming: NamingTables) -> Self {
    self.options.naming = naming;
    self
  }

  /// Set the heading whose duplicates are collapsed.
  #[must_use]
  pub fn collapse_heading<S: Into<String>>(mut self, heading: S) -> Self {
    self.options.collapse_heading = heading.into();
    self
  }

  /// Set the label of the source reference marker.
  #[must_use]
  pub fn source_label<S: Into<String>>(mut self, label: S) -> Self {
    self.options.source_label = label.into();
    self
  }

  /// Build the final `NormalizerOptions`.
  #[must_use]
  pub fn build(self) -> NormalizerOptions {
    self.options
  }
}
