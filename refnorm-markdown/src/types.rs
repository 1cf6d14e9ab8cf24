//! Types for the refnorm-markdown public API and internal use.
use serde::{Deserialize, Serialize};

/// A documentation page split into its opaque frontmatter and markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
  /// Leading `---` delimited block, including both delimiter lines and the
  /// newline after the closing one. Never parsed.
  pub frontmatter: Option<String>,

  /// Markdown following the frontmatter.
  pub body: String,
}

impl Document {
  /// Slice a leading frontmatter block off `text`.
  ///
  /// The block must open on the very first line and be closed by another
  /// `---` line; otherwise the whole text is the body.
  #[must_use]
  pub fn parse(text: &str) -> Self {
    let mut lines = text.split_inclusive('\n');
    let opens = lines
      .next()
      .is_some_and(|first| first.trim_end() == "---" && first.ends_with('\n'));

    if opens {
      let mut offset = text.find('\n').map_or(text.len(), |i| i + 1);
      for line in lines {
        offset += line.len();
        if line.trim_end() == "---" {
          return Self {
            frontmatter: Some(text[..offset].to_string()),
            body:        text[offset..].to_string(),
          };
        }
      }
    }

    Self {
      frontmatter: None,
      body:        text.to_string(),
    }
  }

  /// Replace the body, keeping the frontmatter.
  #[must_use]
  pub fn with_body(self, body: String) -> Self {
    Self { body, ..self }
  }

  /// Reassemble the page. Frontmatter is emitted byte for byte, separated
  /// from a non-empty body by one blank line.
  #[must_use]
  pub fn render(&self) -> String {
    match &self.frontmatter {
      Some(frontmatter) if self.body.trim().is_empty() => frontmatter.clone(),
      Some(frontmatter) => {
        let mut out = frontmatter.clone();
        if !out.ends_with('\n') {
          out.push('\n');
        }
        out.push('\n');
        out.push_str(self.body.trim_start_matches(['\n', '\r']));
        out
      },
      None => self.body.clone(),
    }
  }
}

/// Canonical name and depth for a family of headings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeadingRule {
  /// Heading text to match, compared case-insensitively.
  pub match_name:   String,
  /// Text the heading is rewritten to.
  pub target_name:  String,
  /// Depth (1-6) the heading is moved to.
  pub target_depth: u8,
}

impl HeadingRule {
  #[must_use]
  pub fn new(match_name: &str, target_name: &str, target_depth: u8) -> Self {
    Self {
      match_name:   match_name.to_string(),
      target_name:  target_name.to_string(),
      target_depth: target_depth.clamp(1, 6),
    }
  }

  /// Whether `text` names this rule's heading.
  #[must_use]
  pub fn matches(&self, text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(&self.match_name)
  }

  /// Whether a heading is already in canonical form for this rule.
  #[must_use]
  pub fn is_canonical(&self, depth: usize, text: &str) -> bool {
    depth == usize::from(self.target_depth) && text == self.target_name
  }
}

/// The standard heading table, in match order.
#[must_use]
pub fn default_heading_rules() -> Vec<HeadingRule> {
  vec![
    HeadingRule::new("Parameters", "Arguments", 4),
    HeadingRule::new("Arguments", "Arguments", 4),
    HeadingRule::new("Attributes", "Attributes", 4),
    HeadingRule::new("Returns", "Returns", 4),
    HeadingRule::new("Example", "Example", 4),
    HeadingRule::new("Examples", "Examples", 3),
    HeadingRule::new("Throws", "Throws", 4),
  ]
}

/// Find the first rule naming `text`.
#[must_use]
pub fn find_rule<'r>(rules: &'r [HeadingRule], text: &str) -> Option<&'r HeadingRule> {
  rules.iter().find(|rule| rule.matches(text))
}
