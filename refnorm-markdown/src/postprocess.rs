//! Text-level passes over already serialized markdown.
//!
//! These repair generator artifacts that only exist as serialized text. Each
//! rule is a global substitution over every line outside fenced code, and a
//! rule that finds nothing leaves the text untouched.
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{
  types::{HeadingRule, find_rule},
  utils::{compile_or_never, map_prose_lines, parse_atx_heading},
};

static DEFINED_IN_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never(
    "DEFINED_IN_RE",
    r#"Defined in: \[(?P<label>[^\]\n]*)\]\((?P<url>[^)\s]*)(?:\s+"[^"\n]*")?\)"#,
  )
});

// Code spans are matched first so links inside them survive.
static INLINE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never(
    "INLINE_LINK_RE",
    r#"(?P<code>`+[^`]*`+)|(?P<bang>!?)\[(?P<label>[^\]\n]*)\]\((?P<url>[^)\s]*)(?:\s+"[^"\n]*")?\)"#,
  )
});

static BROKEN_GENERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never(
    "BROKEN_GENERIC_RE",
    r"`(?P<outer>[^`\n]+)`\\<`?(?P<inner>[^`\\<>\n]+?)`?\\>",
  )
});

/// Collapse `Defined in: [label](url)` citations into a bare source marker.
///
/// A link title, as in `[label](url "title")`, is dropped.
#[must_use]
pub fn rewrite_source_references(text: &str, label: &str) -> String {
  map_prose_lines(text, |line| {
    DEFINED_IN_RE
      .replace_all(line, |caps: &Captures| {
        format!("<a href=\"{}\">{label}</a>", &caps["url"])
      })
      .into_owned()
  })
}

/// Replace every inline `[label](url)` link with its label.
///
/// Images and anything inside an inline code span are left alone.
#[must_use]
pub fn strip_links(text: &str) -> String {
  map_prose_lines(text, |line| {
    INLINE_LINK_RE
      .replace_all(line, |caps: &Captures| {
        if caps.name("code").is_some() || !caps["bang"].is_empty() {
          caps[0].to_string()
        } else {
          caps["label"].to_string()
        }
      })
      .into_owned()
  })
}

/// Re-join a generic type the generator split into a code span followed by
/// escaped angle brackets, e.g. `` `Promise`\<`void`\> ``. Unescaped `<` after
/// a code span is inline HTML and is left alone.
#[must_use]
pub fn repair_generic_types(text: &str) -> String {
  map_prose_lines(text, |line| {
    BROKEN_GENERIC_RE
      .replace_all(line, "`$outer<$inner>`")
      .into_owned()
  })
}

/// Rewrite non-canonical headings at depth 1-4 that one of `rules` names.
#[must_use]
pub fn recanonicalize_headings(text: &str, rules: &[HeadingRule]) -> String {
  map_prose_lines(text, |line| {
    let Some((depth, heading)) = parse_atx_heading(line) else {
      return line.to_string();
    };
    if depth > 4 {
      return line.to_string();
    }

    match find_rule(rules, heading) {
      Some(rule) if !rule.is_canonical(depth, heading) => {
        format!(
          "{} {}",
          "#".repeat(usize::from(rule.target_depth)),
          rule.target_name
        )
      },
      _ => line.to_string(),
    }
  })
}

/// Run every text rule in order.
#[must_use]
pub fn apply_text_passes(
  text: &str,
  rules: &[HeadingRule],
  source_label: &str,
) -> String {
  let text = rewrite_source_references(text, source_label);
  let text = strip_links(&text);
  let text = repair_generic_types(&text);
  recanonicalize_headings(&text, rules)
}
