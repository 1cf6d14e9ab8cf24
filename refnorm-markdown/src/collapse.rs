//! Section-aware merging of repeated headings.
//!
//! Templating generators emit one `Throws` block per overload. For each depth
//! `L` the text is cut into sections at headings shallower than `L`; inside a
//! section every `Throws` heading at exactly depth `L` after the first is
//! dropped and its body moves up under the first one.
//!
//! A moved body that opens with a list is kept apart from a list right above
//! it by the same `<!-- end list -->` comment comrak writes, so a later parse
//! still sees two tight lists.
use std::{ops::Range, sync::LazyLock};

use log::debug;
use regex::Regex;

use crate::utils::{
  codeblock::FenceTracker,
  compile_or_never,
  parse_atx_heading,
  squeeze_blank_lines,
};

/// Deepest heading markdown can express.
const MAX_DEPTH: usize = 6;

/// Block separator comrak places between two adjacent lists.
const LIST_SEPARATOR: &str = "<!-- end list -->";

static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never("LIST_ITEM_RE", r"^[ \t]*(?:[-+*]|\d{1,9}[.)])(?:[ \t]|$)")
});

/// Merge every repeated `name` heading within its enclosing section.
///
/// Text without duplicates is returned unchanged.
#[must_use]
pub fn collapse_duplicate_headings(text: &str, name: &str) -> String {
  let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
  let mut changed = false;

  for depth in 2..=MAX_DEPTH {
    if let Some(merged) = collapse_at_depth(&lines, name, depth) {
      lines = merged;
      changed = true;
    }
  }

  if !changed {
    return text.to_string();
  }

  debug!("Collapsed duplicate '{name}' headings");
  squeeze_blank_lines(&lines.join("\n"))
}

/// Heading depth of every line, `None` for non-headings and fenced code.
fn heading_depths(lines: &[String]) -> Vec<Option<usize>> {
  let mut tracker = FenceTracker::new();
  lines
    .iter()
    .map(|line| {
      if tracker.is_code_line(line) {
        return None;
      }
      parse_atx_heading(line).map(|(depth, _)| depth)
    })
    .collect()
}

/// Whether the last non-blank line belongs to a list item.
///
/// comrak indents every continuation line of an item, so an indented line is
/// still inside the list.
fn ends_in_list(lines: &[String]) -> bool {
  lines
    .iter()
    .rev()
    .find(|line| !line.trim().is_empty())
    .is_some_and(|line| {
      LIST_ITEM_RE.is_match(line) || line.starts_with([' ', '\t'])
    })
}

fn starts_with_list(lines: &[String]) -> bool {
  lines
    .iter()
    .find(|line| !line.trim().is_empty())
    .is_some_and(|line| LIST_ITEM_RE.is_match(line))
}

fn collapse_at_depth(
  lines: &[String],
  name: &str,
  depth: usize,
) -> Option<Vec<String>> {
  let depths = heading_depths(lines);
  let is_target = |idx: usize| {
    depths[idx] == Some(depth)
      && parse_atx_heading(&lines[idx]).is_some_and(|(_, text)| text == name)
  };
  let ends_block = |idx: usize| depths[idx].is_some_and(|d| d <= depth);

  let mut out = Vec::with_capacity(lines.len());
  let mut changed = false;
  let mut start = 0;

  while start < lines.len() {
    let end = (start + 1..lines.len())
      .find(|&idx| depths[idx].is_some_and(|d| d < depth))
      .unwrap_or(lines.len());

    let blocks: Vec<Range<usize>> = (start..end)
      .filter(|&idx| is_target(idx))
      .map(|head| {
        let stop = (head + 1..end).find(|&idx| ends_block(idx)).unwrap_or(end);
        head..stop
      })
      .collect();

    match blocks.as_slice() {
      [first, rest @ ..] if !rest.is_empty() => {
        changed = true;
        out.extend_from_slice(&lines[start..first.end]);
        for block in rest {
          let body = &lines[block.start + 1..block.end];
          out.push(String::new());
          if ends_in_list(&out) && starts_with_list(body) {
            out.push(LIST_SEPARATOR.to_string());
            out.push(String::new());
          }
          out.extend_from_slice(body);
          out.push(String::new());
        }
        out.extend(
          (first.end..end)
            .filter(|idx| !rest.iter().any(|block| block.contains(idx)))
            .map(|idx| lines[idx].clone()),
        );
      },
      _ => out.extend_from_slice(&lines[start..end]),
    }

    start = end;
  }

  changed.then_some(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_merges_siblings_under_one_parent() {
    let text = "### run\n\n#### Throws\n\nA\n\n#### Throws\n\nB\n";
    assert_eq!(
      collapse_duplicate_headings(text, "Throws"),
      "### run\n\n#### Throws\n\nA\n\nB\n"
    );
  }

  #[test]
  fn test_keeps_other_subsections_after_merged_block() {
    let text = "### run\n\n#### Throws\n\nA\n\n#### Returns\n\nR\n\n#### \
                Throws\n\nB\n";
    assert_eq!(
      collapse_duplicate_headings(text, "Throws"),
      "### run\n\n#### Throws\n\nA\n\nB\n\n#### Returns\n\nR\n"
    );
  }

  #[test]
  fn test_separate_parents_are_not_merged() {
    let text =
      "### run\n\n#### Throws\n\nA\n\n### stop\n\n#### Throws\n\nB\n";
    assert_eq!(collapse_duplicate_headings(text, "Throws"), text);
  }

  #[test]
  fn test_fenced_headings_are_ignored() {
    let text = "### run\n\n#### Throws\n\nA\n\n```md\n#### Throws\n```\n";
    assert_eq!(collapse_duplicate_headings(text, "Throws"), text);
  }

  #[test]
  fn test_list_bodies_stay_separate_lists() {
    let text = "### run\n\n#### Throws\n\n- a1\n- a2\n\n#### Throws\n\n- b1\n- b2\n";
    let once = collapse_duplicate_headings(text, "Throws");
    assert_eq!(
      once,
      "### run\n\n#### Throws\n\n- a1\n- a2\n\n<!-- end list -->\n\n- b1\n- \
       b2\n"
    );
    assert_eq!(collapse_duplicate_headings(&once, "Throws"), once);
  }

  #[test]
  fn test_paragraph_before_list_needs_no_separator() {
    let text = "### run\n\n#### Throws\n\nA\n\n#### Throws\n\n- b1\n";
    assert_eq!(
      collapse_duplicate_headings(text, "Throws"),
      "### run\n\n#### Throws\n\nA\n\n- b1\n"
    );
  }

  #[test]
  fn test_collapse_is_idempotent() {
    let text = "## a\n\n### Throws\n\nX\n\n### Throws\n\nY\n\n### Throws\n\nZ\n";
    let once = collapse_duplicate_headings(text, "Throws");
    assert_eq!(once, "## a\n\n### Throws\n\nX\n\nY\n\nZ\n");
    assert_eq!(collapse_duplicate_headings(&once, "Throws"), once);
  }
}
