pub mod codeblock;

use std::sync::LazyLock;

use comrak::nodes::{AstNode, NodeValue};
use regex::Regex;

use self::codeblock::{FenceTracker, Segment, is_escaped, split_code_spans};

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile.
/// It will never match any input, which is safer than using a trivial regex
/// like `^$` which would match empty strings.
///
/// # Panics
///
/// Panics if the fallback regex pattern `r"^\b$"` fails to compile, which
/// should never happen.
#[must_use]
#[allow(clippy::unwrap_used, reason = "Both patterns are known to be valid")]
pub fn never_matching_regex() -> Regex {
  // Use a pattern that will never match anything because it asserts something
  // impossible - this pattern is guaranteed to be valid
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| Regex::new(r"^\b$").unwrap())
}

/// Compile `pattern`, logging and falling back to [`never_matching_regex`]
/// if it is invalid.
#[must_use]
pub fn compile_or_never(name: &str, pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!(
      "Failed to compile {name} regex: {e}\n Falling back to never matching \
       regex."
    );
    never_matching_regex()
  })
}

/// Extract all inline text from a node, recursively.
///
/// Link labels and emphasis contents are included; raw inline HTML and
/// images are not.
#[must_use]
pub fn extract_inline_text<'a>(node: &'a AstNode<'a>) -> String {
  let mut text = String::new();
  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(t) => text.push_str(t),
      NodeValue::Code(t) => text.push_str(&t.literal),
      NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
      NodeValue::Link(..)
      | NodeValue::Emph
      | NodeValue::Strong
      | NodeValue::Strikethrough => text.push_str(&extract_inline_text(child)),
      _ => {},
    }
  }
  text
}

static ATX_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never(
    "ATX_HEADING_RE",
    r"^(#{1,6})(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$",
  )
});

/// Recognise a top-level ATX heading line.
///
/// Returns the heading depth and its trimmed text. Indented lines are not
/// headings at this level and yield `None`.
#[must_use]
pub fn parse_atx_heading(line: &str) -> Option<(usize, &str)> {
  let caps = ATX_HEADING_RE.captures(line)?;
  let depth = caps.get(1)?.as_str().len();
  let text = caps.get(2).map_or("", |m| m.as_str().trim());
  Some((depth, text))
}

/// Apply `transform` to every line that is not part of a fenced code block.
///
/// Line endings are preserved exactly, including a missing final newline.
pub fn map_prose_lines<F>(text: &str, mut transform: F) -> String
where
  F: FnMut(&str) -> String,
{
  let mut tracker = FenceTracker::new();
  let mut out = String::with_capacity(text.len());

  for line in text.split_inclusive('\n') {
    let (content, ending) = line
      .strip_suffix('\n')
      .map_or((line, ""), |content| (content, "\n"));

    if tracker.is_code_line(content) {
      out.push_str(content);
    } else {
      out.push_str(&transform(content));
    }
    out.push_str(ending);
  }

  out
}

/// Collapse runs of blank lines outside fenced code into a single blank line
/// and end the text with exactly one newline.
#[must_use]
pub fn squeeze_blank_lines(text: &str) -> String {
  let mut tracker = FenceTracker::new();
  let mut out: Vec<&str> = Vec::new();
  let mut previous_blank = true;

  for line in text.lines() {
    let in_code = tracker.is_code_line(line);
    let blank = line.trim().is_empty();
    if blank && !in_code && previous_blank {
      continue;
    }
    previous_blank = blank && !in_code;
    out.push(line);
  }

  while out.last().is_some_and(|line| line.trim().is_empty()) {
    out.pop();
  }

  if out.is_empty() {
    return String::new();
  }
  let mut joined = out.join("\n");
  joined.push('\n');
  joined
}

/// Rewrite `*emphasis*` delimiters to `_emphasis_`.
///
/// Only single, unescaped asterisks outside code spans are paired, and a pair
/// is rewritten only when it sits on word boundaries, where both markers
/// parse the same. Strong emphasis (`**`) is left alone.
#[must_use]
pub fn canonicalize_emphasis(text: &str) -> String {
  map_prose_lines(text, |line| {
    let mut bytes = line.as_bytes().to_vec();
    for (open, close) in emphasis_pairs(line) {
      bytes[open] = b'_';
      bytes[close] = b'_';
    }
    // Only ASCII bytes were swapped for ASCII bytes
    String::from_utf8(bytes).unwrap_or_else(|_| line.to_string())
  })
}

fn emphasis_pairs(line: &str) -> Vec<(usize, usize)> {
  let bytes = line.as_bytes();
  let mut offset = 0;
  let mut candidates = Vec::new();

  for segment in split_code_spans(line) {
    match segment {
      Segment::Prose(prose) => {
        for (idx, _) in prose.match_indices('*') {
          let pos = offset + idx;
          let single = (pos == 0 || bytes[pos - 1] != b'*')
            && bytes.get(pos + 1) != Some(&b'*');
          if single && !is_escaped(bytes, pos) {
            candidates.push(pos);
          }
        }
        offset += prose.len();
      },
      Segment::Code(code) => offset += code.len(),
    }
  }

  let space_at = |pos: Option<usize>| {
    pos.and_then(|pos| bytes.get(pos)).is_none_or(u8::is_ascii_whitespace)
  };
  let word_at = |pos: Option<usize>| {
    pos
      .and_then(|pos| bytes.get(pos))
      .is_some_and(u8::is_ascii_alphanumeric)
  };

  let mut pairs = Vec::new();
  let mut open: Option<usize> = None;
  for pos in candidates {
    let can_open = !space_at(Some(pos + 1));
    let can_close = !space_at(pos.checked_sub(1));
    match open {
      Some(start) if can_close => {
        if !word_at(start.checked_sub(1)) && !word_at(Some(pos + 1)) {
          pairs.push((start, pos));
        }
        open = None;
      },
      _ if can_open => open = Some(pos),
      _ => {},
    }
  }
  pairs
}
