/// State tracking for code fence detection in serialized markdown.
///
/// Tracks whether a line sits inside a fenced code block, along with the fence
/// character and length needed to recognise the matching closing fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  in_code_block:    bool,
  code_fence_char:  Option<char>,
  code_fence_count: usize,
}

impl FenceTracker {
  /// Create a new fence tracker.
  #[must_use]
  pub const fn new() -> Self {
    Self {
      in_code_block:    false,
      code_fence_char:  None,
      code_fence_count: 0,
    }
  }

  /// Check if currently inside a code block.
  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.in_code_block
  }

  /// Process a line and return the updated state.
  ///
  /// Call this for each line in order. A fence line itself reports as inside
  /// the block on both the opening and the closing side, see
  /// [`FenceTracker::is_code_line`].
  #[must_use]
  pub fn process_line(&self, line: &str) -> Self {
    let trimmed = line.trim_start();

    if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
      let Some(fence_char) = trimmed.chars().next() else {
        return *self;
      };

      let fence_count =
        trimmed.chars().take_while(|&c| c == fence_char).count();

      if !self.in_code_block {
        return Self {
          in_code_block:    true,
          code_fence_char:  Some(fence_char),
          code_fence_count: fence_count,
        };
      }

      // Closing fences carry no info string
      let rest = &trimmed[fence_count * fence_char.len_utf8()..];
      if self.code_fence_char == Some(fence_char)
        && fence_count >= self.code_fence_count
        && rest.trim().is_empty()
      {
        return Self::new();
      }
    }

    *self
  }

  /// Advance over `line` and report whether it belongs to a code block.
  ///
  /// Opening and closing fence lines count as code, so callers rewriting
  /// prose never touch them.
  pub fn is_code_line(&mut self, line: &str) -> bool {
    let was_in_block = self.in_code_block;
    *self = self.process_line(line);
    was_in_block || self.in_code_block
  }
}

/// A piece of a single markdown line, either prose or an inline code span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
  Prose(&'a str),
  Code(&'a str),
}

/// Split one line into prose and inline code spans.
///
/// A code span opens with a run of N backticks and closes with the next run
/// of exactly N backticks on the same line. An unmatched run is prose.
#[must_use]
pub fn split_code_spans(line: &str) -> Vec<Segment<'_>> {
  let bytes = line.as_bytes();
  let mut segments = Vec::new();
  let mut prose_start = 0;
  let mut i = 0;

  while i < bytes.len() {
    if bytes[i] != b'`' || is_escaped(bytes, i) {
      i += 1;
      continue;
    }

    let run = backtick_run(bytes, i);
    let Some(close) = find_closing_run(bytes, i + run, run) else {
      i += run;
      continue;
    };

    if prose_start < i {
      segments.push(Segment::Prose(&line[prose_start..i]));
    }
    let end = close + run;
    segments.push(Segment::Code(&line[i..end]));
    prose_start = end;
    i = end;
  }

  if prose_start < line.len() {
    segments.push(Segment::Prose(&line[prose_start..]));
  }
  segments
}

fn backtick_run(bytes: &[u8], start: usize) -> usize {
  bytes[start..].iter().take_while(|&&b| b == b'`').count()
}

fn find_closing_run(bytes: &[u8], from: usize, len: usize) -> Option<usize> {
  let mut i = from;
  while i < bytes.len() {
    if bytes[i] == b'`' {
      let run = backtick_run(bytes, i);
      if run == len {
        return Some(i);
      }
      i += run;
    } else {
      i += 1;
    }
  }
  None
}

/// Whether the byte at `pos` is preceded by an odd number of backslashes.
#[must_use]
pub fn is_escaped(bytes: &[u8], pos: usize) -> bool {
  bytes[..pos]
    .iter()
    .rev()
    .take_while(|&&b| b == b'\\')
    .count()
    % 2
    == 1
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fence_tracker_basic() {
    let tracker = FenceTracker::new();
    assert!(!tracker.in_code_block());

    let tracker = tracker.process_line("```python");
    assert!(tracker.in_code_block());

    let tracker = tracker.process_line("def f(): pass");
    assert!(tracker.in_code_block());

    let tracker = tracker.process_line("```");
    assert!(!tracker.in_code_block());
  }

  #[test]
  fn test_fence_tracker_info_string_does_not_close() {
    let tracker = FenceTracker::new().process_line("```");
    let tracker = tracker.process_line("```typescript");
    assert!(tracker.in_code_block());
  }

  #[test]
  fn test_fence_tracker_mismatched() {
    let tracker = FenceTracker::new().process_line("```");
    // Tilde doesn't close backtick fence
    let tracker = tracker.process_line("~~~");
    assert!(tracker.in_code_block());
    let tracker = tracker.process_line("```");
    assert!(!tracker.in_code_block());
  }

  #[test]
  fn test_fence_tracker_count() {
    let tracker = FenceTracker::new().process_line("````");
    let tracker = tracker.process_line("```");
    assert!(tracker.in_code_block());
    let tracker = tracker.process_line("````");
    assert!(!tracker.in_code_block());
  }

  #[test]
  fn test_is_code_line_counts_fences() {
    let mut tracker = FenceTracker::new();
    let flags: Vec<bool> = ["text", "```py", "# comment", "```", "text"]
      .iter()
      .map(|line| tracker.is_code_line(line))
      .collect();
    assert_eq!(flags, vec![false, true, true, true, false]);
  }

  #[test]
  fn test_split_code_spans() {
    let segments = split_code_spans("see `a*b` and ``x ` y`` *z*");
    assert_eq!(segments, vec![
      Segment::Prose("see "),
      Segment::Code("`a*b`"),
      Segment::Prose(" and "),
      Segment::Code("``x ` y``"),
      Segment::Prose(" *z*"),
    ]);
  }

  #[test]
  fn test_split_code_spans_unclosed_and_escaped() {
    assert_eq!(split_code_spans("a ` b"), vec![Segment::Prose("a ` b")]);
    assert_eq!(split_code_spans(r"a \`b` c"), vec![Segment::Prose(r"a \`b` c")]);
  }
}
