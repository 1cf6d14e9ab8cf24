//! Structural passes over the parsed tree.
//!
//! They run in a fixed order: [`ParameterTableTransformer`] renames the
//! headings it converts, [`HeadingStandardizer`] then fixes depth and text of
//! every known heading, and [`CodeBlockNormalizer`] is independent of both.
use std::sync::LazyLock;

use comrak::nodes::{AstNode, NodeValue};
use log::{debug, trace};
use regex::Regex;

use super::types::{AstTransformer, FragmentParser};
use crate::{
  types::{HeadingRule, find_rule},
  utils::{compile_or_never, extract_inline_text},
};

/// Heading text that introduces a parameter table.
const PARAMETERS_HEADING: &str = "Parameters";

/// Template for one parameter list item; the placeholders are replaced on the
/// parsed nodes so no escaping is needed.
const ITEM_TEMPLATE: &str = "- `n` _t_ - d\n";

/// Collect every heading below `root` in document order.
fn headings<'a>(root: &'a AstNode<'a>) -> Vec<&'a AstNode<'a>> {
  root
    .descendants()
    .filter(|node| matches!(node.data.borrow().value, NodeValue::Heading(_)))
    .collect()
}

/// Replace the inline content of `heading` with a single text run.
fn set_heading_text<'a>(heading: &'a AstNode<'a>, text: &str) {
  let children: Vec<_> = heading.children().collect();
  let Some((first, rest)) = children.split_first() else {
    return;
  };

  for node in rest {
    node.detach();
  }
  let nested: Vec<_> = first.children().collect();
  for node in nested {
    node.detach();
  }
  first.data.borrow_mut().value = NodeValue::Text(text.to_string().into());
}

fn set_heading_level<'a>(heading: &'a AstNode<'a>, level: u8) {
  let mut data = heading.data.borrow_mut();
  if let NodeValue::Heading(ref mut node) = data.value {
    node.level = level;
    node.setext = false;
  }
}

/// Whether the heading consists of exactly one text run equal to `text`.
fn is_plain_heading<'a>(heading: &'a AstNode<'a>, text: &str) -> bool {
  let mut children = heading.children();
  match (children.next(), children.next()) {
    (Some(only), None) => {
      matches!(&only.data.borrow().value, NodeValue::Text(t) if &**t == text)
    },
    _ => false,
  }
}

/// Converts the table following a `Parameters` heading into a bullet list.
pub struct ParameterTableTransformer {
  target_name: String,
}

impl ParameterTableTransformer {
  /// The renamed heading text comes from the rule matching `Parameters`.
  #[must_use]
  pub fn new(rules: &[HeadingRule]) -> Self {
    let target_name = find_rule(rules, PARAMETERS_HEADING)
      .map_or_else(|| "Arguments".to_string(), |rule| rule.target_name.clone());
    Self { target_name }
  }

  /// The first table among the following siblings, unless a heading comes
  /// first.
  fn following_table<'a>(heading: &'a AstNode<'a>) -> Option<&'a AstNode<'a>> {
    let mut sibling = heading.next_sibling();
    while let Some(node) = sibling {
      match node.data.borrow().value {
        NodeValue::Table(..) => return Some(node),
        NodeValue::Heading(..) => return None,
        _ => {},
      }
      sibling = node.next_sibling();
    }
    None
  }

  /// `(name, type, description)` for every body row with three non-empty
  /// leading cells.
  fn parameter_rows<'a>(table: &'a AstNode<'a>) -> Vec<[String; 3]> {
    table
      .children()
      .skip(1)
      .filter_map(|row| {
        let cells: Vec<String> = row
          .children()
          .take(3)
          .map(|cell| extract_inline_text(cell).trim().to_string())
          .collect();
        match <[String; 3]>::try_from(cells) {
          Ok(cells) if cells.iter().all(|cell| !cell.is_empty()) => Some(cells),
          _ => {
            trace!("Skipping short parameter row");
            None
          },
        }
      })
      .collect()
  }

  /// Fill one templated list item with a parameter row.
  ///
  /// The template parses to a code span, a space, an emphasis and a trailing
  /// text run, in that order.
  fn fill_item<'a>(item: &'a AstNode<'a>, row: &[String; 3]) {
    let [name, ty, description] = row;
    let Some(paragraph) = item.first_child() else {
      return;
    };

    for child in paragraph.children() {
      let mut data = child.data.borrow_mut();
      match data.value {
        NodeValue::Code(ref mut code) => code.literal.clone_from(name),
        NodeValue::Emph => {
          if let Some(text) = child.first_child() {
            text.data.borrow_mut().value = NodeValue::Text(ty.clone().into());
          }
        },
        _ => {},
      }
    }

    if let Some(last) = paragraph.last_child() {
      let mut data = last.data.borrow_mut();
      if let NodeValue::Text(ref mut text) = data.value {
        *text = format!(" - {description}").into();
      }
    }
  }

  fn replace_with_list<'a>(
    table: &'a AstNode<'a>,
    rows: &[[String; 3]],
    parse: &FragmentParser<'_, 'a>,
  ) {
    if rows.is_empty() {
      table.detach();
      return;
    }

    let fragment = parse(&ITEM_TEMPLATE.repeat(rows.len()));
    let Some(list) = fragment.first_child() else {
      return;
    };

    for (item, row) in list.children().zip(rows) {
      Self::fill_item(item, row);
    }

    list.detach();
    table.insert_after(list);
    table.detach();
  }
}

impl AstTransformer for ParameterTableTransformer {
  fn transform<'a>(&self, root: &'a AstNode<'a>, parse: &FragmentParser<'_, 'a>) {
    for heading in headings(root) {
      if !extract_inline_text(heading)
        .trim()
        .eq_ignore_ascii_case(PARAMETERS_HEADING)
      {
        continue;
      }

      let Some(table) = Self::following_table(heading) else {
        continue;
      };

      let rows = Self::parameter_rows(table);
      debug!("Converting parameter table with {} rows", rows.len());
      Self::replace_with_list(table, &rows, parse);
      set_heading_text(heading, &self.target_name);
    }
  }
}

/// Moves every heading named in the rule table to its canonical text and
/// depth.
pub struct HeadingStandardizer<'r> {
  rules: &'r [HeadingRule],
}

impl<'r> HeadingStandardizer<'r> {
  #[must_use]
  pub const fn new(rules: &'r [HeadingRule]) -> Self {
    Self { rules }
  }
}

impl AstTransformer for HeadingStandardizer<'_> {
  fn transform<'a>(&self, root: &'a AstNode<'a>, _parse: &FragmentParser<'_, 'a>) {
    for heading in headings(root) {
      let text = extract_inline_text(heading);
      let Some(rule) = find_rule(self.rules, &text) else {
        continue;
      };

      set_heading_level(heading, rule.target_depth);
      if !is_plain_heading(heading, &rule.target_name) {
        set_heading_text(heading, &rule.target_name);
      }
    }
  }
}

static TS_SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never(
    "TS_SIGNATURE_RE",
    r"^(?P<indent>[ \t]*)(?P<async>async[ \t]+)?(?P<name>[A-Za-z_$][A-Za-z0-9_$]*)[ \t]*\((?P<params>[^()]*)\)[ \t]*(?::[ \t]*(?P<ret>\S.*?))?[ \t]*$",
  )
});

static PY_SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never(
    "PY_SIGNATURE_RE",
    r"^(?P<indent>[ \t]*)def[ \t]+(?P<name>[A-Za-z_][A-Za-z0-9_]*)[ \t]*\((?P<params>.*)\)[ \t]*(?:->[ \t]*(?P<ret>.+?))?[ \t]*:[ \t]*$",
  )
});

/// Control-flow keywords that look like calls but are never signatures.
const TS_KEYWORDS: &[&str] =
  &["if", "for", "while", "switch", "catch", "return", "function", "with"];

/// Canonical language tags, dedent, and single-line signature formatting for
/// code blocks.
pub struct CodeBlockNormalizer;

impl CodeBlockNormalizer {
  /// Canonicalize the first word of an info string.
  #[must_use]
  pub fn canonical_info(info: &str) -> String {
    let trimmed = info.trim();
    let (lang, rest) = trimmed
      .split_once(char::is_whitespace)
      .map_or((trimmed, ""), |(lang, rest)| (lang, rest.trim_start()));

    let lang = if lang.eq_ignore_ascii_case("ts")
      || lang.eq_ignore_ascii_case("typescript")
    {
      "typescript"
    } else if lang.eq_ignore_ascii_case("py")
      || lang.eq_ignore_ascii_case("python")
    {
      "python"
    } else {
      lang
    };

    if rest.is_empty() {
      lang.to_string()
    } else {
      format!("{lang} {rest}")
    }
  }

  /// Strip the indentation shared by every non-blank line.
  #[must_use]
  pub fn dedent(code: &str) -> String {
    let leading = |line: &str| {
      line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
    };
    let is_blank = |line: &str| line.trim().is_empty();

    let indent = code
      .lines()
      .filter(|line| !is_blank(line))
      .map(leading)
      .min()
      .unwrap_or(0);

    if indent == 0 && !code.lines().any(|line| is_blank(line) && !line.is_empty())
    {
      return code.to_string();
    }

    let mut out = code
      .lines()
      .map(|line| if is_blank(line) { "" } else { &line[indent..] })
      .collect::<Vec<_>>()
      .join("\n");
    if code.ends_with('\n') {
      out.push('\n');
    }
    out
  }

  fn rewrite_typescript_line(line: &str) -> Option<String> {
    let caps = TS_SIGNATURE_RE.captures(line)?;
    let name = &caps["name"];
    if TS_KEYWORDS.contains(&name) {
      return None;
    }

    let asyncness = if caps.name("async").is_some() {
      "async "
    } else {
      ""
    };
    let ret = caps.name("ret").map_or("void", |m| m.as_str());
    Some(format!(
      "{}{asyncness}{name}({}): {ret}",
      &caps["indent"], &caps["params"]
    ))
  }

  fn rewrite_python_line(line: &str) -> Option<String> {
    let caps = PY_SIGNATURE_RE.captures(line)?;
    let (indent, name, params) = (&caps["indent"], &caps["name"], &caps["params"]);
    Some(caps.name("ret").map_or_else(
      || format!("{indent}def {name}({params}):"),
      |ret| format!("{indent}def {name}({params}) -> {}:", ret.as_str()),
    ))
  }

  /// Rewrite single-line declaration signatures in a block of `lang`.
  #[must_use]
  pub fn format_signatures(code: &str, lang: &str) -> String {
    let rewrite: fn(&str) -> Option<String> = match lang {
      "typescript" => Self::rewrite_typescript_line,
      "python" => Self::rewrite_python_line,
      _ => return code.to_string(),
    };
    if !(code.contains('(') && code.contains(')')) {
      return code.to_string();
    }

    let mut out = code
      .lines()
      .map(|line| rewrite(line).unwrap_or_else(|| line.to_string()))
      .collect::<Vec<_>>()
      .join("\n");
    if code.ends_with('\n') {
      out.push('\n');
    }
    out
  }
}

impl AstTransformer for CodeBlockNormalizer {
  fn transform<'a>(&self, root: &'a AstNode<'a>, _parse: &FragmentParser<'_, 'a>) {
    for node in root.descendants() {
      let mut data = node.data.borrow_mut();
      if let NodeValue::CodeBlock(ref mut block) = data.value {
        let info = Self::canonical_info(&block.info);
        let lang = info.split_whitespace().next().unwrap_or("").to_string();
        let code = Self::dedent(&block.literal);
        block.literal = Self::format_signatures(&code, &lang);
        block.info = info;
        block.fenced = true;
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_canonical_info() {
    assert_eq!(CodeBlockNormalizer::canonical_info("ts"), "typescript");
    assert_eq!(CodeBlockNormalizer::canonical_info("py title=x"), "python title=x");
    assert_eq!(CodeBlockNormalizer::canonical_info("bash"), "bash");
    assert_eq!(CodeBlockNormalizer::canonical_info(""), "");
  }

  #[test]
  fn test_dedent_strips_shared_indent_only() {
    let code = "    def f():\n\n        return 1\n";
    assert_eq!(CodeBlockNormalizer::dedent(code), "def f():\n\n    return 1\n");
  }

  #[test]
  fn test_dedent_blank_lines_become_empty() {
    let code = "  a\n   \n  b";
    assert_eq!(CodeBlockNormalizer::dedent(code), "a\n\nb");
  }

  #[test]
  fn test_dedent_noop_without_shared_indent() {
    let code = "a\n  b\n";
    assert_eq!(CodeBlockNormalizer::dedent(code), code);
  }

  #[test]
  fn test_typescript_signatures() {
    let code = "create(params?: CreateParams): Promise<Sandbox>\nasync   delete(id: string)\nif (x)\nconsole.log(x)\n";
    assert_eq!(
      CodeBlockNormalizer::format_signatures(code, "typescript"),
      "create(params?: CreateParams): Promise<Sandbox>\nasync delete(id: string): void\nif (x)\nconsole.log(x)\n"
    );
  }

  #[test]
  fn test_typescript_bare_call_reads_as_signature() {
    assert_eq!(
      CodeBlockNormalizer::format_signatures("main()\n", "typescript"),
      "main(): void\n"
    );
  }

  #[test]
  fn test_python_signatures() {
    let code = "def  create(self, params=None)->Sandbox :\n    def stop(self):\ndef split(\n    a,\n):\n";
    assert_eq!(
      CodeBlockNormalizer::format_signatures(code, "python"),
      "def create(self, params=None) -> Sandbox:\n    def stop(self):\ndef split(\n    a,\n):\n"
    );
  }

  #[test]
  fn test_signatures_require_parentheses() {
    let code = "sandbox = daytona.create\n";
    assert_eq!(CodeBlockNormalizer::format_signatures(code, "python"), code);
  }

  #[test]
  fn test_other_languages_untouched() {
    let code = "run(x)\n";
    assert_eq!(CodeBlockNormalizer::format_signatures(code, "bash"), code);
  }
}
