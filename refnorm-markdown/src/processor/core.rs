//! Core implementation of the normalizer.
//!
//! A body goes through two layers: the structural passes over the parsed
//! tree, then the text passes over the serialized result. Frontmatter never
//! reaches either layer.
use std::path::{Path, PathBuf};

use comrak::{
  Arena,
  format_commonmark,
  nodes::{AstNode, NodeValue},
  options::Options,
  parse_document,
};
use log::{trace, warn};
use walkdir::WalkDir;

use super::{
  transforms::{CodeBlockNormalizer, HeadingStandardizer, ParameterTableTransformer},
  types::{AstTransformer, Normalizer, NormalizerOptions},
};
use crate::{
  collapse::collapse_duplicate_headings,
  naming::NamingTables,
  postprocess,
  types::Document,
  utils::canonicalize_emphasis,
};

impl Normalizer {
  /// Create a new `Normalizer` with the given options.
  #[must_use]
  pub fn new(options: NormalizerOptions) -> Self {
    let text_rules = options.text_pass_rules();
    Self {
      options,
      text_rules,
    }
  }

  /// Access normalizer options.
  #[must_use]
  pub const fn options(&self) -> &NormalizerOptions {
    &self.options
  }

  /// Title and file name tables used by the hook adapter.
  #[must_use]
  pub const fn naming(&self) -> &NamingTables {
    &self.options.naming
  }

  /// Normalize a whole document, keeping its frontmatter byte for byte.
  #[must_use]
  pub fn normalize(&self, content: &str) -> String {
    let document = Document::parse(content);
    let body = self.normalize_body(&document.body);
    document.with_body(body).render()
  }

  /// Normalize a markdown body without frontmatter.
  #[must_use]
  pub fn normalize_body(&self, body: &str) -> String {
    let structured = self.apply_structural_passes(body);
    self.apply_text_passes(&structured)
  }

  /// Run the text layer alone: text rules then duplicate collapsing.
  #[must_use]
  pub fn apply_text_passes(&self, text: &str) -> String {
    let text = postprocess::apply_text_passes(
      text,
      &self.text_rules,
      &self.options.source_label,
    );
    collapse_duplicate_headings(&text, &self.options.collapse_heading)
  }

  /// Parse, run every structural pass in order, and serialize.
  ///
  /// If serialization fails the body is returned unmodified.
  fn apply_structural_passes(&self, body: &str) -> String {
    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, body, &options);
    let parse = |fragment: &str| parse_document(&arena, fragment, &options);

    let rules = &self.options.heading_rules;
    let passes: [&dyn AstTransformer; 3] = [
      &ParameterTableTransformer::new(rules),
      &HeadingStandardizer::new(rules),
      &CodeBlockNormalizer,
    ];
    for pass in passes {
      pass.transform(root, &parse);
    }

    Self::serialize(root, &options).unwrap_or_else(|| body.to_string())
  }

  fn serialize<'a>(root: &'a AstNode<'a>, options: &Options) -> Option<String> {
    for node in root.descendants() {
      if let NodeValue::Heading(ref mut heading) = node.data.borrow_mut().value {
        heading.setext = false;
      }
    }

    let mut output = String::new();
    if let Err(e) = format_commonmark(root, options, &mut output) {
      warn!("Failed to serialize markdown, keeping input: {e}");
      return None;
    }
    Some(canonicalize_emphasis(&output))
  }

  /// Build comrak options for the fixed output style.
  fn comrak_options(&self) -> Options<'_> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.render.r#unsafe = true;
    options.render.prefer_fenced = true;
    options
  }
}

/// Collect every file with `extension` below `root`.
///
/// A file path is returned as is, whatever its extension.
#[must_use]
pub fn collect_document_files(root: &Path, extension: &str) -> Vec<PathBuf> {
  if root.is_file() {
    return vec![root.to_path_buf()];
  }

  let mut files = Vec::with_capacity(100);
  for entry in WalkDir::new(root)
    .follow_links(true)
    .sort_by_file_name()
    .into_iter()
    .filter_map(Result::ok)
  {
    let path = entry.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
      files.push(path.to_owned());
    }
  }

  trace!("Found {} document files under {}", files.len(), root.display());
  files
}

#[cfg(test)]
mod tests {
  use super::*;

  fn normalizer() -> Normalizer {
    Normalizer::new(NormalizerOptions::default())
  }

  #[test]
  fn test_parameter_table_becomes_list() {
    let input = "### Parameters\n\n| Name | Type | Description |\n| --- | --- | \
                 --- |\n| x | string | the x |\n| y | number | the y |\n";
    let out = normalizer().normalize(input);
    assert_eq!(
      out,
      "#### Arguments\n\n- `x` _string_ - the x\n- `y` _number_ - the y\n"
    );
  }

  #[test]
  fn test_short_rows_are_dropped() {
    let input = "## Parameters\n\n| Name | Type | Description |\n| --- | --- | \
                 --- |\n| x | string | the x |\n| y | number | |\n";
    let out = normalizer().normalize(input);
    assert!(out.contains("- `x` _string_ - the x"));
    assert!(!out.contains("`y`"));
  }

  #[test]
  fn test_table_after_another_heading_is_kept() {
    let input = "#### Parameters\n\n#### Other\n\n| a | b | c |\n| - | - | - \
                 |\n| 1 | 2 | 3 |\n";
    let out = normalizer().normalize(input);
    assert!(out.starts_with("#### Arguments\n"));
    assert!(out.contains('|'));
    assert!(!out.contains("- `1`"));
  }

  #[test]
  fn test_code_block_is_normalized() {
    let input = "```py\n    def f(a)->int :\n        return a\n```\n";
    let out = normalizer().normalize(input);
    assert_eq!(out, "```python\ndef f(a) -> int:\n    return a\n```\n");
  }

  #[test]
  fn test_indented_code_becomes_fenced() {
    let out = normalizer().normalize("Text\n\n    let x = 1;\n");
    assert_eq!(out, "Text\n\n```\nlet x = 1;\n```\n");
  }

  #[test]
  fn test_setext_heading_becomes_atx() {
    let out = normalizer().normalize("Returns\n-------\n\nvoid\n");
    assert_eq!(out, "#### Returns\n\nvoid\n");
  }

  #[test]
  fn test_normalize_is_idempotent() {
    let input = [
      "---\ntitle: Sandbox\n---\n",
      "## Sandbox\n\n### create()\n\n```ts\ncreate(id)\n```\n",
      "##### Parameters\n",
      "| Name | Type | Description |\n| --- | --- | --- |\n",
      "| id | [`Id`](id.md) | *the* id |\n\n",
      "### Returns\n\n`Promise`\\<`Sandbox`\\>\n\n",
      "#### Throws\n\nA\n\n#### Throws\n\nB\n\n",
      "Defined in: [sandbox.ts:3](https://example.com/sandbox.ts#L3)\n",
    ]
    .concat();
    let n = normalizer();
    let once = n.normalize(&input);
    assert!(once.starts_with("---\ntitle: Sandbox\n---\n\n## Sandbox\n"));
    assert!(once.contains("```typescript\ncreate(id): void\n```"));
    assert!(once.contains("- `id` _Id_ - the id"));
    assert!(once.contains("#### Returns"));
    assert!(once.contains("`Promise<Sandbox>`"));
    assert!(
      once.contains("<a href=\"https://example.com/sandbox.ts#L3\">source</a>")
    );
    assert_eq!(once.matches("#### Throws").count(), 1);
    assert_eq!(n.normalize(&once), once);
  }

  #[test]
  fn test_collect_document_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("classes");
    std::fs::create_dir_all(&nested).expect("mkdir");
    std::fs::write(dir.path().join("a.mdx"), "# a\n").expect("write");
    std::fs::write(nested.join("b.mdx"), "# b\n").expect("write");
    std::fs::write(nested.join("c.md"), "# c\n").expect("write");

    let files = collect_document_files(dir.path(), "mdx");
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.extension().is_some_and(|e| e == "mdx")));

    let single = collect_document_files(&nested.join("c.md"), "mdx");
    assert_eq!(single, vec![nested.join("c.md")]);
  }
}
