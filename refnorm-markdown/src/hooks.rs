//! Page lifecycle hooks for generators that render pages themselves.
//!
//! A host fires [`PageHooks::on_page_begin`] once per page, then
//! [`PageHooks::on_member`] for every member section, then
//! [`PageHooks::on_page_end`] with the assembled page and finally
//! [`PageHooks::on_render`] with the whole text. [`NormalizingHooks`] applies
//! the link, source and generic type rules, duplicate collapsing and the
//! naming tables at those points. Normalizing its output gives the same page
//! as normalizing the raw generator output.
//!
//! ```
//! use refnorm_markdown::{
//!   Normalizer, NormalizerOptions,
//!   hooks::{NormalizingHooks, render_page},
//! };
//!
//! let normalizer = Normalizer::new(NormalizerOptions::default());
//! let hooks = NormalizingHooks::new(&normalizer);
//! let page = render_page(&hooks, "FileSystem", None, &["## FileSystem\n"]);
//! assert_eq!(page.title, "File System");
//! assert_eq!(page.filename, "file-system.mdx");
//! ```
use log::trace;
use serde::Deserialize;

use crate::{
  collapse::collapse_duplicate_headings,
  postprocess,
  processor::Normalizer,
  utils::squeeze_blank_lines,
};

/// The page currently being rendered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageContext {
  /// Canonical name of the documented declaration.
  pub name:     String,
  /// Human title, filled in by [`PageHooks::on_page_begin`].
  pub title:    String,
  /// Output file name, filled in by [`PageHooks::on_page_begin`].
  pub filename: String,
  /// Raw page metadata as handed over by the host, if any.
  pub metadata: Option<String>,
}

impl PageContext {
  #[must_use]
  pub fn new(name: &str, metadata: Option<&str>) -> Self {
    Self {
      name: name.to_string(),
      metadata: metadata.map(str::to_string),
      ..Self::default()
    }
  }
}

/// Fields of the page metadata the hooks understand.
#[derive(Debug, Deserialize)]
struct PageMetadata {
  name: Option<String>,
}

/// Hook points a generator fires while rendering a page.
///
/// Every hook defaults to leaving its input alone.
pub trait PageHooks {
  fn on_page_begin(&self, _page: &mut PageContext) {}

  fn on_member(&self, _page: &PageContext, member: String) -> String {
    member
  }

  fn on_page_end(&self, _page: &PageContext, contents: String) -> String {
    contents
  }

  fn on_render(&self, _page: &PageContext, contents: String) -> String {
    contents
  }
}

/// Hooks applying the normalizer's text rules and naming tables.
#[derive(Debug, Clone, Copy)]
pub struct NormalizingHooks<'n> {
  normalizer: &'n Normalizer,
}

impl<'n> NormalizingHooks<'n> {
  #[must_use]
  pub const fn new(normalizer: &'n Normalizer) -> Self {
    Self { normalizer }
  }

  /// The declaration name, preferring the one in valid page metadata.
  fn resolve_name(page: &PageContext) -> String {
    let from_metadata = page.metadata.as_deref().and_then(|raw| {
      serde_json::from_str::<PageMetadata>(raw)
        .inspect_err(|e| trace!("Ignoring malformed page metadata: {e}"))
        .ok()
        .and_then(|meta| meta.name)
    });
    from_metadata.unwrap_or_else(|| page.name.clone())
  }
}

impl PageHooks for NormalizingHooks<'_> {
  fn on_page_begin(&self, page: &mut PageContext) {
    let naming = self.normalizer.naming();
    page.name = Self::resolve_name(page);
    page.title = naming.title_for(&page.name);
    page.filename = naming.filename_for(&page.name);
    trace!("Rendering {} as {}", page.name, page.filename);
  }

  fn on_member(&self, _page: &PageContext, member: String) -> String {
    let options = self.normalizer.options();
    let member =
      postprocess::rewrite_source_references(&member, &options.source_label);
    postprocess::strip_links(&member)
  }

  // Headings are left to the batch pipeline: renaming `Parameters` here
  // would hide its table from the list conversion.
  fn on_page_end(&self, _page: &PageContext, contents: String) -> String {
    postprocess::repair_generic_types(&contents)
  }

  fn on_render(&self, _page: &PageContext, contents: String) -> String {
    let collapsed = collapse_duplicate_headings(
      &contents,
      &self.normalizer.options().collapse_heading,
    );
    squeeze_blank_lines(&collapsed)
  }
}

/// A page as produced by a host driving [`PageHooks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
  pub title:    String,
  pub filename: String,
  pub contents: String,
}

/// Drive the lifecycle for one page the way a host generator does.
///
/// Members are rendered in order and joined with a blank line.
pub fn render_page<H, S>(
  hooks: &H,
  name: &str,
  metadata: Option<&str>,
  members: &[S],
) -> RenderedPage
where
  H: PageHooks + ?Sized,
  S: AsRef<str>,
{
  let mut page = PageContext::new(name, metadata);
  hooks.on_page_begin(&mut page);

  let body = members
    .iter()
    .map(|member| {
      let rendered = hooks.on_member(&page, member.as_ref().to_string());
      rendered.trim_end_matches('\n').to_string()
    })
    .collect::<Vec<_>>()
    .join("\n\n");

  let contents = hooks.on_page_end(&page, body + "\n");
  let contents = hooks.on_render(&page, contents);

  RenderedPage {
    title: page.title,
    filename: page.filename,
    contents,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::processor::NormalizerOptions;

  #[test]
  fn test_metadata_name_wins() {
    let normalizer = Normalizer::new(NormalizerOptions::default());
    let hooks = NormalizingHooks::new(&normalizer);
    let page = render_page(&hooks, "Ignored", Some(r#"{"name":"Workspace"}"#), &[
      "# Sandbox\n",
    ]);
    assert_eq!(page.title, "Sandbox");
    assert_eq!(page.filename, "sandbox.mdx");
  }

  #[test]
  fn test_malformed_metadata_is_ignored() {
    let normalizer = Normalizer::new(NormalizerOptions::default());
    let hooks = NormalizingHooks::new(&normalizer);
    let page =
      render_page(&hooks, "LspServer", Some("{not json"), &["# LSP\n"]);
    assert_eq!(page.title, "LSP Server");
    assert_eq!(page.filename, "lsp-server.mdx");
  }

  #[test]
  fn test_members_are_normalized_and_collapsed() {
    let normalizer = Normalizer::new(NormalizerOptions::default());
    let hooks = NormalizingHooks::new(&normalizer);
    let members = [
      "### run()\n\n#### Throws\n\nA\n",
      "#### Throws\n\nSee [Error](error.md).\n\nDefined in: [a.ts:1](https://x/a.ts)\n",
    ];
    let page = render_page(&hooks, "Process", None, &members);
    assert_eq!(
      page.contents,
      "### run()\n\n#### Throws\n\nA\n\nSee Error.\n\n<a \
       href=\"https://x/a.ts\">source</a>\n"
    );
  }

  #[test]
  fn test_default_hooks_pass_through() {
    struct Plain;
    impl PageHooks for Plain {}

    let page = render_page(&Plain, "Git", None, &["a\n", "b\n"]);
    assert_eq!(page.contents, "a\n\nb\n");
    assert!(page.filename.is_empty());
  }
}
