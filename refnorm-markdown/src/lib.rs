//! # refnorm-markdown
//!
//! Normalization engine for generated API-reference markdown. Pages produced
//! by different documentation generators are rewritten into one canonical
//! dialect: the same heading names and depths, the same parameter list
//! format and the same code block style.
//!
//! ## Quick Start
//!
//! ```rust
//! use refnorm_markdown::{Normalizer, NormalizerOptions};
//!
//! let normalizer = Normalizer::new(NormalizerOptions::default());
//! let page = "---\ntitle: Git\n---\n\n### Parameters\n\n| Name | Type | \
//!             Description |\n| --- | --- | --- |\n| path | string | Repo \
//!             path |\n";
//!
//! assert_eq!(
//!   normalizer.normalize(page),
//!   "---\ntitle: Git\n---\n\n#### Arguments\n\n- `path` _string_ - Repo path\n"
//! );
//! ```
//!
//! ## Pipeline
//!
//! - **Frontmatter** is sliced off and reattached byte for byte.
//! - **Structural passes** run over the comrak tree: parameter tables become
//!   lists, known headings move to their canonical text and depth, and code
//!   blocks get canonical language tags, dedented bodies and uniform
//!   signatures.
//! - **Text passes** run over the serialized body: `Defined in:` citations
//!   become source markers, links are reduced to their labels, split generic
//!   types are re-joined and headings are re-canonicalized.
//! - **Duplicate collapsing** merges repeated `Throws` sections.
//!
//! Running the pipeline twice yields the same output as running it once.

pub mod collapse;
pub mod error;
pub mod hooks;
pub mod naming;
pub mod postprocess;
pub mod processor;
pub mod types;
pub mod utils;

pub use crate::{
  error::{NormalizeError, NormalizeResult},
  naming::NamingTables,
  processor::{
    FileOutcome,
    Normalizer,
    NormalizerOptions,
    NormalizerOptionsBuilder,
    collect_document_files,
    normalize_file,
  },
  types::{Document, HeadingRule, default_heading_rules},
};
