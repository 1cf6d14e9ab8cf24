//! The normalization pipeline.
//!
//! - [`core`]: the `Normalizer` pipeline and document discovery
//! - [`transforms`]: structural passes over the parsed tree
//! - [`process`]: file-level reading and writing
//! - [`types`]: options, the `Normalizer` type and the `AstTransformer` trait
pub mod core;
pub mod process;
pub mod transforms;
pub mod types;

pub use core::collect_document_files;

pub use process::{FileOutcome, normalize_file};
pub use transforms::{
  CodeBlockNormalizer,
  HeadingStandardizer,
  ParameterTableTransformer,
};
pub use types::{
  AstTransformer,
  FragmentParser,
  Normalizer,
  NormalizerOptions,
  NormalizerOptionsBuilder,
  TEXT_PASS_HEADINGS,
};
