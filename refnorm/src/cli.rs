use std::path::PathBuf;

use clap::Parser;

/// Command line interface for refnorm
#[derive(Parser, Debug, Default)]
#[command(
  author,
  version,
  about = "refnorm: normalize generated API-reference markdown in place"
)]
pub struct Cli {
  /// File or directory to normalize. Directories are searched recursively.
  /// Without a path the configured roots are used.
  pub path: Option<PathBuf>,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,

  /// Path to a configuration file (TOML or JSON)
  #[arg(short = 'c', long = "config-file")]
  pub config_file: Option<PathBuf>,

  /// Number of threads to use for parallel processing.
  #[arg(short = 'p', long = "jobs")]
  pub jobs: Option<usize>,

  /// Extension of the files to normalize, without the leading dot.
  #[arg(short = 'e', long)]
  pub extension: Option<String>,

  /// Report files that would change without writing them. Exits with an
  /// error if any would.
  #[arg(long)]
  pub check: bool,
}

impl Cli {
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
