use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
};

use refnorm_markdown::{NamingTables, NormalizerOptions, naming::DEFAULT_EXTENSION};
use serde::{Deserialize, Serialize};

use crate::{cli::Cli, error::ConfigError};

fn default_roots() -> Vec<PathBuf> {
  vec![
    PathBuf::from("docs/typescript-sdk"),
    PathBuf::from("docs/python-sdk"),
  ]
}

fn default_extension() -> String {
  DEFAULT_EXTENSION.to_string()
}

/// Configuration options for refnorm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  /// Directories normalized when no path is given on the command line
  #[serde(default = "default_roots")]
  pub roots: Vec<PathBuf>,

  /// Extension of the files to normalize and of derived file names
  #[serde(default = "default_extension")]
  pub extension: String,

  /// Number of threads to use for parallel processing
  #[serde(default)]
  pub jobs: Option<usize>,

  /// Title overrides, merged over the built-in ones
  #[serde(default)]
  pub titles: HashMap<String, String>,

  /// File name overrides, merged over the built-in ones
  #[serde(default)]
  pub filenames: HashMap<String, String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      roots:     default_roots(),
      extension: default_extension(),
      jobs:      None,
      titles:    HashMap::new(),
      filenames: HashMap::new(),
    }
  }
}

impl Config {
  /// Create a new configuration from a file
  /// Only TOML and JSON are supported for the time being.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read, has an unknown extension,
  /// or does not parse.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) => {
        match ext.to_lowercase().as_str() {
          "json" => {
            serde_json::from_str(&content).map_err(|source| {
              ConfigError::Serde {
                path: path.to_path_buf(),
                source,
              }
            })
          },
          "toml" => {
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
              path: path.to_path_buf(),
              source,
            })
          },
          _ => {
            Err(ConfigError::Config(format!(
              "Unsupported config file format: {}",
              path.display()
            )))
          },
        }
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load config from file and CLI arguments
  ///
  /// # Errors
  ///
  /// Returns an error if an explicit or discovered config file cannot be
  /// loaded.
  pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
    let mut config = if let Some(config_path) = &cli.config_file {
      Self::from_file(config_path)?
    } else if let Some(discovered) = Self::find_config_file() {
      log::info!("Using discovered config file: {}", discovered.display());
      Self::from_file(&discovered)?
    } else {
      Self::default()
    };

    config.merge_with_cli(cli);
    Ok(config)
  }

  /// Command line values win over file values.
  pub fn merge_with_cli(&mut self, cli: &Cli) {
    if let Some(jobs) = cli.jobs {
      self.jobs = Some(jobs);
    }
    if let Some(ref extension) = cli.extension {
      self.extension.clone_from(extension);
    }
    self.extension = self.extension.trim_start_matches('.').to_string();
  }

  /// Search for config files in the current directory
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let config_filenames = [
      "refnorm.toml",
      "refnorm.json",
      ".refnorm.toml",
      ".refnorm.json",
      ".config/refnorm.toml",
      ".config/refnorm.json",
    ];

    let current_dir = std::env::current_dir().ok()?;
    config_filenames
      .iter()
      .map(|filename| current_dir.join(filename))
      .find(|path| path.exists())
  }

  /// The paths to normalize: the command line path, or every root.
  #[must_use]
  pub fn targets(&self, cli: &Cli) -> Vec<PathBuf> {
    cli
      .path
      .as_ref()
      .map_or_else(|| self.roots.clone(), |path| vec![path.clone()])
  }

  /// Normalizer options with the configured naming overrides applied.
  #[must_use]
  pub fn normalizer_options(&self) -> NormalizerOptions {
    let mut naming = NamingTables::default()
      .with_overrides(self.titles.clone(), self.filenames.clone());
    naming.extension.clone_from(&self.extension);

    NormalizerOptions {
      naming,
      ..NormalizerOptions::default()
    }
  }
}
