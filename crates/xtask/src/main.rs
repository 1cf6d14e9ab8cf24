use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;

const BIN_NAME: &str = "refnorm";

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate shell completions and the manpage for the refnorm CLI
  Dist {
    /// Output directory for generated files.
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Which artifacts to generate.
    #[arg(short, long, value_enum, default_value_t = Artifacts::All)]
    artifacts: Artifacts,

    /// Shells to generate completions for. Defaults to all supported shells.
    #[arg(short, long, value_enum, action = clap::ArgAction::Append)]
    shell: Vec<Shell>,
  },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Artifacts {
  All,
  Completions,
  Manpage,
}

fn main() -> Result<()> {
  let Commands::Dist {
    output_dir,
    artifacts,
    shell,
  } = Xtask::parse().command;

  if artifacts != Artifacts::Manpage {
    let shells = if shell.is_empty() {
      vec![Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell]
    } else {
      shell
    };
    generate_completions(&output_dir, &shells)?;
  }
  if artifacts != Artifacts::Completions {
    generate_manpage(&output_dir)?;
  }

  Ok(())
}

/// Write one completion script per shell into `<output_dir>/completions`.
fn generate_completions(output_dir: &Path, shells: &[Shell]) -> Result<()> {
  let completions_dir = output_dir.join("completions");
  fs::create_dir_all(&completions_dir).with_context(|| {
    format!("Failed to create {}", completions_dir.display())
  })?;

  let mut cmd = refnorm::cli::Cli::command();
  for &shell in shells {
    let path = generate_to(shell, &mut cmd, BIN_NAME, &completions_dir)
      .with_context(|| format!("Failed to generate {shell} completions"))?;
    println!("Wrote {}", path.display());
  }
  Ok(())
}

/// Render the manpage to `<output_dir>/man/refnorm.1`.
fn generate_manpage(output_dir: &Path) -> Result<()> {
  let man_dir = output_dir.join("man");
  fs::create_dir_all(&man_dir)
    .with_context(|| format!("Failed to create {}", man_dir.display()))?;

  let file_path = man_dir.join(format!("{BIN_NAME}.1"));
  let mut file = fs::File::create(&file_path).with_context(|| {
    format!("Failed to create manpage file at {}", file_path.display())
  })?;
  Man::new(refnorm::cli::Cli::command())
    .render(&mut file)
    .context("Failed to render manpage")?;

  println!("Wrote {}", file_path.display());
  Ok(())
}
