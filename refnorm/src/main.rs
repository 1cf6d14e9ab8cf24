use color_eyre::eyre::{Context, Result};
use log::{LevelFilter, info};
use refnorm::{
  cli::Cli,
  config::Config,
  error::RefnormError,
  utils::{normalize_files, resolve_files},
};
use refnorm_markdown::Normalizer;

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log while loading the config
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  let config = Config::load(&cli).wrap_err("Failed to load configuration")?;
  run(&config, &cli)
}

/// Resolve the targets and normalize every file found.
fn run(config: &Config, cli: &Cli) -> Result<()> {
  let targets = config.targets(cli);
  let files = resolve_files(&targets, &config.extension)
    .wrap_err("Failed to resolve input paths")?;
  info!("Normalizing {} files", files.len());

  // Setup thread pool once for all parallel operations
  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build_global()?;

  let normalizer = Normalizer::new(config.normalizer_options());
  let report = normalize_files(&normalizer, &files, cli.check);

  info!(
    "Processed {} files: {} {}, {} failed",
    report.processed,
    report.changed,
    if cli.check { "would change" } else { "changed" },
    report.failed
  );

  if cli.check && report.changed > 0 {
    return Err(
      RefnormError::CheckFailed {
        count: report.changed,
      }
      .into(),
    );
  }

  Ok(())
}
