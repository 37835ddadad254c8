use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dtsbuild_lib::{BuildRequest, build};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::output::ConsoleReporter;

mod output;

/// dtsbuild - Generate type definition files for a library package with tsc
#[derive(Parser)]
#[command(name = "dtsbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Project root containing the package to build
  #[arg(long, default_value = ".")]
  root: PathBuf,

  /// Output directory for the generated declaration files, relative to the
  /// project root unless absolute
  #[arg(long, default_value = "lib/typescript")]
  out: PathBuf,

  /// Path to the config file, relative to the project root
  #[arg(long)]
  project: Option<String>,

  /// Explicit path to the tsc binary, relative to the project root
  #[arg(long)]
  tsc: Option<PathBuf>,
}

fn main() -> Result<()> {
  // Initialize logging
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();

  let root = dunce::canonicalize(&cli.root)
    .with_context(|| format!("Failed to resolve project root {}", cli.root.display()))?;
  let output = if cli.out.is_absolute() { cli.out.clone() } else { root.join(&cli.out) };

  let mut request = BuildRequest::new(root, output);
  request.project = cli.project;
  request.tsc = cli.tsc;

  debug!(root = %request.root.display(), output = %request.output.display(), "starting declaration build");

  let reporter = ConsoleReporter::new();

  if build(&request, &reporter).is_err() {
    // The detailed cause was already reported through the sink.
    std::process::exit(1);
  }

  Ok(())
}
