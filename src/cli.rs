//! Command line interface converting each argument into a bundle next to its source.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use crate::builder::{BundleBuilder, directory_destination};
use crate::config::BundleConfig;
use crate::error::BundleError;
use crate::fetch::RemoteFetcher;
use crate::models::BundleRequest;
use crate::timestamps::{TimestampSink, TimestampSource, TimestampStrategy};

/// Convert markdown files into textbundles
#[derive(Parser, Debug)]
#[command(name = "textbundler", version, about)]
pub struct Args {
  /// Markdown files to convert
  #[arg(value_name = "FILE", required = true)]
  pub files: Vec<PathBuf>,

  /// Replace links to local files with Bear-compatible tags to ease processing
  #[arg(short, long)]
  pub process_attachments: bool,

  /// Use the dates from git commit history instead of the OS creation / modification dates
  /// (must be in a git repo and have the git CLI)
  #[arg(short, long)]
  pub git_dates: bool,

  /// Text to append to the end of each Markdown file. Use %f to template the original filename
  /// and \n for a newline.
  #[arg(short, long, value_name = "TEXT", default_value = "")]
  pub append: String,

  /// Bundle layout configuration file (defaults to ./textbundler.json when present)
  #[arg(long, value_name = "PATH")]
  pub config: Option<PathBuf>,
}

impl Args {
  /// Append template with `\n` sequences expanded to newlines.
  pub fn append_text(&self) -> String {
    self.append.replace("\\n", "\n")
  }

  /// Load the configuration named on the command line or discover one in the working directory.
  pub fn load_config(&self) -> Result<BundleConfig> {
    match &self.config {
      Some(path) => BundleConfig::from_path(path)
        .map_err(|err| anyhow!("failed to load configuration from {}: {err:#}", path.display())),
      None => {
        let cwd = std::env::current_dir().context("failed to determine working directory")?;
        Ok(BundleConfig::discover(&cwd))
      }
    }
  }
}

/// Convert every file in order, stopping at the first failure.
pub fn run(args: &Args) -> Result<()> {
  let config = args.load_config()?;
  let builder = BundleBuilder::with_defaults(&config)?;
  let timestamps = TimestampStrategy::from_git_flag(args.git_dates).source();
  let append = args.append_text();

  for file in &args.files {
    let bundle = convert_file(
      &builder,
      timestamps.as_ref(),
      file,
      args.process_attachments,
      &append,
    )?;
    log::info!("{} -> {}", file.display(), bundle.display());
  }

  Ok(())
}

/// Read a document, look up its timestamps and bundle it into its own directory.
pub fn convert_file<R, T>(
  builder: &BundleBuilder<'_, R, T>,
  timestamps: &dyn TimestampSource,
  path: &Path,
  process_attachments: bool,
  append: &str,
) -> std::result::Result<PathBuf, BundleError>
where
  R: RemoteFetcher,
  T: TimestampSink,
{
  let contents = fs::read(path).map_err(|source| BundleError::ReadSource {
    path: path.to_path_buf(),
    source,
  })?;
  let source_path = std::path::absolute(path).map_err(|source| BundleError::ResolveSource {
    path: path.to_path_buf(),
    source,
  })?;

  let created = timestamps.creation_time(&source_path)?;
  let modified = timestamps.modification_time(&source_path)?;

  let document_dir = source_path.parent().unwrap_or_else(|| Path::new(""));
  let destination = directory_destination(document_dir);

  builder.build(&BundleRequest {
    contents: &contents,
    source_path: &source_path,
    created,
    modified,
    destination: &destination,
    process_attachments,
    append,
  })
}
