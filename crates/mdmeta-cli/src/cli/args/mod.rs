use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod common;
pub use common::*;


#[derive(Parser, Debug)]
#[command(
    name = "mdmeta",
    version,
    about = "Manage metadata blocks in Markdown files: author detection, automatic versioning and project reports",
    after_help = "Examples:
  # Add/update metadata in all markdown files in the current directory
  mdmeta update --set status=draft --set version=1.0.0

  # Remove metadata from a specific file
  mdmeta update --remove notes.md

  # Process everything except docs/
  mdmeta update --ignore 'docs/*' --set owner=docs-team

  # Report on the project's markdown files
  mdmeta report

  # Create a default .mdignore file
  mdmeta init-mdignore"
)]
pub struct Cli {
    /// Verbose output (debug logging, author detection details)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add, update or remove metadata in markdown files
    Update(UpdateArgs),
    /// Summarise metadata across the project's markdown files
    Report(ReportArgs),
    /// Create a default .mdignore file
    InitMdignore(InitMdignoreArgs),
    /// List the markdown files that would be processed
    List(ListArgs),
    /// Show detected author information without modifying files
    Info(InfoArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Markdown files to process (default: all under --root)
    pub files: Vec<PathBuf>,

    /// Set metadata key-value pairs (can be used multiple times)
    #[arg(long, short = 's', value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Remove the metadata block from files
    #[arg(long, short = 'r', conflicts_with_all = ["set", "overwrite"])]
    pub remove: bool,

    /// Replace existing metadata instead of merging into it
    #[arg(long, short = 'o')]
    pub overwrite: bool,

    /// Show what would be done without writing
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Disable automatic author detection
    #[arg(long)]
    pub no_auto_author: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y')]
    pub yes: bool,

    #[command(flatten)]
    pub scan: ScanArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// Write the report to this file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
    pub format: ReportFormat,

    #[command(flatten)]
    pub scan: ScanArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitMdignoreArgs {
    /// Overwrite an existing file
    #[arg(long, short = 'f')]
    pub force: bool,

    #[arg(long, default_value = mdmeta_core::ignore::MDIGNORE_FILE)]
    pub path: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub scan: ScanArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InfoArgs {
    /// Files to inspect (default: all under --root)
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub scan: ScanArgs,
}

/// Parses `KEY=VALUE`, splitting on the first `=` and trimming both sides.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid metadata format: {s}. Use KEY=VALUE format."))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
