//! Shared argument types used across multiple commands.

use clap::ValueEnum;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

/// Where to look for Markdown files and what to skip.
#[derive(clap::Args, Clone, Debug)]
pub struct ScanArgs {
    /// Project root to scan
    #[arg(long, alias = "bulk", default_value = ".", env = "MDMETA_ROOT")]
    pub root: PathBuf,

    /// Extra ignore patterns (can be used multiple times)
    #[arg(long, short = 'i', value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Ignore file (default: .mdignore, then .gitignore, in the root)
    #[arg(long, value_name = "FILE")]
    pub ignore_file: Option<PathBuf>,

    /// Skip Markdown files directly in the root directory
    #[arg(long)]
    pub exclude_root: bool,

    /// Project config file (default: <root>/.mdmeta.yaml when present)
    #[arg(long, value_name = "FILE", env = "MDMETA_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Default for ScanArgs {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ignore: Vec::new(),
            ignore_file: None,
            exclude_root: false,
            config: None,
        }
    }
}
