use crate::cli::args::ScanArgs;
use anyhow::Context;
use dialoguer::{theme::ColorfulTheme, Confirm};
use mdmeta_core::config::MetaConfig;
use mdmeta_core::ignore::{load_ignore_patterns, IgnoreMatcher};
use mdmeta_core::Metadata;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

/// Resolved scan settings: CLI flags layered over the project config.
pub struct ScanContext {
    pub root: PathBuf,
    pub config: MetaConfig,
    pub matcher: IgnoreMatcher,
    pub include_root: bool,
}

impl ScanContext {
    pub fn from_args(scan: &ScanArgs) -> anyhow::Result<Self> {
        let config = MetaConfig::discover(&scan.root, scan.config.as_deref())
            .context("failed to load project config")?;

        let ignore_file = scan
            .ignore_file
            .as_deref()
            .or(config.ignore_file.as_deref())
            .map(|p| resolve_in(&scan.root, p));
        let mut patterns = load_ignore_patterns(&scan.root, ignore_file.as_deref());
        patterns.extend(config.ignore.iter().cloned());
        patterns.extend(scan.ignore.iter().cloned());
        tracing::debug!(count = patterns.len(), "ignore patterns");

        Ok(Self {
            root: scan.root.clone(),
            include_root: !(scan.exclude_root || config.exclude_root),
            matcher: IgnoreMatcher::new(&patterns),
            config,
        })
    }

    pub fn markdown_files(&self) -> Vec<PathBuf> {
        mdmeta_core::discovery::find_markdown_files(&self.root, &self.matcher, self.include_root)
    }
}

/// Paths that do not exist as given are looked up under the project root.
fn resolve_in(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

pub fn metadata_from_pairs(pairs: &[(String, String)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect()
}

/// Asks a yes/no question. Piped stdin is read line by line; end of input declines.
pub fn confirm(prompt: &str, default: bool) -> bool {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(default)
            .interact()
            .unwrap_or(false);
    }
    confirm_from(&mut stdin.lock(), &mut std::io::stdout(), prompt, default)
}

fn confirm_from(
    input: &mut impl BufRead,
    out: &mut impl Write,
    prompt: &str,
    default: bool,
) -> bool {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        let _ = write!(out, "{prompt} {hint} ");
        let _ = out.flush();
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                let _ = writeln!(out);
                return false;
            }
            Ok(_) => {}
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "" => return default,
            "y" | "yes" => return true,
            "n" | "no" => return false,
            _ => {}
        }
    }
}
