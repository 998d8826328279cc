//! Ignore rules for directory scans.
//!
//! Patterns are shell-style globs in the spirit of `.gitignore` lines, but
//! matched the simple way: a pattern ignores a path when it matches the whole
//! relative path, any leading part of it, or any single component. `*` also
//! crosses `/`.

use crate::errors::{MetaError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "node_modules",
    ".git",
    ".vscode",
    ".idea",
    "__pycache__",
    "*.pyc",
    "*.pyo",
    ".DS_Store",
    "Thumbs.db",
    "*.tmp",
    "*.temp",
    ".env",
    ".env.local",
    "dist",
    "build",
    "target",
    "*.log",
];

pub const MDIGNORE_FILE: &str = ".mdignore";
pub const GITIGNORE_FILE: &str = ".gitignore";

const MDIGNORE_EXTRA: &[&str] = &[
    "# Markdown processing ignore file",
    "# Add patterns to ignore when processing markdown files",
    "",
    "# Common build/cache directories",
    "*.cache",
    ".pytest_cache",
    ".mypy_cache",
    "",
    "# Documentation build outputs",
    "docs/_build",
    "site/",
    "",
    "# Add your custom patterns below:",
];

/// Chooses the ignore file for `root`: explicit, then `.mdignore`, then `.gitignore`.
pub fn resolve_ignore_file(root: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    [MDIGNORE_FILE, GITIGNORE_FILE]
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
}

/// Default patterns plus the non-comment lines of the resolved ignore file.
pub fn load_ignore_patterns(root: &Path, ignore_file: Option<&Path>) -> Vec<String> {
    let mut patterns: Vec<String> = DEFAULT_IGNORE_PATTERNS
        .iter()
        .map(|s| s.to_string())
        .collect();

    let Some(file) = resolve_ignore_file(root, ignore_file) else {
        return patterns;
    };
    match std::fs::read_to_string(&file) {
        Ok(text) => {
            let before = patterns.len();
            patterns.extend(
                text.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(str::to_string),
            );
            tracing::debug!(
                file = %file.display(),
                added = patterns.len() - before,
                "loaded ignore file"
            );
        }
        Err(e) => {
            tracing::warn!(file = %file.display(), error = %e, "could not read ignore file");
        }
    }
    patterns
}

/// Compiled ignore patterns.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    set: GlobSet,
    patterns: Vec<String>,
}

impl IgnoreMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();
        for raw in patterns {
            let raw = raw.as_ref();
            let pattern = raw.trim().trim_start_matches('/').trim_end_matches('/');
            if pattern.is_empty() {
                continue;
            }
            if pattern.starts_with('!') {
                tracing::warn!(pattern = raw, "negated ignore patterns are not supported");
                continue;
            }
            match GlobBuilder::new(pattern).literal_separator(false).build() {
                Ok(glob) => {
                    builder.add(glob);
                    kept.push(pattern.to_string());
                }
                Err(e) => {
                    tracing::warn!(pattern = raw, error = %e, "skipping invalid ignore pattern");
                }
            }
        }
        let set = builder.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to compile ignore patterns");
            GlobSet::empty()
        });
        Self {
            set,
            patterns: kept,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_IGNORE_PATTERNS)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `path` (absolute or relative to the working directory) is ignored under `root`.
    pub fn is_ignored(&self, path: &Path, root: &Path) -> bool {
        let rel = path.strip_prefix(root).unwrap_or(path);
        let rel = rel.to_string_lossy().replace('\\', "/");
        let rel = rel.trim_start_matches("./");
        if rel.is_empty() {
            return false;
        }
        if self.set.is_match(rel) {
            return true;
        }

        let parts: Vec<&str> = rel.split('/').filter(|p| !p.is_empty()).collect();
        (0..parts.len()).any(|i| {
            self.set.is_match(parts[..=i].join("/")) || self.set.is_match(parts[i])
        })
    }
}

impl Default for IgnoreMatcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

pub fn default_ignore_file_contents() -> String {
    let mut out = String::new();
    for line in DEFAULT_IGNORE_PATTERNS.iter().chain(MDIGNORE_EXTRA) {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Writes the default ignore file; refuses to replace an existing one unless `force`.
pub fn create_ignore_file(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(MetaError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MetaError::io(parent, e))?;
    }
    std::fs::write(path, default_ignore_file_contents()).map_err(|e| MetaError::io(path, e))?;
    tracing::info!(path = %path.display(), "created ignore file");
    Ok(())
}
