//! Optional project configuration (`.mdmeta.yaml`).

use crate::errors::{MetaError, Result};
use crate::metadata::Metadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".mdmeta.yaml";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MetaConfig {
    /// Extra ignore patterns, added to the defaults and the ignore file.
    pub ignore: Vec<String>,

    /// Ignore file to read instead of `.mdignore`/`.gitignore`.
    pub ignore_file: Option<PathBuf>,

    /// Skip Markdown files directly in the project root.
    pub exclude_root: bool,

    /// Fill `author` automatically when it is not set explicitly.
    pub auto_author: bool,

    /// Ask git before the environment when detecting authors.
    pub prefer_git: bool,

    /// Metadata applied to every processed file before `--set` values.
    pub defaults: BTreeMap<String, serde_yaml::Value>,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            ignore_file: None,
            exclude_root: false,
            auto_author: true,
            prefer_git: true,
            defaults: BTreeMap::new(),
        }
    }
}

impl MetaConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MetaError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| MetaError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Loads `explicit` if given, else `<root>/.mdmeta.yaml` when present, else defaults.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = root.join(CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using project config");
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }

    /// `defaults` converted to metadata values.
    pub fn default_metadata(&self) -> Result<Metadata> {
        let mut out = Metadata::new();
        for (k, v) in &self.defaults {
            let value = serde_json::to_value(v)?;
            out.insert(k.clone(), value);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let cfg = MetaConfig::discover(dir.path(), None).unwrap();
        assert_eq!(cfg, MetaConfig::default());
        assert!(cfg.auto_author);
        assert!(cfg.prefer_git);
    }

    #[test]
    fn reads_project_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "ignore: [drafts]\nexclude_root: true\nauto_author: false\ndefaults:\n  status: draft\n  tags: [a]\n",
        )
        .unwrap();
        let cfg = MetaConfig::discover(dir.path(), None).unwrap();
        assert_eq!(cfg.ignore, vec!["drafts"]);
        assert!(cfg.exclude_root);
        assert!(!cfg.auto_author);
        assert!(cfg.prefer_git);

        let meta = cfg.default_metadata().unwrap();
        assert_eq!(meta["status"], json!("draft"));
        assert_eq!(meta["tags"], json!(["a"]));
    }

    #[test]
    fn unknown_keys_are_config_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "ignroe: [x]\n").unwrap();
        let err = MetaConfig::discover(dir.path(), Some(&path)).unwrap_err();
        assert!(matches!(err, MetaError::Config { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_explicit_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = MetaConfig::discover(dir.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err, MetaError::Config { .. }));
    }
}
