pub mod json;
pub mod markdown;

use crate::author::UNKNOWN_AUTHOR;
use crate::discovery::find_markdown_files;
use crate::ignore::IgnoreMatcher;
use crate::metadata::{extract_metadata, field, value_text, AUTHOR, UPDATED_AT, VERSION};
use crate::process::read_document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Aggregate metadata state of a project's Markdown files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub total_files: usize,
    pub files_with_metadata: usize,
    pub files_without_metadata: usize,
    pub authors: Vec<String>,
    pub versions: BTreeMap<String, usize>,
    pub last_updated: Option<String>,
    pub files_by_author: BTreeMap<String, Vec<PathBuf>>,
    pub files_without_author: Vec<PathBuf>,
}

impl ProjectStatus {
    /// Share of files carrying a block, in percent.
    pub fn coverage_percent(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        self.files_with_metadata as f64 / self.total_files as f64 * 100.0
    }

    fn add(&mut self, path: PathBuf, content: &str) {
        let (_, metadata) = extract_metadata(content);
        let Some(metadata) = metadata else {
            self.files_without_metadata += 1;
            self.files_without_author.push(path);
            return;
        };
        self.files_with_metadata += 1;

        match field(&metadata, AUTHOR).map(value_text) {
            Some(author) if author != UNKNOWN_AUTHOR => {
                self.files_by_author.entry(author).or_default().push(path);
            }
            _ => self.files_without_author.push(path),
        }

        let version = field(&metadata, VERSION)
            .map(value_text)
            .unwrap_or_else(|| "0.0.0".to_string());
        *self.versions.entry(version).or_default() += 1;

        if let Some(updated) = field(&metadata, UPDATED_AT).map(value_text) {
            if self.last_updated.as_deref().map_or(true, |cur| updated.as_str() > cur) {
                self.last_updated = Some(updated);
            }
        }
    }
}

/// Scans every Markdown file under `root` (root files included).
pub fn project_status(root: &Path, ignore: &IgnoreMatcher) -> ProjectStatus {
    let files = find_markdown_files(root, ignore, true);
    let mut status = ProjectStatus {
        total_files: files.len(),
        ..ProjectStatus::default()
    };

    for path in files {
        match read_document(&path) {
            Ok(content) => status.add(path, &content),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "error analyzing file"),
        }
    }

    status.authors = status.files_by_author.keys().cloned().collect();
    status.files_without_author.sort();
    status
}
