use crate::ignore::IgnoreMatcher;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"))
        .unwrap_or(false)
}

/// Finds Markdown files under `root`, pruning ignored directories. Sorted.
pub fn find_markdown_files(
    root: &Path,
    ignore: &IgnoreMatcher,
    include_root: bool,
) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !e.file_type().is_dir() || !ignore.is_ignored(e.path(), root)
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        if ignore.is_ignored(entry.path(), root) {
            tracing::debug!(path = %entry.path().display(), "ignoring");
            continue;
        }
        if !include_root && entry.depth() == 1 {
            tracing::debug!(path = %entry.path().display(), "skipping root file");
            continue;
        }
        files.push(entry.into_path());
    }
    files.sort();
    files
}
