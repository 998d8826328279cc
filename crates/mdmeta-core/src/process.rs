//! Applying metadata changes to files on disk.

use crate::author;
use crate::discovery::find_markdown_files;
use crate::errors::{MetaError, Result};
use crate::fingerprint::{DocumentFingerprint, FINGERPRINT_KEY};
use crate::ignore::IgnoreMatcher;
use crate::metadata::{
    attach_block, default_metadata, extract_metadata, field, format_metadata, merge,
    render_block, value_text, with_fallbacks, Metadata, AUTHOR, CREATED_AT, UPDATED_AT,
    VERSION,
};
use crate::version::{classify_fingerprint_change, increment_version};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Explicit values; these win over existing metadata.
    pub set: Metadata,
    /// Fallback values; existing metadata and `set` win over these.
    pub defaults: Metadata,
    pub remove: bool,
    /// Start from the defaults instead of the existing block.
    pub overwrite: bool,
    pub dry_run: bool,
    pub auto_author: bool,
    pub prefer_git: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            set: Metadata::new(),
            defaults: Metadata::new(),
            remove: false,
            overwrite: false,
            dry_run: false,
            auto_author: true,
            prefer_git: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    Updated,
    Removed,
    Unchanged,
    /// Removal requested but the file has no block.
    NoMetadata,
}

impl FileOutcome {
    pub fn is_modified(self) -> bool {
        matches!(self, Self::Updated | Self::Removed)
    }
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: Result<FileOutcome>,
}

#[derive(Debug, Default)]
pub struct BulkSummary {
    pub total: usize,
    pub modified: usize,
    pub failed: usize,
    pub files: Vec<FileReport>,
}

impl BulkSummary {
    pub fn record(&mut self, path: PathBuf, result: Result<FileOutcome>) {
        self.total += 1;
        match &result {
            Ok(outcome) if outcome.is_modified() => self.modified += 1,
            Ok(_) => {}
            Err(_) => self.failed += 1,
        }
        self.files.push(FileReport { path, result });
    }
}

pub fn read_document(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| MetaError::io(path, e))?;
    String::from_utf8(bytes).map_err(|_| MetaError::Encoding {
        path: path.to_path_buf(),
    })
}

/// Replaces `path` atomically via a temp file in the same directory.
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| MetaError::io(dir, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| MetaError::io(tmp.path(), e))?;
    if let Ok(meta) = std::fs::metadata(path) {
        if let Err(e) = std::fs::set_permissions(tmp.path(), meta.permissions()) {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "could not keep file permissions"
            );
        }
    }
    tmp.persist(path).map_err(|e| MetaError::io(path, e.error))?;
    Ok(())
}

/// Adds, updates or removes the block in one file.
pub fn process_file(path: &Path, opts: &ProcessOptions, now: &str) -> Result<FileOutcome> {
    let original = read_document(path)?;
    let (body, current) = extract_metadata(&original);

    if opts.remove {
        if current.is_none() {
            tracing::debug!(path = %path.display(), "no metadata found");
            return Ok(FileOutcome::NoMetadata);
        }
        let stripped = format!("{}\n", body.trim_end());
        if !opts.dry_run {
            write_document(path, &stripped)?;
        }
        return Ok(FileOutcome::Removed);
    }

    let Some(updated) = updated_document(path, &body, current.as_ref(), opts, now)? else {
        return Ok(FileOutcome::Unchanged);
    };
    if updated.trim() == original.trim() {
        tracing::debug!(path = %path.display(), "no changes");
        return Ok(FileOutcome::Unchanged);
    }
    if !opts.dry_run {
        write_document(path, &updated)?;
    }
    Ok(FileOutcome::Updated)
}

/// New document text, or `None` when neither body nor metadata changed.
fn updated_document(
    path: &Path,
    body: &str,
    current: Option<&Metadata>,
    opts: &ProcessOptions,
    now: &str,
) -> Result<Option<String>> {
    let mut explicit = opts.set.clone();
    if opts.auto_author && !explicit.contains_key(AUTHOR) {
        let info = author::author_info(path, opts.prefer_git, false);
        tracing::info!(path = %path.display(), author = %info.author, "auto-detected author");
        explicit.insert(AUTHOR.into(), Value::String(info.author));
    }

    let base = match current {
        Some(current) if !opts.overwrite => with_fallbacks(current, &opts.defaults),
        _ => merge(&default_metadata(), &opts.defaults),
    };
    let mut metadata = merge(&base, &explicit);

    let fingerprint = DocumentFingerprint::compute(body);
    let previous = current
        .and_then(|m| m.get(FINGERPRINT_KEY))
        .and_then(DocumentFingerprint::from_value);

    if field(&metadata, CREATED_AT).is_none() {
        metadata.insert(CREATED_AT.into(), Value::String(now.to_string()));
    }

    if let Some(previous) = &previous {
        if previous.matches_body(body) {
            tracing::debug!(path = %path.display(), "no content changes");
            if current == Some(&metadata) {
                return Ok(None);
            }
        } else if !explicit.contains_key(VERSION) {
            let kind = classify_fingerprint_change(previous, &fingerprint);
            let version = metadata
                .get(VERSION)
                .map(value_text)
                .unwrap_or_else(|| "0.0.0".to_string());
            let bumped = increment_version(&version, kind)?;
            tracing::info!(path = %path.display(), %kind, from = %version, to = %bumped, "version bump");
            metadata.insert(VERSION.into(), Value::String(bumped));
        }
    }

    metadata.insert(FINGERPRINT_KEY.into(), fingerprint.to_value());
    metadata.insert(UPDATED_AT.into(), Value::String(now.to_string()));

    let json = format_metadata(&mut metadata, now)?;
    Ok(Some(attach_block(body, &render_block(&json))))
}

/// Processes every Markdown file under `root`. One failing file never stops the batch.
pub fn process_bulk(
    root: &Path,
    opts: &ProcessOptions,
    ignore: &IgnoreMatcher,
    include_root: bool,
    now: &str,
) -> BulkSummary {
    let files = find_markdown_files(root, ignore, include_root);
    tracing::debug!(count = files.len(), root = %root.display(), "found markdown files");
    process_paths(files, opts, now)
}

/// Processes the given files in order.
pub fn process_paths(
    files: impl IntoIterator<Item = PathBuf>,
    opts: &ProcessOptions,
    now: &str,
) -> BulkSummary {
    let mut summary = BulkSummary::default();
    for path in files {
        let result = process_file(&path, opts, now);
        if let Err(e) = &result {
            tracing::warn!(path = %path.display(), error = %e, "failed to process file");
        }
        summary.record(path, result);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const T1: &str = "2026-10-19 10:00:00";
    const T2: &str = "2026-10-19 11:00:00";

    fn opts(pairs: &[(&str, &str)]) -> ProcessOptions {
        ProcessOptions {
            set: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
            auto_author: false,
            ..ProcessOptions::default()
        }
    }

    fn meta_of(path: &Path) -> Metadata {
        extract_metadata(&fs::read_to_string(path).unwrap())
            .1
            .expect("metadata block")
    }

    fn doc(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, text).unwrap();
        p
    }

    #[test]
    fn first_run_adds_block_with_fingerprint() {
        let dir = TempDir::new().unwrap();
        let p = doc(&dir, "a.md", "# Title\n\nBody.\n");

        let out = process_file(&p, &opts(&[("author", "Ann")]), T1).unwrap();
        assert_eq!(out, FileOutcome::Updated);

        let text = fs::read_to_string(&p).unwrap();
        assert!(text.starts_with("# Title\n\nBody.\n\n<!-- METADATA\n"));
        let m = meta_of(&p);
        assert_eq!(m["author"], json!("Ann"));
        assert_eq!(m["version"], json!("1.0.0"));
        assert_eq!(m["created_at"], json!(T1));
        let fp = DocumentFingerprint::from_value(&m[FINGERPRINT_KEY]).unwrap();
        assert_eq!(fp.headers, Some(vec!["1:Title".to_string()]));
    }

    #[test]
    fn second_run_without_changes_is_noop() {
        let dir = TempDir::new().unwrap();
        let p = doc(&dir, "a.md", "# Title\n\nBody.\n");
        process_file(&p, &opts(&[("author", "Ann")]), T1).unwrap();
        let before = fs::read_to_string(&p).unwrap();

        let out = process_file(&p, &opts(&[]), T2).unwrap();
        assert_eq!(out, FileOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&p).unwrap(), before);
    }

    #[test]
    fn edits_bump_by_kind() {
        let dir = TempDir::new().unwrap();
        let p = doc(&dir, "a.md", "# Title\n\n## Part\n\nBody.\n");
        process_file(&p, &opts(&[]), T1).unwrap();

        let edit = |from: &str, to: &str| {
            let text = fs::read_to_string(&p).unwrap().replacen(from, to, 1);
            fs::write(&p, text).unwrap();
            process_file(&p, &opts(&[]), T2).unwrap()
        };

        assert_eq!(edit("Body.", "Body, edited."), FileOutcome::Updated);
        assert_eq!(meta_of(&p)["version"], json!("1.0.1"));

        edit("## Part", "## Section");
        assert_eq!(meta_of(&p)["version"], json!("1.1.0"));

        edit("# Title", "# Renamed");
        let m = meta_of(&p);
        assert_eq!(m["version"], json!("2.0.0"));
        assert_eq!(m["created_at"], json!(T1));
        assert_eq!(m["updated_at"], json!(T2));
    }

    #[test]
    fn explicit_version_is_not_bumped() {
        let dir = TempDir::new().unwrap();
        let p = doc(&dir, "a.md", "# Title\n");
        process_file(&p, &opts(&[]), T1).unwrap();
        let text = fs::read_to_string(&p).unwrap().replacen("# Title", "# Other", 1);
        fs::write(&p, text).unwrap();

        process_file(&p, &opts(&[("version", "5.0.0")]), T2).unwrap();
        assert_eq!(meta_of(&p)["version"], json!("5.0.0"));
    }

    #[test]
    fn metadata_change_without_body_change_keeps_version() {
        let dir = TempDir::new().unwrap();
        let p = doc(&dir, "a.md", "# Title\n");
        process_file(&p, &opts(&[]), T1).unwrap();

        let out = process_file(&p, &opts(&[("status", "final")]), T2).unwrap();
        assert_eq!(out, FileOutcome::Updated);
        let m = meta_of(&p);
        assert_eq!(m["status"], json!("final"));
        assert_eq!(m["version"], json!("1.0.0"));
    }

    #[test]
    fn dry_run_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let p = doc(&dir, "a.md", "# Title\n");
        let o = ProcessOptions {
            dry_run: true,
            ..opts(&[("author", "Ann")])
        };
        assert_eq!(process_file(&p, &o, T1).unwrap(), FileOutcome::Updated);
        assert_eq!(fs::read_to_string(&p).unwrap(), "# Title\n");
    }

    #[test]
    fn remove_block() {
        let dir = TempDir::new().unwrap();
        let p = doc(&dir, "a.md", "# Title\n\nBody.\n");
        let remove = ProcessOptions {
            remove: true,
            ..opts(&[])
        };
        assert_eq!(process_file(&p, &remove, T1).unwrap(), FileOutcome::NoMetadata);

        process_file(&p, &opts(&[]), T1).unwrap();
        assert_eq!(process_file(&p, &remove, T2).unwrap(), FileOutcome::Removed);
        assert_eq!(fs::read_to_string(&p).unwrap(), "# Title\n\nBody.\n");
    }

    #[test]
    fn overwrite_discards_existing_fields() {
        let dir = TempDir::new().unwrap();
        let p = doc(&dir, "a.md", "# Title\n");
        process_file(&p, &opts(&[("status", "draft")]), T1).unwrap();

        let o = ProcessOptions {
            overwrite: true,
            ..opts(&[("owner", "docs-team")])
        };
        process_file(&p, &o, T2).unwrap();
        let m = meta_of(&p);
        assert!(!m.contains_key("status"));
        assert_eq!(m["owner"], json!("docs-team"));
        assert_eq!(m["created_at"], json!(T2));
    }

    #[test]
    fn legacy_block_is_upgraded() {
        let dir = TempDir::new().unwrap();
        let p = doc(
            &dir,
            "legacy.md",
            "# Title\n\n<!-- METADATA\nauthor: Old Hand\nversion: 0.3.0\n-->\n",
        );
        process_file(&p, &opts(&[]), T1).unwrap();
        let m = meta_of(&p);
        assert_eq!(m["author"], json!("Old Hand"));
        assert_eq!(m["version"], json!("0.3.0"));
        assert!(m.contains_key(FINGERPRINT_KEY));
    }

    #[test]
    fn config_defaults_never_replace_stored_values() {
        let dir = TempDir::new().unwrap();
        let p = doc(&dir, "a.md", "# Title\n\nBody.\n");
        let defaults: Metadata = [("status", "draft"), ("version", "1.0.0")]
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        let with_defaults = |pairs: &[(&str, &str)]| ProcessOptions {
            defaults: defaults.clone(),
            ..opts(pairs)
        };

        process_file(&p, &with_defaults(&[("status", "final")]), T1).unwrap();
        assert_eq!(meta_of(&p)["status"], json!("final"));

        let text = fs::read_to_string(&p).unwrap().replacen("# Title", "# Renamed", 1);
        fs::write(&p, text).unwrap();
        process_file(&p, &with_defaults(&[]), T2).unwrap();
        let m = meta_of(&p);
        assert_eq!(m["status"], json!("final"));
        assert_eq!(m["version"], json!("2.0.0"));
    }

    #[test]
    fn defaults_fill_missing_keys_after_existing_ones() {
        let dir = TempDir::new().unwrap();
        let p = doc(&dir, "a.md", "# Title\n");
        process_file(&p, &opts(&[("status", "draft")]), T1).unwrap();

        let o = ProcessOptions {
            defaults: [("owner".to_string(), json!("docs"))].into_iter().collect(),
            ..opts(&[])
        };
        assert_eq!(process_file(&p, &o, T2).unwrap(), FileOutcome::Updated);
        let m = meta_of(&p);
        assert_eq!(m["owner"], json!("docs"));
        assert_eq!(m.keys().last().map(String::as_str), Some("owner"));
    }

    fn legacy_doc(dir: &TempDir, body: &str) -> PathBuf {
        let fingerprint = json!({
            "content_hash": crate::fingerprint::sha256_hex(body),
            "headers_hash": crate::fingerprint::sha256_hex("1:Title"),
        });
        let block = json!({
            "author": "Ann",
            "version": "1.2.0",
            "created_at": T1,
            "updated_at": T1,
            "_fingerprint": fingerprint.to_string(),
        });
        let text = format!(
            "{body}<!-- METADATA\n{}\n-->\n",
            serde_json::to_string_pretty(&block).unwrap()
        );
        doc(dir, "legacy.md", &text)
    }

    #[test]
    fn untouched_legacy_fingerprint_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let p = legacy_doc(&dir, "# Title\n\nBody.\n\n");
        let before = fs::read_to_string(&p).unwrap();

        assert_eq!(process_file(&p, &opts(&[]), T2).unwrap(), FileOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&p).unwrap(), before);
    }

    #[test]
    fn legacy_fingerprint_body_edit_is_minor() {
        let dir = TempDir::new().unwrap();
        let p = legacy_doc(&dir, "# Title\n\nBody.\n\n");
        let text = fs::read_to_string(&p).unwrap().replacen("Body.", "Body, edited.", 1);
        fs::write(&p, text).unwrap();

        assert_eq!(process_file(&p, &opts(&[]), T2).unwrap(), FileOutcome::Updated);
        let m = meta_of(&p);
        assert_eq!(m["version"], json!("1.2.1"));
        let fp = DocumentFingerprint::from_value(&m[FINGERPRINT_KEY]).unwrap();
        assert_eq!(fp.headers, Some(vec!["1:Title".to_string()]));
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let p = doc(&dir, "a.md", "# Title\n");
        fs::set_permissions(&p, fs::Permissions::from_mode(0o640)).unwrap();

        write_document(&p, "# Title\n\nmore\n").unwrap();
        let mode = fs::metadata(&p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("bin.md");
        fs::write(&p, [0xff, 0xfe, 0x00]).unwrap();
        let err = process_file(&p, &opts(&[]), T1).unwrap_err();
        assert!(matches!(err, MetaError::Encoding { .. }));
    }

    #[test]
    fn bulk_counts_and_continues_past_failures() {
        let dir = TempDir::new().unwrap();
        doc(&dir, "a.md", "# A\n");
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/b.md"), "# B\n").unwrap();
        fs::write(dir.path().join("docs/bad.md"), [0xffu8]).unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/c.md"), "# C\n").unwrap();

        let summary = process_bulk(
            dir.path(),
            &opts(&[("author", "Bot")]),
            &IgnoreMatcher::with_defaults(),
            true,
            T1,
        );
        assert_eq!(summary.total, 3);
        assert_eq!(summary.modified, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("build/c.md")).unwrap(),
            "# C\n"
        );

        let summary = process_bulk(
            dir.path(),
            &opts(&[("author", "Bot")]),
            &IgnoreMatcher::with_defaults(),
            false,
            T2,
        );
        assert_eq!(summary.total, 2);
        assert_eq!(summary.modified, 0);
    }
}
