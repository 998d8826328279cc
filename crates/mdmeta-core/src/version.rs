//! Document version bumping.
//!
//! Versions are three-part numeric releases. A change to the set of top-level
//! headings is a major change, any other heading change is a medium change and
//! a body-only edit is a minor change.

use crate::errors::{MetaError, Result};
use crate::fingerprint::DocumentFingerprint;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BumpKind {
    Major,
    Medium,
    Minor,
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Major => "major",
            Self::Medium => "medium",
            Self::Minor => "minor",
        };
        f.write_str(s)
    }
}

fn heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^(#{1,6})[ \t]+(.+)$").expect("static regex"))
}

fn headings(text: &str) -> Vec<(usize, String)> {
    heading()
        .captures_iter(text)
        .filter_map(|c| Some((c.get(1)?.as_str().len(), c.get(2)?.as_str().trim().to_string())))
        .collect()
}

/// Classifies the edit between two document bodies.
pub fn analyze_document_changes(old: &str, new: &str) -> BumpKind {
    let old = headings(old);
    let new = headings(new);

    let main = |hs: &[(usize, String)]| -> BTreeSet<String> {
        hs.iter()
            .filter(|(level, _)| *level == 1)
            .map(|(_, text)| text.clone())
            .collect()
    };
    if main(&old) != main(&new) {
        return BumpKind::Major;
    }

    let sub = |hs: &[(usize, String)]| -> BTreeSet<(usize, String)> {
        hs.iter().filter(|(level, _)| *level != 1).cloned().collect()
    };
    if sub(&old) != sub(&new) {
        return BumpKind::Medium;
    }

    BumpKind::Minor
}

/// Classifies an edit from the stored fingerprint of the previous body.
pub fn classify_fingerprint_change(
    previous: &DocumentFingerprint,
    current: &DocumentFingerprint,
) -> BumpKind {
    let top_level = |set: BTreeSet<String>| -> BTreeSet<String> {
        set.into_iter().filter(|h| h.starts_with("1:")).collect()
    };
    // Without a stored header list only the headers hash can be compared.
    if previous.headers.is_none() {
        return if previous.headers_hash == current.headers_hash {
            BumpKind::Minor
        } else {
            BumpKind::Medium
        };
    }
    if top_level(previous.header_set()) != top_level(current.header_set()) {
        BumpKind::Major
    } else if previous.headers_hash != current.headers_hash {
        BumpKind::Medium
    } else {
        BumpKind::Minor
    }
}

/// Parses the leading numeric release components of `version`.
///
/// Tolerates a `v` prefix, fewer than three components and a pre-release or
/// build suffix on the last component (`1.2.3-rc1`, `2.0+build`).
pub fn parse_release(version: &str) -> Result<(u64, u64, u64)> {
    let trimmed = version.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    let mut parts = [0u64; 3];
    for (idx, raw) in trimmed.split('.').take(3).enumerate() {
        let digits: String = raw.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            if idx == 0 {
                return Err(MetaError::invalid_version(
                    version,
                    "expected a numeric major component",
                ));
            }
            break;
        }
        parts[idx] = digits
            .parse()
            .map_err(|e| MetaError::invalid_version(version, format!("{e}")))?;
        if digits.len() != raw.len() {
            break;
        }
    }
    Ok((parts[0], parts[1], parts[2]))
}

pub fn increment_version(current: &str, kind: BumpKind) -> Result<String> {
    let current = current.trim();
    if current.is_empty() || current == "0.0.0" {
        return Ok("0.0.1".to_string());
    }
    let (major, minor, patch) = parse_release(current)?;
    let overflow = || MetaError::invalid_version(current, format!("{kind} component overflows"));
    Ok(match kind {
        BumpKind::Major => {
            let major = major.checked_add(1).ok_or_else(overflow)?;
            format!("{major}.0.0")
        }
        BumpKind::Medium => {
            let minor = minor.checked_add(1).ok_or_else(overflow)?;
            format!("{major}.{minor}.0")
        }
        BumpKind::Minor => {
            let patch = patch.checked_add(1).ok_or_else(overflow)?;
            format!("{major}.{minor}.{patch}")
        }
    })
}
