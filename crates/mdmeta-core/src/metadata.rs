//! Reading and writing the `<!-- METADATA ... -->` block at the end of a document.

use crate::errors::Result;
use crate::version::{analyze_document_changes, increment_version};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Ordered key/value metadata. Insertion order is kept so defaults render first.
pub type Metadata = serde_json::Map<String, Value>;

pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";
pub const AUTHOR: &str = "author";
pub const VERSION: &str = "version";

pub const DEFAULT_VERSION: &str = "1.0.0";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn block_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)<!--\s*METADATA\s*\n([\s\S]*?)\n-->\s*$").expect("static regex")
    })
}

pub fn default_metadata() -> Metadata {
    let mut m = Metadata::new();
    m.insert(CREATED_AT.into(), Value::String(String::new()));
    m.insert(UPDATED_AT.into(), Value::String(String::new()));
    m.insert(AUTHOR.into(), Value::String(String::new()));
    m.insert(VERSION.into(), Value::String(DEFAULT_VERSION.into()));
    m
}

/// Current local time in the block's timestamp format.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Renders a metadata value as plain text (strings unquoted).
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Text of a field, empty when absent.
pub fn field<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a Value> {
    metadata.get(key).filter(|v| !value_text(v).is_empty())
}

/// Overlays `overlay` onto `base`; overlay values win.
pub fn merge(base: &Metadata, overlay: &Metadata) -> Metadata {
    let mut out = base.clone();
    for (k, v) in overlay {
        out.insert(k.clone(), v.clone());
    }
    out
}

/// Parses the inside of a block. JSON objects are merged over the defaults;
/// anything else is read as `key: value` lines.
pub fn parse_metadata(text: &str) -> Metadata {
    let mut metadata = default_metadata();
    if text.trim().is_empty() {
        return metadata;
    }

    if let Ok(Value::Object(parsed)) = serde_json::from_str::<Value>(text) {
        for (k, v) in parsed {
            metadata.insert(k, v);
        }
        return metadata;
    }

    for line in text.split('\n') {
        if let Some((key, value)) = line.split_once(':') {
            metadata.insert(
                key.trim().to_lowercase(),
                Value::String(value.trim().to_string()),
            );
        }
    }
    metadata
}

/// Adds the keys of `fallbacks` that `base` lacks, after the existing ones.
pub fn with_fallbacks(base: &Metadata, fallbacks: &Metadata) -> Metadata {
    let mut out = base.clone();
    for (k, v) in fallbacks {
        if !out.contains_key(k) {
            out.insert(k.clone(), v.clone());
        }
    }
    out
}

/// Splits a document into its body and the parsed block, if one exists.
pub fn extract_metadata(content: &str) -> (String, Option<Metadata>) {
    if content.is_empty() {
        return (String::new(), None);
    }
    let Some(caps) = block_pattern().captures(content) else {
        return (content.to_string(), None);
    };
    let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
        return (content.to_string(), None);
    };

    let metadata = parse_metadata(inner.as_str().trim());
    let mut body = String::with_capacity(content.len());
    body.push_str(&content[..whole.start()]);
    body.push_str(&content[whole.end()..]);
    (body, Some(metadata))
}

/// Stamps timestamps and renders pretty JSON.
pub fn format_metadata(metadata: &mut Metadata, now: &str) -> Result<String> {
    if field(metadata, CREATED_AT).is_none() {
        metadata.insert(CREATED_AT.into(), Value::String(now.to_string()));
    }
    metadata.insert(UPDATED_AT.into(), Value::String(now.to_string()));
    Ok(serde_json::to_string_pretty(metadata)?)
}

pub fn render_block(json: &str) -> String {
    format!("<!-- METADATA\n{json}\n-->")
}

/// Places `block` at the end of `body`, separated by one blank line.
pub fn attach_block(body: &str, block: &str) -> String {
    format!("{}\n\n{}\n", body.trim_end(), block)
}

/// Adds a block to `content` or updates the existing one.
///
/// When `old_body` is given and differs from the current body the version is
/// bumped according to the kind of edit.
pub fn add_or_update_metadata(
    content: &str,
    new_metadata: &Metadata,
    overwrite: bool,
    old_body: Option<&str>,
    now: &str,
) -> Result<String> {
    let (body, current) = extract_metadata(content);

    let mut metadata = match current {
        Some(current) if !overwrite => merge(&current, new_metadata),
        _ => merge(&default_metadata(), new_metadata),
    };

    if let Some(old_body) = old_body {
        if old_body != body {
            let kind = analyze_document_changes(old_body, &body);
            let version = metadata
                .get(VERSION)
                .map(value_text)
                .unwrap_or_else(|| "0.0.0".to_string());
            let bumped = increment_version(&version, kind)?;
            metadata.insert(VERSION.into(), Value::String(bumped));
        }
    }

    let json = format_metadata(&mut metadata, now)?;
    Ok(attach_block(&body, &render_block(&json)))
}

pub fn remove_metadata(content: &str) -> String {
    let (body, _) = extract_metadata(content);
    format!("{}\n", body.trim_end())
}

/// Body without the block, trimmed; used to compare documents.
pub fn content_without_metadata(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    match block_pattern().find(content) {
        Some(m) => format!("{}{}", &content[..m.start()], &content[m.end()..])
            .trim()
            .to_string(),
        None => content.trim().to_string(),
    }
}
