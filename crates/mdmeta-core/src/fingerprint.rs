use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Metadata key the fingerprint is stored under.
pub const FINGERPRINT_KEY: &str = "_fingerprint";

fn header_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("static regex"))
}

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Collects every Markdown heading as `"{level}:{text}"`.
pub fn extract_headers(content: &str) -> BTreeSet<String> {
    content
        .split('\n')
        .filter_map(|line| {
            let caps = header_line().captures(line.trim())?;
            let level = caps.get(1)?.as_str().len();
            let text = caps.get(2)?.as_str().trim();
            Some(format!("{level}:{text}"))
        })
        .collect()
}

/// Header lists have been stored both as arrays and as JSON-encoded strings.
mod serde_headers {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(d: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<serde_json::Value> = Option::deserialize(d)?;
        match opt {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => serde_json::from_str(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            Some(v @ serde_json::Value::Array(_)) => serde_json::from_value(v)
                .map(Some)
                .map_err(serde::de::Error::custom),
            Some(other) => Err(serde::de::Error::custom(format!(
                "headers must be a list or string, got: {other}"
            ))),
        }
    }
}

/// Snapshot of a document body used to detect and classify edits between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFingerprint {
    pub content_hash: String,
    pub headers_hash: String,
    /// Sorted header list. Blocks written by older tools may lack it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "serde_headers::deserialize"
    )]
    pub headers: Option<Vec<String>>,
}

impl DocumentFingerprint {
    /// Computes the fingerprint of a body (metadata block already removed).
    ///
    /// Trailing whitespace is not significant: the separator written before the
    /// block must not register as an edit on the next run.
    pub fn compute(body: &str) -> Self {
        let body = body.trim_end();
        let headers: Vec<String> = extract_headers(body).into_iter().collect();
        Self {
            content_hash: sha256_hex(body),
            headers_hash: sha256_hex(&headers.join("|")),
            headers: Some(headers),
        }
    }

    /// Whether this fingerprint was taken from `body`.
    ///
    /// Older blocks hashed the body as extracted, separator included, so the
    /// untrimmed form is accepted too.
    pub fn matches_body(&self, body: &str) -> bool {
        self.content_hash == sha256_hex(body.trim_end()) || self.content_hash == sha256_hex(body)
    }

    /// Header set recorded in the fingerprint; empty when none was stored.
    pub fn header_set(&self) -> BTreeSet<String> {
        self.headers
            .as_deref()
            .unwrap_or_default()
            .iter()
            .cloned()
            .collect()
    }

    /// Reads the stored form: a JSON-encoded string or an inline object.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => serde_json::from_str(s).ok(),
            serde_json::Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }

    /// Stored form, a JSON-encoded string.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::Value::String(serde_json::to_string(self).unwrap_or_default())
    }
}
