//! Error types for metadata processing.

use std::path::PathBuf;

/// Errors surfaced by the core library.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// Reading or writing a file failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid UTF-8.
    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },

    /// Version string cannot be bumped.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Configuration file could not be loaded.
    #[error("configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Target file exists and overwriting was not requested.
    #[error("{} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MetaError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_version(version: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Process exit code when this error ends a command.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::Json(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, MetaError>;
