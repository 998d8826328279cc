//! Core of `mdmeta`: metadata blocks for Markdown documents.
//!
//! A document carries one block at its end:
//!
//! ```text
//! <!-- METADATA
//! {
//!   "created_at": "2026-10-19 10:00:00",
//!   "updated_at": "2026-10-19 10:00:00",
//!   "author": "Jane Doe <jane@example.com>",
//!   "version": "1.0.0"
//! }
//! -->
//! ```
//!
//! [`process::process_file`] keeps it current: it fills in the author,
//! stamps timestamps and bumps `version` when the body changes between runs.

pub mod author;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod fingerprint;
pub mod ignore;
pub mod metadata;
pub mod process;
pub mod report;
pub mod version;

pub use errors::{MetaError, Result};
pub use metadata::Metadata;
