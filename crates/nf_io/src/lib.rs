//! crates/nf_io/src/lib.rs
//! I/O for the grading engine.
//!
//! - CSV loaders for standards rows and participant rosters.
//! - Canonical JSON bytes and atomic artifact writes.
//! - SHA-256 fingerprints (`STD:` standards table, `RES:` result docs).
//! - Grading policy loading from JSON.
//!
//! Loaders are tolerant: a record that cannot be read is skipped, logged and
//! reported back to the caller; only whole-source failures are errors.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for nf_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync).
    #[error("io/path error: {0}")]
    Path(String),

    /// CSV source could not be read at all (bad header, unreadable stream).
    #[error("csv error: {0}")]
    Csv(String),

    /// JSON serialization/deserialization errors with an optional JSON Pointer.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Hashing-related errors.
    #[error("hash error: {0}")]
    Hash(String),

    /// Generic validation / invariants.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        IoError::Csv(e.to_string())
    }
}

/// A record the loader could not use. `line` is 1-based and counts the header.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SkippedRecord {
    pub line: u64,
    pub reason: String,
}

/// Rows plus whatever was skipped on the way in.
#[derive(Clone, Debug, PartialEq)]
pub struct Loaded<T> {
    pub rows: Vec<T>,
    /// Source line of each entry in `rows`.
    pub lines: Vec<u64>,
    pub skipped: Vec<SkippedRecord>,
}

impl<T> Loaded<T> {
    /// Rows built in memory; lines number them as if under a header.
    pub fn from_rows(rows: Vec<T>) -> Self {
        let lines = (2..).take(rows.len()).collect();
        Self { rows, lines, skipped: Vec::new() }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> + '_ {
        self.lines.iter().copied().zip(self.rows.iter())
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod participants;
pub mod policy;
pub mod standards;

pub use hasher::{res_id_from_canonical, sha256_canonical, sha256_file, sha256_hex, std_id_from_rows};
pub use participants::{load_participants, read_participants};
pub use policy::load_policy;
pub use standards::{load_standards, read_standards};
