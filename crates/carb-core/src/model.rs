//! The per-file and per-run records: `IngestRecord`, its `outcome`, and
//! the stat/mime annotations collected alongside it.
//!
//! Record files are colon-delimited text, one record per line:
//! `"<BlobId>:<cwd>:<start_dir>:<abs_path>\n"`. Colon is
//! the field separator and absolute paths are assumed to contain no
//! embedded newline; they may contain colons, so the line is split with
//! at most four parts and the final part (the path) absorbs anything left.

use crate::BlobId;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Whether a file's content was newly stored or already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The content was not previously present; a new blob was installed.
    Ingested,
    /// The content's blob already existed; no new blob was created.
    Deduped,
}

/// One observed file, as recorded by the Streaming Ingestor + Blob
/// Installer for a single run.
#[derive(Debug, Clone)]
pub struct IngestRecord {
    /// Content identity of the file.
    pub blob_id: BlobId,
    /// Working directory the run was invoked from.
    pub source_cwd: PathBuf,
    /// Normalized start directory for this run.
    pub source_start_dir: PathBuf,
    /// Absolute path of the source file.
    pub source_abs_path: PathBuf,
    /// Path of the source file relative to `source_start_dir`.
    pub relative_path: String,
    /// File size in bytes (duplicated from `blob_id` for convenience).
    pub size: u64,
    /// Whether this file's content was newly stored or deduped.
    pub outcome: Outcome,
}

/// Errors parsing a record line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseRecordError {
    /// The line did not contain the expected four colon-delimited fields.
    #[error("malformed record line: {0}")]
    Malformed(String),
    /// The leading `BlobId` field failed to parse.
    #[error("malformed blob id in record: {0}")]
    BadBlobId(String),
}

impl IngestRecord {
    /// Render the `"<BlobId>:<cwd>:<start_dir>:<abs_path>"` line used by
    /// `file_processed`/`file_ingested`/`file_skipped` (no trailing
    /// newline; callers append one).
    #[must_use]
    pub fn to_processed_line(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.blob_id,
            self.source_cwd.display(),
            self.source_start_dir.display(),
            self.source_abs_path.display(),
        )
    }

    /// Parse a `"<BlobId>:<cwd>:<start_dir>:<abs_path>"` line back into
    /// its four fields. `relative_path`, `size`, and `outcome` are not
    /// recoverable from this line alone (they are not part of the wire
    /// format) and are left to the caller to fill in from context.
    pub fn parse_processed_fields(
        line: &str,
    ) -> Result<(BlobId, PathBuf, PathBuf, PathBuf), ParseRecordError> {
        let mut parts = line.splitn(4, ':');
        let blob_id_str =
            parts.next().ok_or_else(|| ParseRecordError::Malformed(line.to_string()))?;
        let cwd = parts.next().ok_or_else(|| ParseRecordError::Malformed(line.to_string()))?;
        let start_dir = parts.next().ok_or_else(|| ParseRecordError::Malformed(line.to_string()))?;
        let abs_path = parts.next().ok_or_else(|| ParseRecordError::Malformed(line.to_string()))?;
        let blob_id: BlobId = blob_id_str
            .parse()
            .map_err(|_| ParseRecordError::BadBlobId(blob_id_str.to_string()))?;
        Ok((blob_id, PathBuf::from(cwd), PathBuf::from(start_dir), PathBuf::from(abs_path)))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ingested => write!(f, "ingested"),
            Outcome::Deduped => write!(f, "deduped"),
        }
    }
}

/// Portable stat capture: fields meaningful on every target platform.
#[derive(Debug, Clone, Copy)]
pub struct PortableStat {
    /// File size in bytes.
    pub size: u64,
    /// Modification time, seconds since the UNIX epoch.
    pub mtime_unix_secs: i64,
}

impl PortableStat {
    /// Render as `"<abs_path>:<size>:<mtime_unix_secs>"`.
    #[must_use]
    pub fn to_line(&self, abs_path: &Path) -> String {
        format!("{}:{}:{}", abs_path.display(), self.size, self.mtime_unix_secs)
    }
}

/// Native stat capture: adds unix ownership/permission bits where
/// available. On non-unix targets the three
/// fields are `None` and rendered as `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeStat {
    /// Owning user id, if available.
    pub uid: Option<u32>,
    /// Owning group id, if available.
    pub gid: Option<u32>,
    /// Permission bits, if available.
    pub mode: Option<u32>,
}

impl NativeStat {
    /// Render as `"<abs_path>:<uid>:<gid>:<mode>"`, with `-` for absent fields.
    #[must_use]
    pub fn to_line(&self, abs_path: &Path) -> String {
        fn field(v: Option<u32>) -> String {
            v.map_or_else(|| "-".to_string(), |v| v.to_string())
        }
        format!(
            "{}:{}:{}:{}",
            abs_path.display(),
            field(self.uid),
            field(self.gid),
            field(self.mode)
        )
    }
}

/// One MIME annotation: `"<BlobId>:<mime>"`.
#[must_use]
pub fn mime_line(blob_id: &BlobId, mime: &str) -> String {
    format!("{blob_id}:{mime}")
}
