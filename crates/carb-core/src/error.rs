//! Error taxonomy: fatal errors abort the run before or
//! during setup; item errors are isolated to a single work item and never
//! propagate past the worker boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the entire run. Never raised once enumeration has
/// started handing out work items.
#[derive(Debug, Error)]
pub enum Fatal {
    /// A required external dependency (the FEC codec, a hash backend) is
    /// missing. Maps to exit code 69.
    #[error("missing dependency: {0}")]
    MissingDependency(String),
    /// The resolved storage root (or its tmp subdirectory) is not
    /// writable by the invoking user.
    #[error("storage root not writable: {0}")]
    UnwritableRoot(PathBuf),
    /// No SHA-256 implementation is available (should be unreachable with
    /// `sha2` vendored, but kept as a named failure mode).
    #[error("no hash algorithm available")]
    NoHashAlgorithm,
    /// The supplied start directory does not resolve to an existing
    /// directory (C1 Path Normalizer contract).
    #[error("invalid start directory: {0}")]
    InvalidStartDir(PathBuf),
}

/// Errors scoped to a single work item. Logged and skipped by the
/// scheduler; never abort the run.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The source file became unreadable mid-stream (C3).
    #[error("read error on {path}: {source}")]
    Read {
        /// Source file path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The enumerator could not stat a candidate path (C2).
    #[error("stat error on {path}: {source}")]
    Stat {
        /// Source file path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// All install fallbacks (hardlink, no-clobber rename, no-clobber
    /// copy) failed (C4).
    #[error("install failed for {path}: {reason}")]
    InstallFailed {
        /// Source file path.
        path: PathBuf,
        /// Human-readable reason, not further structured.
        reason: String,
    },
    /// Parity creation failed for an installed blob (C5). Treated as
    /// absent parity; the run still succeeds.
    #[error("parity creation failed for {blob_id}: {reason}")]
    ParityFailed {
        /// The blob whose parity set could not be created.
        blob_id: String,
        /// Human-readable reason.
        reason: String,
    },
}
