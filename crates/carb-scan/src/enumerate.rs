//! C2 File Enumerator.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors building the enumerator itself (as opposed to per-file skips,
/// which are logged and never surfaced as an `Err`).
#[derive(Debug, Error)]
pub enum EnumeratorError {
    /// One of the configured exclude globs failed to compile.
    #[error("invalid exclude glob {pattern:?}: {source}")]
    BadGlob {
        /// The offending pattern.
        pattern: String,
        /// Underlying parse failure.
        #[source]
        source: globset::Error,
    },
}

/// Enumeration mode.
#[derive(Debug, Clone, Copy)]
pub enum Cutoff {
    /// No mtime predicate; every regular file qualifies.
    Full,
    /// Only files with `mtime` strictly greater than this qualify.
    Incremental(SystemTime),
}

fn compile_excludes(patterns: &[String]) -> Result<GlobSet, EnumeratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|source| EnumeratorError::BadGlob { pattern: pattern.clone(), source })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| EnumeratorError::BadGlob {
        pattern: patterns.join(","),
        source,
    })
}

/// Whether `path` (or any ancestor up to `start_dir`) matches one of the
/// self-managed internal directories, so the enumerator can prune its own
/// storage roots when they live under the start directory.
fn is_internal(path: &Path, internal_dirs: &[PathBuf]) -> bool {
    internal_dirs.iter().any(|d| path == d)
}

/// Produce a lazy, finite sequence of absolute regular-file paths under
/// `start_dir` satisfying every predicate: not excluded,
/// not inside a self-managed internal directory, a regular file (symlinks
/// followed only when they resolve to one, never recursed into), and (in
/// incremental mode) strictly newer than the cutoff.
///
/// Stat failures on individual candidates are logged via `tracing::warn!`
/// and skipped; they never fail the run.
pub fn enumerate(
    start_dir: PathBuf,
    internal_dirs: Vec<PathBuf>,
    exclude_globs: &[String],
    cutoff: Cutoff,
) -> Result<impl Iterator<Item = PathBuf>, EnumeratorError> {
    let excludes = compile_excludes(exclude_globs)?;

    let walker = WalkDir::new(start_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(move |entry| !is_internal(entry.path(), &internal_dirs));

    let iter = walker.filter_map(move |entry| {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                return None;
            }
        };

        let path = entry.path().to_path_buf();
        let file_type = entry.file_type();

        // Regular file: include directly. Symlink: only include if it
        // resolves (through following) to a regular file; never descend
        // into symlinked directories (walkdir already won't, since
        // follow_links is false).
        let is_candidate = if file_type.is_file() {
            true
        } else if file_type.is_symlink() {
            match std::fs::metadata(&path) {
                Ok(meta) => meta.is_file(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unstatable symlink");
                    return None;
                }
            }
        } else {
            false
        };
        if !is_candidate {
            return None;
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if excludes.is_match(name) {
                return None;
            }
        }

        if let Cutoff::Incremental(ref_mtime) = cutoff {
            let mtime = match std::fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping file with unreadable mtime");
                    return None;
                }
            };
            if mtime <= ref_mtime {
                return None;
            }
        }

        Some(path)
    });

    Ok(iter)
}
