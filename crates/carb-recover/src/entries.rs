//! Reconstructs the per-file restore plan from a sealed manifest's
//! `file_processed` record file.

use carb_core::model::IngestRecord;
use carb_core::BlobId;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One file this run observed, enough to restore it: its content
/// identity, its normalized start directory, and its path relative to
/// that start directory.
#[derive(Debug, Clone)]
pub struct RecoverEntry {
    /// Content identity of the file.
    pub blob_id: BlobId,
    /// Normalized start directory for this run.
    pub start_dir: PathBuf,
    /// Path of the file relative to `start_dir`, with no leading separator.
    pub rel_path: String,
}

/// Errors loading `file_processed` back into restore entries.
#[derive(Debug, Error)]
pub enum LoadEntriesError {
    /// The manifest's `file_processed` file could not be read.
    #[error("could not read {path}: {source}")]
    Io {
        /// The file that failed to open or read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

fn rel_of(abs_path: &Path, start_dir: &Path) -> String {
    if abs_path == start_dir {
        return String::new();
    }
    abs_path.strip_prefix(start_dir).map(|r| r.to_string_lossy().into_owned()).unwrap_or_else(|_| {
        abs_path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    })
}

/// Load every entry from `run_dir/file_processed`. Lines that fail to
/// parse are logged and skipped; a malformed line never aborts loading
/// the rest of the plan.
pub fn load_recover_entries(run_dir: &Path) -> Result<Vec<RecoverEntry>, LoadEntriesError> {
    let path = run_dir.join("file_processed");
    let file = std::fs::File::open(&path).map_err(|source| LoadEntriesError::Io { path: path.clone(), source })?;
    let reader = std::io::BufReader::new(file);

    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|source| LoadEntriesError::Io { path: path.clone(), source })?;
        if line.is_empty() {
            continue;
        }
        match IngestRecord::parse_processed_fields(&line) {
            Ok((blob_id, _cwd, start_dir, abs_path)) => {
                let rel_path = rel_of(&abs_path, &start_dir);
                entries.push(RecoverEntry { blob_id, start_dir, rel_path });
            }
            Err(e) => tracing::warn!(line = %line, error = %e, "skipping malformed record while building restore plan"),
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_entries_and_derives_relative_paths() {
        let dir = tempdir().unwrap();
        let id = BlobId::new(5, [1; 32]);
        let line = format!("{id}:/home/u:/home/u/data:/home/u/data/sub/a.txt");
        std::fs::write(dir.path().join("file_processed"), format!("{line}\n")).unwrap();

        let entries = load_recover_entries(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].blob_id, id);
        assert_eq!(entries[0].rel_path, "sub/a.txt");
        assert_eq!(entries[0].start_dir, PathBuf::from("/home/u/data"));
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        let id = BlobId::new(5, [1; 32]);
        let good = format!("{id}:/home/u:/home/u/data:/home/u/data/a.txt\n");
        std::fs::write(dir.path().join("file_processed"), format!("garbage\n{good}")).unwrap();

        let entries = load_recover_entries(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
    }
}
