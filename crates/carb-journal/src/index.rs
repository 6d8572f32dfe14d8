//! The global append-only index of `BlobId`s known across all runs.
//! Advisory only: duplicates across runs are expected and harmless.

use carb_core::BlobId;
use std::io::{self, Write};
use std::path::Path;

/// Append `blob_ids` (already rendered via `Display`) to the global index
/// file at `path`, creating it if absent. Each line is LF-terminated.
pub fn append_new_blob_ids(path: &Path, blob_ids: &[BlobId]) -> io::Result<()> {
    if blob_ids.is_empty() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    for id in blob_ids {
        writeln!(file, "{id}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn appends_without_truncating_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blobs/INDEX");
        append_new_blob_ids(&path, &[BlobId::new(1, [1; 32])]).unwrap();
        append_new_blob_ids(&path, &[BlobId::new(2, [2; 32])]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn empty_slice_is_a_no_op_and_does_not_create_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blobs/INDEX");
        append_new_blob_ids(&path, &[]).unwrap();
        assert!(!path.exists());
    }
}
