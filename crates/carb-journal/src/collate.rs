//! Single-threaded collation of per-worker category files into the
//! sealed manifest, plus derivation of `index_new`.

use crate::worker::Category;
use carb_core::BlobId;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures while collating a run. Logged and treated as non-fatal by the
/// caller: a partial manifest is still preferable to none.
#[derive(Debug, Error)]
pub enum CollateError {
    /// An I/O failure reading a per-worker file or writing a consolidated
    /// one.
    #[error("collation io error on {path}: {source}")]
    Io {
        /// The file being read or written when the failure occurred.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Run-level facts written once into the manifest directory.
#[derive(Debug, Clone)]
pub struct RunDescriptor {
    /// Human-readable settings summary (jobs, par2 enabled, redundancy, ...).
    pub settings: String,
    /// Run start time, formatted the same way as the manifest directory suffix.
    pub start_time: String,
    /// Normalized start directory, as an absolute path string.
    pub start_folder: String,
}

fn concat_category(run_dir: &Path, category: Category, worker_ids: &[u64]) -> Result<PathBuf, CollateError> {
    let logs_dir = run_dir.join("logs");
    let out_path = run_dir.join(category_file_name(category));
    let mut out = std::fs::File::create(&out_path).map_err(|source| CollateError::Io { path: out_path.clone(), source })?;

    for &worker_id in worker_ids {
        let part = logs_dir.join(format!("{worker_id}_{}", category_suffix(category)));
        if !part.exists() {
            continue;
        }
        let bytes = std::fs::read(&part).map_err(|source| CollateError::Io { path: part.clone(), source })?;
        out.write_all(&bytes).map_err(|source| CollateError::Io { path: out_path.clone(), source })?;
    }
    Ok(out_path)
}

fn category_suffix(category: Category) -> &'static str {
    match category {
        Category::Processed => "processed",
        Category::Ingested => "ingested",
        Category::Skipped => "skipped",
        Category::Stat1 => "stat1",
        Category::Stat2 => "stat2",
        Category::Types => "types",
        Category::Par2Created => "par2created",
    }
}

fn category_file_name(category: Category) -> &'static str {
    match category {
        Category::Processed => "file_processed",
        Category::Ingested => "file_ingested",
        Category::Skipped => "file_skipped",
        Category::Stat1 => "file_stat1",
        Category::Stat2 => "file_stat2",
        Category::Types => "file_types",
        Category::Par2Created => "par2_created",
    }
}

/// Derive `index_new`: the deduplicated, sorted list of `BlobId`s that
/// appear in the consolidated `file_ingested` file. Malformed lines are
/// logged and skipped rather than aborting collation.
fn derive_index_new(file_ingested: &Path) -> io::Result<Vec<BlobId>> {
    let file = std::fs::File::open(file_ingested)?;
    let reader = io::BufReader::new(file);
    let mut ids = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        match carb_core::model::IngestRecord::parse_processed_fields(&line) {
            Ok((blob_id, _, _, _)) => ids.push(blob_id),
            Err(e) => tracing::warn!(line = %line, error = %e, "skipping malformed ingest record during collation"),
        }
    }
    ids.sort();
    ids.dedup();
    Ok(ids)
}

/// Collate all per-worker category files for `worker_ids` into the
/// consolidated manifest under `run_dir`, derive `index_new`, write the
/// one-shot `settings`/`start_time`/`start_folder` files, and append
/// `index_new` to the global index. Returns the sorted `index_new` list
/// so the caller can also drive parity backfill decisions.
pub fn collate(
    run_dir: &Path,
    worker_ids: &[u64],
    descriptor: &RunDescriptor,
    global_index_path: &Path,
) -> Result<Vec<BlobId>, CollateError> {
    for category in Category::all() {
        concat_category(run_dir, category, worker_ids)?;
    }

    let file_ingested = run_dir.join(category_file_name(Category::Ingested));
    let index_new = derive_index_new(&file_ingested).map_err(|source| CollateError::Io { path: file_ingested, source })?;

    let index_new_path = run_dir.join("index_new");
    let mut f = std::fs::File::create(&index_new_path).map_err(|source| CollateError::Io { path: index_new_path.clone(), source })?;
    for id in &index_new {
        writeln!(f, "{id}").map_err(|source| CollateError::Io { path: index_new_path.clone(), source })?;
    }

    write_once(run_dir, "settings", &descriptor.settings)?;
    write_once(run_dir, "start_time", &descriptor.start_time)?;
    write_once(run_dir, "start_folder", &descriptor.start_folder)?;

    crate::index::append_new_blob_ids(global_index_path, &index_new)
        .map_err(|source| CollateError::Io { path: global_index_path.to_path_buf(), source })?;

    Ok(index_new)
}

fn write_once(run_dir: &Path, name: &str, content: &str) -> Result<(), CollateError> {
    let path = run_dir.join(name);
    std::fs::write(&path, format!("{content}\n")).map_err(|source| CollateError::Io { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::WorkerJournal;
    use tempfile::tempdir;

    fn sample_id(n: u8) -> BlobId {
        BlobId::new(u64::from(n), [n; 32])
    }

    #[test]
    fn concatenates_workers_and_derives_deduped_sorted_index() {
        let dir = tempdir().unwrap();
        let run_dir = dir.path().join("v05_x");
        std::fs::create_dir_all(run_dir.join("logs")).unwrap();

        for (worker_id, ids) in [(0u64, vec![sample_id(2), sample_id(1)]), (1u64, vec![sample_id(1)])] {
            let mut w = WorkerJournal::open(&run_dir, worker_id).unwrap();
            for id in ids {
                let line = format!("{id}:/cwd:/start:/start/f");
                w.append_line(Category::Ingested, &line).unwrap();
                w.append_line(Category::Processed, &line).unwrap();
            }
            w.finish().unwrap();
        }

        let descriptor = RunDescriptor {
            settings: "jobs=4".to_string(),
            start_time: "2024-01-01_00_00_00".to_string(),
            start_folder: "/start".to_string(),
        };
        let global_index = dir.path().join("INDEX");
        let index_new = collate(&run_dir, &[0, 1], &descriptor, &global_index).unwrap();

        assert_eq!(index_new, vec![sample_id(1), sample_id(2)]);
        assert!(run_dir.join("file_ingested").exists());
        assert!(run_dir.join("file_processed").exists());
        assert_eq!(std::fs::read_to_string(run_dir.join("settings")).unwrap(), "jobs=4\n");

        let idx_contents = std::fs::read_to_string(&global_index).unwrap();
        assert_eq!(idx_contents.lines().count(), 2);
    }

    #[test]
    fn a_second_run_appends_rather_than_overwrites_the_global_index() {
        let dir = tempdir().unwrap();
        let global_index = dir.path().join("INDEX");

        for n in [1u8, 2u8] {
            let run_dir = dir.path().join(format!("v05_{n}"));
            std::fs::create_dir_all(run_dir.join("logs")).unwrap();
            let mut w = WorkerJournal::open(&run_dir, 0).unwrap();
            let line = format!("{}:/cwd:/start:/start/f", sample_id(n));
            w.append_line(Category::Ingested, &line).unwrap();
            w.finish().unwrap();

            let descriptor = RunDescriptor {
                settings: "jobs=1".to_string(),
                start_time: "2024-01-01_00_00_00".to_string(),
                start_folder: "/start".to_string(),
            };
            collate(&run_dir, &[0], &descriptor, &global_index).unwrap();
        }

        let idx_contents = std::fs::read_to_string(&global_index).unwrap();
        assert_eq!(idx_contents.lines().count(), 2);
    }
}
