//! Run Journal (C6): per-worker append-only category files, collated
//! single-threaded at run end into a sealed manifest directory, plus the
//! global append-only index and `ingestedFolders` log.

#![deny(unsafe_code)]

pub mod collate;
pub mod folders;
pub mod index;
pub mod worker;

pub use collate::{collate, CollateError, RunDescriptor};
pub use folders::{record_ingested_folder, Mode};
pub use index::append_new_blob_ids;
pub use worker::{Category, WorkerJournal};

use carb_core::ids::format_run_timestamp;
use std::path::PathBuf;

/// Create the directory for a fresh run manifest (`manifest/v05_<TS>`) and
/// its `logs` subdirectory where workers write their category files.
pub fn start_run(manifest_root: &std::path::Path, run_unix_secs: u64) -> std::io::Result<PathBuf> {
    let run_dir = manifest_root.join(format!("v05_{}", format_run_timestamp(run_unix_secs)));
    std::fs::create_dir_all(run_dir.join("logs"))?;
    Ok(run_dir)
}
