//! C3 Streaming Ingestor: tee a single read pass over the source file into
//! a uniquely-named staging file and an incremental SHA-256 hasher. The
//! source is read exactly once; a second pass would observe different
//! bytes if the file were mutated concurrently.

use carb_core::{BlobId, ItemError};
use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const READ_BUF_SIZE: usize = 128 * 1024;

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// What [`stream_and_hash`] produced for one source file.
#[derive(Debug)]
pub struct Staged {
    /// Where the tee'd bytes were written, under the configured tmp dir.
    pub staging_path: PathBuf,
    /// Bytes read from the source.
    pub size: u64,
    /// Content identity of the bytes read.
    pub blob_id: BlobId,
}

fn unique_staging_path(tmp_dir: &Path, worker_id: u64) -> PathBuf {
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    tmp_dir.join(format!("stg_{}_{worker_id}_{seq}", std::process::id()))
}

/// Read `source` exactly once, writing its bytes into a fresh staging file
/// under `tmp_dir` while feeding the same bytes into a SHA-256 hasher. On
/// any I/O failure the staging file is removed and an [`ItemError::Read`]
/// is returned.
pub fn stream_and_hash(source: &Path, tmp_dir: &Path, worker_id: u64) -> Result<Staged, ItemError> {
    let staging_path = unique_staging_path(tmp_dir, worker_id);

    let outcome = (|| -> io::Result<Staged> {
        let mut reader = File::open(source)?;
        let mut writer =
            OpenOptions::new().write(true).create_new(true).open(&staging_path)?;
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; READ_BUF_SIZE];
        let mut total: u64 = 0;

        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            writer.write_all(&buf[..n])?;
            hasher.update(&buf[..n]);
            total += n as u64;
        }
        writer.flush()?;

        let digest: [u8; 32] = hasher.finalize().into();
        Ok(Staged { staging_path: staging_path.clone(), size: total, blob_id: BlobId::new(total, digest) })
    })();

    outcome.map_err(|io_err| {
        let _ = std::fs::remove_file(&staging_path);
        ItemError::Read { path: source.to_path_buf(), source: io_err }
    })
}
