//! At-most-once parity creation per `BlobId`, coordinated by a
//! `lock_<BlobId>` directory acting as a test-and-set primitive.

use super::codec::FecCodec;
use super::planner::plan;
use carb_core::config::BlockSize;
use carb_core::BlobId;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Poll interval while waiting for a concurrent creator to finish.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Bounded wait: `POLL_INTERVAL * MAX_POLL_ATTEMPTS` ≈ 5s.
const MAX_POLL_ATTEMPTS: u32 = 50;

/// What happened when [`create_parity`] was asked to ensure a parity set
/// exists for a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParityOutcome {
    /// A parity set already existed; nothing was done.
    AlreadyPresent,
    /// This call created the parity set.
    Created,
    /// Another worker held the lock and finished before the bounded wait
    /// elapsed; its parity set is now present.
    CreatedByOther,
    /// The lock was held past the bounded wait, or creation failed; the
    /// blob has no parity set. Acceptable per the absence-is-acceptable
    /// rule — the caller logs and continues.
    Skipped,
}

fn parity_file(parity_dir: &Path, blob_id: &BlobId) -> PathBuf {
    parity_dir.join(format!("{}.par2", blob_id.parity_prefix()))
}

fn lock_dir(parity_dir: &Path, blob_id: &BlobId) -> PathBuf {
    parity_dir.join(format!("lock_{blob_id}"))
}

/// Ensure a parity set exists for `blob_id`'s installed blob at
/// `blob_path`, creating it via `codec` if absent. Safe to call from many
/// workers concurrently, including across separate runs.
pub fn create_parity(
    codec: &dyn FecCodec,
    blob_path: &Path,
    blob_id: &BlobId,
    parity_dir: &Path,
    block: BlockSize,
    redundancy: Option<u8>,
    size: u64,
) -> io::Result<ParityOutcome> {
    let target = parity_file(parity_dir, blob_id);
    if target.exists() {
        return Ok(ParityOutcome::AlreadyPresent);
    }

    let lock = lock_dir(parity_dir, blob_id);
    match std::fs::create_dir(&lock) {
        Ok(()) => {
            let outcome = do_create(codec, blob_path, blob_id, parity_dir, block, redundancy, size);
            let _ = std::fs::remove_dir(&lock);
            Ok(outcome)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            for _ in 0..MAX_POLL_ATTEMPTS {
                if target.exists() {
                    return Ok(ParityOutcome::CreatedByOther);
                }
                if !lock.exists() {
                    // Holder finished (successfully or not) and released
                    // the lock without leaving parity behind.
                    return Ok(if target.exists() { ParityOutcome::CreatedByOther } else { ParityOutcome::Skipped });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Ok(ParityOutcome::Skipped)
        }
        Err(e) => Err(e),
    }
}

fn do_create(
    codec: &dyn FecCodec,
    blob_path: &Path,
    blob_id: &BlobId,
    parity_dir: &Path,
    block: BlockSize,
    redundancy: Option<u8>,
    size: u64,
) -> ParityOutcome {
    let (block_size, redundancy_percent) = plan(size, block, redundancy);
    let prefix = parity_dir.join(blob_id.parity_prefix());
    match codec.create(blob_path, &prefix, block_size, redundancy_percent) {
        Ok(()) => ParityOutcome::Created,
        Err(e) => {
            tracing::warn!(blob_id = %blob_id, error = %e, "parity creation failed, continuing without it");
            ParityOutcome::Skipped
        }
    }
}
