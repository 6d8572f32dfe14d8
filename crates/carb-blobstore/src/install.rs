//! C4 Blob Installer. The algorithmic core: atomic
//! content-addressed install with dedup and race resolution.

use carb_core::model::Outcome;
use carb_core::{BlobId, ItemError};
use std::io;
use std::path::Path;

/// Outcome of an install attempt, mirroring `IngestRecord.outcome`.
pub type InstallOutcome = Outcome;

/// Install `staging_path` (already hashed to `blob_id`) into the blob
/// directory `blob_dir`, following this exact protocol order:
///
/// 1. Atomic hardlink `staging_path` → `blob_dir/<blob_id>`. Success ⇒
///    `Ingested`; `staging_path` is removed.
/// 2. If the link failed because the target exists ⇒ `Deduped`;
///    `staging_path` is removed.
/// 3. Otherwise (e.g. cross-device): no-clobber rename, then no-clobber
///    copy. If both fail, `InstallFailed`.
///
/// On a race between `N` workers computing the same `BlobId`, exactly one
/// hardlink succeeds (`Ingested`); the rest observe an existing target and
/// become `Deduped`.
pub fn install(
    staging_path: &Path,
    blob_id: &BlobId,
    blob_dir: &Path,
) -> Result<InstallOutcome, ItemError> {
    let target = blob_dir.join(blob_id.canonical_name());

    match std::fs::hard_link(staging_path, &target) {
        Ok(()) => {
            remove_staging(staging_path);
            return Ok(Outcome::Ingested);
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            remove_staging(staging_path);
            return Ok(Outcome::Deduped);
        }
        Err(e) => {
            // The link failed for a non-existence reason (cross-device is
            // the expected case). A concurrent worker may still have just
            // installed the same content: check directly before falling
            // back, a concurrent winner may already have installed it.
            if target.exists() {
                remove_staging(staging_path);
                return Ok(Outcome::Deduped);
            }
            tracing::debug!(
                error = %e,
                path = %staging_path.display(),
                "hardlink install failed, falling back to rename/copy"
            );
        }
    }

    if no_clobber_rename(staging_path, &target) {
        return Ok(Outcome::Ingested);
    }
    if target.exists() {
        remove_staging(staging_path);
        return Ok(Outcome::Deduped);
    }

    if no_clobber_copy(staging_path, &target) {
        remove_staging(staging_path);
        return Ok(Outcome::Ingested);
    }
    if target.exists() {
        remove_staging(staging_path);
        return Ok(Outcome::Deduped);
    }

    Err(ItemError::InstallFailed {
        path: staging_path.to_path_buf(),
        reason: "hardlink, rename, and copy all failed".to_string(),
    })
}

/// Best-effort no-clobber rename: the existence check is not perfectly
/// atomic (that guarantee lives solely in the hardlink step above), but a
/// concurrent winner is still caught by the `target.exists()` check the
/// caller performs immediately after a failed attempt.
fn no_clobber_rename(staging_path: &Path, target: &Path) -> bool {
    if target.exists() {
        return false;
    }
    std::fs::rename(staging_path, target).is_ok()
}

/// Best-effort no-clobber copy, same caveat as [`no_clobber_rename`].
fn no_clobber_copy(staging_path: &Path, target: &Path) -> bool {
    if target.exists() {
        return false;
    }
    std::fs::copy(staging_path, target).is_ok()
}

fn remove_staging(staging_path: &Path) {
    if let Err(e) = std::fs::remove_file(staging_path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %staging_path.display(), error = %e, "failed to remove staging file");
        }
    }
}
