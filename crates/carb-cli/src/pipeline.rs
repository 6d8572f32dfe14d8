//! Per-item pipeline: C3 stream+hash, C4 install, C5 parity, and the
//! per-worker journal entries for one enumerated path. Runs to completion
//! inside a single pool thread; nothing here is shared across items
//! except the handles passed in.

use crate::{ingest, stat};
use carb_blobstore::{create_parity, install, FecCodec, ParityOutcome};
use carb_core::config::Config;
use carb_core::model::{mime_line, IngestRecord, Outcome};
use carb_core::BlobId;
use carb_journal::{Category, WorkerJournal};
use carb_scan::rel;
use carb_telemetry::IngestObserver;
use std::path::Path;

/// Process one enumerated file. Every failure is isolated here: it is
/// logged via `tracing::warn!`, the observer is told about it, and the
/// function returns without propagating — the scheduler never sees an
/// `Err` from a single item.
#[allow(clippy::too_many_arguments)]
pub fn process_item(
    path: &Path,
    worker_id: u64,
    cwd: &Path,
    start_dir: &Path,
    cfg: &Config,
    codec: &dyn FecCodec,
    journal: &mut WorkerJournal,
    observer: &dyn IngestObserver,
) {
    let _span = observer.span("process_item");

    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "stat error, skipping item");
            observer.item_error();
            return;
        }
    };

    let staged = match ingest::stream_and_hash(path, &cfg.tmp_dir(), worker_id) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "read error, skipping item");
            observer.item_error();
            return;
        }
    };

    let outcome = match install(&staged.staging_path, &staged.blob_id, &cfg.blob_dir()) {
        Ok(o) => o,
        Err(e) => {
            tracing::warn!(error = %e, "install failed, skipping item");
            observer.item_error();
            return;
        }
    };

    record_and_log(path, start_dir, cwd, cfg, &staged.blob_id, staged.size, outcome, journal, observer);
    record_stats(path, &meta, &staged.blob_id, cfg, journal);

    if cfg.par2_enabled {
        maybe_create_parity(codec, &staged.blob_id, staged.size, cfg, journal, observer);
    }
}

#[allow(clippy::too_many_arguments)]
fn record_and_log(
    path: &Path,
    start_dir: &Path,
    cwd: &Path,
    cfg: &Config,
    blob_id: &BlobId,
    size: u64,
    outcome: Outcome,
    journal: &mut WorkerJournal,
    observer: &dyn IngestObserver,
) {
    let _ = cfg;
    let record = IngestRecord {
        blob_id: *blob_id,
        source_cwd: cwd.to_path_buf(),
        source_start_dir: start_dir.to_path_buf(),
        source_abs_path: path.to_path_buf(),
        relative_path: rel(path, start_dir),
        size,
        outcome,
    };
    let line = record.to_processed_line();
    let _ = journal.append_line(Category::Processed, &line);
    match outcome {
        Outcome::Ingested => {
            let _ = journal.append_line(Category::Ingested, &line);
            observer.blob_ingested(size);
        }
        Outcome::Deduped => {
            let _ = journal.append_line(Category::Skipped, &line);
            observer.blob_deduped(size);
        }
    }
}

fn record_stats(path: &Path, meta: &std::fs::Metadata, blob_id: &BlobId, cfg: &Config, journal: &mut WorkerJournal) {
    let _ = journal.append_line(Category::Stat1, &stat::portable_stat(meta).to_line(path));
    let _ = journal.append_line(Category::Stat2, &stat::native_stat(meta).to_line(path));

    if cfg.enable_mime {
        if let Some(kind) = infer::get_from_path(path).ok().flatten() {
            let _ = journal.append_line(Category::Types, &mime_line(blob_id, kind.mime_type()));
        }
    }
}

fn maybe_create_parity(
    codec: &dyn FecCodec,
    blob_id: &BlobId,
    size: u64,
    cfg: &Config,
    journal: &mut WorkerJournal,
    observer: &dyn IngestObserver,
) {
    let blob_path = cfg.blob_dir().join(blob_id.canonical_name());
    match create_parity(codec, &blob_path, blob_id, &cfg.parity_dir(), cfg.par2_blocksize, cfg.par2_redundancy, size) {
        Ok(ParityOutcome::Created) => {
            let _ = journal.append_line(Category::Par2Created, &blob_id.to_string());
            observer.parity_created();
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(blob_id = %blob_id, error = %e, "parity creation io error, continuing without it");
        }
    }
}
