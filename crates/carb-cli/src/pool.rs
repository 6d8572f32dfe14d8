//! C8 Worker Pool / Scheduler: a fixed-size `rayon` pool fed by a bounded
//! `crossbeam-channel`, draining the enumerator lazily so memory use stays
//! bounded regardless of tree size. Each work item runs C3→C4→C5 to
//! completion on whichever thread picks it up; per-item failures are
//! isolated inside [`crate::pipeline::process_item`] and never reach here.

use crate::pipeline::process_item;
use carb_blobstore::FecCodec;
use carb_core::config::Config;
use carb_core::ids::next_worker_id;
use carb_journal::WorkerJournal;
use carb_telemetry::IngestObserver;
use crossbeam_channel::bounded;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Run every path from `paths` through the worker pool. Returns the
/// worker ids that actually opened a journal, for the caller to pass to
/// collation.
pub fn run(
    paths: impl Iterator<Item = PathBuf> + Send,
    run_dir: &Path,
    cwd: &Path,
    start_dir: &Path,
    cfg: &Config,
    codec_factory: impl Fn() -> Box<dyn FecCodec> + Sync,
    observer: &dyn IngestObserver,
) -> std::io::Result<Vec<u64>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.jobs)
        .thread_name(|i| format!("carb-worker-{i}"))
        .build()
        .expect("failed to build worker thread pool");

    // Bounding the channel caps how far the feeder can run ahead of the
    // workers, which is what keeps the enumerator's laziness meaningful.
    let (tx, rx) = bounded::<PathBuf>(cfg.jobs * 4);
    let worker_ids: Mutex<Vec<u64>> = Mutex::new(Vec::new());

    pool.scope(|scope| {
        scope.spawn(move |_| {
            for path in paths {
                if tx.send(path).is_err() {
                    break;
                }
            }
        });

        for _ in 0..cfg.jobs {
            let rx = rx.clone();
            let worker_ids = &worker_ids;
            scope.spawn(move |_| {
                let worker_id = next_worker_id();
                worker_ids.lock().unwrap().push(worker_id);

                let mut journal = match WorkerJournal::open(run_dir, worker_id) {
                    Ok(j) => j,
                    Err(e) => {
                        tracing::error!(worker_id, error = %e, "failed to open worker journal, worker exiting");
                        return;
                    }
                };
                let codec = codec_factory();

                while let Ok(path) = rx.recv() {
                    process_item(&path, worker_id, cwd, start_dir, cfg, codec.as_ref(), &mut journal, observer);
                }

                if let Err(e) = journal.finish() {
                    tracing::warn!(worker_id, error = %e, "failed to sync worker journal");
                }
            });
        }
    });

    Ok(worker_ids.into_inner().unwrap())
}
