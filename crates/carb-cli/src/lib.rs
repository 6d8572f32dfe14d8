//! Library half of the `carb` binary: CLI parsing, the streaming
//! ingestor, the per-item pipeline, the worker pool, and the top-level
//! orchestration that wires C1 (path normalization) through C2
//! (enumeration), C8's worker pool running C3→C4→C5 per item, C6
//! (journal collation), and C7 (recovery script emission). Split out of
//! `main.rs` so the orchestration can be driven from integration tests
//! without going through `std::process::exit`.

#![deny(unsafe_code)]

pub mod cli;
pub mod ingest;
pub mod pipeline;
pub mod pool;
pub mod stat;
pub mod storage_root;

use carb_blobstore::parity::codec::Par2Cli;
use carb_blobstore::FecCodec;
use carb_core::config::Config;
use carb_core::ids::{format_run_timestamp, now_unix_secs};
use carb_core::Fatal;
use carb_journal::{collate, record_ingested_folder, start_run, Mode as JournalMode, RunDescriptor};
use carb_recover::{load_recover_entries, render_recovery_script};
use carb_scan::enumerate::Cutoff;
use carb_scan::{enumerate, normalize_start_dir};
use carb_telemetry::{observer::CountingSnapshot, CountingObserver};
use cli::{Cli, Mode};
use std::path::Path;

/// The only FEC codec binary name `carb` knows how to invoke.
pub const PAR2_BINARY: &str = "par2";

/// Every way a run can fail, carrying enough to pick an exit code.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// A usage-level problem with the parsed arguments.
    #[error("{0}")]
    Usage(#[from] cli::UsageError),
    /// A fatal, run-aborting failure.
    #[error("{0}")]
    Fatal(#[from] Fatal),
    /// An I/O failure outside the per-item pipeline (setup or journaling).
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The enumerator's exclude-glob configuration was invalid.
    #[error("{0}")]
    Enumerator(#[from] carb_scan::EnumeratorError),
    /// Collating per-worker journals into the sealed manifest failed.
    #[error("{0}")]
    Collate(#[from] carb_journal::CollateError),
}

/// Map a [`RunError`] to the process exit code documented for `carb`: 64
/// for usage/configuration problems, 69 for a missing external
/// dependency, 1 for everything else non-zero.
#[must_use]
pub fn exit_code_for(err: &RunError) -> i32 {
    match err {
        RunError::Usage(_) => 64,
        RunError::Fatal(Fatal::InvalidStartDir(_)) => 64,
        RunError::Fatal(Fatal::MissingDependency(_)) => 69,
        RunError::Fatal(_) => 1,
        RunError::Enumerator(_) => 64,
        RunError::Io(_) | RunError::Collate(_) => 1,
    }
}

/// Run one full `carb` invocation to completion: normalize the start
/// directory, resolve configuration, enumerate candidates, drive them
/// through the worker pool, collate the run journal, and emit the
/// recovery script. Returns `Ok(())` on a clean run (exit code 0).
pub fn run(cli: &Cli) -> Result<(), RunError> {
    let mode = cli.mode()?;

    let storage_root = storage_root::resolve();
    let cfg = Config::from_env(storage_root);

    let start_dir = normalize_start_dir(&cli.start_dir)?;
    let cwd = std::env::current_dir().unwrap_or_else(|_| start_dir.clone());

    for dir in [cfg.blob_dir(), cfg.parity_dir(), cfg.manifest_root(), cfg.tmp_dir()] {
        std::fs::create_dir_all(&dir).map_err(|_| Fatal::UnwritableRoot(dir.clone()))?;
    }

    if cfg.par2_enabled {
        let probe = Par2Cli::new(PAR2_BINARY);
        if !probe.is_available() {
            return Err(Fatal::MissingDependency(PAR2_BINARY.to_string()).into());
        }
    }

    let internal_dirs = vec![cfg.blob_dir(), cfg.parity_dir(), cfg.manifest_root(), cfg.tmp_dir()];
    let cutoff = match &mode {
        Mode::Full => Cutoff::Full,
        Mode::Incremental { cutoff, .. } => Cutoff::Incremental(*cutoff),
    };
    let paths = enumerate(start_dir.clone(), internal_dirs, &cfg.exclude_globs, cutoff)?;

    let run_unix_secs = now_unix_secs();
    let run_dir = start_run(&cfg.manifest_root(), run_unix_secs)?;

    let observer = CountingObserver::new();
    let codec_binary = PAR2_BINARY.to_string();
    let mut worker_ids = pool::run(
        paths,
        &run_dir,
        &cwd,
        &start_dir,
        &cfg,
        move || Box::new(Par2Cli::new(codec_binary.clone())) as Box<dyn FecCodec>,
        &observer,
    )?;
    worker_ids.sort_unstable();
    worker_ids.dedup();

    let start_time = format_run_timestamp(run_unix_secs);
    let descriptor = RunDescriptor {
        settings: format!(
            "jobs={} par2={} par2_redundancy={} par2_blocksize={:?} enable_mime={}",
            cfg.jobs,
            cfg.par2_enabled,
            cfg.par2_redundancy_resolved(),
            cfg.par2_blocksize,
            cfg.enable_mime
        ),
        start_time: start_time.clone(),
        start_folder: start_dir.display().to_string(),
    };
    collate(&run_dir, &worker_ids, &descriptor, &cfg.global_index_path())?;

    let journal_mode = match &mode {
        Mode::Full => JournalMode::Full,
        Mode::Incremental { cutoff, .. } => {
            let secs = cutoff.duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_secs();
            JournalMode::Incremental { ref_timestamp: format_run_timestamp(secs) }
        }
    };
    record_ingested_folder(&cfg.ingested_folders_path(), &start_time, &cwd, &start_dir, &cfg.comment, &journal_mode)?;

    let entries = load_recover_entries(&run_dir).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load restore entries, recovery script will be empty");
        Vec::new()
    });
    let script = render_recovery_script(&entries, &cfg.blob_dir(), &cfg.parity_dir(), PAR2_BINARY);
    write_recovery_script(&run_dir, &script)?;

    print_summary(&observer.snapshot());
    Ok(())
}

fn write_recovery_script(run_dir: &Path, script: &str) -> std::io::Result<()> {
    let path = run_dir.join("recover");
    std::fs::write(&path, script)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms)?;
    }
    Ok(())
}

fn print_summary(snap: &CountingSnapshot) {
    println!(
        "carb: ingested {} files ({} bytes), deduped {} files ({} bytes), {} parity sets created, {} item errors",
        snap.ingested_count,
        snap.ingested_bytes,
        snap.deduped_count,
        snap.deduped_bytes,
        snap.parity_created_count,
        snap.item_error_count,
    );
}
