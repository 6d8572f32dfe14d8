//! Full-pipeline integration tests: enumerate → worker pool (stream+hash,
//! install, parity) → journal collation, driven the same way `carb_cli::run`
//! drives them but against a throwaway storage root instead of the
//! process-wide default, so tests never touch `$HOME`.

use carb_core::config::Config;
use carb_journal::{collate, RunDescriptor};
use carb_scan::enumerate::Cutoff;
use carb_scan::enumerate;
use carb_telemetry::CountingObserver;
use std::time::Duration;
use tempfile::tempdir;

fn test_config(root: &std::path::Path) -> Config {
    let mut cfg = Config::from_env(root.to_path_buf());
    cfg.par2_enabled = false;
    cfg
}

fn prepare_store(cfg: &Config) {
    std::fs::create_dir_all(cfg.blob_dir()).unwrap();
    std::fs::create_dir_all(cfg.parity_dir()).unwrap();
    std::fs::create_dir_all(cfg.manifest_root()).unwrap();
    std::fs::create_dir_all(cfg.tmp_dir()).unwrap();
}

#[test]
fn fresh_full_backup_dedupes_shared_content_across_files() {
    let dir = tempdir().unwrap();
    let cfg = test_config(&dir.path().join("store"));
    prepare_store(&cfg);

    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("a.txt"), b"shared bytes\n").unwrap();
    std::fs::write(src.join("b.txt"), b"shared bytes\n").unwrap();
    std::fs::write(src.join("c.txt"), b"unique bytes\n").unwrap();

    let paths = enumerate(src.clone(), vec![], &[], Cutoff::Full).unwrap();
    let run_dir = carb_journal::start_run(&cfg.manifest_root(), 1).unwrap();
    let observer = CountingObserver::new();

    let worker_ids = carb_cli::pool::run(paths, &run_dir, &src, &src, &cfg, || {
        Box::new(carb_blobstore::parity::codec::Par2Cli::new("par2")) as Box<dyn carb_blobstore::FecCodec>
    }, &observer)
    .unwrap();

    let descriptor = RunDescriptor {
        settings: "jobs=1".to_string(),
        start_time: "2024-01-01_00_00_00".to_string(),
        start_folder: src.display().to_string(),
    };
    let index_new = collate(&run_dir, &worker_ids, &descriptor, &cfg.global_index_path()).unwrap();

    // Two distinct contents were ingested: one blob for the shared pair,
    // one for the unique file.
    assert_eq!(index_new.len(), 2);

    let ingested = std::fs::read_to_string(run_dir.join("file_ingested")).unwrap();
    let skipped = std::fs::read_to_string(run_dir.join("file_skipped")).unwrap();
    assert_eq!(ingested.lines().count(), 2);
    assert_eq!(skipped.lines().count(), 1);

    let snap = observer.snapshot();
    assert_eq!(snap.ingested_count, 2);
    assert_eq!(snap.deduped_count, 1);

    let blob_files: Vec<_> = std::fs::read_dir(cfg.blob_dir()).unwrap().filter_map(Result::ok).collect();
    assert_eq!(blob_files.len(), 2, "dedup must not create a second blob for identical content");
}

#[test]
fn incremental_mode_skips_files_at_or_before_the_cutoff() {
    let dir = tempdir().unwrap();
    let cfg = test_config(&dir.path().join("store"));
    prepare_store(&cfg);

    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    let old = src.join("old.txt");
    std::fs::write(&old, b"old\n").unwrap();
    let cutoff = std::fs::metadata(&old).unwrap().modified().unwrap();

    std::thread::sleep(Duration::from_millis(10));
    std::fs::write(src.join("new.txt"), b"new\n").unwrap();

    let paths = enumerate(src.clone(), vec![], &[], Cutoff::Incremental(cutoff)).unwrap();
    let run_dir = carb_journal::start_run(&cfg.manifest_root(), 2).unwrap();
    let observer = CountingObserver::new();

    let worker_ids = carb_cli::pool::run(paths, &run_dir, &src, &src, &cfg, || {
        Box::new(carb_blobstore::parity::codec::Par2Cli::new("par2")) as Box<dyn carb_blobstore::FecCodec>
    }, &observer)
    .unwrap();

    let descriptor = RunDescriptor {
        settings: "jobs=1".to_string(),
        start_time: "2024-01-01_00_00_01".to_string(),
        start_folder: src.display().to_string(),
    };
    collate(&run_dir, &worker_ids, &descriptor, &cfg.global_index_path()).unwrap();

    let ingested = std::fs::read_to_string(run_dir.join("file_ingested")).unwrap();
    assert_eq!(ingested.lines().count(), 1);
    assert!(ingested.contains("new.txt"));
}

#[test]
fn exclude_globs_remove_matching_basenames_before_ingestion() {
    let dir = tempdir().unwrap();
    let cfg = test_config(&dir.path().join("store"));
    prepare_store(&cfg);

    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("keep.txt"), b"keep\n").unwrap();
    std::fs::write(src.join("drop.swp"), b"drop\n").unwrap();

    let paths = enumerate(src.clone(), vec![], &["*.swp".to_string()], Cutoff::Full).unwrap();
    let run_dir = carb_journal::start_run(&cfg.manifest_root(), 3).unwrap();
    let observer = CountingObserver::new();

    let worker_ids = carb_cli::pool::run(paths, &run_dir, &src, &src, &cfg, || {
        Box::new(carb_blobstore::parity::codec::Par2Cli::new("par2")) as Box<dyn carb_blobstore::FecCodec>
    }, &observer)
    .unwrap();

    let descriptor = RunDescriptor {
        settings: "jobs=1".to_string(),
        start_time: "2024-01-01_00_00_02".to_string(),
        start_folder: src.display().to_string(),
    };
    collate(&run_dir, &worker_ids, &descriptor, &cfg.global_index_path()).unwrap();

    let processed = std::fs::read_to_string(run_dir.join("file_processed")).unwrap();
    assert_eq!(processed.lines().count(), 1);
    assert!(processed.contains("keep.txt"));
    assert!(!processed.contains("drop.swp"));
}
