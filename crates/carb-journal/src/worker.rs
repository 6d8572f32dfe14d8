//! Per-worker append-only journal: one file per category, exclusive to
//! the worker that owns it, so no cross-worker locking is ever needed on
//! the hot path.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The record categories a worker appends to while processing one file.
/// `Recover` is intentionally absent: the restore program is written once
/// into the sealed manifest directory by the recovery emitter, not
/// accumulated per worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Every file the enumerator handed to this worker.
    Processed,
    /// Files whose outcome was `Ingested`.
    Ingested,
    /// Files whose outcome was `Deduped`.
    Skipped,
    /// Portable stat captures.
    Stat1,
    /// Native stat captures.
    Stat2,
    /// MIME annotations.
    Types,
    /// BlobIds whose parity set was created by this worker this run.
    Par2Created,
}

impl Category {
    fn suffix(self) -> &'static str {
        match self {
            Category::Processed => "processed",
            Category::Ingested => "ingested",
            Category::Skipped => "skipped",
            Category::Stat1 => "stat1",
            Category::Stat2 => "stat2",
            Category::Types => "types",
            Category::Par2Created => "par2created",
        }
    }

    /// All categories, in the order they are concatenated during
    /// collation.
    #[must_use]
    pub fn all() -> [Category; 7] {
        [
            Category::Processed,
            Category::Ingested,
            Category::Skipped,
            Category::Stat1,
            Category::Stat2,
            Category::Types,
            Category::Par2Created,
        ]
    }
}

/// Append-only handle for one worker's per-category log files, rooted at
/// `<run_dir>/logs/<worker_id>_<category>`.
pub struct WorkerJournal {
    worker_id: u64,
    logs_dir: PathBuf,
    files: std::collections::HashMap<&'static str, File>,
}

impl WorkerJournal {
    /// Open (creating if absent) the category files for `worker_id` under
    /// `run_dir/logs`.
    pub fn open(run_dir: &Path, worker_id: u64) -> io::Result<Self> {
        let logs_dir = run_dir.join("logs");
        std::fs::create_dir_all(&logs_dir)?;
        Ok(Self { worker_id, logs_dir, files: std::collections::HashMap::new() })
    }

    fn file_for(&mut self, category: Category) -> io::Result<&mut File> {
        let suffix = category.suffix();
        if !self.files.contains_key(suffix) {
            let path = self.logs_dir.join(format!("{}_{}", self.worker_id, suffix));
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            self.files.insert(suffix, file);
        }
        Ok(self.files.get_mut(suffix).expect("just inserted"))
    }

    /// Append one line to `category`'s file, adding the trailing newline.
    pub fn append_line(&mut self, category: Category, line: &str) -> io::Result<()> {
        let file = self.file_for(category)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    /// Flush and close every open category file for this worker.
    pub fn finish(mut self) -> io::Result<()> {
        for (_, file) in self.files.drain() {
            file.sync_all()?;
        }
        Ok(())
    }
}
