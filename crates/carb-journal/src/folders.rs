//! The `ingestedFolders` log: one append-only line per run recording
//! provenance and mode.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

/// Enumeration mode this run used, rendered into the log line exactly as
/// `"full"` or `"incremental ref=<REF_TS>"`.
#[derive(Debug, Clone)]
pub enum Mode {
    /// Every regular file was considered.
    Full,
    /// Only files newer than `ref_timestamp` were considered.
    Incremental {
        /// Human-readable cutoff reference timestamp.
        ref_timestamp: String,
    },
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Full => write!(f, "full"),
            Mode::Incremental { ref_timestamp } => write!(f, "incremental ref={ref_timestamp}"),
        }
    }
}

/// Append one line to the `ingestedFolders` log at `path`:
/// `"<TS> :<cwd>:<start_dir>: <comment> : <mode_descriptor>\n"`.
pub fn record_ingested_folder(
    path: &Path,
    run_timestamp: &str,
    cwd: &Path,
    start_dir: &Path,
    comment: &str,
    mode: &Mode,
) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(
        file,
        "{run_timestamp} :{}:{}: {comment} : {mode}",
        cwd.display(),
        start_dir.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn full_mode_line_matches_the_documented_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest/ingestedFolders");
        record_ingested_folder(
            &path,
            "2024-01-02_03_04_05",
            &PathBuf::from("/home/u"),
            &PathBuf::from("/home/u/data"),
            "nightly",
            &Mode::Full,
        )
        .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "2024-01-02_03_04_05 :/home/u:/home/u/data: nightly : full\n");
    }

    #[test]
    fn incremental_mode_includes_the_reference_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest/ingestedFolders");
        record_ingested_folder(
            &path,
            "2024-01-02_03_04_05",
            &PathBuf::from("/home/u"),
            &PathBuf::from("/home/u/data"),
            "",
            &Mode::Incremental { ref_timestamp: "2024-01-01_00_00_00".to_string() },
        )
        .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "2024-01-02_03_04_05 :/home/u:/home/u/data:  : incremental ref=2024-01-01_00_00_00\n"
        );
    }

    #[test]
    fn multiple_runs_append_as_separate_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ingestedFolders");
        for _ in 0..3 {
            record_ingested_folder(&path, "t", &PathBuf::from("/a"), &PathBuf::from("/b"), "", &Mode::Full).unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);
    }
}
