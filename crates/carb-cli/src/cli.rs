//! Command-line surface: `carb <start_dir>`, `carb <start_dir> --full`, or
//! `carb <start_dir> <ref_file>` for incremental mode.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "carb", about = "Content-addressable, deduplicating backup ingester with FEC parity")]
pub struct Cli {
    /// Directory tree to ingest.
    pub start_dir: PathBuf,

    /// Reference file whose mtime is the incremental cutoff. Omit for a
    /// full backup.
    pub ref_file: Option<PathBuf>,

    /// Force full mode even if a reference file argument is present.
    #[arg(long)]
    pub full: bool,
}

/// A usage-level problem with the parsed arguments, distinct from a
/// `carb_core::Fatal` runtime failure: these are caught before anything is
/// touched.
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    /// Both `--full` and a reference file were given; the CLI refuses to
    /// guess which mode was intended.
    #[error("--full and a reference file are mutually exclusive")]
    FullAndRefFileBothGiven,
    /// The reference file could not be statted for its mtime.
    #[error("could not read reference file {0}: {1}")]
    UnreadableRefFile(PathBuf, std::io::Error),
}

/// Enumeration mode this invocation selected.
pub enum Mode {
    /// No cutoff; every regular file qualifies.
    Full,
    /// Only files newer than `cutoff` qualify; `ref_file` is kept for the
    /// `ingestedFolders` log's human-readable reference.
    Incremental { cutoff: std::time::SystemTime, ref_file: PathBuf },
}

impl Cli {
    /// Resolve the enumeration mode this invocation selected.
    pub fn mode(&self) -> Result<Mode, UsageError> {
        match (&self.ref_file, self.full) {
            (Some(_), true) => Err(UsageError::FullAndRefFileBothGiven),
            (Some(ref_file), false) => {
                let meta = std::fs::metadata(ref_file)
                    .map_err(|e| UsageError::UnreadableRefFile(ref_file.clone(), e))?;
                let cutoff = meta
                    .modified()
                    .map_err(|e| UsageError::UnreadableRefFile(ref_file.clone(), e))?;
                Ok(Mode::Incremental { cutoff, ref_file: ref_file.clone() })
            }
            (None, _) => Ok(Mode::Full),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn no_ref_file_is_full_mode() {
        let cli = Cli { start_dir: PathBuf::from("."), ref_file: None, full: false };
        assert!(matches!(cli.mode().unwrap(), Mode::Full));
    }

    #[test]
    fn ref_file_selects_incremental_mode() {
        let dir = tempdir().unwrap();
        let ref_file = dir.path().join("ref");
        std::fs::write(&ref_file, b"x").unwrap();
        let cli = Cli { start_dir: PathBuf::from("."), ref_file: Some(ref_file), full: false };
        assert!(matches!(cli.mode().unwrap(), Mode::Incremental { .. }));
    }

    #[test]
    fn full_flag_with_ref_file_is_a_usage_error() {
        let dir = tempdir().unwrap();
        let ref_file = dir.path().join("ref");
        std::fs::write(&ref_file, b"x").unwrap();
        let cli = Cli { start_dir: PathBuf::from("."), ref_file: Some(ref_file), full: true };
        assert!(matches!(cli.mode(), Err(UsageError::FullAndRefFileBothGiven)));
    }
}
