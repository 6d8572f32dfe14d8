//! Immutable run configuration.
//!
//! Built once at startup from environment variables and CLI overrides,
//! then handed to every component as a borrowed/shared `Arc<Config>` —
//! never as exported mutable shell-style globals.

use std::path::PathBuf;

/// Parity block-size selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockSize {
    /// Planner chooses the block size automatically.
    Auto,
    /// Caller pinned a specific block size, in bytes.
    Fixed(u64),
}

/// Full run configuration, assembled once and shared read-only.
#[derive(Clone, Debug)]
pub struct Config {
    /// Parallelism for the worker pool (`JOBS`). Defaults to the logical
    /// CPU count.
    pub jobs: usize,
    /// Whether parity sets are created at all (`PAR2`). Default `true`.
    pub par2_enabled: bool,
    /// Redundancy percent the user explicitly configured via
    /// `PAR2_REDUNDANCY`, clamped to `[1, 80]`. `None` means the planner
    /// is free to derive redundancy from the data-slice count instead of
    /// honoring a fixed value.
    pub par2_redundancy: Option<u8>,
    /// Parity block size (`PAR2_BLOCKSIZE`).
    pub par2_blocksize: BlockSize,
    /// Whether to probe MIME type per ingested blob (`ENABLE_MIME`).
    pub enable_mime: bool,
    /// Basename globs excluded from enumeration (`EXCLUDE_GLOBS`).
    pub exclude_globs: Vec<String>,
    /// Storage root (blobs/parity/manifest/tmp all live under here).
    pub storage_root: PathBuf,
    /// Free-text annotation recorded in `ingestedFolders`.
    pub comment: String,
}

/// Default redundancy percent per `DEFAULT_R`.
pub const DEFAULT_REDUNDANCY_PERCENT: u8 = 10;
/// Redundancy upper bound; the FEC codec refuses above this.
pub const MAX_REDUNDANCY_PERCENT: u8 = 80;
const MIN_REDUNDANCY_PERCENT: u8 = 1;

impl Config {
    /// Build configuration from the process environment, applying the
    /// documented defaults and clamps. `storage_root` must already be
    /// resolved by the caller (see `carb-cli`'s default storage root
    /// resolution).
    #[must_use]
    pub fn from_env(storage_root: PathBuf) -> Self {
        let jobs = std::env::var("JOBS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or_else(num_cpus_fallback);

        let par2_enabled =
            std::env::var("PAR2").ok().map(|v| v != "0").unwrap_or(true);

        let par2_redundancy = std::env::var("PAR2_REDUNDANCY").ok().and_then(|v| v.parse::<i64>().ok()).map(
            |v| v.clamp(i64::from(MIN_REDUNDANCY_PERCENT), i64::from(MAX_REDUNDANCY_PERCENT)) as u8,
        );

        let par2_blocksize = match std::env::var("PAR2_BLOCKSIZE") {
            Ok(v) if v.is_empty() || v.eq_ignore_ascii_case("auto") => BlockSize::Auto,
            Ok(v) => v.parse::<u64>().map(BlockSize::Fixed).unwrap_or(BlockSize::Auto),
            Err(_) => BlockSize::Auto,
        };

        let enable_mime = std::env::var("ENABLE_MIME").ok().map(|v| v != "0").unwrap_or(true);

        let exclude_globs = std::env::var("EXCLUDE_GLOBS")
            .ok()
            .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
            .unwrap_or_default();

        let comment = std::env::var("COMMENT").unwrap_or_default();

        Self {
            jobs,
            par2_enabled,
            par2_redundancy,
            par2_blocksize,
            enable_mime,
            exclude_globs,
            storage_root,
            comment,
        }
    }

    /// The blob directory (`<root>/blobs`).
    #[must_use]
    pub fn blob_dir(&self) -> PathBuf {
        self.storage_root.join("blobs")
    }

    /// The parity directory (`<root>/parity`).
    #[must_use]
    pub fn parity_dir(&self) -> PathBuf {
        self.storage_root.join("parity")
    }

    /// The staging/tmp directory (`<root>/tmp`), overridable by `TMPDIR`.
    #[must_use]
    pub fn tmp_dir(&self) -> PathBuf {
        std::env::var("TMPDIR").map(PathBuf::from).unwrap_or_else(|_| self.storage_root.join("tmp"))
    }

    /// The manifest root directory (`<root>/manifest`).
    #[must_use]
    pub fn manifest_root(&self) -> PathBuf {
        self.storage_root.join("manifest")
    }

    /// The append-only global index file (`<root>/blobs/INDEX`).
    #[must_use]
    pub fn global_index_path(&self) -> PathBuf {
        self.blob_dir().join("INDEX")
    }

    /// The append-only `ingestedFolders` log (`<root>/manifest/ingestedFolders`).
    #[must_use]
    pub fn ingested_folders_path(&self) -> PathBuf {
        self.manifest_root().join("ingestedFolders")
    }

    /// Redundancy percent to report/record when no per-blob plan applies
    /// (e.g. run settings); falls back to the default when unconfigured.
    #[must_use]
    pub fn par2_redundancy_resolved(&self) -> u8 {
        self.par2_redundancy.unwrap_or(DEFAULT_REDUNDANCY_PERCENT)
    }
}

fn num_cpus_fallback() -> usize {
    std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variable mutation must be serialized across tests in
    // this process.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for k in ["JOBS", "PAR2", "PAR2_REDUNDANCY", "PAR2_BLOCKSIZE", "ENABLE_MIME", "EXCLUDE_GLOBS", "COMMENT", "TMPDIR"] {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn defaults_are_sane() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        let cfg = Config::from_env(PathBuf::from("/tmp/carb-test-root"));
        assert!(cfg.jobs > 0);
        assert!(cfg.par2_enabled);
        assert_eq!(cfg.par2_redundancy, None);
        assert_eq!(cfg.par2_redundancy_resolved(), DEFAULT_REDUNDANCY_PERCENT);
        assert_eq!(cfg.par2_blocksize, BlockSize::Auto);
        assert!(cfg.enable_mime);
        assert!(cfg.exclude_globs.is_empty());
    }

    #[test]
    fn redundancy_is_clamped() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("PAR2_REDUNDANCY", "999");
        let cfg = Config::from_env(PathBuf::from("/tmp/carb-test-root"));
        assert_eq!(cfg.par2_redundancy, Some(MAX_REDUNDANCY_PERCENT));
        std::env::set_var("PAR2_REDUNDANCY", "0");
        let cfg = Config::from_env(PathBuf::from("/tmp/carb-test-root"));
        assert_eq!(cfg.par2_redundancy, Some(MIN_REDUNDANCY_PERCENT));
        clear_env();
    }

    #[test]
    fn exclude_globs_split_on_comma_and_trim() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("EXCLUDE_GLOBS", "*.swp, *.tmp ,*.bak");
        let cfg = Config::from_env(PathBuf::from("/tmp/carb-test-root"));
        assert_eq!(cfg.exclude_globs, vec!["*.swp", "*.tmp", "*.bak"]);
        clear_env();
    }
}
