//! The forward-error-correction codec is treated as an opaque external
//! tool, shelled out to rather than linked in. [`FecCodec`] is the
//! capability seam; [`Par2Cli`] is the only implementation, wrapping a
//! `par2`-compatible command line.

use std::path::Path;
use std::process::Command;

/// What went wrong invoking the codec, without assuming anything about
/// its internal error reporting beyond an exit status and stderr text.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The codec binary could not be spawned at all (not installed, not
    /// on `PATH`, permission denied).
    #[error("could not run {command}: {source}")]
    Spawn {
        /// The command that failed to start.
        command: String,
        /// Underlying spawn failure.
        #[source]
        source: std::io::Error,
    },
    /// The codec ran but exited non-zero.
    #[error("{command} exited with {status}: {stderr}")]
    NonZeroExit {
        /// The command that failed.
        command: String,
        /// Its exit status.
        status: std::process::ExitStatus,
        /// Captured stderr, truncated by the caller if huge.
        stderr: String,
    },
}

/// Capability set a forward-error-correction codec must provide: create a
/// parity set for a file, verify one against its source, and attempt
/// repair in place.
pub trait FecCodec {
    /// Create parity volumes for `source`, writing `<parity_prefix>.par2`
    /// plus numbered volumes alongside it, at the given block size and
    /// redundancy percent.
    fn create(
        &self,
        source: &Path,
        parity_prefix: &Path,
        block_size: u64,
        redundancy_percent: u8,
    ) -> Result<(), CodecError>;

    /// Verify `source` against its `<parity_prefix>.par2` set. `Ok(true)`
    /// means clean, `Ok(false)` means damage was detected (but no repair
    /// was attempted).
    fn verify(&self, source: &Path, parity_prefix: &Path) -> Result<bool, CodecError>;

    /// Attempt in-place repair of `source` using its parity set. Returns
    /// whether repair succeeded.
    fn repair(&self, source: &Path, parity_prefix: &Path) -> Result<bool, CodecError>;

    /// Whether the underlying binary is reachable at all, so callers can
    /// degrade gracefully (e.g. the recovery emitter falling back to a
    /// raw copy) instead of failing every single operation.
    fn is_available(&self) -> bool;
}

/// Shells out to a `par2`-compatible command-line tool.
#[derive(Clone, Debug)]
pub struct Par2Cli {
    binary: String,
}

impl Par2Cli {
    /// Build a codec wrapper invoking `binary` (typically `par2`, or
    /// whatever `PAR2` resolves to).
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    fn run(&self, args: &[&std::ffi::OsStr]) -> Result<(), CodecError> {
        let output = Command::new(&self.binary).args(args).output().map_err(|source| CodecError::Spawn {
            command: self.binary.clone(),
            source,
        })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(CodecError::NonZeroExit {
                command: self.binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

impl FecCodec for Par2Cli {
    fn create(
        &self,
        source: &Path,
        parity_prefix: &Path,
        block_size: u64,
        redundancy_percent: u8,
    ) -> Result<(), CodecError> {
        let block_arg = format!("-s{block_size}");
        let redundancy_arg = format!("-r{redundancy_percent}");
        self.run(&[
            std::ffi::OsStr::new("create"),
            std::ffi::OsStr::new(&block_arg),
            std::ffi::OsStr::new(&redundancy_arg),
            parity_prefix.as_os_str(),
            source.as_os_str(),
        ])
    }

    fn verify(&self, source: &Path, parity_prefix: &Path) -> Result<bool, CodecError> {
        match self.run(&[std::ffi::OsStr::new("verify"), parity_prefix.as_os_str(), source.as_os_str()]) {
            Ok(()) => Ok(true),
            Err(CodecError::NonZeroExit { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn repair(&self, source: &Path, parity_prefix: &Path) -> Result<bool, CodecError> {
        match self.run(&[std::ffi::OsStr::new("repair"), parity_prefix.as_os_str(), source.as_os_str()]) {
            Ok(()) => Ok(true),
            Err(CodecError::NonZeroExit { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success() || !o.stdout.is_empty() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_reports_unavailable() {
        let codec = Par2Cli::new("carb-definitely-not-a-real-binary");
        assert!(!codec.is_available());
    }

    #[test]
    fn missing_binary_create_is_a_spawn_error() {
        let codec = Par2Cli::new("carb-definitely-not-a-real-binary");
        let err = codec.create(Path::new("/tmp/x"), Path::new("/tmp/x"), 4096, 10).unwrap_err();
        assert!(matches!(err, CodecError::Spawn { .. }));
    }
}
