//! Portable and native stat capture for `file_stat1`/`file_stat2`.

use carb_core::model::{NativeStat, PortableStat};
use std::fs::Metadata;
use std::time::UNIX_EPOCH;

/// Build the portable capture (size + mtime) from already-fetched metadata.
#[must_use]
pub fn portable_stat(meta: &Metadata) -> PortableStat {
    let mtime_unix_secs = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs() as i64);
    PortableStat { size: meta.len(), mtime_unix_secs }
}

/// Build the native capture: unix ownership/permission bits where
/// available, absent (`None`) on every other target.
#[must_use]
pub fn native_stat(meta: &Metadata) -> NativeStat {
    imp::native_stat(meta)
}

#[cfg(unix)]
mod imp {
    use carb_core::model::NativeStat;
    use std::fs::Metadata;
    use std::os::unix::fs::MetadataExt;

    pub fn native_stat(meta: &Metadata) -> NativeStat {
        NativeStat { uid: Some(meta.uid()), gid: Some(meta.gid()), mode: Some(meta.mode()) }
    }
}

#[cfg(not(unix))]
mod imp {
    use carb_core::model::NativeStat;
    use std::fs::Metadata;

    pub fn native_stat(_meta: &Metadata) -> NativeStat {
        NativeStat::default()
    }
}
