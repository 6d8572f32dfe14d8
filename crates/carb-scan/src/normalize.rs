//! C1 Path Normalizer.

use carb_core::Fatal;
use std::path::{Path, PathBuf};

/// Canonicalize a user-supplied start directory: resolve it to an
/// absolute path with no trailing separator, rejecting anything that
/// does not resolve to an existing directory.
///
/// `std::fs::canonicalize` already applies the sentinel trick (joining a dummy component and taking its parent) as a side
/// effect of resolving the path to its real, separator-normalized form —
/// `"foo/"` and `"foo"` canonicalize to the same absolute path.
pub fn normalize_start_dir(path: &Path) -> Result<PathBuf, Fatal> {
    let canon = std::fs::canonicalize(path).map_err(|_| Fatal::InvalidStartDir(path.to_path_buf()))?;
    if !canon.is_dir() {
        return Err(Fatal::InvalidStartDir(path.to_path_buf()));
    }
    Ok(canon)
}

/// Compute `p`'s path relative to `s`, with no leading separator.
/// `rel(s, s)` is the empty string.
///
/// `p` must already be an absolute descendant of `s` (both normalized by
/// [`normalize_start_dir`]); callers that pass an unrelated path get an
/// empty string back rather than a panic, since this is a pure
/// presentation helper and a malformed caller should not crash a worker.
#[must_use]
pub fn rel(p: &Path, s: &Path) -> String {
    if p == s {
        return String::new();
    }
    p.strip_prefix(s).map(|r| r.to_string_lossy().into_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rejects_nonexistent_path() {
        let err = normalize_start_dir(Path::new("/does/not/exist/ever")).unwrap_err();
        assert!(matches!(err, Fatal::InvalidStartDir(_)));
    }

    #[test]
    fn rejects_a_file_path() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"x").unwrap();
        let err = normalize_start_dir(&file).unwrap_err();
        assert!(matches!(err, Fatal::InvalidStartDir(_)));
    }

    #[test]
    fn trailing_slash_normalizes_identically() {
        let dir = tempdir().unwrap();
        let with_slash = format!("{}/", dir.path().display());
        let a = normalize_start_dir(Path::new(&with_slash)).unwrap();
        let b = normalize_start_dir(dir.path()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rel_of_self_is_empty() {
        let dir = tempdir().unwrap();
        let s = normalize_start_dir(dir.path()).unwrap();
        assert_eq!(rel(&s, &s), "");
    }

    #[test]
    fn rel_has_no_leading_separator() {
        let dir = tempdir().unwrap();
        let s = normalize_start_dir(dir.path()).unwrap();
        let p = s.join("a").join("b.txt");
        assert_eq!(rel(&p, &s), "a/b.txt");
    }
}
