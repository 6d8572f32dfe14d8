//! Default storage root resolution: a platform-appropriate user data
//! directory, overridable by `HOME` per the documented configuration
//! inputs.

use std::path::PathBuf;

/// Resolve the default storage root. `HOME` (when set) wins, matching the
/// documented override; otherwise fall back to the platform data
/// directory (XDG data dir on Linux, Application Support on macOS).
#[must_use]
pub fn resolve() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        if !home.as_os_str().is_empty() {
            return home.join(".carb");
        }
    }
    dirs::data_dir().map_or_else(|| PathBuf::from(".carb"), |d| d.join("carb"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_override_wins_when_set() {
        let prev = std::env::var_os("HOME");
        std::env::set_var("HOME", "/tmp/carb-home-test");
        assert_eq!(resolve(), PathBuf::from("/tmp/carb-home-test/.carb"));
        match prev {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }
    }
}
