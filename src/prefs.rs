//! Client-local UI preferences.
//!
//! The filter surface remembers which of its sections the visitor collapsed.
//! Nothing here is ever sent to a server; the document lives next to the
//! rest of the page's local state as `.gallery-prefs.json`.
//!
//! Loading never fails: a missing, corrupt, or outdated file yields the
//! defaults (every section expanded). Bump [`PREFS_VERSION`] to discard
//! stored documents when the format changes.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the preferences file within the storage directory.
const PREFS_FILENAME: &str = ".gallery-prefs.json";

/// Version of the preferences format.
const PREFS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UiPrefs {
    pub version: u32,
    /// Section name → collapsed.
    pub collapsed: BTreeMap<String, bool>,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            version: PREFS_VERSION,
            collapsed: BTreeMap::new(),
        }
    }
}

impl UiPrefs {
    /// Load from the storage directory, falling back to defaults.
    pub fn load(dir: &Path) -> Self {
        let path = prefs_path(dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        let prefs: Self = match serde_json::from_str(&content) {
            Ok(p) => p,
            Err(e) => {
                log::debug!("ignoring unreadable prefs {}: {}", path.display(), e);
                return Self::default();
            }
        };
        if prefs.version != PREFS_VERSION {
            return Self::default();
        }
        prefs
    }

    pub fn save(&self, dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(prefs_path(dir), json)
    }

    /// Sections default to expanded.
    pub fn is_collapsed(&self, section: &str) -> bool {
        self.collapsed.get(section).copied().unwrap_or(false)
    }

    pub fn set_collapsed(&mut self, section: &str, collapsed: bool) {
        self.collapsed.insert(section.to_string(), collapsed);
    }
}

pub fn prefs_path(dir: &Path) -> PathBuf {
    dir.join(PREFS_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn sections_default_to_expanded() {
        let prefs = UiPrefs::default();
        assert!(!prefs.is_collapsed("tags"));
        assert_eq!(prefs.version, PREFS_VERSION);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let mut prefs = UiPrefs::default();
        prefs.set_collapsed("exposure", true);
        prefs.set_collapsed("tags", false);
        prefs.save(tmp.path()).unwrap();

        let loaded = UiPrefs::load(tmp.path());
        assert_eq!(loaded, prefs);
        assert!(loaded.is_collapsed("exposure"));
    }

    #[test]
    fn load_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(UiPrefs::load(tmp.path()), UiPrefs::default());
    }

    #[test]
    fn load_corrupt_json_returns_default() {
        let tmp = TempDir::new().unwrap();
        fs::write(prefs_path(tmp.path()), "{ not json").unwrap();
        assert_eq!(UiPrefs::load(tmp.path()), UiPrefs::default());
    }

    #[test]
    fn load_wrong_version_returns_default() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            prefs_path(tmp.path()),
            r#"{ "version": 99, "collapsed": { "tags": true } }"#,
        )
        .unwrap();
        let loaded = UiPrefs::load(tmp.path());
        assert!(!loaded.is_collapsed("tags"));
    }
}
