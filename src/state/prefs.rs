/// Session preferences that persist across runs
///
/// Not user-configurable settings, just remembered context (currently the
/// directory the image picker last used). Stored as JSON in the user data
/// directory. Load and save take an optional base-directory override so
/// tests can point them at a temp dir.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PREFS_FILE: &str = "prefs.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Prefs {
    /// Directory the image picker opened from last time
    #[serde(default)]
    pub last_picker_dir: Option<PathBuf>,
}

impl Prefs {
    /// Load from the default location. A missing file is just defaults;
    /// an unreadable or corrupt file is defaults plus a warning for the log.
    pub fn load() -> (Self, Option<String>) {
        Self::load_from(None)
    }

    pub fn load_from(base_dir: Option<PathBuf>) -> (Self, Option<String>) {
        let Some(path) = Self::prefs_path(base_dir) else {
            return (Self::default(), None);
        };

        if !path.exists() {
            return (Self::default(), None);
        }

        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(prefs) => (prefs, None),
                Err(e) => (
                    Self::default(),
                    Some(format!("could not parse {}: {e}", path.display())),
                ),
            },
            Err(e) => (
                Self::default(),
                Some(format!("could not read {}: {e}", path.display())),
            ),
        }
    }

    /// Save to the default location. Returns a warning for the log on
    /// failure; preferences are never worth interrupting the user over.
    pub fn save(&self) -> Option<String> {
        self.save_to(None)
    }

    pub fn save_to(&self, base_dir: Option<PathBuf>) -> Option<String> {
        let Some(path) = Self::prefs_path(base_dir) else {
            return Some("no data directory available".to_string());
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return Some(format!("could not create {}: {e}", parent.display()));
            }
        }

        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(e) => return Some(format!("could not encode preferences: {e}")),
        };

        match fs::write(&path, json) {
            Ok(()) => None,
            Err(e) => Some(format!("could not write {}: {e}", path.display())),
        }
    }

    fn prefs_path(base_dir: Option<PathBuf>) -> Option<PathBuf> {
        base_dir
            .or_else(|| dirs::data_dir().map(|dir| dir.join("waymark")))
            .map(|dir| dir.join(PREFS_FILE))
    }

    /// Remember the directory a picked file came from. Paths without a
    /// parent (e.g. the filesystem root) leave the setting untouched.
    pub fn set_last_picker_dir_from_file(&mut self, file_path: &Path) {
        if let Some(parent) = file_path.parent() {
            self.last_picker_dir = Some(parent.to_path_buf());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_has_no_picker_dir() {
        assert!(Prefs::default().last_picker_dir.is_none());
    }

    #[test]
    fn set_last_picker_dir_extracts_parent() {
        let mut prefs = Prefs::default();
        prefs.set_last_picker_dir_from_file(Path::new("/home/user/photos/pier.jpg"));
        assert_eq!(
            prefs.last_picker_dir,
            Some(PathBuf::from("/home/user/photos"))
        );
    }

    #[test]
    fn set_last_picker_dir_ignores_root() {
        let mut prefs = Prefs::default();
        prefs.set_last_picker_dir_from_file(Path::new("/"));
        assert!(prefs.last_picker_dir.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().expect("create temp dir");
        let base = dir.path().to_path_buf();

        let original = Prefs {
            last_picker_dir: Some(PathBuf::from("/home/user/photos")),
        };
        assert!(original.save_to(Some(base.clone())).is_none());

        let (loaded, warning) = Prefs::load_from(Some(base));
        assert!(warning.is_none());
        assert_eq!(loaded, original);
    }

    #[test]
    fn missing_file_is_defaults_without_warning() {
        let dir = tempdir().expect("create temp dir");
        let (prefs, warning) = Prefs::load_from(Some(dir.path().to_path_buf()));
        assert!(warning.is_none());
        assert_eq!(prefs, Prefs::default());
    }

    #[test]
    fn corrupt_file_is_defaults_with_warning() {
        let dir = tempdir().expect("create temp dir");
        fs::write(dir.path().join(PREFS_FILE), "not json").expect("write file");

        let (prefs, warning) = Prefs::load_from(Some(dir.path().to_path_buf()));
        assert!(warning.is_some());
        assert_eq!(prefs, Prefs::default());
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempdir().expect("create temp dir");
        let nested = dir.path().join("nested").join("deeply");

        let prefs = Prefs::default();
        assert!(prefs.save_to(Some(nested.clone())).is_none());
        assert!(nested.join(PREFS_FILE).exists());
    }
}
