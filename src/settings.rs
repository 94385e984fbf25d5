/// Named tuning profiles.
///
/// ## File format (`profiles.toml`):
///   ```toml
///   [profiles.floaty]
///   gravity = 0.1
///   max_jump_power = 3.0
///   ```
///
/// Each profile is a flat table of `Tuning` knobs; missing keys take the
/// defaults. The simulation never touches this store, it only receives the
/// resolved `Tuning`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Tuning;
use crate::error::SettingsError;

const PROFILES_FILE: &str = "profiles.toml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileStore {
    #[serde(default)]
    profiles: BTreeMap<String, Tuning>,
}

impl ProfileStore {
    /// A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(ProfileStore::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Result<&Tuning, SettingsError> {
        self.profiles.get(name).ok_or_else(|| SettingsError::UnknownProfile(name.to_string()))
    }

    /// Insert or overwrite.
    pub fn put(&mut self, name: &str, tuning: Tuning) {
        self.profiles.insert(name.to_string(), tuning);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.profiles.remove(name).is_some()
    }
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

/// Writable directory for profiles and the log file.
pub fn data_dir() -> PathBuf {
    // 1. Exe directory, when writable (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let test_path = parent.join(".write_test_cellbreak");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home (~/.local/share/cellbreak)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/cellbreak");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub fn profiles_path() -> PathBuf {
    data_dir().join(PROFILES_FILE)
}

// ══════════════════════════════════════════════════════════════
// One-shot helpers used by the game loop
// ══════════════════════════════════════════════════════════════

pub fn load_profile(name: &str) -> Result<Tuning, SettingsError> {
    ProfileStore::load(&profiles_path())?.get(name).cloned()
}

pub fn save_profile(name: &str, tuning: &Tuning) -> Result<(), SettingsError> {
    let path = profiles_path();
    let mut store = ProfileStore::load(&path)?;
    store.put(name, tuning.clone());
    store.save(&path)
}

pub fn delete_profile(name: &str) -> Result<bool, SettingsError> {
    let path = profiles_path();
    let mut store = ProfileStore::load(&path)?;
    let removed = store.remove(name);
    if removed {
        store.save(&path)?;
    }
    Ok(removed)
}

pub fn list_profiles() -> Result<Vec<String>, SettingsError> {
    Ok(ProfileStore::load(&profiles_path())?.names().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cellbreak-test-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(PROFILES_FILE)
    }

    #[test]
    fn missing_file_is_empty_store() {
        let path = scratch("missing");
        let _ = std::fs::remove_file(&path);
        let store = ProfileStore::load(&path).unwrap();
        assert_eq!(store.names().count(), 0);
    }

    #[test]
    fn saved_profiles_load_back() {
        let path = scratch("roundtrip");
        let mut store = ProfileStore::default();
        store.put("floaty", Tuning { gravity: 0.1, max_jump_power: 3.0, ..Tuning::default() });
        store.put("classic", Tuning::default());
        store.save(&path).unwrap();

        let loaded = ProfileStore::load(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.names().collect::<Vec<_>>(), vec!["classic", "floaty"]);
        assert_eq!(loaded.get("floaty").unwrap().gravity, 0.1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn partial_profile_fills_defaults() {
        let store: ProfileStore = toml::from_str("[profiles.heavy]\ngravity = 0.6\n").unwrap();
        let t = store.get("heavy").unwrap();
        assert_eq!(t.gravity, 0.6);
        assert_eq!(t.max_checkpoints, 5);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let store = ProfileStore::default();
        assert!(matches!(store.get("nope"), Err(SettingsError::UnknownProfile(_))));
    }

    #[test]
    fn remove_reports_presence() {
        let mut store = ProfileStore::default();
        store.put("a", Tuning::default());
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let path = scratch("corrupt");
        std::fs::write(&path, "profiles = 3 = 4").unwrap();
        assert!(matches!(ProfileStore::load(&path), Err(SettingsError::Parse(_))));
        let _ = std::fs::remove_file(&path);
    }
}
