// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed `ConfigStore` for Prism tools (one JSON file per key).

use directories::ProjectDirs;
use prism_app_core::config::{ConfigError, ConfigStore};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores each config key as `<key>.json` under a base directory.
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Store rooted at the platform config directory (e.g. `~/.config/prism`).
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("dev", "prism", "Prism")
            .ok_or_else(|| ConfigError::Other("could not resolve config dir".into()))?;
        Self::with_base(dirs.config_dir())
    }

    /// Store rooted at `base`, created if absent.
    pub fn with_base(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;
        debug!(base = %base.display(), "config store ready");
        Ok(Self { base })
    }

    /// Directory the JSON files live in.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(ConfigError::NotFound),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use prism_app_core::{ConfigService, ConsolePrefs, PREFS_KEY};

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsConfigStore::with_base(dir.path()).unwrap();
        assert!(matches!(store.load_raw("absent"), Err(ConfigError::NotFound)));
    }

    #[test]
    fn prefs_land_in_key_named_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = ConfigService::new(FsConfigStore::with_base(dir.path().join("nested")).unwrap());
        let mut prefs = ConsolePrefs::default();
        prefs.graph.batch_size = 7;
        prefs.save(&service).unwrap();

        let file = dir.path().join("nested").join(format!("{PREFS_KEY}.json"));
        assert!(file.is_file());
        assert_eq!(ConsolePrefs::load(&service).unwrap().graph.batch_size, 7);
    }
}
