// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store fake for testing without filesystem I/O.

use prism_app_core::config::{ConfigError, ConfigStore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// [`ConfigStore`] backed by a shared map, with call counters and
/// switchable failures.
///
/// Clones share state, so a test can hand one clone to a
/// [`ConfigService`](prism_app_core::ConfigService) and inspect the other.
///
/// # Example
///
/// ```
/// use prism_app_core::{ConfigService, ConsolePrefs};
/// use prism_dry_tests::InMemoryConfigStore;
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
/// ConsolePrefs::default().save(&service).unwrap();
/// assert!(store.contains_key("console"));
/// assert_eq!(store.save_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    blobs: BTreeMap<String, Vec<u8>>,
    loads: usize,
    saves: usize,
    fail_loads: bool,
    fail_saves: bool,
}

impl InMemoryConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with `key` already holding `bytes`.
    pub fn with_blob(key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.lock().blobs.insert(key.to_owned(), bytes.into());
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Make every following `load_raw` fail (or succeed again).
    pub fn set_fail_on_load(&self, fail: bool) {
        self.lock().fail_loads = fail;
    }

    /// Make every following `save_raw` fail (or succeed again).
    pub fn set_fail_on_save(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    /// `load_raw` calls so far, failed ones included.
    pub fn load_count(&self) -> usize {
        self.lock().loads
    }

    /// `save_raw` calls so far, failed ones included.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Whether anything is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().blobs.contains_key(key)
    }

    /// Stored bytes for `key` without counting a load.
    pub fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().blobs.get(key).cloned()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut inner = self.lock();
        inner.loads += 1;
        if inner.fail_loads {
            return Err(ConfigError::Other("simulated load failure".into()));
        }
        inner.blobs.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        inner.saves += 1;
        if inner.fail_saves {
            return Err(ConfigError::Other("simulated save failure".into()));
        }
        inner.blobs.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}
