// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Console preferences persisted between sessions.

use prism_graph::GraphConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, ConfigService, ConfigStore};

/// Store key the console preferences live under.
pub const PREFS_KEY: &str = "console";

/// Everything the console remembers between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolePrefs {
    /// Engine configuration used for every new run.
    pub graph: GraphConfig,
}

impl ConsolePrefs {
    /// Load saved prefs, falling back to defaults when none are stored.
    ///
    /// Stored engine config that fails validation is an error rather than
    /// silently replaced.
    pub fn load<S: ConfigStore>(service: &ConfigService<S>) -> Result<Self, ConfigError> {
        let Some(prefs) = service.load::<Self>(PREFS_KEY)? else {
            debug!(key = PREFS_KEY, "no saved prefs; using defaults");
            return Ok(Self::default());
        };
        prefs.graph.validate()?;
        Ok(prefs)
    }

    /// Persist these prefs under [`PREFS_KEY`].
    pub fn save<S: ConfigStore>(&self, service: &ConfigService<S>) -> Result<(), ConfigError> {
        self.graph.validate()?;
        service.save(PREFS_KEY, self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use prism_graph::DisplayMode;

    #[test]
    fn partial_blob_fills_defaults() {
        let prefs: ConsolePrefs =
            serde_json::from_str(r#"{"graph": {"mode": "tree", "batch_size": 50}}"#).unwrap();
        assert_eq!(prefs.graph.mode, DisplayMode::Tree);
        assert_eq!(prefs.graph.batch_size, 50);
        assert_eq!(prefs.graph.large_graph_threshold, 1000);
        assert_eq!(prefs.graph.uid_field, "uid");
    }

    #[test]
    fn empty_object_is_default() {
        let prefs: ConsolePrefs = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, ConsolePrefs::default());
    }
}
