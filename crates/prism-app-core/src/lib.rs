// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Application services shared by Prism hosts: the config storage port and
//! the persisted console preferences that wrap the engine configuration.

pub mod config;
pub mod prefs;

pub use config::{ConfigError, ConfigService, ConfigStore};
pub use prefs::{ConsolePrefs, PREFS_KEY};
