// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Display ids: natural ids in flat mode, parent-qualified ids in tree mode.

use crate::config::DisplayMode;

/// Builds display ids according to the configured [`DisplayMode`].
#[derive(Debug, Clone)]
pub struct IdComposer {
    mode: DisplayMode,
    separator: String,
}

impl IdComposer {
    /// Composer for `mode`, joining tree ids with `separator`.
    pub fn new(mode: DisplayMode, separator: impl Into<String>) -> Self {
        Self {
            mode,
            separator: separator.into(),
        }
    }

    /// Display id of a node with `natural` id reached from `parent`.
    ///
    /// Flat mode ignores the parent so every path to an entity meets at one
    /// node. Tree mode keeps paths apart.
    pub fn display_id(&self, parent: &str, natural: &str) -> String {
        match self.mode {
            DisplayMode::Flat => natural.to_owned(),
            DisplayMode::Tree => compose(parent, natural, &self.separator),
        }
    }
}

/// Join the non-empty parts of `parent` and `natural` with `separator`.
pub fn compose(parent: &str, natural: &str, separator: &str) -> String {
    match (parent.is_empty(), natural.is_empty()) {
        (true, _) => natural.to_owned(),
        (false, true) => parent.to_owned(),
        (false, false) => format!("{parent}{separator}{natural}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_skips_empty_parts() {
        assert_eq!(compose("", "0x1", "/"), "0x1");
        assert_eq!(compose("0x1", "", "/"), "0x1");
        assert_eq!(compose("0x1", "0x2", "/"), "0x1/0x2");
        assert_eq!(compose("0x1/0x2", "0x3", "/"), "0x1/0x2/0x3");
    }

    #[test]
    fn flat_mode_ignores_parent() {
        let flat = IdComposer::new(DisplayMode::Flat, "/");
        let tree = IdComposer::new(DisplayMode::Tree, "/");
        assert_eq!(flat.display_id("0xa", "0x2"), "0x2");
        assert_eq!(tree.display_id("0xa", "0x2"), "0xa/0x2");
        assert_ne!(tree.display_id("0xa", "0x2"), tree.display_id("0xb", "0x2"));
    }
}
