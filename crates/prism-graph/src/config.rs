// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine configuration: reserved key conventions and tunables.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::GraphError;

/// Traversal items processed per cooperative batch.
pub const DEFAULT_BATCH_SIZE: usize = 200;
/// Node count whose first crossing records the large-graph cutoff.
pub const DEFAULT_LARGE_GRAPH_THRESHOLD: usize = 1000;
/// Seed for the fallback colour generator.
pub const DEFAULT_COLOR_SEED: u64 = 0x7072_6973_6d5f_6367;

/// How display ids are derived from natural ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Natural id is the display id; repeated entities collapse into one node.
    #[default]
    Flat,
    /// Display id is parent-qualified; each path gets its own node.
    Tree,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Flat or hierarchical display ids.
    pub mode: DisplayMode,
    /// Traversal items per batch before yielding to the host.
    pub batch_size: usize,
    /// Node count that triggers the large-graph cutoff hint.
    pub large_graph_threshold: usize,
    /// Separates relation and facet key in `relation|facet`.
    pub facet_delimiter: char,
    /// Natural-id field name.
    pub uid_field: String,
    /// Bare key marking an aggregate row.
    pub count_marker: String,
    /// Separator of namespaced relation names (`person.name`).
    pub namespace_separator: char,
    /// Joins parent and child ids in tree mode.
    pub tree_id_separator: String,
    /// Case-insensitive pattern picking the attribute that names a node.
    pub name_pattern: Option<String>,
    /// Width at which node labels get shortened.
    pub max_label_chars: usize,
    /// Seed for colours generated after the palette runs out.
    pub color_seed: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Flat,
            batch_size: DEFAULT_BATCH_SIZE,
            large_graph_threshold: DEFAULT_LARGE_GRAPH_THRESHOLD,
            facet_delimiter: '|',
            uid_field: "uid".into(),
            count_marker: "count".into(),
            namespace_separator: '.',
            tree_id_separator: "/".into(),
            name_pattern: Some("name".into()),
            max_label_chars: 12,
            color_seed: DEFAULT_COLOR_SEED,
        }
    }
}

impl GraphConfig {
    /// Config for hierarchical display with every other field defaulted.
    pub fn tree() -> Self {
        Self {
            mode: DisplayMode::Tree,
            ..Self::default()
        }
    }

    /// Check the config can drive a run.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.batch_size == 0 {
            return Err(GraphError::ZeroBatchSize);
        }
        if self.mode == DisplayMode::Tree && self.tree_id_separator.is_empty() {
            return Err(GraphError::EmptyTreeSeparator);
        }
        self.compile_name_pattern().map(|_| ())
    }

    /// Compile `name_pattern` case-insensitively.
    pub fn compile_name_pattern(&self) -> Result<Option<Regex>, GraphError> {
        let Some(pattern) = self.name_pattern.as_deref() else {
            return Ok(None);
        };
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Some)
            .map_err(|source| GraphError::NamePattern {
                pattern: pattern.to_owned(),
                source,
            })
    }
}
