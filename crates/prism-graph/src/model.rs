// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Display-graph data model handed to renderers.
//! Pure data (nodes, edges, legend) with deterministic hashing/serialization.

use std::collections::{BTreeMap, BTreeSet};

use ciborium::ser::into_writer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::GraphError;

/// Decoded query response: block name → array of result nodes.
pub type ResultObject = serde_json::Map<String, Value>;
/// Property map with stable key order.
pub type Attrs = BTreeMap<String, Value>;
/// Blake3 digest of a canonical snapshot (32 bytes).
pub type Hash32 = [u8; 32];

/// Which response introduced a node or traversal item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Expansion {
    /// The run's initial query response.
    Response,
    /// A follow-up response fetched by expanding the given display node.
    Node(String),
}

/// Node payload split by where each key belongs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeProperties {
    /// Plain attributes (no natural id, no facet-qualified keys).
    pub attrs: Attrs,
    /// Facets of other relations, keyed `relation[facetKey]`.
    pub facets: Attrs,
}

/// Renderable node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayNode {
    /// Display id, unique within the run.
    pub id: String,
    /// Identifier found in the result node, empty when synthesized.
    pub natural_id: String,
    /// Short text drawn on the node.
    pub label: String,
    /// Full value the label was derived from.
    pub name: String,
    /// Attributes and foreign facets.
    pub properties: NodeProperties,
    /// Colour of the relation group that produced the node.
    pub color: String,
    /// Relation (or aggregate function) the node was reached through.
    pub group: String,
    /// Origins that contributed this node; empty origins mean the node is gone.
    pub expansion_parents: BTreeSet<Expansion>,
    /// True once an expansion of this very node has been merged.
    pub expanded: bool,
}

/// Edge payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeProperties {
    /// Facets carried by the relation edge itself.
    pub facets: Attrs,
}

/// Renderable edge, unique per ordered `(from, to)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayEdge {
    /// `"<from>-<to>"`.
    pub id: String,
    /// Parent display id.
    pub from: String,
    /// Child display id.
    pub to: String,
    /// Relation or aggregate function name.
    pub label: String,
    /// Colour of the relation group.
    pub color: String,
    /// Edge facets.
    pub properties: EdgeProperties,
    /// Index of the child within the parent's relation array.
    pub position: usize,
}

/// One row of the colour/label legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    /// Relation (or aggregate function) name.
    pub relation: String,
    /// Short label assigned to it.
    pub label: String,
    /// Colour assigned to it.
    pub color: String,
}

/// Exported state of a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    /// Nodes in emission order.
    pub nodes: Vec<DisplayNode>,
    /// Edges in emission order.
    pub edges: Vec<DisplayEdge>,
    /// Legend rows in first-encounter order.
    pub legend: Vec<LegendEntry>,
    /// Node count at the moment the large-graph threshold was first exceeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_graph_cutoff: Option<usize>,
    /// Traversal items still queued when the snapshot was taken.
    pub remaining: usize,
}

impl GraphSnapshot {
    /// Look up a node by display id.
    pub fn node(&self, id: &str) -> Option<&DisplayNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up the edge for an ordered pair.
    pub fn edge(&self, from: &str, to: &str) -> Option<&DisplayEdge> {
        self.edges.iter().find(|e| e.from == from && e.to == to)
    }

    /// Canonical serialization (sorted by id) for hashing/comparison.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, GraphError> {
        let mut g = self.clone();
        g.nodes.sort_by(|a, b| a.id.cmp(&b.id));
        g.edges
            .sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));
        let mut bytes = Vec::new();
        into_writer(&g, &mut bytes).map_err(|e| GraphError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    /// Compute blake3 hash of the canonical form.
    pub fn compute_hash(&self) -> Result<Hash32, GraphError> {
        Ok(blake3::hash(&self.to_canonical_bytes()?).into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn node(id: &str) -> DisplayNode {
        DisplayNode {
            id: id.into(),
            natural_id: id.into(),
            label: String::new(),
            name: String::new(),
            properties: NodeProperties::default(),
            color: "#47c0ee".into(),
            group: "q".into(),
            expansion_parents: BTreeSet::from([Expansion::Response]),
            expanded: false,
        }
    }

    #[test]
    fn canonical_hash_ignores_emission_order() {
        let a = GraphSnapshot {
            nodes: vec![node("0x1"), node("0x2")],
            ..GraphSnapshot::default()
        };
        let b = GraphSnapshot {
            nodes: vec![node("0x2"), node("0x1")],
            ..GraphSnapshot::default()
        };
        assert_eq!(a.compute_hash().unwrap(), b.compute_hash().unwrap());
    }

    #[test]
    fn cutoff_is_omitted_from_json_when_unset() {
        let json = serde_json::to_value(GraphSnapshot::default()).unwrap();
        assert!(json.get("largeGraphCutoff").is_none());
        assert_eq!(json["remaining"], 0);
    }
}
