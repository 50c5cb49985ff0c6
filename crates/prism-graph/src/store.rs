// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deduplicated node and edge collections for one run.
//!
//! Ordering invariant: nodes and edges keep the order they were first
//! inserted in. Merges never move an entry.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::info;

use crate::model::{Attrs, DisplayEdge, DisplayNode, Expansion, GraphSnapshot, LegendEntry};

/// Node and edge collections keyed by display id and `(from, to)`.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<DisplayNode>,
    node_index: HashMap<String, usize>,
    edges: Vec<DisplayEdge>,
    edge_index: HashMap<(String, String), usize>,
    large_graph_threshold: usize,
    large_graph_cutoff: Option<usize>,
}

impl GraphStore {
    /// Empty store recording a cutoff once more than `large_graph_threshold` nodes exist.
    pub fn new(large_graph_threshold: usize) -> Self {
        Self {
            large_graph_threshold,
            ..Self::default()
        }
    }

    /// Insert `node`, or merge it into the node with the same display id.
    ///
    /// Returns true when a new node was created.
    pub fn upsert_node(&mut self, node: DisplayNode) -> bool {
        if let Some(&idx) = self.node_index.get(&node.id) {
            merge_node(&mut self.nodes[idx], node);
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        if self.large_graph_cutoff.is_none() && self.nodes.len() > self.large_graph_threshold {
            let cutoff = self.nodes.len() - 1;
            info!(cutoff, "large graph threshold crossed");
            self.large_graph_cutoff = Some(cutoff);
        }
        true
    }

    /// Insert `edge`, or union its facets into the edge for the same pair.
    ///
    /// Existing facet values are kept. Returns true when a new edge was created.
    pub fn upsert_edge(&mut self, edge: DisplayEdge) -> bool {
        let key = (edge.from.clone(), edge.to.clone());
        if let Some(&idx) = self.edge_index.get(&key) {
            let existing = &mut self.edges[idx];
            for (facet, value) in edge.properties.facets {
                existing.properties.facets.entry(facet).or_insert(value);
            }
            return false;
        }
        self.edge_index.insert(key, self.edges.len());
        self.edges.push(edge);
        true
    }

    /// Node by display id.
    pub fn node(&self, id: &str) -> Option<&DisplayNode> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Edge by ordered pair.
    pub fn edge(&self, from: &str, to: &str) -> Option<&DisplayEdge> {
        self.edge_index
            .get(&(from.to_owned(), to.to_owned()))
            .map(|&idx| &self.edges[idx])
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node count recorded when the threshold was first exceeded.
    pub fn large_graph_cutoff(&self) -> Option<usize> {
        self.large_graph_cutoff
    }

    /// Withdraw `origin` from every node; drop nodes left without any origin
    /// together with their edges. Clears the `expanded` flag of `expanded_id`.
    ///
    /// Returns the number of nodes removed.
    pub fn remove_expansion(&mut self, origin: &Expansion, expanded_id: &str) -> usize {
        let mut orphaned = HashSet::new();
        for node in &mut self.nodes {
            if node.id == expanded_id {
                node.expanded = false;
            }
            node.expansion_parents.remove(origin);
            if node.expansion_parents.is_empty() {
                orphaned.insert(node.id.clone());
            }
        }
        if orphaned.is_empty() {
            return 0;
        }
        self.nodes.retain(|n| !orphaned.contains(&n.id));
        self.edges
            .retain(|e| !orphaned.contains(&e.from) && !orphaned.contains(&e.to));
        self.reindex();
        orphaned.len()
    }

    /// Copy out the current contents.
    pub fn export(&self, legend: Vec<LegendEntry>, remaining: usize) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            legend,
            large_graph_cutoff: self.large_graph_cutoff,
            remaining,
        }
    }

    fn reindex(&mut self) {
        self.node_index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, n)| (n.id.clone(), idx))
            .collect();
        self.edge_index = self
            .edges
            .iter()
            .enumerate()
            .map(|(idx, e)| ((e.from.clone(), e.to.clone()), idx))
            .collect();
    }
}

/// Unset values never block a later, richer value.
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

fn fill_unset(existing: &mut Attrs, incoming: Attrs) {
    for (key, value) in incoming {
        if is_unset(&value) {
            continue;
        }
        match existing.get_mut(&key) {
            Some(current) if is_unset(current) => *current = value,
            Some(_) => {}
            None => {
                existing.insert(key, value);
            }
        }
    }
}

fn merge_node(existing: &mut DisplayNode, incoming: DisplayNode) {
    fill_unset(&mut existing.properties.attrs, incoming.properties.attrs);
    fill_unset(&mut existing.properties.facets, incoming.properties.facets);
    if existing.natural_id.is_empty() {
        existing.natural_id = incoming.natural_id;
    }
    if !incoming.color.is_empty() {
        existing.color = incoming.color;
        existing.group = incoming.group;
    }
    if !incoming.label.is_empty() {
        existing.label = incoming.label;
    }
    if !incoming.name.is_empty() {
        existing.name = incoming.name;
    }
    if incoming.expanded {
        existing.expanded = true;
    }
    existing
        .expansion_parents
        .extend(incoming.expansion_parents);
}
