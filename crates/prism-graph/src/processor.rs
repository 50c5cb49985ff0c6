// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph processor: drains the traversal queue into the store in batches.
//!
//! State machine: `Idle → Draining → (Yielded ⇄ Draining) → Done`, with
//! `Cancelled` reachable from any state once the run's token is superseded.
//! A finished run goes back to `Draining` when more work is enqueued.

use std::collections::BTreeSet;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, trace};

use crate::aggregate;
use crate::config::{DisplayMode, GraphConfig};
use crate::epoch::{RunEpoch, RunToken};
use crate::labeler::Labeler;
use crate::model::{
    DisplayEdge, DisplayNode, EdgeProperties, Expansion, GraphSnapshot, NodeProperties,
    ResultObject,
};
use crate::naming::{display_value, node_name, shorten_name};
use crate::palette::ColorGenerator;
use crate::pump::Inline;
use crate::queue::{QueueItem, Source, TraversalItem, TraversalQueue};
use crate::store::GraphStore;
use crate::tree_id::IdComposer;
use crate::GraphError;

/// Lifecycle of a [`GraphRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Created, no batch processed yet.
    Idle,
    /// Inside a batch.
    Draining,
    /// Suspended at a batch boundary.
    Yielded,
    /// Queue fully drained.
    Done,
    /// Superseded by a newer run; will not resume.
    Cancelled,
}

/// Outcome of one [`GraphRun::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A full batch was processed and work remains.
    Yielded(Progress),
    /// Nothing left to process.
    Done,
    /// The run's token was superseded; nothing was processed.
    Cancelled,
}

/// Counters reported at each batch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Traversal items visited since the run started.
    pub processed: usize,
    /// Traversal items still queued.
    pub remaining: usize,
    /// Nodes in the store.
    pub nodes: usize,
    /// Edges in the store.
    pub edges: usize,
    /// Batches that ended in a yield.
    pub batches: usize,
}

/// One transformation run: owns its queue, store, labeler and colours.
#[derive(Debug)]
pub struct GraphRun {
    config: GraphConfig,
    name_pattern: Option<Regex>,
    ids: IdComposer,
    queue: TraversalQueue,
    store: GraphStore,
    labeler: Labeler,
    token: RunToken,
    state: RunState,
    processed: usize,
    batches: usize,
    // Synthetic ids handed out so far; salts the next one.
    minted: u64,
}

impl GraphRun {
    /// Validate `config` and enqueue the top-level nodes of `response`.
    pub fn new(
        response: ResultObject,
        config: GraphConfig,
        token: RunToken,
    ) -> Result<Self, GraphError> {
        config.validate()?;
        let name_pattern = config.compile_name_pattern()?;
        Ok(Self {
            name_pattern,
            ids: IdComposer::new(config.mode, config.tree_id_separator.clone()),
            queue: TraversalQueue::from_response(response, &Expansion::Response),
            store: GraphStore::new(config.large_graph_threshold),
            labeler: Labeler::new(
                config.namespace_separator,
                ColorGenerator::new(config.color_seed),
            ),
            token,
            state: RunState::Idle,
            processed: 0,
            batches: 0,
            minted: 0,
            config,
        })
    }

    /// Queue a follow-up response, e.g. the neighbours of an expanded node.
    pub fn enqueue_response(&mut self, response: ResultObject, expansion: Expansion) {
        self.queue.enqueue_response(response, &expansion);
        if self.state == RunState::Done {
            self.state = RunState::Yielded;
        }
    }

    /// Undo an expansion of display node `id`: drop its queued work and
    /// every node only it contributed.
    pub fn collapse(&mut self, id: &str) {
        let origin = Expansion::Node(id.to_owned());
        let dropped = self
            .queue
            .retain_visits(|item| item.source.expansion != origin);
        let removed = self.store.remove_expansion(&origin, id);
        debug!(id, dropped, removed, "collapsed expansion");
    }

    /// Process at most one batch.
    pub fn step(&mut self) -> Step {
        if !self.token.is_current() {
            if self.state != RunState::Cancelled {
                info!(
                    generation = self.token.generation(),
                    "run superseded; cancelling"
                );
                self.state = RunState::Cancelled;
            }
            return Step::Cancelled;
        }
        if self.state == RunState::Done {
            return Step::Done;
        }

        self.state = RunState::Draining;
        let mut visited = 0;
        while let Some(entry) = self.queue.pop() {
            match entry {
                QueueItem::Level => {
                    if self.queue.pending() == 0 {
                        break;
                    }
                    self.queue.push_level();
                }
                QueueItem::Visit(item) => {
                    self.visit(item);
                    self.processed += 1;
                    visited += 1;
                    if visited >= self.config.batch_size {
                        self.state = RunState::Yielded;
                        self.batches += 1;
                        return Step::Yielded(self.progress());
                    }
                }
            }
        }

        self.queue.clear();
        self.state = RunState::Done;
        debug!(
            generation = self.token.generation(),
            nodes = self.store.node_count(),
            edges = self.store.edge_count(),
            "run drained"
        );
        Step::Done
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Counters as of now.
    pub fn progress(&self) -> Progress {
        Progress {
            processed: self.processed,
            remaining: self.queue.pending(),
            nodes: self.store.node_count(),
            edges: self.store.edge_count(),
            batches: self.batches,
        }
    }

    /// Token this run checks before each batch.
    pub fn token(&self) -> &RunToken {
        &self.token
    }

    /// Export nodes, edges and legend as they stand.
    pub fn snapshot(&self) -> GraphSnapshot {
        self.store
            .export(self.labeler.legend(), self.queue.pending())
    }

    fn visit(&mut self, item: TraversalItem) {
        let TraversalItem {
            node,
            mut source,
            position,
        } = item;
        let Value::Object(fields) = node else {
            trace!(relation = %source.relation, position, "skipping non-object result node");
            return;
        };

        let natural_id = natural_id(&fields, &self.config.uid_field);
        let anchored = self.anchor_expansion_root(&mut source, natural_id.as_deref());
        let display_id = match (anchored, &natural_id) {
            (Some(id), _) => id,
            (None, Some(uid)) => self.ids.display_id(&source.id, uid),
            (None, None) => {
                let synthetic = synthetic_id(&source, position, self.minted);
                self.minted += 1;
                self.ids.display_id(&source.id, &synthetic)
            }
        };

        let mut fields: Vec<(String, Value)> = fields.into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let mut properties = NodeProperties::default();
        let mut edge_facets = crate::model::Attrs::new();
        for (key, value) in fields {
            if key == self.config.uid_field {
                continue;
            }
            if let Some((relation, facet)) = split_facet(&key, self.config.facet_delimiter) {
                if relation == source.relation {
                    edge_facets.insert(facet.to_owned(), value);
                } else {
                    properties
                        .facets
                        .insert(format!("{relation}[{facet}]"), value);
                }
                continue;
            }
            match value {
                Value::Array(children) if children.first().is_some_and(Value::is_object) => {
                    self.enqueue_children(&display_id, &key, &source.expansion, children);
                }
                Value::Object(child)
                    if child
                        .get(&self.config.uid_field)
                        .is_some_and(Value::is_string) =>
                {
                    self.enqueue_children(
                        &display_id,
                        &key,
                        &source.expansion,
                        vec![Value::Object(child)],
                    );
                }
                other => {
                    properties.attrs.insert(key, other);
                }
            }
        }

        let aggregate = aggregate::detect(&properties.attrs, &self.config.count_marker);
        let group = aggregate.map_or_else(|| source.relation.clone(), |a| a.function.to_owned());
        let (label, name) = match aggregate {
            Some(agg) => (
                properties
                    .attrs
                    .get(agg.key)
                    .map(display_value)
                    .unwrap_or_default(),
                String::new(),
            ),
            None => {
                let name = node_name(&properties.attrs, self.name_pattern.as_ref());
                (shorten_name(&name, self.config.max_label_chars), name)
            }
        };
        let style = self.labeler.style_for(&group);

        let expanded = matches!(&source.expansion, Expansion::Node(id) if *id == display_id);
        self.store.upsert_node(DisplayNode {
            id: display_id.clone(),
            natural_id: natural_id.unwrap_or_default(),
            label,
            name,
            properties,
            color: style.color.clone(),
            group: group.clone(),
            expansion_parents: BTreeSet::from([source.expansion]),
            expanded,
        });

        // Top-level nodes have no parent to link from.
        if source.id.is_empty() {
            return;
        }
        self.store.upsert_edge(DisplayEdge {
            id: format!("{}-{}", source.id, display_id),
            from: source.id,
            to: display_id,
            label: group,
            color: style.color,
            properties: EdgeProperties {
                facets: edge_facets,
            },
            position,
        });
    }

    /// Tree-mode expansion roots belong under the node that was expanded.
    ///
    /// Returns the expanded node's id when the root is that node itself;
    /// otherwise re-parents `source` onto it so the root gets a qualified id
    /// and an edge. Flat mode and unknown targets are left alone.
    fn anchor_expansion_root(&self, source: &mut Source, natural: Option<&str>) -> Option<String> {
        if self.config.mode != DisplayMode::Tree || !source.id.is_empty() {
            return None;
        }
        let Expansion::Node(target) = &source.expansion else {
            return None;
        };
        let anchor = self.store.node(target)?;
        if natural.is_some_and(|uid| !anchor.natural_id.is_empty() && anchor.natural_id == uid) {
            return Some(target.clone());
        }
        source.id = target.clone();
        None
    }

    fn enqueue_children(
        &mut self,
        parent: &str,
        relation: &str,
        expansion: &Expansion,
        children: Vec<Value>,
    ) {
        for (position, child) in children.into_iter().enumerate() {
            if !child.is_object() {
                trace!(relation, position, "skipping non-object entry in relation");
                continue;
            }
            self.queue.push(TraversalItem {
                node: child,
                source: Source {
                    id: parent.to_owned(),
                    relation: relation.to_owned(),
                    expansion: expansion.clone(),
                },
                position,
            });
        }
    }
}

fn natural_id(fields: &Map<String, Value>, uid_field: &str) -> Option<String> {
    match fields.get(uid_field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `relation|facet` split. Segments after a second delimiter are ignored.
fn split_facet(key: &str, delimiter: char) -> Option<(&str, &str)> {
    let mut parts = key.split(delimiter);
    let relation = parts.next()?;
    let facet = parts.next()?;
    Some((relation, facet))
}

/// Id for a node without a natural id, unique within the run.
///
/// `ordinal` counts synthetic ids already minted, so two anonymous rows never
/// share an id even when they sit at the same place in different responses.
/// Identical inputs still produce identical ids.
fn synthetic_id(source: &Source, position: usize, ordinal: u64) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"synthetic:");
    hasher.update(source.id.as_bytes());
    hasher.update(b"\0");
    hasher.update(source.relation.as_bytes());
    hasher.update(b"\0");
    match &source.expansion {
        Expansion::Response => {
            hasher.update(b"response");
        }
        Expansion::Node(id) => {
            hasher.update(b"node:");
            hasher.update(id.as_bytes());
        }
    }
    hasher.update(b"\0");
    hasher.update(&(position as u64).to_le_bytes());
    hasher.update(&ordinal.to_le_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    format!("_:{}", hex::encode(&digest[..8]))
}

/// Transform `response` in one go, without yielding.
pub fn transform(response: ResultObject, config: GraphConfig) -> Result<GraphSnapshot, GraphError> {
    let epoch = RunEpoch::new();
    let mut run = GraphRun::new(response, config, epoch.begin())?;
    Ok(match run.drive(&mut Inline) {
        Some(snapshot) => snapshot,
        None => run.snapshot(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> ResultObject {
        match value {
            Value::Object(map) => map,
            _ => ResultObject::new(),
        }
    }

    fn run(value: Value, config: GraphConfig) -> GraphRun {
        GraphRun::new(response(value), config, RunEpoch::new().begin()).unwrap()
    }

    #[test]
    fn classifies_attrs_facets_and_children() {
        let mut r = run(
            json!({"q": [{
                "uid": "0x1",
                "name": "Alice",
                "friend": [{"uid": "0x2", "name": "Bob", "friend|close": true}],
                "name|lang": "en",
                "tags": ["a", "b"]
            }]}),
            GraphConfig::default(),
        );
        assert_eq!(r.step(), Step::Done);
        let g = r.snapshot();

        let alice = g.node("0x1").unwrap();
        assert_eq!(alice.natural_id, "0x1");
        assert!(alice.properties.attrs.get("uid").is_none());
        assert!(alice.properties.attrs.get("friend").is_none());
        assert_eq!(alice.properties.attrs["tags"], json!(["a", "b"]));
        assert_eq!(alice.properties.facets["name[lang]"], "en");
        assert_eq!(alice.label, "Alice");

        let edge = g.edge("0x1", "0x2").unwrap();
        assert_eq!(edge.id, "0x1-0x2");
        assert_eq!(edge.label, "friend");
        assert_eq!(edge.properties.facets["close"], true);
        assert!(g.node("0x2").unwrap().properties.facets.is_empty());
    }

    #[test]
    fn one_to_one_object_is_a_relation() {
        let mut r = run(
            json!({"q": [{"uid": "0x1", "owner": {"uid": "0x9", "name": "Eve"}}]}),
            GraphConfig::default(),
        );
        r.step();
        let g = r.snapshot();
        assert_eq!(g.nodes.len(), 2);
        assert!(g.edge("0x1", "0x9").is_some());
    }

    #[test]
    fn synthetic_ids_depend_on_place_origin_and_ordinal() {
        let src = Source {
            id: "0x1".into(),
            relation: "count".into(),
            expansion: Expansion::Response,
        };
        assert_eq!(synthetic_id(&src, 0, 0), synthetic_id(&src, 0, 0));
        assert_ne!(synthetic_id(&src, 0, 0), synthetic_id(&src, 1, 0));
        assert_ne!(synthetic_id(&src, 0, 0), synthetic_id(&src, 0, 1));
        let expanded = Source {
            expansion: Expansion::Node("0x1".into()),
            ..src.clone()
        };
        assert_ne!(synthetic_id(&src, 0, 0), synthetic_id(&expanded, 0, 0));
        assert!(synthetic_id(&src, 0, 0).starts_with("_:"));
        assert_eq!(synthetic_id(&src, 0, 0).len(), 18);
    }

    #[test]
    fn anonymous_rows_from_separate_responses_stay_apart() {
        let mut r = run(json!({"q": [{"count": 5}]}), GraphConfig::default());
        assert_eq!(r.step(), Step::Done);
        r.enqueue_response(response(json!({"q": [{"count": 7}]})), Expansion::Node("0x1".into()));
        r.enqueue_response(response(json!({"q": [{"count": 9}]})), Expansion::Response);
        assert_eq!(r.step(), Step::Done);

        let g = r.snapshot();
        assert_eq!(g.nodes.len(), 3);
        let mut pairs: Vec<(String, Value)> = g
            .nodes
            .iter()
            .map(|n| (n.label.clone(), n.properties.attrs["count"].clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            pairs,
            vec![
                ("5".to_owned(), json!(5)),
                ("7".to_owned(), json!(7)),
                ("9".to_owned(), json!(9)),
            ]
        );
    }

    #[test]
    fn same_parent_in_two_blocks_keeps_both_aggregates() {
        let mut r = run(
            json!({
                "a": [{"uid": "0x1", "stats": [{"count": 2}]}],
                "b": [{"uid": "0x1", "stats": [{"count": 3}]}]
            }),
            GraphConfig::default(),
        );
        assert_eq!(r.step(), Step::Done);
        let g = r.snapshot();
        assert_eq!(g.nodes.len(), 3);
        assert_eq!(g.edges.len(), 2);
    }

    #[test]
    fn facet_key_stops_at_second_delimiter() {
        assert_eq!(split_facet("friend|w|x", '|'), Some(("friend", "w")));
        assert_eq!(split_facet("friend|since", '|'), Some(("friend", "since")));
        assert_eq!(split_facet("friend", '|'), None);

        let mut r = run(
            json!({"q": [{"uid": "0x1", "friend": [{"uid": "0x2", "friend|w|x": 1}]}]}),
            GraphConfig::default(),
        );
        r.step();
        let g = r.snapshot();
        let facets = &g.edge("0x1", "0x2").unwrap().properties.facets;
        assert_eq!(facets.len(), 1);
        assert_eq!(facets["w"], 1);
    }

    #[test]
    fn batch_boundary_yields_and_resumes() {
        let nodes: Vec<Value> = (0..5).map(|i| json!({"uid": format!("0x{i}")})).collect();
        let mut r = run(
            json!({ "q": nodes }),
            GraphConfig {
                batch_size: 2,
                ..GraphConfig::default()
            },
        );
        assert_eq!(r.state(), RunState::Idle);
        let Step::Yielded(p) = r.step() else {
            unreachable!("expected a yield");
        };
        assert_eq!(p.processed, 2);
        assert_eq!(p.remaining, 3);
        assert_eq!(r.state(), RunState::Yielded);
        assert_eq!(r.snapshot().remaining, 3);
        assert!(matches!(r.step(), Step::Yielded(_)));
        assert_eq!(r.step(), Step::Done);
        assert_eq!(r.snapshot().nodes.len(), 5);
        assert_eq!(r.step(), Step::Done);
    }

    #[test]
    fn non_object_entries_are_tolerated() {
        let mut r = run(
            json!({"q": [1, "x", {"uid": "0x1", "friend": [{"uid": "0x2"}, 7]}]}),
            GraphConfig::default(),
        );
        assert_eq!(r.step(), Step::Done);
        assert_eq!(r.snapshot().nodes.len(), 2);
    }
}
