// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Breadth-first traversal queue with level markers.
//!
//! Only top-level result nodes are enqueued up front; nested relations are
//! pushed by the processor as it visits each node.

use std::collections::VecDeque;

use serde_json::Value;
use tracing::trace;

use crate::model::{Expansion, ResultObject};

/// Where a traversal item was reached from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Parent display id, empty for top-level nodes.
    pub id: String,
    /// Relation (or query block) name that produced the item.
    pub relation: String,
    /// Response the item came from.
    pub expansion: Expansion,
}

/// One result node waiting to be visited.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalItem {
    /// The raw result node.
    pub node: Value,
    /// Parent link.
    pub source: Source,
    /// Index within the parent's relation array.
    pub position: usize,
}

/// Queue entry.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueItem {
    /// A node to visit.
    Visit(TraversalItem),
    /// Everything enqueued before this marker belongs to an earlier level.
    Level,
}

/// FIFO of traversal items with a count of real (non-marker) entries.
#[derive(Debug, Clone, Default)]
pub struct TraversalQueue {
    items: VecDeque<QueueItem>,
    pending: usize,
}

impl TraversalQueue {
    /// Queue holding every top-level node of `response` followed by one level marker.
    pub fn from_response(response: ResultObject, expansion: &Expansion) -> Self {
        let mut queue = Self::default();
        queue.enqueue_response(response, expansion);
        queue
    }

    /// Append every top-level node of `response`, then a level marker.
    ///
    /// Blocks are taken in sorted key order, nodes in array order. Blocks
    /// that are not arrays are skipped.
    pub fn enqueue_response(&mut self, response: ResultObject, expansion: &Expansion) {
        let mut blocks: Vec<(String, Value)> = response.into_iter().collect();
        blocks.sort_by(|a, b| a.0.cmp(&b.0));
        for (block, value) in blocks {
            let Value::Array(nodes) = value else {
                trace!(%block, "skipping non-array query block");
                continue;
            };
            for (position, node) in nodes.into_iter().enumerate() {
                self.push(TraversalItem {
                    node,
                    source: Source {
                        id: String::new(),
                        relation: block.clone(),
                        expansion: expansion.clone(),
                    },
                    position,
                });
            }
        }
        self.push_level();
    }

    /// Append a node to visit.
    pub fn push(&mut self, item: TraversalItem) {
        self.pending += 1;
        self.items.push_back(QueueItem::Visit(item));
    }

    /// Append a level marker.
    pub fn push_level(&mut self) {
        self.items.push_back(QueueItem::Level);
    }

    /// Remove the head entry.
    pub fn pop(&mut self) -> Option<QueueItem> {
        let item = self.items.pop_front()?;
        if matches!(item, QueueItem::Visit(_)) {
            self.pending -= 1;
        }
        Some(item)
    }

    /// Drop queued visits rejected by `keep`. Returns how many were dropped.
    pub fn retain_visits(&mut self, mut keep: impl FnMut(&TraversalItem) -> bool) -> usize {
        let before = self.pending;
        self.items.retain(|item| match item {
            QueueItem::Visit(visit) => keep(visit),
            QueueItem::Level => true,
        });
        self.pending = self
            .items
            .iter()
            .filter(|item| matches!(item, QueueItem::Visit(_)))
            .count();
        before - self.pending
    }

    /// Drop everything, markers included.
    pub fn clear(&mut self) {
        self.items.clear();
        self.pending = 0;
    }

    /// Real traversal items still queued.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Entries including markers.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no entry (not even a marker) is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
