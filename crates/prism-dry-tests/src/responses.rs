// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Query-response builders.
//!
//! Responses are JSON objects of named blocks, each an array of result
//! nodes; relations nest as arrays under the relation name and edge facets
//! sit on the child as `relation|facet`.

use prism_graph::ResultObject;
use serde_json::{Map, Value};

/// Builder for one result node.
///
/// # Example
///
/// ```
/// use prism_dry_tests::NodeBuilder;
///
/// let bob = NodeBuilder::new("0x2").attr("name", "Bob").edge_facet("friend", "since", 2004);
/// let alice = NodeBuilder::new("0x1").attr("name", "Alice").child("friend", bob).build();
/// assert_eq!(alice["friend"][0]["friend|since"], 2004);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NodeBuilder {
    fields: Map<String, Value>,
}

impl NodeBuilder {
    /// Node with natural id `uid`.
    pub fn new(uid: &str) -> Self {
        Self::anonymous().attr("uid", uid)
    }

    /// Node without a natural id.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Set a plain attribute.
    pub fn attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_owned(), value.into());
        self
    }

    /// Set a facet on the edge that leads to this node through `relation`.
    pub fn edge_facet(self, relation: &str, facet: &str, value: impl Into<Value>) -> Self {
        self.attr(&format!("{relation}|{facet}"), value)
    }

    /// Append `child` to the `relation` array.
    pub fn child(mut self, relation: &str, child: Self) -> Self {
        let slot = self
            .fields
            .entry(relation.to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(children) => children.push(child.build()),
            other => *other = Value::Array(vec![child.build()]),
        }
        self
    }

    /// Finished result node.
    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Builder for a whole response object.
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    blocks: ResultObject,
}

impl ResponseBuilder {
    /// Empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `nodes` to the query block `name`, after any already there.
    pub fn block(mut self, name: &str, nodes: impl IntoIterator<Item = NodeBuilder>) -> Self {
        let slot = self
            .blocks
            .entry(name.to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(existing) = slot {
            existing.extend(nodes.into_iter().map(NodeBuilder::build));
        }
        self
    }

    /// Add a non-array block such as `extensions`.
    pub fn raw(mut self, name: &str, value: Value) -> Self {
        self.blocks.insert(name.to_owned(), value);
        self
    }

    /// Finished response object.
    pub fn build(self) -> ResultObject {
        self.blocks
    }
}

/// `count` unrelated nodes `0x0, 0x1, ...` in block `q`.
pub fn flat_entities(count: usize) -> ResultObject {
    ResponseBuilder::new()
        .block(
            "q",
            (0..count).map(|i| NodeBuilder::new(&format!("0x{i:x}")).attr("name", format!("n{i}"))),
        )
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_children_accumulate() {
        let node = NodeBuilder::new("0x1")
            .child("friend", NodeBuilder::new("0x2"))
            .child("friend", NodeBuilder::new("0x3"))
            .build();
        assert_eq!(node, json!({"uid": "0x1", "friend": [{"uid": "0x2"}, {"uid": "0x3"}]}));
    }

    #[test]
    fn blocks_append() {
        let r = ResponseBuilder::new()
            .block("q", [NodeBuilder::new("0x1")])
            .block("q", [NodeBuilder::anonymous().attr("count", 3)])
            .raw("extensions", json!({"latency": 1}))
            .build();
        assert_eq!(r["q"], json!([{"uid": "0x1"}, {"count": 3}]));
        assert!(r.contains_key("extensions"));
    }

    #[test]
    fn flat_entities_are_distinct() {
        let r = flat_entities(20);
        let q = r["q"].as_array().unwrap();
        assert_eq!(q.len(), 20);
        assert_eq!(q[19]["uid"], "0x13");
    }
}
