// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used)]
//! Same content, same graph: key enumeration order never changes ids,
//! labels or colours.

use proptest::prelude::*;
use prism_dry_tests::{NodeBuilder, ResponseBuilder};
use prism_graph::{transform, GraphConfig, GraphSnapshot, Labeler, ResultObject};
use prism_graph::palette::ColorGenerator;
use serde_json::{Map, Value};

/// Rebuild every object with its keys inserted in reverse order.
fn reversed(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.reverse();
            let mut out = Map::new();
            for (k, v) in entries {
                out.insert(k, reversed(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(reversed).collect()),
        other => other,
    }
}

fn reversed_response(response: &ResultObject) -> ResultObject {
    match reversed(Value::Object(response.clone())) {
        Value::Object(map) => map,
        _ => ResultObject::new(),
    }
}

fn movie_response() -> ResultObject {
    ResponseBuilder::new()
        .block(
            "films",
            [NodeBuilder::new("0x10")
                .attr("name", "Blade Runner")
                .child("director", NodeBuilder::new("0x20").attr("name", "Ridley Scott"))
                .child("genre", NodeBuilder::new("0x30").attr("name", "Sci-Fi"))
                .child("genre", NodeBuilder::new("0x31").attr("name", "Noir"))
                .child("starring", NodeBuilder::anonymous().attr("count", 4))],
        )
        .block(
            "people",
            [NodeBuilder::new("0x20")
                .attr("name", "Ridley Scott")
                .child("director.film", NodeBuilder::new("0x10"))],
        )
        .build()
}

fn keys(map: &Map<String, Value>) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}

fn first_node(response: &ResultObject, block: &str) -> Map<String, Value> {
    response[block][0].as_object().cloned().unwrap_or_default()
}

fn hash(graph: &GraphSnapshot) -> [u8; 32] {
    graph.compute_hash().unwrap()
}

#[test]
fn maps_keep_insertion_order() {
    let mut map = Map::new();
    map.insert("b".into(), Value::Null);
    map.insert("a".into(), Value::Null);
    assert_eq!(keys(&map), ["b", "a"]);
}

#[test]
fn reordered_keys_export_identical_graphs() {
    let original = movie_response();
    let shuffled = reversed_response(&original);
    assert_ne!(keys(&original), keys(&shuffled));
    let (film, reordered_film) = (first_node(&original, "films"), first_node(&shuffled, "films"));
    assert_ne!(keys(&film), keys(&reordered_film));
    let mut restored = keys(&reordered_film);
    restored.reverse();
    assert_eq!(keys(&film), restored);

    let a = transform(original, GraphConfig::default()).unwrap();
    let b = transform(shuffled, GraphConfig::default()).unwrap();
    assert_eq!(a, b);
    assert_eq!(hash(&a), hash(&b));
}

#[test]
fn repeated_runs_export_identical_graphs() {
    let a = transform(movie_response(), GraphConfig::tree()).unwrap();
    let b = transform(movie_response(), GraphConfig::tree()).unwrap();
    assert_eq!(hash(&a), hash(&b));
}

#[test]
fn batch_size_does_not_change_the_result() {
    let small = GraphConfig {
        batch_size: 1,
        ..GraphConfig::default()
    };
    let a = transform(movie_response(), small).unwrap();
    let b = transform(movie_response(), GraphConfig::default()).unwrap();
    assert_eq!(hash(&a), hash(&b));
}

fn arb_response() -> impl Strategy<Value = ResultObject> {
    let relation = prop::sample::select(vec!["friend", "film", "genre", "~friend", "person.name"]);
    let child = (relation, 0u8..12, prop::option::of(0i64..100));
    let parent = (0u8..12, prop::collection::vec(child, 0..6));
    prop::collection::vec(parent, 0..8).prop_map(|parents| {
        let nodes = parents.into_iter().map(|(uid, children)| {
            children.into_iter().fold(
                NodeBuilder::new(&format!("0x{uid:x}")).attr("name", format!("n{uid}")),
                |node, (rel, child_uid, count)| {
                    let child = match count {
                        Some(n) => NodeBuilder::anonymous().attr("count", n),
                        None => NodeBuilder::new(&format!("0x{child_uid:x}")),
                    };
                    node.child(rel, child)
                },
            )
        });
        ResponseBuilder::new().block("q", nodes).build()
    })
}

proptest! {
    #[test]
    fn key_order_never_matters(response in arb_response()) {
        let shuffled = reversed_response(&response);
        let (node, reordered) = (first_node(&response, "q"), first_node(&shuffled, "q"));
        if node.len() > 1 {
            prop_assert_ne!(keys(&node), keys(&reordered));
        }
        let a = transform(response, GraphConfig::default()).unwrap();
        let b = transform(shuffled, GraphConfig::default()).unwrap();
        prop_assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn relation_keeps_its_first_style(relations in prop::collection::vec("[a-z~]{1,6}(\\.[a-z]{1,4})?", 1..40)) {
        let mut labeler = Labeler::new('.', ColorGenerator::new(11));
        let first: Vec<_> = relations.iter().map(|r| labeler.style_for(r)).collect();
        for (relation, style) in relations.iter().zip(&first) {
            prop_assert_eq!(&labeler.style_for(relation), style);
        }
        let distinct: std::collections::BTreeSet<&String> = relations.iter().collect();
        prop_assert_eq!(labeler.len(), distinct.len());
        prop_assert_eq!(labeler.legend().len(), distinct.len());
    }
}
