// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Recognizes aggregate rows (`count`, `max(..)`, ...) among result nodes.

use crate::model::Attrs;

/// Function names recognized in `fn(...)`-style keys.
pub const AGGREGATE_FUNCTIONS: [&str; 4] = ["count", "max", "min", "sum"];

/// An aggregate found in a node's attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate<'a> {
    /// Function name, used as the edge label and legend key.
    pub function: &'a str,
    /// Attribute key holding the aggregate value.
    pub key: &'a str,
}

/// Find the first aggregate key in `attrs`, if any.
///
/// A key equal to `count_marker` counts as a `count` aggregate on its own.
pub fn detect<'a>(attrs: &'a Attrs, count_marker: &'a str) -> Option<Aggregate<'a>> {
    attrs.keys().find_map(|key| {
        if key == count_marker {
            return Some(Aggregate {
                function: count_marker,
                key: key.as_str(),
            });
        }
        AGGREGATE_FUNCTIONS
            .iter()
            .find(|f| key.strip_prefix(**f).is_some_and(|rest| rest.starts_with('(')))
            .map(|f| Aggregate {
                function: *f,
                key: key.as_str(),
            })
    })
}
