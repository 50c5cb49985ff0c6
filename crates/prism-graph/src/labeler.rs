// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Short label and colour per relation name.
//!
//! Labels are the shortest prefix of the relation name not already owned by
//! another relation. Namespaced names (`person.name`) combine the first
//! character of each side (`pn`) before growing. Colours are drawn once per
//! relation from the run's [`ColorGenerator`].

use std::collections::HashMap;

use crate::model::LegendEntry;
use crate::palette::ColorGenerator;

/// Label and colour assigned to one relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStyle {
    /// Relation (or aggregate function) name.
    pub relation: String,
    /// Short label.
    pub label: String,
    /// `#rrggbb` colour.
    pub color: String,
}

/// Assigns and remembers a [`GroupStyle`] per relation for one run.
#[derive(Debug, Clone)]
pub struct Labeler {
    namespace_separator: char,
    colors: ColorGenerator,
    by_relation: HashMap<String, usize>,
    assigned: Vec<GroupStyle>,
    // label -> relation that owns it
    owners: HashMap<String, String>,
}

impl Labeler {
    /// Empty labeler drawing colours from `colors`.
    pub fn new(namespace_separator: char, colors: ColorGenerator) -> Self {
        Self {
            namespace_separator,
            colors,
            by_relation: HashMap::new(),
            assigned: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Style for `relation`, assigning one on first sight.
    pub fn style_for(&mut self, relation: &str) -> GroupStyle {
        if let Some(&idx) = self.by_relation.get(relation) {
            return self.assigned[idx].clone();
        }
        let label = self.pick_label(relation);
        let style = GroupStyle {
            relation: relation.to_owned(),
            label: label.clone(),
            color: self.colors.next_color(),
        };
        self.owners.insert(label, relation.to_owned());
        self.by_relation
            .insert(relation.to_owned(), self.assigned.len());
        self.assigned.push(style.clone());
        style
    }

    /// Legend rows in first-encounter order.
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.assigned
            .iter()
            .map(|s| LegendEntry {
                relation: s.relation.clone(),
                label: s.label.clone(),
                color: s.color.clone(),
            })
            .collect()
    }

    /// Number of relations seen so far.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    /// True before any relation has been styled.
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    fn pick_label(&self, relation: &str) -> String {
        let chars: Vec<char> = relation.chars().collect();
        let (prefix, suffix): (&[char], Vec<char>) = match chars
            .iter()
            .position(|&c| c == self.namespace_separator)
        {
            Some(idx) if idx > 0 && idx + 1 < chars.len() => (
                &chars[..idx],
                chars[idx + 1..]
                    .iter()
                    .copied()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<Vec<char>>(),
            ),
            _ => (chars.as_slice(), Vec::new()),
        };

        // A leading symbol (e.g. `~` of a reverse edge) is never a label alone.
        let min_prefix = if prefix.first().is_some_and(|&c| !has_case(c)) {
            2
        } else {
            1
        };
        let min_suffix = usize::from(!suffix.is_empty());

        for len in 0..=prefix.len() + suffix.len() {
            for extra in 0..=1 {
                let candidate: String = prefix
                    .iter()
                    .take(min_prefix + len + extra)
                    .chain(suffix.iter().take(min_suffix + len))
                    .collect();
                if self.is_free(&candidate) {
                    return candidate;
                }
            }
        }
        relation.to_owned()
    }

    fn is_free(&self, label: &str) -> bool {
        !label.is_empty() && !self.owners.contains_key(label)
    }
}

fn has_case(c: char) -> bool {
    !c.to_uppercase().eq(c.to_lowercase())
}
