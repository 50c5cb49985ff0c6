// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Query-result to display-graph transformation engine.
//!
//! Takes the tree-shaped result object returned by a graph query (child
//! results nested as arrays keyed by relation name) and turns it into a
//! deduplicated, labeled, colored node/edge model a renderer can draw.
//!
//! # Design Principles
//!
//! - **Run owns everything**: queue, store, labeler and colour generator
//!   belong to one [`GraphRun`]. Concurrent runs share nothing but an epoch.
//! - **Queue, not recursion**: the result tree is walked breadth-first off an
//!   explicit queue so work can be cut into batches at any point.
//! - **Host owns time**: the engine never sleeps or spawns; a [`Scheduler`]
//!   supplied by the host decides when a suspended run resumes.
//! - **Never fails on data**: malformed input shrinks the graph, it does not
//!   abort the run. Only configuration is validated.
//!
//! # Crate Features
//!
//! - `tokio` (default): enables [`GraphRun::drive_async`].

use thiserror::Error;

pub mod aggregate;
pub mod config;
pub mod epoch;
pub mod labeler;
pub mod model;
pub mod naming;
pub mod palette;
pub mod processor;
pub mod pump;
pub mod queue;
pub mod schema;
pub mod store;
pub mod tree_id;

pub use config::{DisplayMode, GraphConfig};
pub use epoch::{RunEpoch, RunToken};
pub use labeler::{GroupStyle, Labeler};
pub use model::{
    Attrs, DisplayEdge, DisplayNode, EdgeProperties, Expansion, GraphSnapshot, Hash32,
    LegendEntry, NodeProperties, ResultObject,
};
pub use processor::{transform, GraphRun, Progress, RunState, Step};
pub use pump::{Inline, Resume, Scheduler, ThreadYield};
pub use schema::normalize_schema_response;

/// Error type for engine configuration and snapshot encoding.
///
/// Transformation itself never fails; these only arise before a run starts
/// or when a host asks for canonical bytes.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A batch size of zero would never make progress.
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
    /// Tree mode needs a separator to join parent and child ids.
    #[error("tree id separator must not be empty")]
    EmptyTreeSeparator,
    /// The node-name pattern did not compile.
    #[error("invalid name pattern `{pattern}`: {source}")]
    NamePattern {
        /// The offending pattern text.
        pattern: String,
        /// Underlying regex compile error.
        #[source]
        source: regex::Error,
    },
    /// Canonical CBOR encoding of a snapshot failed.
    #[error("canonical encoding failed: {0}")]
    Encode(String),
}
