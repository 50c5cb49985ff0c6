// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Prism crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`responses`] - Query-response builders (result nodes, blocks, wide fixtures)

pub mod config;
pub mod responses;

pub use config::InMemoryConfigStore;
pub use responses::{flat_entities, NodeBuilder, ResponseBuilder};
