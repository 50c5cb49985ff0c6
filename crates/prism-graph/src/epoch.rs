// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Run generations. Starting a run supersedes every earlier run of the same
//! epoch; a superseded run stops at its next resume point.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic generation counter shared by the runs of one view.
#[derive(Debug, Clone, Default)]
pub struct RunEpoch {
    current: Arc<AtomicU64>,
}

impl RunEpoch {
    /// Epoch at generation 0 with no live run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation and return its token.
    pub fn begin(&self) -> RunToken {
        let generation = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        RunToken {
            generation,
            current: Arc::clone(&self.current),
        }
    }

    /// Supersede the live run without starting another. Returns the new generation.
    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Latest generation handed out.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}

/// Generation captured by a run; checked before every batch.
#[derive(Debug, Clone)]
pub struct RunToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl RunToken {
    /// Generation this token was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False once a newer generation has begun.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }
}
