// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scheduler port: how a host pumps a [`GraphRun`] between batches.
//!
//! The engine never owns time. At each batch boundary it hands the host a
//! [`Progress`] and the host decides whether to continue now or park the run
//! and call [`GraphRun::drive`] again later (next frame, next tick).

use tracing::{debug, instrument};

use crate::model::GraphSnapshot;
use crate::processor::{GraphRun, Progress, Step};

/// Host decision at a batch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// Process the next batch right away.
    Continue,
    /// Return to the host; the run keeps its queue and resumes on the next `drive`.
    Park,
}

/// Host-supplied pump consulted at every batch boundary.
pub trait Scheduler {
    /// Called after a batch that left work queued.
    fn resume(&mut self, progress: &Progress) -> Resume;
}

/// Never suspends. For tests and headless one-shot transforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Scheduler for Inline {
    fn resume(&mut self, _progress: &Progress) -> Resume {
        Resume::Continue
    }
}

/// Gives the OS thread away between batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadYield;

impl Scheduler for ThreadYield {
    fn resume(&mut self, _progress: &Progress) -> Resume {
        std::thread::yield_now();
        Resume::Continue
    }
}

impl<F> Scheduler for F
where
    F: FnMut(&Progress) -> Resume,
{
    fn resume(&mut self, progress: &Progress) -> Resume {
        self(progress)
    }
}

impl GraphRun {
    /// Run batches until the queue drains, the host parks, or the run is superseded.
    ///
    /// Returns the final snapshot once drained, `None` when parked or cancelled.
    #[instrument(skip_all)]
    pub fn drive<S>(&mut self, scheduler: &mut S) -> Option<GraphSnapshot>
    where
        S: Scheduler + ?Sized,
    {
        loop {
            match self.step() {
                Step::Done => return Some(self.snapshot()),
                Step::Cancelled => return None,
                Step::Yielded(progress) => {
                    debug!(
                        generation = self.token().generation(),
                        processed = progress.processed,
                        remaining = progress.remaining,
                        "batch boundary"
                    );
                    if scheduler.resume(&progress) == Resume::Park {
                        return None;
                    }
                }
            }
        }
    }

    /// Run to completion on a tokio runtime, yielding to it between batches.
    ///
    /// Returns `None` if the run was superseded.
    #[cfg(feature = "tokio")]
    #[instrument(skip_all)]
    pub async fn drive_async(&mut self) -> Option<GraphSnapshot> {
        loop {
            match self.step() {
                Step::Done => return Some(self.snapshot()),
                Step::Cancelled => return None,
                Step::Yielded(progress) => {
                    debug!(
                        generation = self.token().generation(),
                        processed = progress.processed,
                        remaining = progress.remaining,
                        "batch boundary"
                    );
                    tokio::task::yield_now().await;
                }
            }
        }
    }
}
