/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Sequencer counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time snapshot of a sequencer's counters.
///
/// All counters only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerStats {
    /// Jobs accepted by `submit`.
    pub submitted: u64,
    /// Jobs whose operation has settled.
    pub executed: u64,
    /// Jobs whose operation produced a value.
    pub resolved: u64,
    /// Jobs whose operation failed.
    pub rejected: u64,
    /// Hook invocations that returned an error or panicked.
    pub hook_failures: u64,
    /// Drain episodes started.
    pub drains: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub(crate) submitted: AtomicU64,
    pub(crate) executed: AtomicU64,
    pub(crate) resolved: AtomicU64,
    pub(crate) rejected: AtomicU64,
    pub(crate) hook_failures: AtomicU64,
    pub(crate) drains: AtomicU64,
}

impl StatsCounters {
    #[inline]
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SequencerStats {
        SequencerStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            hook_failures: self.hook_failures.load(Ordering::Relaxed),
            drains: self.drains.load(Ordering::Relaxed),
        }
    }
}
