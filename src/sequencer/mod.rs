/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Sequencer module for strictly ordered execution of async jobs.
//!
//! This module provides a [`Sequencer`] that accepts asynchronous jobs from
//! any number of tasks and runs them one at a time, in the exact order they
//! were submitted. Each submission is tied to its own [`JobHandle`], which
//! resolves with that job's value or error and nothing else.
//!
//! # Architecture
//!
//! - Every submission is assigned a monotonic id starting at 0
//! - Jobs wait in a FIFO pending queue guarded by a single mutex
//! - Whenever the sequencer is idle, a submission spawns one drain task that
//!   empties the queue head to tail, then returns the sequencer to idle
//! - Results are returned to callers via oneshot channels
//! - After each job settles, the resolved or rejected hook fires, then the
//!   executed hook, before the next job starts
//!
//! # Examples
//!
//! ```no_run
//! use job_sequencer::sequencer::{Sequencer, SequencerConfig, HookFailurePolicy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sequencer = Sequencer::with_config(
//!     SequencerConfig::default()
//!         .with_name("uploads")
//!         .with_hook_failure_policy(HookFailurePolicy::Isolate),
//! );
//!
//! sequencer.set_on_rejected(|job| async move {
//!     eprintln!("job {} failed", job.id);
//!     Ok(())
//! });
//!
//! let handle = sequencer.submit(|| async { Ok::<_, std::io::Error>("done") })?;
//! assert_eq!(handle.id(), 0);
//! assert_eq!(handle.await?, "done");
//!
//! // Wait until the drain episode (and its hooks) has finished.
//! sequencer.idle().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod handle;
pub mod hooks;
pub mod job;
pub mod stats;

#[cfg(test)]
mod tests;

// Re-export main types
pub use config::{HookFailurePolicy, SequencerConfig};
pub use self::core::{Sequencer, SequencerState};
pub use error::{HookError, JobError, SequencerError};
pub use handle::JobHandle;
pub use hooks::{Hook, HookKind};
pub use job::{Job, JobFailure, JobOutcome};
pub use stats::SequencerStats;
