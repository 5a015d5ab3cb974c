/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # job-sequencer
//!
//! A single-consumer job sequencer for Tokio. Callers submit asynchronous
//! jobs from any task and await each job's own result, while the jobs
//! themselves run strictly one at a time, in submission order.
//!
//! The whole crate is the [`Sequencer`]: an ordered pending queue, a
//! single-flight drain loop that empties it, monotonically increasing job
//! ids, and three optional lifecycle hooks (resolved, rejected, executed).
//!
//! # Examples
//!
//! ```no_run
//! use job_sequencer::Sequencer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sequencer = Sequencer::new();
//! sequencer.set_on_executed(|job| async move {
//!     println!("job {} executed", job.id);
//!     Ok(())
//! });
//!
//! let first = sequencer.submit(|| async { Ok::<_, std::io::Error>(1) })?;
//! let second = sequencer.submit(|| async { Ok::<_, std::io::Error>(2) })?;
//! assert_eq!(first.await?, 1);
//! assert_eq!(second.await?, 2);
//! # Ok(())
//! # }
//! ```

pub mod sequencer;

pub use sequencer::{
    HookFailurePolicy, Job, JobError, JobHandle, Sequencer, SequencerConfig, SequencerError,
    SequencerState, SequencerStats,
};
