/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Job types.
//!
//! A [`Job`] is the identity of one submitted unit of work. The operation
//! itself lives in an internal queued entry and is consumed exactly once by
//! the drain loop; hooks only ever see the [`Job`].

use futures::future::BoxFuture;
use std::fmt;

/// One submitted unit of work, as seen by hooks.
///
/// # Examples
///
/// ```
/// use job_sequencer::sequencer::Job;
///
/// let job = Job::new(7, 1_234_567_890);
/// assert_eq!(job.id, 7);
/// assert_eq!(job.to_string(), "job #7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Job {
    /// Monotonically increasing id, starting at 0 for each sequencer.
    pub id: u64,

    /// Nanosecond timestamp when the job was submitted.
    pub submitted_at_ns: u64,
}

impl Job {
    /// Creates a new job.
    #[must_use]
    pub fn new(id: u64, submitted_at_ns: u64) -> Self {
        Self {
            id,
            submitted_at_ns,
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job #{}", self.id)
    }
}

/// Why a job's operation did not produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFailure {
    /// The operation returned an error.
    Error,

    /// The operation panicked.
    Panicked,

    /// The operation was cancelled before it settled (runtime shutdown).
    Cancelled,
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Panicked => write!(f, "panicked"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Settlement of a job's operation, as seen by the drain loop.
///
/// The caller's value or error travels on its own channel; the loop only
/// needs to know which hook to route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The operation produced a value.
    Resolved,

    /// The operation failed.
    Rejected {
        /// What kind of failure occurred.
        reason: JobFailure,
    },
}

impl JobOutcome {
    /// Returns `true` if the job resolved.
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Returns `true` if the job was rejected.
    #[inline]
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Bound operation of a queued job. Runs the caller's operation, settles the
/// caller's handle and reports the outcome to the loop.
pub(crate) type JobTask = Box<dyn FnOnce(Job) -> BoxFuture<'static, JobOutcome> + Send>;

/// Entry of the pending queue.
pub(crate) struct QueuedJob {
    pub(crate) job: Job,
    pub(crate) task: JobTask,
}

impl QueuedJob {
    pub(crate) fn new(job: Job, task: JobTask) -> Self {
        Self { job, task }
    }

    /// Consumes the entry, invoking its operation exactly once.
    pub(crate) async fn run(self) -> (Job, JobOutcome) {
        let Self { job, task } = self;
        let outcome = task(job).await;
        (job, outcome)
    }
}

impl fmt::Debug for QueuedJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedJob").field("job", &self.job).finish()
    }
}
