/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Error types for the Sequencer.

use super::hooks::HookKind;
use thiserror::Error;

/// Errors that can occur when submitting to the Sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SequencerError {
    /// `submit` was called outside a Tokio runtime, so no drain could run.
    #[error("no tokio runtime is available to drive the sequencer")]
    NoRuntime,
}

/// Error delivered to a [`JobHandle`](super::JobHandle) when its job did not
/// produce a value.
///
/// # Examples
///
/// ```
/// use job_sequencer::JobError;
///
/// let error: JobError<&str> = JobError::Failed("boom");
/// assert!(error.is_failed());
/// assert_eq!(error.into_failure(), Some("boom"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError<E> {
    /// The operation returned this error.
    #[error("job failed: {0}")]
    Failed(E),

    /// The operation panicked.
    #[error("job {job_id} panicked")]
    Panicked {
        /// Id of the job.
        job_id: u64,
    },

    /// The job was discarded before it settled, e.g. the runtime shut down.
    #[error("job {job_id} was dropped before it settled")]
    Dropped {
        /// Id of the job.
        job_id: u64,
    },
}

impl<E> JobError<E> {
    /// Returns `true` if the operation itself returned an error.
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the operation's own error, if that is what happened.
    #[must_use]
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// A hook returned an error or panicked.
///
/// Hook failures are never delivered to job handles; the drain loop logs
/// them and applies the configured [`HookFailurePolicy`](super::HookFailurePolicy).
#[derive(Debug, Error)]
pub enum HookError {
    /// The hook returned an error.
    #[error("{kind} hook failed for job {job_id}: {error:#}")]
    Failed {
        /// Which hook failed.
        kind: HookKind,
        /// Id of the job the hook was invoked for.
        job_id: u64,
        /// The hook's error.
        error: anyhow::Error,
    },

    /// The hook panicked.
    #[error("{kind} hook panicked for job {job_id}")]
    Panicked {
        /// Which hook panicked.
        kind: HookKind,
        /// Id of the job the hook was invoked for.
        job_id: u64,
    },
}

impl HookError {
    /// Returns the kind of hook that failed.
    #[must_use]
    pub fn kind(&self) -> HookKind {
        match self {
            Self::Failed { kind, .. } | Self::Panicked { kind, .. } => *kind,
        }
    }
}
