/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Caller-facing handle for a submitted job.

use super::error::JobError;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Result sent from the drain loop to the submitter.
pub(crate) type JobResult<T, E> = Result<T, JobError<E>>;

/// Future returned by [`Sequencer::submit`](super::Sequencer::submit).
///
/// Resolves with exactly the outcome of the submitted operation: its value,
/// or [`JobError::Failed`] carrying its error. Hooks never alter it.
/// Dropping the handle does not cancel the job.
#[derive(Debug)]
#[must_use = "the job runs regardless, but its result is lost if the handle is dropped"]
pub struct JobHandle<T, E> {
    id: u64,
    receiver: oneshot::Receiver<JobResult<T, E>>,
}

impl<T, E> JobHandle<T, E> {
    pub(crate) fn new(id: u64, receiver: oneshot::Receiver<JobResult<T, E>>) -> Self {
        Self { id, receiver }
    }

    /// Returns the id assigned to this job.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T, E> Future for JobHandle<T, E> {
    type Output = JobResult<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(JobError::Dropped { job_id: this.id })),
            Poll::Pending => Poll::Pending,
        }
    }
}
