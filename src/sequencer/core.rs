/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Core Sequencer implementation.
//!
//! This module provides the main Sequencer struct: it assigns monotonic job
//! ids, keeps the pending queue, and runs the single-flight drain loop that
//! executes jobs one at a time and dispatches hooks after each.

use super::config::{HookFailurePolicy, SequencerConfig};
use super::error::{HookError, JobError, SequencerError};
use super::handle::JobHandle;
use super::hooks::{Hook, HookKind, HookSlots, into_hook};
use super::job::{Job, JobFailure, JobOutcome, JobTask, QueuedJob};
use super::stats::{SequencerStats, StatsCounters};
use futures::FutureExt;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{Notify, oneshot};
use tracing::{Instrument, debug, error, trace, warn};

/// Whether a drain episode is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// No drain is running; the next submission starts one.
    Idle,

    /// A drain task owns the pending queue.
    Draining,
}

/// A single-consumer sequencer that runs async jobs one at a time, in
/// submission order.
///
/// Cloning a `Sequencer` is cheap and yields another handle to the same
/// instance: same id counter, same queue, same hooks. Independent
/// sequencers share nothing.
///
/// # Examples
///
/// ```no_run
/// use job_sequencer::Sequencer;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sequencer = Sequencer::new();
/// let handle = sequencer.submit(|| async { Ok::<_, std::io::Error>(42) })?;
/// assert_eq!(handle.await?, 42);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Sequencer {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: SequencerConfig,

    /// Queue, id counter and running flag. Every check-and-set on the
    /// running flag happens under this lock, together with the queue access
    /// it depends on.
    state: Mutex<QueueState>,

    hooks: HookSlots,

    stats: StatsCounters,

    /// Signalled each time a drain episode ends.
    idle: Notify,
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: u64,
    pending: VecDeque<QueuedJob>,
    is_running: bool,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    /// Creates a new Sequencer with the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use job_sequencer::{Sequencer, SequencerState};
    ///
    /// let sequencer = Sequencer::new();
    /// assert_eq!(sequencer.state(), SequencerState::Idle);
    /// assert_eq!(sequencer.next_id(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SequencerConfig::default())
    }

    /// Creates a new Sequencer with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Name, hook failure policy and pending warning threshold
    #[must_use]
    pub fn with_config(config: SequencerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(QueueState::default()),
                hooks: HookSlots::default(),
                stats: StatsCounters::default(),
                idle: Notify::new(),
            }),
        }
    }

    /// Returns the configuration this sequencer was built with.
    #[must_use]
    pub fn config(&self) -> &SequencerConfig {
        &self.inner.config
    }

    /// Submits a job to the sequencer.
    ///
    /// The job is assigned the next id and appended to the pending queue;
    /// if the sequencer is idle a drain task is spawned on the current Tokio
    /// runtime. `operation` is invoked exactly once, by the drain loop, after
    /// every job submitted before it has finished and had its hooks run.
    ///
    /// The returned handle resolves with exactly the operation's own result.
    ///
    /// # Arguments
    ///
    /// * `operation` - Closure producing the job's future; called once
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::NoRuntime`] if called outside a Tokio
    /// runtime. Nothing is enqueued and no id is consumed in that case.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use job_sequencer::{JobError, Sequencer};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let sequencer = Sequencer::new();
    /// let failing = sequencer.submit(|| async { Err::<(), _>("nope") })?;
    /// assert_eq!(failing.await, Err(JobError::Failed("nope")));
    /// # Ok(())
    /// # }
    /// ```
    pub fn submit<F, Fut, T, E>(&self, operation: F) -> Result<JobHandle<T, E>, SequencerError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| SequencerError::NoRuntime)?;
        let (reply, receiver) = oneshot::channel();
        let task = bind_operation(operation, reply);

        let (id, pending, start_drain) = {
            let mut state = self.inner.lock_state();
            let id = state.next_id;
            state.next_id += 1;
            state
                .pending
                .push_back(QueuedJob::new(Job::new(id, nanos_since_epoch()), task));
            let start_drain = !state.is_running;
            state.is_running = true;
            (id, state.pending.len(), start_drain)
        };

        StatsCounters::incr(&self.inner.stats.submitted);
        trace!(sequencer = %self.inner.config.name, job_id = id, pending, "job submitted");
        if self.inner.config.exceeds_pending_threshold(pending) {
            warn!(sequencer = %self.inner.config.name, pending, "pending queue above threshold");
        }

        if start_drain {
            StatsCounters::incr(&self.inner.stats.drains);
            let inner = Arc::clone(&self.inner);
            let span = tracing::info_span!("sequencer_drain", name = %inner.config.name);
            runtime.spawn(inner.drain().instrument(span));
        }

        Ok(JobHandle::new(id, receiver))
    }

    /// Sets the hook fired after every job, after the resolved or rejected hook.
    ///
    /// Replaces any previous executed hook. Takes effect from the next dispatch,
    /// including for a job that is currently running.
    ///
    /// # Arguments
    ///
    /// * `hook` - Function called with the [`Job`]; its error counts as a hook failure
    pub fn set_on_executed<F, Fut>(&self, hook: F)
    where
        F: Fn(Job) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.inner.hooks.set(HookKind::Executed, Some(into_hook(hook)));
    }

    /// Sets the hook fired after a job whose operation produced a value.
    ///
    /// Replaces any previous resolved hook. Takes effect from the next dispatch,
    /// including for a job that is currently running.
    ///
    /// # Arguments
    ///
    /// * `hook` - Function called with the [`Job`]; its error counts as a hook failure
    pub fn set_on_resolved<F, Fut>(&self, hook: F)
    where
        F: Fn(Job) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.inner.hooks.set(HookKind::Resolved, Some(into_hook(hook)));
    }

    /// Sets the hook fired after a job whose operation failed.
    ///
    /// Replaces any previous rejected hook. Takes effect from the next dispatch,
    /// including for a job that is currently running.
    ///
    /// # Arguments
    ///
    /// * `hook` - Function called with the [`Job`]; its error counts as a hook failure
    pub fn set_on_rejected<F, Fut>(&self, hook: F)
    where
        F: Fn(Job) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.inner.hooks.set(HookKind::Rejected, Some(into_hook(hook)));
    }

    /// Clears the executed hook.
    pub fn clear_on_executed(&self) {
        self.inner.hooks.set(HookKind::Executed, None);
    }

    /// Clears the resolved hook.
    pub fn clear_on_resolved(&self) {
        self.inner.hooks.set(HookKind::Resolved, None);
    }

    /// Clears the rejected hook.
    pub fn clear_on_rejected(&self) {
        self.inner.hooks.set(HookKind::Rejected, None);
    }

    /// Returns the hook currently set for `kind`, if any.
    #[must_use]
    pub fn hook(&self, kind: HookKind) -> Option<Hook> {
        self.inner.hooks.get(kind)
    }

    /// Returns whether a drain episode is active.
    #[must_use]
    pub fn state(&self) -> SequencerState {
        if self.is_running() {
            SequencerState::Draining
        } else {
            SequencerState::Idle
        }
    }

    /// Returns `true` while a drain episode is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.lock_state().is_running
    }

    /// Number of jobs waiting to run. The in-flight job is not counted.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.lock_state().pending.len()
    }

    /// The id the next submission will receive.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.inner.lock_state().next_id
    }

    /// Returns a snapshot of the sequencer's counters.
    #[must_use]
    pub fn stats(&self) -> SequencerStats {
        self.inner.stats.snapshot()
    }

    /// Waits until no drain episode is active.
    ///
    /// Returns immediately if the sequencer is already idle. When it
    /// returns after a drain, that drain's last job has settled and all of
    /// its hooks have run.
    ///
    /// With [`HookFailurePolicy::Isolate`] the drain only ends once it finds
    /// the queue empty. With
    /// [`HookFailurePolicy::Halt`] a halted drain also ends here, so jobs can
    /// still be pending; check [`pending_len`](Self::pending_len) if that
    /// matters.
    pub async fn idle(&self) {
        loop {
            let mut notified = pin!(self.inner.idle.notified());
            notified.as_mut().enable();
            if !self.is_running() {
                return;
            }
            notified.await;
        }
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drains the pending queue head to tail. Only ever running once per
    /// instance: it is spawned by the submission that flipped `is_running`.
    async fn drain(self: Arc<Self>) {
        let mut guard = DrainGuard {
            inner: &self,
            armed: true,
        };
        let mut drained: u64 = 0;
        debug!("drain started");

        loop {
            let next = {
                let mut state = self.lock_state();
                match state.pending.pop_front() {
                    Some(queued) => queued,
                    None => {
                        state.is_running = false;
                        guard.armed = false;
                        break;
                    }
                }
            };

            let (job, outcome) = next.run().await;
            drained += 1;
            self.record_outcome(&job, outcome);

            if !self.dispatch_hooks(&job, outcome).await {
                let mut state = self.lock_state();
                state.is_running = false;
                guard.armed = false;
                warn!(
                    job_id = job.id,
                    pending = state.pending.len(),
                    "drain halted after hook failure"
                );
                break;
            }
        }

        self.idle.notify_waiters();
        debug!(drained, "drain finished");
    }

    fn record_outcome(&self, job: &Job, outcome: JobOutcome) {
        StatsCounters::incr(&self.stats.executed);
        match outcome {
            JobOutcome::Resolved => {
                StatsCounters::incr(&self.stats.resolved);
                trace!(job_id = job.id, "job resolved");
            }
            JobOutcome::Rejected { reason } => {
                StatsCounters::incr(&self.stats.rejected);
                trace!(job_id = job.id, %reason, "job rejected");
            }
        }
    }

    /// Fires the resolved or rejected hook, then the executed hook.
    ///
    /// Returns `false` if the drain must stop because a hook failed under
    /// [`HookFailurePolicy::Halt`].
    async fn dispatch_hooks(&self, job: &Job, outcome: JobOutcome) -> bool {
        let settled = match outcome {
            JobOutcome::Resolved => HookKind::Resolved,
            JobOutcome::Rejected { .. } => HookKind::Rejected,
        };

        let mut healthy = true;
        for kind in [settled, HookKind::Executed] {
            let Some(hook) = self.hooks.get(kind) else {
                continue;
            };
            if let Err(err) = run_hook(kind, hook, *job).await {
                StatsCounters::incr(&self.stats.hook_failures);
                warn!(error = %err, "hook failure");
                healthy = false;
            }
        }

        healthy || self.config.hook_failure_policy == HookFailurePolicy::Isolate
    }
}

/// Cleans up when a drain task is dropped mid-episode (runtime shutdown):
/// pending jobs are discarded so their handles resolve to
/// [`JobError::Dropped`], and the running flag is cleared.
struct DrainGuard<'a> {
    inner: &'a Inner,
    armed: bool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let stranded = {
            let mut state = self.inner.lock_state();
            state.is_running = false;
            std::mem::take(&mut state.pending)
        };
        if !stranded.is_empty() {
            warn!(dropped = stranded.len(), "drain cancelled, discarding pending jobs");
        }
        // Outside the lock: dropping a job runs its captured values' destructors.
        drop(stranded);
        self.inner.idle.notify_waiters();
    }
}

/// Binds `operation` to the caller's reply channel.
///
/// The operation runs in its own task so a panic surfaces as a rejected job
/// instead of tearing down the drain.
fn bind_operation<F, Fut, T, E>(
    operation: F,
    reply: oneshot::Sender<Result<T, JobError<E>>>,
) -> JobTask
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    Box::new(move |job: Job| {
        async move {
            let (result, outcome) = match tokio::spawn(async move { operation().await }).await {
                Ok(Ok(value)) => (Ok(value), JobOutcome::Resolved),
                Ok(Err(err)) => (
                    Err(JobError::Failed(err)),
                    JobOutcome::Rejected {
                        reason: JobFailure::Error,
                    },
                ),
                Err(join_error) if join_error.is_panic() => {
                    error!(job_id = job.id, "job operation panicked");
                    (
                        Err(JobError::Panicked { job_id: job.id }),
                        JobOutcome::Rejected {
                            reason: JobFailure::Panicked,
                        },
                    )
                }
                Err(_) => (
                    Err(JobError::Dropped { job_id: job.id }),
                    JobOutcome::Rejected {
                        reason: JobFailure::Cancelled,
                    },
                ),
            };
            // The submitter may have dropped its handle; the job still counts.
            let _ = reply.send(result);
            outcome
        }
        .boxed()
    })
}

/// Runs one hook in its own task and waits for it.
async fn run_hook(kind: HookKind, hook: Hook, job: Job) -> Result<(), HookError> {
    match tokio::spawn(async move { hook(job).await }).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(HookError::Failed {
            kind,
            job_id: job.id,
            error,
        }),
        Err(_) => Err(HookError::Panicked {
            kind,
            job_id: job.id,
        }),
    }
}

/// Returns the current time in nanoseconds since the Unix epoch.
#[inline]
fn nanos_since_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
