/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Sequencer configuration.
//!
//! Nothing here is required: [`SequencerConfig::default()`] gives a working
//! sequencer. The configuration only tunes logging and how hook failures
//! affect the drain loop.

use serde::{Deserialize, Serialize};

/// Default name used in tracing spans when none is configured.
pub const DEFAULT_SEQUENCER_NAME: &str = "sequencer";

/// What the drain loop does when a hook returns an error or panics.
///
/// A hook failure never changes the result delivered to the job's own
/// [`JobHandle`](super::JobHandle); the policy only decides whether the
/// current drain episode keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookFailurePolicy {
    /// Log the failure and continue with the remaining hooks and jobs.
    #[default]
    Isolate,

    /// End the current drain episode once the failing job's hooks are done.
    ///
    /// Jobs still pending stay queued in order and the sequencer returns to
    /// idle; the next submission starts a fresh drain that picks them up.
    Halt,
}

/// Configuration for a [`Sequencer`](super::Sequencer).
///
/// # Examples
///
/// ```
/// use job_sequencer::sequencer::{HookFailurePolicy, SequencerConfig};
///
/// let config = SequencerConfig::default()
///     .with_name("billing")
///     .with_pending_warn_threshold(1_000);
/// assert_eq!(config.name, "billing");
/// assert_eq!(config.hook_failure_policy, HookFailurePolicy::Isolate);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Name recorded on the drain span and log lines.
    pub name: String,

    /// Behaviour of the drain loop on hook failure.
    pub hook_failure_policy: HookFailurePolicy,

    /// Log a warning whenever a submission grows the pending queue past this size.
    pub pending_warn_threshold: Option<usize>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SEQUENCER_NAME.to_string(),
            hook_failure_policy: HookFailurePolicy::default(),
            pending_warn_threshold: None,
        }
    }
}

impl SequencerConfig {
    /// Sets the sequencer name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the hook failure policy.
    #[must_use]
    pub fn with_hook_failure_policy(mut self, policy: HookFailurePolicy) -> Self {
        self.hook_failure_policy = policy;
        self
    }

    /// Sets the pending queue size above which submissions log a warning.
    #[must_use]
    pub fn with_pending_warn_threshold(mut self, threshold: usize) -> Self {
        self.pending_warn_threshold = Some(threshold);
        self
    }

    /// Returns `true` if `pending` exceeds the configured warning threshold.
    #[inline]
    #[must_use]
    pub(crate) fn exceeds_pending_threshold(&self, pending: usize) -> bool {
        self.pending_warn_threshold
            .is_some_and(|threshold| pending > threshold)
    }
}
