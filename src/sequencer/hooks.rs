/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Lifecycle hook slots.
//!
//! Each slot holds at most one hook. Slots may be set or cleared at any
//! time, including from inside a job or another hook; the drain loop reads
//! the current value at each dispatch.

use super::job::Job;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// Type alias for hook functions.
pub type Hook = Arc<dyn Fn(Job) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Identifies one of the three hook slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Fires after every job, whatever its outcome.
    Executed,

    /// Fires after a job whose operation produced a value.
    Resolved,

    /// Fires after a job whose operation failed.
    Rejected,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed => write!(f, "executed"),
            Self::Resolved => write!(f, "resolved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Wraps a closure returning a future into a [`Hook`].
pub(crate) fn into_hook<F, Fut>(hook: F) -> Hook
where
    F: Fn(Job) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |job| hook(job).boxed())
}

/// The three hook slots of a sequencer.
#[derive(Default)]
pub(crate) struct HookSlots {
    executed: RwLock<Option<Hook>>,
    resolved: RwLock<Option<Hook>>,
    rejected: RwLock<Option<Hook>>,
}

impl HookSlots {
    fn slot(&self, kind: HookKind) -> &RwLock<Option<Hook>> {
        match kind {
            HookKind::Executed => &self.executed,
            HookKind::Resolved => &self.resolved,
            HookKind::Rejected => &self.rejected,
        }
    }

    /// Replaces the hook in `kind`'s slot. `None` clears it.
    pub(crate) fn set(&self, kind: HookKind, hook: Option<Hook>) {
        *self
            .slot(kind)
            .write()
            .unwrap_or_else(PoisonError::into_inner) = hook;
    }

    /// Returns the hook currently in `kind`'s slot.
    pub(crate) fn get(&self, kind: HookKind) -> Option<Hook> {
        self.slot(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn is_set(&self, kind: HookKind) -> bool {
        self.slot(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for HookSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSlots")
            .field("executed", &self.is_set(HookKind::Executed))
            .field("resolved", &self.is_set(HookKind::Resolved))
            .field("rejected", &self.is_set(HookKind::Rejected))
            .finish()
    }
}
