//! Instrumentation hooks
//!
//! A profiling tool observes reductions by registering a
//! [`ProfilingListener`]. Each dispatch reports a "begin" right before its
//! closure is constructed and a matching "end" once the closure has run.
//! With no listener registered, nothing is reported and nothing is paid
//! beyond a presence check.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Receiver of reduction begin/end events
pub trait ProfilingListener: Send + Sync {
    /// A reduction named `label` over `domain_size_hint` iterations starts
    ///
    /// Returns an opaque correlation id passed back to
    /// [`end_parallel_reduce`](Self::end_parallel_reduce).
    fn begin_parallel_reduce(&self, label: &str, domain_size_hint: u64) -> u64;

    /// The reduction identified by `id` finished
    fn end_parallel_reduce(&self, id: u64);
}

static GLOBAL_LISTENER: RwLock<Option<Arc<dyn ProfilingListener>>> = parking_lot::const_rwlock(None);

/// Install the process-wide listener, returning the one it replaces
pub fn register_listener(
    listener: Arc<dyn ProfilingListener>,
) -> Option<Arc<dyn ProfilingListener>> {
    tracing::debug!("profiling listener registered");
    GLOBAL_LISTENER.write().replace(listener)
}

/// Remove the process-wide listener
pub fn unregister_listener() -> Option<Arc<dyn ProfilingListener>> {
    GLOBAL_LISTENER.write().take()
}

/// Check whether a process-wide listener is registered
pub fn is_listener_registered() -> bool {
    GLOBAL_LISTENER.read().is_some()
}

/// Listener source used by a dispatcher
#[derive(Clone, Default)]
pub enum Profiler {
    /// Whatever listener is registered process-wide at dispatch time
    #[default]
    Global,
    /// A fixed listener, or none
    Local(Option<Arc<dyn ProfilingListener>>),
}

impl Profiler {
    /// Profiler that never reports
    pub fn disabled() -> Self {
        Self::Local(None)
    }

    /// Profiler reporting to `listener` only
    pub fn with_listener(listener: Arc<dyn ProfilingListener>) -> Self {
        Self::Local(Some(listener))
    }

    /// Listener to report to, if one is present
    pub fn listener(&self) -> Option<Arc<dyn ProfilingListener>> {
        match self {
            Self::Global => GLOBAL_LISTENER.read().clone(),
            Self::Local(listener) => listener.clone(),
        }
    }

    /// Report a begin event and return the region that reports the end
    pub(crate) fn begin_reduce(&self, label: &str, domain_size_hint: u64) -> ReduceRegion {
        let active = self.listener().map(|listener| {
            let id = listener.begin_parallel_reduce(label, domain_size_hint);
            (listener, id)
        });
        ReduceRegion { active }
    }
}

impl fmt::Debug for Profiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("Profiler::Global"),
            Self::Local(listener) => f
                .debug_tuple("Profiler::Local")
                .field(&listener.is_some())
                .finish(),
        }
    }
}

/// Open profiling region; reports the matching end when dropped
#[must_use = "the end event fires as soon as the region is dropped"]
pub(crate) struct ReduceRegion {
    active: Option<(Arc<dyn ProfilingListener>, u64)>,
}

impl ReduceRegion {
    /// Correlation id of the begin event, if one was reported
    pub(crate) fn id(&self) -> Option<u64> {
        self.active.as_ref().map(|(_, id)| *id)
    }
}

impl Drop for ReduceRegion {
    fn drop(&mut self) {
        if let Some((listener, id)) = self.active.take() {
            listener.end_parallel_reduce(id);
        }
    }
}
