//! Reduction dispatch
//!
//! Every public call shape converges on [`ReduceDispatcher::execute`]:
//!
//! ```text
//! execute(label, policy | count, functor, destination)
//!   1. normalize the policy            (no side effects)
//!   2. adapt the destination           (no side effects)
//!   3. begin profiling region          (if a listener is present)
//!   4. claim allocation exemption
//!   5. construct backend closure
//!   6. release allocation exemption    (always, even if 5 failed)
//!   7. execute closure
//!   8. end profiling region            (always, if 3 reported a begin)
//! ```

use crate::error::Result;
use crate::functor::ReduceFunctor;
use crate::policy::{self, ExecutionPolicy, PolicySource};
use crate::profiling::Profiler;
use crate::return_value::{ReturnDestination, ReturnValue};
use crate::runtime::{
    AllocationTracker, Backend, HostBackend, SharedAllocationTracker, TrackingExemption,
};

/// Label used when the caller supplies none
pub const DEFAULT_LABEL: &str = "No Label";

/// Dispatcher using the process-wide collaborators
pub type GlobalDispatcher = ReduceDispatcher<HostBackend, &'static SharedAllocationTracker>;

/// Orchestrates one reduction from caller arguments to backend execution
///
/// The collaborators are explicit so tests and embedders can substitute
/// their own; [`ReduceDispatcher::global`] wires the process-wide ones.
#[derive(Debug)]
pub struct ReduceDispatcher<B, T> {
    backend: B,
    tracker: T,
    profiler: Profiler,
}

impl GlobalDispatcher {
    /// Host backend, process-wide tracker and process-wide listener
    pub fn global() -> Self {
        Self::new(HostBackend, SharedAllocationTracker::global())
    }
}

impl<B: Backend, T: AllocationTracker> ReduceDispatcher<B, T> {
    /// Dispatcher over `backend` and `tracker`, reporting to the global listener
    pub fn new(backend: B, tracker: T) -> Self {
        Self {
            backend,
            tracker,
            profiler: Profiler::Global,
        }
    }

    /// Swap in a different backend
    pub fn with_backend<B2: Backend>(self, backend: B2) -> ReduceDispatcher<B2, T> {
        ReduceDispatcher {
            backend,
            tracker: self.tracker,
            profiler: self.profiler,
        }
    }

    /// Swap in a different allocation tracker
    pub fn with_tracker<T2: AllocationTracker>(self, tracker: T2) -> ReduceDispatcher<B, T2> {
        ReduceDispatcher {
            backend: self.backend,
            tracker,
            profiler: self.profiler,
        }
    }

    /// Replace the listener source
    pub fn with_profiler(mut self, profiler: Profiler) -> Self {
        self.profiler = profiler;
        self
    }

    /// The backend closures are constructed with
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The allocation tracker exempted during construction
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// The listener source
    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    /// Run one reduction
    ///
    /// Normalization and adaptation failures return before any event is
    /// reported or the tracker is touched. Errors from the backend are
    /// returned unmodified, after the exemption has been released and the
    /// profiling region closed.
    pub fn execute<'a, F>(
        &self,
        label: &str,
        source: PolicySource,
        functor: &'a F,
        dest: ReturnDestination<'a, F::Value>,
    ) -> Result<()>
    where
        F: ReduceFunctor,
    {
        let policy = policy::normalize(source, functor)?;
        let dest = ReturnValue::adapt(dest, functor)?;

        let _span = tracing::debug_span!(
            "parallel_reduce",
            label,
            len = policy.len(),
            space = %policy.space(),
            backend = self.backend.name(),
        )
        .entered();

        let region = self.profiler.begin_reduce(label, policy.len() as u64);
        if let Some(id) = region.id() {
            tracing::trace!(id, "profiling region opened");
        }

        let closure = {
            let _exemption = TrackingExemption::acquire(&self.tracker);
            self.backend.construct(functor, policy, dest)
        };
        let closure = closure.inspect_err(|err| {
            tracing::debug!(%err, "closure construction failed");
        })?;

        let result = closure.execute();
        drop(region);
        result
    }
}

/// Reduce over an explicit policy
///
/// Equivalent to [`parallel_reduce_labeled`] with [`DEFAULT_LABEL`].
pub fn parallel_reduce<'a, P, F>(
    policy: P,
    functor: &'a F,
    dest: ReturnDestination<'a, F::Value>,
) -> Result<()>
where
    P: ExecutionPolicy,
    F: ReduceFunctor,
{
    parallel_reduce_labeled(DEFAULT_LABEL, policy, functor, dest)
}

/// Reduce over an explicit policy, reporting `label` to profiling tools
pub fn parallel_reduce_labeled<'a, P, F>(
    label: &str,
    policy: P,
    functor: &'a F,
    dest: ReturnDestination<'a, F::Value>,
) -> Result<()>
where
    P: ExecutionPolicy,
    F: ReduceFunctor,
{
    GlobalDispatcher::global().execute(
        label,
        PolicySource::Explicit(policy.into_range_policy()),
        functor,
        dest,
    )
}

/// Reduce over `[0, count)` on the functor's execution space
///
/// Equivalent to [`parallel_reduce_count_labeled`] with [`DEFAULT_LABEL`].
pub fn parallel_reduce_count<'a, F>(
    count: usize,
    functor: &'a F,
    dest: ReturnDestination<'a, F::Value>,
) -> Result<()>
where
    F: ReduceFunctor,
{
    parallel_reduce_count_labeled(DEFAULT_LABEL, count, functor, dest)
}

/// Reduce over `[0, count)`, reporting `label` to profiling tools
pub fn parallel_reduce_count_labeled<'a, F>(
    label: &str,
    count: usize,
    functor: &'a F,
    dest: ReturnDestination<'a, F::Value>,
) -> Result<()>
where
    F: ReduceFunctor,
{
    GlobalDispatcher::global().execute(label, PolicySource::Count(count), functor, dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::functor::from_fn;
    use crate::policy::RangePolicy;
    use crate::reducer::{Add, Max};
    use crate::runtime::ExecutionSpace;

    fn serial_dispatcher() -> ReduceDispatcher<HostBackend, SharedAllocationTracker> {
        GlobalDispatcher::global()
            .with_tracker(SharedAllocationTracker::new())
            .with_profiler(Profiler::disabled())
    }

    #[test]
    fn test_scalar_sum() {
        let f = from_fn(|i, acc: &mut u64| *acc += i as u64).on(ExecutionSpace::Serial);
        let mut total = 0u64;
        serial_dispatcher()
            .execute("sum", 10usize.into(), &f, ReturnDestination::scalar(&mut total))
            .unwrap();
        assert_eq!(total, 45);
    }

    #[test]
    fn test_empty_domain_writes_identity() {
        let f = from_fn(|i, acc: &mut i32| *acc += i as i32).on(ExecutionSpace::Serial);
        let dispatcher = serial_dispatcher();

        let mut sum = 99;
        let mut add = Add::new(&mut sum);
        dispatcher
            .execute(DEFAULT_LABEL, 0usize.into(), &f, ReturnDestination::reducer(&mut add))
            .unwrap();
        drop(add);
        assert_eq!(sum, 0);

        let mut bound = 99;
        let mut max = Max::new(&mut bound, -40);
        dispatcher
            .execute(DEFAULT_LABEL, 0usize.into(), &f, ReturnDestination::reducer(&mut max))
            .unwrap();
        drop(max);
        assert_eq!(bound, -40);
    }

    #[test]
    fn test_exemption_released_after_dispatch() {
        let dispatcher = serial_dispatcher();
        let f = from_fn(|_, acc: &mut u8| *acc += 1).on(ExecutionSpace::Serial);
        let mut out = 0u8;
        dispatcher
            .execute("count", 5usize.into(), &f, ReturnDestination::scalar(&mut out))
            .unwrap();
        assert_eq!(out, 5);
        assert!(dispatcher.tracker().is_enabled());
        assert_eq!(dispatcher.tracker().outstanding_claims(), 0);
    }

    #[test]
    fn test_space_mismatch_fails_before_execution() {
        let dispatcher = serial_dispatcher();
        let f = from_fn(|_, acc: &mut u8| *acc += 1).on(ExecutionSpace::Threads);
        let mut out = 3u8;
        let err = dispatcher
            .execute(
                "mismatch",
                RangePolicy::on(ExecutionSpace::Serial, 0, 4).into(),
                &f,
                ReturnDestination::scalar(&mut out),
            )
            .unwrap_err();
        assert!(err.is_structural());
        assert!(matches!(err, Error::ExecutionSpaceMismatch { .. }));
        assert_eq!(out, 3);
    }
}
