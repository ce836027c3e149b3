//! Allocation tracking and the construction-time exemption
//!
//! Allocation bookkeeping is owned by a tracker. While a backend closure is
//! being constructed the dispatcher suspends bookkeeping by claiming an
//! exemption, and resumes it as soon as construction returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Paired claim/release contract of an allocation tracker
///
/// Claims and releases always come in balanced pairs. A tracker shared
/// between threads must tolerate overlapping claims from concurrent
/// dispatches.
pub trait AllocationTracker: Send + Sync {
    /// Claim the tracker and suspend allocation bookkeeping
    fn claim_and_disable(&self);

    /// Release a previous claim and resume bookkeeping
    fn release_and_enable(&self);

    /// Check whether bookkeeping is currently active
    fn is_enabled(&self) -> bool {
        true // Default: never suspended
    }
}

impl<T: AllocationTracker + ?Sized> AllocationTracker for &T {
    fn claim_and_disable(&self) {
        (**self).claim_and_disable()
    }

    fn release_and_enable(&self) {
        (**self).release_and_enable()
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

impl<T: AllocationTracker + ?Sized> AllocationTracker for Arc<T> {
    fn claim_and_disable(&self) {
        (**self).claim_and_disable()
    }

    fn release_and_enable(&self) {
        (**self).release_and_enable()
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

/// Process-wide allocation tracker
///
/// Outstanding claims are counted, so overlapping claims from several
/// threads compose: bookkeeping resumes once the last claim is released.
#[derive(Debug, Default)]
pub struct SharedAllocationTracker {
    exemptions: AtomicUsize,
    tracked_bytes: AtomicUsize,
    exempt_bytes: AtomicUsize,
}

static GLOBAL_TRACKER: SharedAllocationTracker = SharedAllocationTracker::new();

impl SharedAllocationTracker {
    /// Create a tracker with bookkeeping enabled
    pub const fn new() -> Self {
        Self {
            exemptions: AtomicUsize::new(0),
            tracked_bytes: AtomicUsize::new(0),
            exempt_bytes: AtomicUsize::new(0),
        }
    }

    /// The tracker shared by the whole process
    pub fn global() -> &'static Self {
        &GLOBAL_TRACKER
    }

    /// Record an allocation of `size_bytes`
    ///
    /// Returns `true` if the allocation was tracked, `false` if it happened
    /// inside an exemption.
    pub fn record_allocation(&self, size_bytes: usize) -> bool {
        if self.is_enabled() {
            self.tracked_bytes.fetch_add(size_bytes, Ordering::Relaxed);
            true
        } else {
            self.exempt_bytes.fetch_add(size_bytes, Ordering::Relaxed);
            false
        }
    }

    /// Total bytes recorded while bookkeeping was active
    pub fn tracked_bytes(&self) -> usize {
        self.tracked_bytes.load(Ordering::Relaxed)
    }

    /// Total bytes recorded while an exemption was held
    pub fn exempt_bytes(&self) -> usize {
        self.exempt_bytes.load(Ordering::Relaxed)
    }

    /// Number of claims currently outstanding
    pub fn outstanding_claims(&self) -> usize {
        self.exemptions.load(Ordering::Acquire)
    }
}

impl AllocationTracker for SharedAllocationTracker {
    fn claim_and_disable(&self) {
        self.exemptions.fetch_add(1, Ordering::AcqRel);
    }

    fn release_and_enable(&self) {
        let released = self
            .exemptions
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if released.is_err() {
            tracing::warn!("allocation tracker released without an outstanding claim");
        }
    }

    fn is_enabled(&self) -> bool {
        self.outstanding_claims() == 0
    }
}

/// Scoped exemption from allocation bookkeeping
///
/// Claims the tracker on creation and releases it when dropped, so the
/// release runs on every exit path.
#[must_use = "the exemption is released as soon as the guard is dropped"]
pub struct TrackingExemption<'a, T: AllocationTracker + ?Sized> {
    tracker: &'a T,
}

impl<'a, T: AllocationTracker + ?Sized> TrackingExemption<'a, T> {
    /// Claim `tracker` until the returned guard is dropped
    pub fn acquire(tracker: &'a T) -> Self {
        tracker.claim_and_disable();
        Self { tracker }
    }
}

impl<T: AllocationTracker + ?Sized> Drop for TrackingExemption<'_, T> {
    fn drop(&mut self) {
        self.tracker.release_and_enable();
    }
}
