//! Common test utilities
#![allow(dead_code)]

use parking_lot::Mutex;
use parreduce::error::{Error, Result};
use parreduce::functor::ReduceFunctor;
use parreduce::policy::RangePolicy;
use parreduce::profiling::{Profiler, ProfilingListener};
use parreduce::return_value::{DestinationKind, ReturnValue};
use parreduce::runtime::{AllocationTracker, Backend, HostBackend, ReduceClosure};
use parreduce::ReduceDispatcher;
use parreduce::dtype::DType;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Install a test-writer subscriber so `RUST_LOG` output shows up on failure
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Tracker double counting claims and releases
#[derive(Debug, Default)]
pub struct CountingTracker {
    claims: AtomicUsize,
    releases: AtomicUsize,
}

impl CountingTracker {
    pub fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl AllocationTracker for CountingTracker {
    fn claim_and_disable(&self) {
        self.claims.fetch_add(1, Ordering::SeqCst);
    }

    fn release_and_enable(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.claims() == self.releases()
    }
}

/// Listener double recording every event
#[derive(Debug, Default)]
pub struct RecordingListener {
    next_id: AtomicU64,
    pub begins: Mutex<Vec<(String, u64, u64)>>,
    pub ends: Mutex<Vec<u64>>,
}

impl RecordingListener {
    pub fn begin_count(&self) -> usize {
        self.begins.lock().len()
    }

    pub fn end_count(&self) -> usize {
        self.ends.lock().len()
    }

    /// Every begin id ended exactly once, and nothing else ended
    pub fn assert_balanced(&self) {
        let begins = self.begins.lock();
        let ends = self.ends.lock();
        assert_eq!(begins.len(), ends.len(), "unmatched profiling events");
        for (label, _, id) in begins.iter() {
            let matches = ends.iter().filter(|end| *end == id).count();
            assert_eq!(matches, 1, "begin '{label}' (id {id}) ended {matches} times");
        }
    }
}

impl ProfilingListener for RecordingListener {
    fn begin_parallel_reduce(&self, label: &str, domain_size_hint: u64) -> u64 {
        let id = 1000 + self.next_id.fetch_add(1, Ordering::SeqCst);
        self.begins
            .lock()
            .push((label.to_string(), domain_size_hint, id));
        id
    }

    fn end_parallel_reduce(&self, id: u64) {
        self.ends.lock().push(id);
    }
}

/// What a backend saw when asked to construct a closure
#[derive(Clone, Debug, PartialEq)]
pub struct Construction {
    pub policy: RangePolicy,
    pub kind: DestinationKind,
    pub dtype: DType,
    pub value_count: usize,
    pub tracking_enabled: bool,
}

/// Failure to inject into a [`RecordingBackend`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fault {
    #[default]
    None,
    Construct,
    Execute,
}

/// Backend double recording constructions and delegating to the host backend
pub struct RecordingBackend {
    tracker: Arc<CountingTracker>,
    fault: Fault,
    pub constructions: Mutex<Vec<Construction>>,
    pub executions: Arc<Mutex<Vec<bool>>>,
}

impl RecordingBackend {
    pub fn new(tracker: Arc<CountingTracker>, fault: Fault) -> Self {
        Self {
            tracker,
            fault,
            constructions: Mutex::new(Vec::new()),
            executions: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Backend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn construct<'a, F>(
        &self,
        functor: &'a F,
        policy: RangePolicy,
        dest: ReturnValue<'a, F::Value>,
    ) -> Result<Box<dyn ReduceClosure + 'a>>
    where
        F: ReduceFunctor + 'a,
    {
        self.constructions.lock().push(Construction {
            policy,
            kind: dest.kind(),
            dtype: dest.dtype(),
            value_count: dest.value_count(),
            tracking_enabled: self.tracker.is_enabled(),
        });
        if self.fault == Fault::Construct {
            return Err(Error::Backend("construct failed".to_string()));
        }
        let inner = HostBackend.construct(functor, policy, dest)?;
        Ok(Box::new(Probe {
            inner,
            tracker: self.tracker.clone(),
            fail: self.fault == Fault::Execute,
            executions: self.executions.clone(),
        }))
    }
}

struct Probe<'a> {
    inner: Box<dyn ReduceClosure + 'a>,
    tracker: Arc<CountingTracker>,
    fail: bool,
    executions: Arc<Mutex<Vec<bool>>>,
}

impl ReduceClosure for Probe<'_> {
    fn execute(self: Box<Self>) -> Result<()> {
        self.executions.lock().push(self.tracker.is_enabled());
        if self.fail {
            return Err(Error::Backend("execute failed".to_string()));
        }
        self.inner.execute()
    }
}

/// Dispatcher wired to fresh doubles
pub struct Harness {
    pub tracker: Arc<CountingTracker>,
    pub listener: Arc<RecordingListener>,
    pub dispatcher: ReduceDispatcher<RecordingBackend, Arc<CountingTracker>>,
}

impl Harness {
    pub fn new(fault: Fault) -> Self {
        init_tracing();
        let tracker = Arc::new(CountingTracker::default());
        let listener = Arc::new(RecordingListener::default());
        let backend = RecordingBackend::new(tracker.clone(), fault);
        let dispatcher = ReduceDispatcher::new(backend, tracker.clone())
            .with_profiler(Profiler::with_listener(listener.clone()));
        Self {
            tracker,
            listener,
            dispatcher,
        }
    }

    pub fn constructions(&self) -> Vec<Construction> {
        self.dispatcher.backend().constructions.lock().clone()
    }

    pub fn executions(&self) -> Vec<bool> {
        self.dispatcher.backend().executions.lock().clone()
    }
}
