//! Rayon-backed reduction closure

use super::Accumulator;
use crate::config;
use crate::error::Result;
use crate::functor::ReduceFunctor;
use crate::policy::RangePolicy;
use crate::return_value::ReturnValue;
use crate::runtime::ReduceClosure;
use rayon::prelude::*;

/// Reduction split into fixed-size chunks on the rayon pool
///
/// Each chunk is folded from its own identity; partial results are joined in
/// whatever order rayon completes them.
pub struct ThreadsReduce<'a, F: ReduceFunctor> {
    functor: &'a F,
    policy: RangePolicy,
    dest: ReturnValue<'a, F::Value>,
}

impl<'a, F: ReduceFunctor> ThreadsReduce<'a, F> {
    /// Bind a functor, domain and destination
    pub fn new(functor: &'a F, policy: RangePolicy, dest: ReturnValue<'a, F::Value>) -> Self {
        Self {
            functor,
            policy,
            dest,
        }
    }

    /// Iterations per chunk
    ///
    /// An explicit policy chunk size wins; otherwise aim for four chunks per
    /// worker, never below the configured minimum. Never exceeds the domain.
    fn chunk_size(&self) -> usize {
        let len = self.policy.len().max(1);
        if let Some(chunk) = self.policy.chunk_size() {
            return chunk.clamp(1, len);
        }
        let workers = self.policy.space().concurrency().max(1);
        let target = len.div_ceil(workers.saturating_mul(4));
        target.max(config::global().min_chunk_size).clamp(1, len)
    }
}

impl<F: ReduceFunctor> ReduceClosure for ThreadsReduce<'_, F> {
    fn execute(mut self: Box<Self>) -> Result<()> {
        let chunk = self.chunk_size();
        let begin = self.policy.begin();
        let end = self.policy.end();
        let chunks = self.policy.len().div_ceil(chunk);
        tracing::trace!(chunks, chunk, "threads reduce");

        let mut total = {
            let acc = Accumulator::new(self.functor, self.dest.reducer(), self.dest.value_count());
            (0..chunks)
                .into_par_iter()
                .map(|c| {
                    let lo = begin + c * chunk;
                    let hi = lo + chunk.min(end - lo);
                    acc.fold(lo..hi)
                })
                .reduce(
                    || acc.identity(),
                    |mut left, right| {
                        acc.join(&mut left, &right);
                        left
                    },
                )
        };
        self.functor.finalize(&mut total);
        self.dest.store(&total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functor::from_fn;
    use crate::return_value::ReturnDestination;
    use crate::runtime::ExecutionSpace;

    #[test]
    fn test_chunk_size_respects_policy() {
        let f = from_fn(|_, _: &mut u32| {});
        let mut out = 0u32;
        let dest = ReturnValue::adapt(ReturnDestination::scalar(&mut out), &f).unwrap();
        let policy = RangePolicy::on(ExecutionSpace::Threads, 0, 10_000).with_chunk_size(7);
        let closure = ThreadsReduce::new(&f, policy, dest);
        assert_eq!(closure.chunk_size(), 7);
    }

    #[test]
    fn test_chunk_size_never_exceeds_domain() {
        let f = from_fn(|_, _: &mut u32| {});
        let mut out = 0u32;
        let dest = ReturnValue::adapt(ReturnDestination::scalar(&mut out), &f).unwrap();
        let policy = RangePolicy::on(ExecutionSpace::Threads, 5, 15).with_chunk_size(usize::MAX);
        let closure = ThreadsReduce::new(&f, policy, dest);
        assert_eq!(closure.chunk_size(), 10);
    }

    #[test]
    fn test_uneven_chunks_cover_domain() {
        let f = from_fn(|i, acc: &mut u64| *acc += i as u64);
        let mut out = 0u64;
        let dest = ReturnValue::adapt(ReturnDestination::scalar(&mut out), &f).unwrap();
        let policy = RangePolicy::on(ExecutionSpace::Threads, 3, 1000).with_chunk_size(64);
        Box::new(ThreadsReduce::new(&f, policy, dest)).execute().unwrap();
        assert_eq!(out, (3..1000u64).sum::<u64>());
    }

    #[test]
    fn test_huge_chunk_on_offset_range() {
        let f = from_fn(|i, acc: &mut u64| *acc += i as u64);
        let mut out = 0u64;
        let dest = ReturnValue::adapt(ReturnDestination::scalar(&mut out), &f).unwrap();
        let policy = RangePolicy::on(ExecutionSpace::Threads, 1, 10).with_chunk_size(usize::MAX);
        Box::new(ThreadsReduce::new(&f, policy, dest)).execute().unwrap();
        assert_eq!(out, 45);
    }

    #[test]
    fn test_range_ending_at_usize_max() {
        let f = from_fn(|_, acc: &mut u64| *acc += 1);
        let mut out = 0u64;
        let dest = ReturnValue::adapt(ReturnDestination::scalar(&mut out), &f).unwrap();
        let policy = RangePolicy::on(ExecutionSpace::Threads, usize::MAX - 100, usize::MAX)
            .with_chunk_size(64);
        Box::new(ThreadsReduce::new(&f, policy, dest)).execute().unwrap();
        assert_eq!(out, 100);
    }
}
