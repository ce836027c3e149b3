//! Process-wide configuration overrides

use parreduce::config::{self, ReduceConfig};
use parreduce::functor::ReduceFunctor;
use parreduce::policy;
use parreduce::prelude::*;

#[test]
fn test_default_space_follows_global_config() {
    let f = from_fn(|i, acc: &mut u64| *acc += i as u64);

    let previous = config::set_global(ReduceConfig {
        default_space: ExecutionSpace::Serial,
        min_chunk_size: 16,
    });
    assert_eq!(config::default_execution_space(), ExecutionSpace::Serial);
    assert_eq!(policy::infer_execution_space(&f), ExecutionSpace::Serial);
    assert_eq!(RangePolicy::new(0, 4).space(), ExecutionSpace::Serial);

    let mut total = 0u64;
    parallel_reduce_count(100, &f, ReturnDestination::scalar(&mut total)).unwrap();
    assert_eq!(total, 4950);

    // A declared space is never overridden by the default
    let pinned = from_fn(|_, acc: &mut u64| *acc += 1).on(ExecutionSpace::Serial);
    assert_eq!(pinned.execution_space(), Some(ExecutionSpace::Serial));

    #[cfg(feature = "rayon")]
    {
        config::set_global(ReduceConfig {
            default_space: ExecutionSpace::Threads,
            min_chunk_size: 16,
        });
        assert_eq!(policy::infer_execution_space(&f), ExecutionSpace::Threads);
        assert_eq!(policy::infer_execution_space(&pinned), ExecutionSpace::Serial);

        let mut threaded = 0u64;
        parallel_reduce_count(100, &f, ReturnDestination::scalar(&mut threaded)).unwrap();
        assert_eq!(threaded, 4950);
    }

    config::set_global(previous);
}
