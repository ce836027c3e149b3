//! Host backend
//!
//! Reference implementation of [`Backend`] for the execution spaces that run
//! on the host. `Serial` folds every iteration on the calling thread;
//! `Threads` splits the domain into fixed-size chunks, folds each chunk on
//! the rayon pool and joins the partial results.

mod serial;
#[cfg(feature = "rayon")]
mod threads;

pub use serial::SerialReduce;
#[cfg(feature = "rayon")]
pub use threads::ThreadsReduce;

use super::{Backend, ExecutionSpace, ReduceClosure};
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::functor::ReduceFunctor;
use crate::policy::RangePolicy;
use crate::reducer::Reducer;
use crate::return_value::ReturnValue;
use std::ops::Range;

/// Backend for host execution spaces
#[derive(Clone, Copy, Debug, Default)]
pub struct HostBackend;

impl Backend for HostBackend {
    fn name(&self) -> &'static str {
        "host"
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
        match policy.space() {
            ExecutionSpace::Serial => Ok(Box::new(SerialReduce::new(functor, policy, dest))),
            #[cfg(feature = "rayon")]
            ExecutionSpace::Threads => Ok(Box::new(ThreadsReduce::new(functor, policy, dest))),
            #[allow(unreachable_patterns)]
            space => Err(Error::UnsupportedExecutionSpace { space }),
        }
    }
}

/// Identity, fold and join for one reduction
///
/// A reducer destination overrides the functor's `init` and `join`.
pub(crate) struct Accumulator<'a, F: ReduceFunctor> {
    functor: &'a F,
    reducer: Option<&'a dyn Reducer<Value = F::Value>>,
    value_count: usize,
}

impl<'a, F: ReduceFunctor> Accumulator<'a, F> {
    pub(crate) fn new(
        functor: &'a F,
        reducer: Option<&'a dyn Reducer<Value = F::Value>>,
        value_count: usize,
    ) -> Self {
        Self {
            functor,
            reducer,
            value_count,
        }
    }

    /// A fresh partial result holding the identity
    pub(crate) fn identity(&self) -> Vec<F::Value> {
        let mut acc = vec![F::Value::zero(); self.value_count];
        match self.reducer {
            Some(reducer) => acc.iter_mut().for_each(|v| reducer.init(v)),
            None => self.functor.init(&mut acc),
        }
        acc
    }

    /// Combine `src` into `dest`
    pub(crate) fn join(&self, dest: &mut [F::Value], src: &[F::Value]) {
        match self.reducer {
            Some(reducer) => dest
                .iter_mut()
                .zip(src)
                .for_each(|(d, s)| reducer.join(d, s)),
            None => self.functor.join(dest, src),
        }
    }

    /// Apply the functor to every index of `range`, starting from the identity
    pub(crate) fn fold(&self, range: Range<usize>) -> Vec<F::Value> {
        let mut acc = self.identity();
        for i in range {
            self.functor.apply(i, &mut acc);
        }
        acc
    }
}
