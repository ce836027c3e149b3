//! Serial reduction closure

use super::Accumulator;
use crate::error::Result;
use crate::functor::ReduceFunctor;
use crate::policy::RangePolicy;
use crate::return_value::ReturnValue;
use crate::runtime::ReduceClosure;

/// Reduction folded in index order on the calling thread
pub struct SerialReduce<'a, F: ReduceFunctor> {
    functor: &'a F,
    policy: RangePolicy,
    dest: ReturnValue<'a, F::Value>,
}

impl<'a, F: ReduceFunctor> SerialReduce<'a, F> {
    /// Bind a functor, domain and destination
    pub fn new(functor: &'a F, policy: RangePolicy, dest: ReturnValue<'a, F::Value>) -> Self {
        Self {
            functor,
            policy,
            dest,
        }
    }
}

impl<F: ReduceFunctor> ReduceClosure for SerialReduce<'_, F> {
    fn execute(mut self: Box<Self>) -> Result<()> {
        let mut total = {
            let acc = Accumulator::new(self.functor, self.dest.reducer(), self.dest.value_count());
            acc.fold(self.policy.range())
        };
        self.functor.finalize(&mut total);
        self.dest.store(&total)
    }
}
