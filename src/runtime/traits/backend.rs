//! Core trait for reduction backends

use super::ReduceClosure;
use crate::error::Result;
use crate::functor::ReduceFunctor;
use crate::policy::RangePolicy;
use crate::return_value::ReturnValue;

/// Parallel-execution engine a dispatch hands off to
///
/// A backend turns a normalized policy, an adapted destination and the
/// caller's functor into a closure. Construction happens while allocation
/// bookkeeping is suspended; execution happens after it resumes.
///
/// # Example
///
/// ```ignore
/// let closure = HostBackend.construct(&functor, policy, dest)?;
/// closure.execute()?;
/// ```
pub trait Backend: Send + Sync {
    /// Human-readable name of this backend
    fn name(&self) -> &'static str;

    /// Build the closure that will run the reduction
    ///
    /// Errors returned here are propagated unmodified by the dispatcher.
    fn construct<'a, F>(
        &self,
        functor: &'a F,
        policy: RangePolicy,
        dest: ReturnValue<'a, F::Value>,
    ) -> Result<Box<dyn ReduceClosure + 'a>>
    where
        F: ReduceFunctor + 'a;
}
