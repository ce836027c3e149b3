//! Functor capability contract
//!
//! A reduction functor contributes one iteration at a time into a partial
//! result. Beyond `apply`, everything is optional: the number of values per
//! result (needed only for array destinations), the execution space the
//! functor must run on, and custom identity, combine and finalization hooks.

use crate::dtype::Element;
use crate::runtime::ExecutionSpace;
use std::fmt;
use std::marker::PhantomData;

/// Work performed by a reduction
///
/// `acc` always holds the functor's value count of elements (one for scalar
/// destinations).
///
/// # Example
///
/// ```ignore
/// struct SumSquares;
///
/// impl ReduceFunctor for SumSquares {
///     type Value = f64;
///
///     fn apply(&self, i: usize, acc: &mut [f64]) {
///         acc[0] += (i * i) as f64;
///     }
/// }
/// ```
pub trait ReduceFunctor: Sync {
    /// Reduction element type
    type Value: Element;

    /// Contribute iteration `i` into the partial result `acc`
    fn apply(&self, i: usize, acc: &mut [Self::Value]);

    /// Number of values per result
    ///
    /// Required for array destinations; `None` means a single value.
    fn value_count(&self) -> Option<usize> {
        None
    }

    /// Execution space this functor must run on
    ///
    /// `None` lets the dispatch use the process-wide default.
    fn execution_space(&self) -> Option<ExecutionSpace> {
        None
    }

    /// Overwrite `acc` with the identity
    ///
    /// Ignored when the destination is a reducer.
    fn init(&self, acc: &mut [Self::Value]) {
        acc.fill(Self::Value::zero());
    }

    /// Combine `src` into `dest` element-wise
    ///
    /// Must be associative. Ignored when the destination is a reducer.
    /// Integer overflow follows `+`: a panic in debug builds, wrapping in
    /// release builds.
    fn join(&self, dest: &mut [Self::Value], src: &[Self::Value]) {
        for (d, s) in dest.iter_mut().zip(src) {
            *d = *d + *s;
        }
    }

    /// Last transformation of the fully combined result before it is stored
    fn finalize(&self, _acc: &mut [Self::Value]) {}
}

/// Functor built from a closure over a single value
///
/// See [`from_fn`].
pub struct FnFunctor<T, C> {
    body: C,
    space: Option<ExecutionSpace>,
    _value: PhantomData<fn() -> T>,
}

/// Build a scalar functor from `body(i, &mut acc)`
///
/// ```ignore
/// let sum = from_fn(|i, acc: &mut u64| *acc += i as u64);
/// parallel_reduce_count(100, &sum, ReturnDestination::scalar(&mut total))?;
/// ```
pub fn from_fn<T, C>(body: C) -> FnFunctor<T, C>
where
    T: Element,
    C: Fn(usize, &mut T) + Sync,
{
    FnFunctor {
        body,
        space: None,
        _value: PhantomData,
    }
}

impl<T, C> FnFunctor<T, C> {
    /// Require the functor to run on `space`
    pub fn on(mut self, space: ExecutionSpace) -> Self {
        self.space = Some(space);
        self
    }
}

impl<T, C> ReduceFunctor for FnFunctor<T, C>
where
    T: Element,
    C: Fn(usize, &mut T) + Sync,
{
    type Value = T;

    #[inline]
    fn apply(&self, i: usize, acc: &mut [T]) {
        (self.body)(i, &mut acc[0])
    }

    fn execution_space(&self) -> Option<ExecutionSpace> {
        self.space
    }
}

impl<T, C> fmt::Debug for FnFunctor<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFunctor")
            .field("space", &self.space)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Histogram;

    impl ReduceFunctor for Histogram {
        type Value = u32;

        fn apply(&self, i: usize, acc: &mut [u32]) {
            acc[i % 3] += 1;
        }

        fn value_count(&self) -> Option<usize> {
            Some(3)
        }
    }

    #[test]
    fn test_default_init_and_join() {
        let mut acc = [7u32, 8, 9];
        Histogram.init(&mut acc);
        assert_eq!(acc, [0, 0, 0]);

        for i in 0..7 {
            Histogram.apply(i, &mut acc);
        }
        let mut other = [1u32, 1, 1];
        Histogram.join(&mut other, &acc);
        assert_eq!(other, [4, 3, 3]);
    }

    #[test]
    fn test_from_fn_declarations() {
        let f = from_fn(|i, acc: &mut f64| *acc += i as f64);
        assert_eq!(f.value_count(), None);
        assert_eq!(f.execution_space(), None);

        let f = f.on(ExecutionSpace::Serial);
        assert_eq!(f.execution_space(), Some(ExecutionSpace::Serial));

        let mut acc = [0.5f64];
        f.apply(3, &mut acc);
        assert_eq!(acc, [3.5]);
    }
}
