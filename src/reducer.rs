//! Built-in reducers
//!
//! A reducer bundles three things: a combine operation, the identity that
//! seeds every partial result, and the place the final value is written.
//! Passing a reducer as the destination of a dispatch makes its `join` and
//! `init` take precedence over the functor's own.
//!
//! # Combine requirements
//!
//! Workers may combine partial results pairwise in any order and any
//! grouping, so `join` must be associative. Results are only reproducible
//! when the combine does not depend on fold order.

use crate::dtype::Element;

/// Capability interface for reduction operators with an embedded result
///
/// Implementors are recognized as reducer destinations through
/// [`ReturnDestination::reducer`](crate::ReturnDestination::reducer); no
/// runtime inspection takes place.
pub trait Reducer: Send + Sync {
    /// Type of the reduced value
    type Value: Element;

    /// Combine `src` into `dest` in place
    fn join(&self, dest: &mut Self::Value, src: &Self::Value);

    /// Overwrite `val` with the identity of this reduction
    fn init(&self, val: &mut Self::Value);

    /// Current value of the embedded result
    fn result(&self) -> &Self::Value;

    /// Mutable access to the embedded result
    fn result_mut(&mut self) -> &mut Self::Value;
}

/// Bounded reducer seeded by a caller-supplied bound
///
/// `join` keeps the lesser of its two operands and `init` seeds partial
/// results with `min_value`.
///
/// # Precondition
///
/// `min_value` must be an identity of `join` for every value the functor can
/// produce. It is not checked: a bound that does not hold for the data yields
/// a silently wrong result.
#[derive(Debug)]
pub struct Max<'r, T: Element> {
    min_value: T,
    result: &'r mut T,
}

impl<'r, T: Element> Max<'r, T> {
    /// Create a reducer writing into `result`, seeded with `min_value`
    pub fn new(result: &'r mut T, min_value: T) -> Self {
        Self { min_value, result }
    }

    /// The identity bound this reducer seeds partial results with
    #[inline]
    pub fn min_value(&self) -> T {
        self.min_value
    }
}

impl<T: Element> Reducer for Max<'_, T> {
    type Value = T;

    #[inline]
    fn join(&self, dest: &mut T, src: &T) {
        *dest = if *dest < *src { *dest } else { *src };
    }

    #[inline]
    fn init(&self, val: &mut T) {
        *val = self.min_value;
    }

    fn result(&self) -> &T {
        self.result
    }

    fn result_mut(&mut self) -> &mut T {
        self.result
    }
}

/// Summing reducer
///
/// `join` adds in place; the identity is the value type's zero.
///
/// # Overflow
///
/// Integer sums use plain `+`: a sum that leaves the value type's range
/// panics in debug builds and wraps in release builds. Reduce into a wider
/// type when the total can exceed the range.
#[derive(Debug)]
pub struct Add<'r, T: Element> {
    result: &'r mut T,
}

impl<'r, T: Element> Add<'r, T> {
    /// Create a reducer writing into `result`
    pub fn new(result: &'r mut T) -> Self {
        Self { result }
    }
}

impl<T: Element> Reducer for Add<'_, T> {
    type Value = T;

    #[inline]
    fn join(&self, dest: &mut T, src: &T) {
        *dest = *dest + *src;
    }

    #[inline]
    fn init(&self, val: &mut T) {
        *val = T::zero();
    }

    fn result(&self) -> &T {
        self.result
    }

    fn result_mut(&mut self) -> &mut T {
        self.result
    }
}
