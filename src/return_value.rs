//! Result destinations and their adaptation
//!
//! A caller can ask for a reduction's result in four ways. Each is a variant
//! of [`ReturnDestination`]; [`ReturnValue::adapt`] checks the variant against
//! the functor's declared shape and produces the single canonical form the
//! backends consume: an [`UnmanagedView`] plus, for reducers, the reducer
//! whose combine semantics replace the functor's.
//!
//! | Variant   | Canonical form                              | Element count       |
//! |-----------|---------------------------------------------|---------------------|
//! | `View`    | the caller's view, unchanged                | view length         |
//! | `Scalar`  | rank-0 view over the value                  | 1                   |
//! | `Array`   | rank-1 view over the slice                  | functor value count |
//! | `Reducer` | rank-0 view over the reducer's result field | 1                   |
//!
//! Count mismatches are reported here, before a dispatch has any side effect.

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::functor::ReduceFunctor;
use crate::reducer::Reducer;
use crate::view::UnmanagedView;
use std::fmt;

/// Where a reduction's result is written
pub enum ReturnDestination<'a, T: Element> {
    /// A single value
    Scalar(&'a mut T),
    /// One slot per functor value
    Array(&'a mut [T]),
    /// The result field embedded in a reducer
    Reducer(&'a mut dyn Reducer<Value = T>),
    /// A pre-existing multi-dimensional view
    View(UnmanagedView<'a, T>),
}

/// Category of a [`ReturnDestination`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DestinationKind {
    /// Single value
    Scalar,
    /// Slice sized by the functor's value count
    Array,
    /// Reducer result field
    Reducer,
    /// Caller-provided view
    View,
}

impl<'a, T: Element> ReturnDestination<'a, T> {
    /// Write the result into `value`
    pub fn scalar(value: &'a mut T) -> Self {
        Self::Scalar(value)
    }

    /// Write one result per functor value into `values`
    pub fn array(values: &'a mut [T]) -> Self {
        Self::Array(values)
    }

    /// Combine with `reducer`'s semantics and write into its result field
    pub fn reducer<R>(reducer: &'a mut R) -> Self
    where
        R: Reducer<Value = T> + 'a,
    {
        Self::Reducer(reducer)
    }

    /// Write the result into an existing view
    pub fn view(view: UnmanagedView<'a, T>) -> Self {
        Self::View(view)
    }

    /// Category of this destination
    pub fn kind(&self) -> DestinationKind {
        match self {
            Self::Scalar(_) => DestinationKind::Scalar,
            Self::Array(_) => DestinationKind::Array,
            Self::Reducer(_) => DestinationKind::Reducer,
            Self::View(_) => DestinationKind::View,
        }
    }
}

impl<T: Element> fmt::Debug for ReturnDestination<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Self::Array(v) => f.debug_tuple("Array").field(v).finish(),
            Self::Reducer(r) => f.debug_tuple("Reducer").field(r.result()).finish(),
            Self::View(v) => f.debug_tuple("View").field(v).finish(),
        }
    }
}

enum Target<'a, T: Element> {
    View(UnmanagedView<'a, T>),
    Reducer(&'a mut dyn Reducer<Value = T>),
}

/// Adapted destination handed to a backend
pub struct ReturnValue<'a, T: Element> {
    kind: DestinationKind,
    target: Target<'a, T>,
}

impl<'a, T: Element> ReturnValue<'a, T> {
    /// Classify `dest` and check it against `functor`'s declared value count
    ///
    /// # Errors
    ///
    /// - [`Error::MissingValueCount`] for an array destination when the
    ///   functor declares no value count
    /// - [`Error::ValueCountMismatch`] when the destination cannot hold
    ///   exactly the functor's value count
    pub fn adapt<F>(dest: ReturnDestination<'a, T>, functor: &F) -> Result<Self>
    where
        F: ReduceFunctor<Value = T>,
    {
        let declared = functor.value_count();
        let kind = dest.kind();
        let target = match dest {
            ReturnDestination::View(view) => {
                let expected = declared.unwrap_or(1);
                if view.len() != expected {
                    return Err(mismatch(kind, expected, view.len()));
                }
                Target::View(view)
            }
            ReturnDestination::Scalar(value) => {
                single_value(kind, declared)?;
                Target::View(UnmanagedView::scalar(value))
            }
            ReturnDestination::Array(values) => {
                let expected = declared.ok_or_else(|| {
                    tracing::debug!(len = values.len(), "array destination without value count");
                    Error::MissingValueCount
                })?;
                if values.len() != expected {
                    return Err(mismatch(kind, expected, values.len()));
                }
                Target::View(UnmanagedView::from_slice(values))
            }
            ReturnDestination::Reducer(reducer) => {
                single_value(kind, declared)?;
                Target::Reducer(reducer)
            }
        };

        let adapted = Self { kind, target };
        tracing::trace!(
            kind = ?adapted.kind,
            dtype = %adapted.dtype(),
            count = adapted.value_count(),
            "adapted return value"
        );
        Ok(adapted)
    }

    /// Category the destination was classified as
    #[inline]
    pub fn kind(&self) -> DestinationKind {
        self.kind
    }

    /// Element type of the destination
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Number of values the destination holds
    pub fn value_count(&self) -> usize {
        match &self.target {
            Target::View(view) => view.len(),
            Target::Reducer(_) => 1,
        }
    }

    /// Reducer whose semantics override the functor's, if any
    pub fn reducer(&self) -> Option<&dyn Reducer<Value = T>> {
        match &self.target {
            Target::View(_) => None,
            Target::Reducer(reducer) => Some(&**reducer),
        }
    }

    /// Canonical view over the destination memory
    pub fn view(&mut self) -> UnmanagedView<'_, T> {
        match &mut self.target {
            Target::View(view) => view.reborrow(),
            Target::Reducer(reducer) => UnmanagedView::scalar(reducer.result_mut()),
        }
    }

    /// Write the combined result
    pub fn store(&mut self, values: &[T]) -> Result<()> {
        self.view().copy_from(values)
    }
}

impl<T: Element> fmt::Debug for ReturnValue<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReturnValue")
            .field("kind", &self.kind)
            .field("dtype", &T::DTYPE)
            .field("value_count", &self.value_count())
            .finish()
    }
}

fn single_value(kind: DestinationKind, declared: Option<usize>) -> Result<()> {
    match declared {
        Some(count) if count != 1 => Err(mismatch(kind, count, 1)),
        _ => Ok(()),
    }
}

fn mismatch(kind: DestinationKind, expected: usize, got: usize) -> Error {
    tracing::debug!(?kind, expected, got, "destination does not match functor value count");
    Error::value_count_mismatch(expected, got)
}
