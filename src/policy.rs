//! Iteration policies and their normalization
//!
//! A dispatch accepts either an explicit policy already bound to an
//! execution space, or a bare iteration count. Both normalize to the same
//! canonical [`RangePolicy`]; a count `n` becomes `[0, n)` on the space the
//! functor requires, or on the process-wide default when it requires none.

use crate::config;
use crate::error::{Error, Result};
use crate::functor::ReduceFunctor;
use crate::runtime::ExecutionSpace;
use std::ops::Range;

/// Objects usable as an explicit iteration policy
pub trait ExecutionPolicy {
    /// Space the policy is bound to
    fn space(&self) -> ExecutionSpace;

    /// Canonical half-open range form of this policy
    fn into_range_policy(self) -> RangePolicy;
}

/// Half-open index range `[begin, end)` bound to an execution space
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangePolicy {
    begin: usize,
    end: usize,
    space: ExecutionSpace,
    chunk_size: Option<usize>,
}

impl RangePolicy {
    /// Range on the process-wide default execution space
    ///
    /// An `end` before `begin` is clamped to an empty range.
    pub fn new(begin: usize, end: usize) -> Self {
        Self::on(config::default_execution_space(), begin, end)
    }

    /// Range on an explicit execution space
    ///
    /// An `end` before `begin` is clamped to an empty range.
    pub fn on(space: ExecutionSpace, begin: usize, end: usize) -> Self {
        Self {
            begin,
            end: end.max(begin),
            space,
            chunk_size: None,
        }
    }

    /// Range on the default space, rejecting `end < begin`
    pub fn try_new(begin: usize, end: usize) -> Result<Self> {
        Self::try_on(config::default_execution_space(), begin, end)
    }

    /// Range on `space`, rejecting `end < begin`
    pub fn try_on(space: ExecutionSpace, begin: usize, end: usize) -> Result<Self> {
        if end < begin {
            return Err(Error::invalid_argument(
                "end",
                format!("range end {end} precedes begin {begin}"),
            ));
        }
        Ok(Self::on(space, begin, end))
    }

    /// Request a fixed number of iterations per work chunk
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// First index
    #[inline]
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// One past the last index
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Index range
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.begin..self.end
    }

    /// Number of iterations
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Check if the range has no iterations
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Space the range runs on
    #[inline]
    pub fn space(&self) -> ExecutionSpace {
        self.space
    }

    /// Requested chunk size, if any
    #[inline]
    pub fn chunk_size(&self) -> Option<usize> {
        self.chunk_size
    }
}

impl ExecutionPolicy for RangePolicy {
    fn space(&self) -> ExecutionSpace {
        self.space
    }

    fn into_range_policy(self) -> RangePolicy {
        self
    }
}

/// Iteration domain as supplied by the caller
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolicySource {
    /// Policy already bound to an execution space
    Explicit(RangePolicy),
    /// Bare iteration count; the space is inferred from the functor
    Count(usize),
}

impl From<RangePolicy> for PolicySource {
    fn from(policy: RangePolicy) -> Self {
        Self::Explicit(policy)
    }
}

impl From<usize> for PolicySource {
    fn from(count: usize) -> Self {
        Self::Count(count)
    }
}

/// Space a count-driven dispatch of `functor` runs on
pub fn infer_execution_space<F: ReduceFunctor>(functor: &F) -> ExecutionSpace {
    functor
        .execution_space()
        .unwrap_or_else(config::default_execution_space)
}

/// Resolve `source` into the canonical policy for `functor`
///
/// # Errors
///
/// - [`Error::ExecutionSpaceMismatch`] if an explicit policy targets a
///   different space than the functor declares
/// - [`Error::UnsupportedExecutionSpace`] if the resolved space is not
///   available in this build
pub fn normalize<F: ReduceFunctor>(source: PolicySource, functor: &F) -> Result<RangePolicy> {
    let policy = match source {
        PolicySource::Explicit(policy) => {
            let required = functor.execution_space();
            if let Some(required) = required.filter(|r| !policy.space().is_compatible_with(*r)) {
                tracing::debug!(
                    policy = %policy.space(),
                    functor = %required,
                    "policy space incompatible with functor"
                );
                return Err(Error::ExecutionSpaceMismatch {
                    policy: policy.space(),
                    functor: required,
                });
            }
            policy
        }
        PolicySource::Count(count) => RangePolicy::on(infer_execution_space(functor), 0, count),
    };

    if !policy.space().is_available() {
        return Err(Error::UnsupportedExecutionSpace {
            space: policy.space(),
        });
    }

    tracing::trace!(
        begin = policy.begin(),
        end = policy.end(),
        space = %policy.space(),
        "normalized policy"
    );
    Ok(policy)
}
