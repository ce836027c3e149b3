//! # parreduce
//!
//! **Reduction dispatch and adaptation over pluggable parallel backends.**
//!
//! parreduce turns the many ways of describing a parallel reduction into one
//! canonical backend invocation. Before any iteration runs it resolves:
//!
//! - **the domain**: an explicit [`RangePolicy`] or a bare count, normalized
//!   to `[begin, end)` on an execution space inferred from the functor
//! - **the destination**: a scalar, an array, a reducer's result field, or an
//!   existing view, adapted into one [`UnmanagedView`]
//! - **the hand-off**: the closure is constructed while allocation tracking is
//!   suspended and run once tracking resumes, bracketed by profiling events
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parreduce::prelude::*;
//!
//! let data = vec![3.0f64, 1.0, 4.0, 1.0, 5.0];
//! let sum = from_fn(|i, acc: &mut f64| *acc += data[i]);
//!
//! let mut total = 0.0;
//! parallel_reduce_count(data.len(), &sum, ReturnDestination::scalar(&mut total))?;
//!
//! let mut lowest = 0.0;
//! let mut max = Max::new(&mut lowest, f64::MAX);
//! parallel_reduce_labeled(
//!     "lowest",
//!     RangePolicy::on(ExecutionSpace::Serial, 0, data.len()),
//!     &from_fn(|i, acc: &mut f64| *acc = acc.min(data[i])),
//!     ReturnDestination::reducer(&mut max),
//! )?;
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): `Threads` execution space on the rayon pool

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dispatch;
pub mod dtype;
pub mod error;
pub mod functor;
pub mod policy;
pub mod profiling;
pub mod reducer;
pub mod return_value;
pub mod runtime;
pub mod view;

pub use dispatch::{
    DEFAULT_LABEL, GlobalDispatcher, ReduceDispatcher, parallel_reduce, parallel_reduce_count,
    parallel_reduce_count_labeled, parallel_reduce_labeled,
};
pub use error::{Error, Result};
pub use functor::{ReduceFunctor, from_fn};
pub use policy::{ExecutionPolicy, PolicySource, RangePolicy};
pub use reducer::{Add, Max, Reducer};
pub use return_value::{DestinationKind, ReturnDestination, ReturnValue};
pub use runtime::ExecutionSpace;
pub use view::UnmanagedView;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{DType, Element};
    pub use crate::error::{Error, Result};
    pub use crate::functor::{ReduceFunctor, from_fn};
    pub use crate::policy::{ExecutionPolicy, RangePolicy};
    pub use crate::reducer::{Add, Max, Reducer};
    pub use crate::return_value::ReturnDestination;
    pub use crate::runtime::ExecutionSpace;
    pub use crate::view::UnmanagedView;
    pub use crate::{
        parallel_reduce, parallel_reduce_count, parallel_reduce_count_labeled,
        parallel_reduce_labeled,
    };
}

/// Execution space chosen by enabled features
///
/// - With `rayon` feature: `Threads`
/// - Otherwise: `Serial`
pub const DEFAULT_EXECUTION_SPACE: ExecutionSpace = ExecutionSpace::build_default();
