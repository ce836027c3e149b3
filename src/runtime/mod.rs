//! Execution spaces and backend collaborators
//!
//! This module defines what a dispatch hands work to. The dispatcher itself
//! never schedules iterations; it builds a closure through a [`Backend`] and
//! runs it.
//!
//! # Architecture
//!
//! ```text
//! Backend (constructs closures for a normalized reduction)
//! ├── ExecutionSpace (where iterations run: serial, threads)
//! ├── ReduceClosure (constructed reduction, runs to completion)
//! └── AllocationTracker (bookkeeping suspended during construction)
//! ```

mod allocator;
pub mod host;
mod space;
pub mod traits;

pub use allocator::{AllocationTracker, SharedAllocationTracker, TrackingExemption};
pub use host::HostBackend;
pub use space::ExecutionSpace;
pub use traits::{Backend, ReduceClosure};
