//! Trait for constructed reduction closures

use crate::error::Result;

/// A reduction bound to its functor, iteration domain and destination
///
/// Produced by [`Backend::construct`](super::Backend::construct). Running it
/// consumes the closure; `execute` returns only once every contribution has
/// been combined and written to the destination.
pub trait ReduceClosure {
    /// Run the reduction to completion
    fn execute(self: Box<Self>) -> Result<()>;
}
