//! Collaborator traits for backend abstraction

pub mod backend;
pub mod closure;

pub use backend::Backend;
pub use closure::ReduceClosure;
