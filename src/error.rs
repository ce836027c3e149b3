//! Error types for parreduce

use crate::runtime::ExecutionSpace;
use thiserror::Error;

/// Result type alias using parreduce's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while dispatching a reduction
#[derive(Error, Debug)]
pub enum Error {
    /// Destination element count does not match the functor's declared count
    #[error("Value count mismatch: functor declares {expected}, destination holds {got}")]
    ValueCountMismatch {
        /// Count declared by the functor
        expected: usize,
        /// Count held by the destination
        got: usize,
    },

    /// Array destination given to a functor without a declared value count
    #[error("Array destination requires the functor to declare a value count")]
    MissingValueCount,

    /// View shape does not cover the underlying slice
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Execution space is not available in this build
    #[error("Execution space '{space}' is not available")]
    UnsupportedExecutionSpace {
        /// The requested space
        space: ExecutionSpace,
    },

    /// Explicit policy targets a different space than the functor requires
    #[error("Policy runs on '{policy}' but functor requires '{functor}'")]
    ExecutionSpaceMismatch {
        /// Space the policy is bound to
        policy: ExecutionSpace,
        /// Space the functor declares
        functor: ExecutionSpace,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Backend limitation - reduction valid but exceeds backend capabilities
    #[error("{backend} limitation: {operation} - {reason}")]
    BackendLimitation {
        /// The backend that has the limitation
        backend: &'static str,
        /// The operation being attempted
        operation: &'static str,
        /// Description of the limitation
        reason: String,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a value count mismatch error
    pub fn value_count_mismatch(expected: usize, got: usize) -> Self {
        Self::ValueCountMismatch { expected, got }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a backend limitation error
    pub fn backend_limitation(
        backend: &'static str,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::BackendLimitation {
            backend,
            operation,
            reason: reason.into(),
        }
    }

    /// Whether the error was raised before any backend work was attempted
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::ValueCountMismatch { .. }
                | Self::MissingValueCount
                | Self::ShapeMismatch { .. }
                | Self::UnsupportedExecutionSpace { .. }
                | Self::ExecutionSpaceMismatch { .. }
                | Self::InvalidArgument { .. }
        )
    }
}
