//! Execution spaces

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Target a reduction's iterations run on
///
/// Availability depends on enabled features:
///
/// - `Serial`: always available, runs on the calling thread
/// - `Threads`: requires the `rayon` feature, runs on the rayon pool
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ExecutionSpace {
    /// Calling thread, one iteration at a time
    Serial,
    /// Host worker pool
    Threads,
}

impl ExecutionSpace {
    /// Every space this crate knows about, available or not
    pub const ALL: [ExecutionSpace; 2] = [Self::Serial, Self::Threads];

    /// Human-readable name of this space
    pub const fn name(self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Threads => "threads",
        }
    }

    /// Whether this build can run work on this space
    pub const fn is_available(self) -> bool {
        match self {
            Self::Serial => true,
            Self::Threads => cfg!(feature = "rayon"),
        }
    }

    /// Space used when neither the functor nor the configuration names one
    ///
    /// - With `rayon` feature: `Threads`
    /// - Otherwise: `Serial`
    pub const fn build_default() -> Self {
        if cfg!(feature = "rayon") {
            Self::Threads
        } else {
            Self::Serial
        }
    }

    /// Number of workers the space fans out to
    pub fn concurrency(self) -> usize {
        match self {
            Self::Serial => 1,
            #[cfg(feature = "rayon")]
            Self::Threads => rayon::current_num_threads(),
            #[cfg(not(feature = "rayon"))]
            Self::Threads => 1,
        }
    }

    /// Whether a policy bound to `self` can run a functor requiring `required`
    #[inline]
    pub fn is_compatible_with(self, required: ExecutionSpace) -> bool {
        self == required
    }
}

impl Default for ExecutionSpace {
    fn default() -> Self {
        Self::build_default()
    }
}

impl fmt::Display for ExecutionSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExecutionSpace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(Self::Serial),
            "threads" | "rayon" => Ok(Self::Threads),
            other => Err(Error::invalid_argument(
                "execution_space",
                format!("unknown execution space '{other}'"),
            )),
        }
    }
}
