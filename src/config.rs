//! Process-wide dispatch configuration
//!
//! Values come from, in order of precedence: [`set_global`], the environment
//! (read once, on first access), and the build defaults.
//!
//! # Environment Variables
//!
//! - `PARREDUCE_EXECUTION_SPACE` - default space: `serial` or `threads`
//! - `PARREDUCE_MIN_CHUNK` - minimum iterations per threads-space chunk

use crate::runtime::ExecutionSpace;
use parking_lot::RwLock;
use std::env;
use std::sync::OnceLock;

/// Environment variable naming the default execution space
pub const EXECUTION_SPACE_ENV: &str = "PARREDUCE_EXECUTION_SPACE";

/// Environment variable setting the minimum threads-space chunk
pub const MIN_CHUNK_ENV: &str = "PARREDUCE_MIN_CHUNK";

/// Default minimum iterations per chunk
pub const DEFAULT_MIN_CHUNK: usize = 1024;

/// Dispatch defaults shared by the whole process
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReduceConfig {
    /// Space used for count-driven dispatches of functors that declare none
    pub default_space: ExecutionSpace,
    /// Lower bound on iterations per chunk when a policy requests no chunk size
    pub min_chunk_size: usize,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            default_space: ExecutionSpace::build_default(),
            min_chunk_size: DEFAULT_MIN_CHUNK,
        }
    }
}

impl ReduceConfig {
    /// Build a configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source
    ///
    /// Unparseable or unavailable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(EXECUTION_SPACE_ENV) {
            match value.parse::<ExecutionSpace>() {
                Ok(space) if space.is_available() => config.default_space = space,
                Ok(space) => {
                    tracing::warn!(%space, "execution space not available in this build, keeping default")
                }
                Err(err) => tracing::warn!(%err, "ignoring {EXECUTION_SPACE_ENV}"),
            }
        }

        if let Some(value) = lookup(MIN_CHUNK_ENV) {
            match value.trim().parse::<usize>() {
                Ok(chunk) if chunk > 0 => config.min_chunk_size = chunk,
                _ => tracing::warn!(value = %value, "ignoring {MIN_CHUNK_ENV}"),
            }
        }

        config
    }
}

static GLOBAL_CONFIG: OnceLock<RwLock<ReduceConfig>> = OnceLock::new();

fn cell() -> &'static RwLock<ReduceConfig> {
    GLOBAL_CONFIG.get_or_init(|| RwLock::new(ReduceConfig::from_env()))
}

/// Snapshot of the process-wide configuration
pub fn global() -> ReduceConfig {
    cell().read().clone()
}

/// Replace the process-wide configuration, returning the previous one
pub fn set_global(config: ReduceConfig) -> ReduceConfig {
    std::mem::replace(&mut *cell().write(), config)
}

/// Space used when a dispatch does not name one
pub fn default_execution_space() -> ExecutionSpace {
    cell().read().default_space
}
