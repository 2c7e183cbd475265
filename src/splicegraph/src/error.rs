//! Caller-facing, recoverable errors.
//!
//! The bundle pipeline itself never returns one of these: malformed bundle
//! input (empty hits, zero junctions) is absorbed as an empty result, and
//! every precondition §7 calls an invariant is asserted, not recovered from.
//! This module exists solely for the one genuinely out-of-scope-but-nearby
//! boundary the core still owns the type for: loading a [`crate::Config`]
//! from a YAML file on disk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("failed to parse configuration file")]
    Parse(#[from] serde_yaml::Error),
}
