//! Error types for the simulation core

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by world construction, spawning and configuration loading.
///
/// Collision resolution and boundary handling are total and never fail; only
/// placement and configuration problems reach the caller.
#[derive(Debug, Error)]
pub enum SimError {
    /// Rejection sampling ran out of attempts before placing every body.
    #[error("placement infeasible: placed {placed} of {requested} bodies before the retry budget ran out")]
    PlacementInfeasible {
        /// Bodies placed before giving up.
        placed: usize,
        /// Bodies requested.
        requested: usize,
    },

    /// A parameter was out of range (radius, speed bounds, arena, dt...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file was not valid JSON for `SimConfig`.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SimError::InvalidConfiguration(reason.into())
    }
}

/// Result alias used across the crate.
pub type SimResult<T> = std::result::Result<T, SimError>;
