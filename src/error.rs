//! Error types for the TSP engine.
//!
//! Three kinds of failure exist:
//!
//! 1. **Configuration errors** ([`TspError::InvalidConfig`],
//!    [`TspError::UnknownCity`], [`TspError::InvalidCrossoverPoints`]) are
//!    reported before any work is done.
//! 2. **State errors** ([`TspError::NotInitialized`]) signal that an engine
//!    operation was called before a population exists.
//! 3. **Route errors** ([`TspError::InvalidRoute`], [`TspError::ParentMismatch`])
//!    reject sequences that break the permutation invariant.
//!
//! Degenerate distances (zero, infinite, NaN) are never errors; they map to
//! a fitness of `0`.

use thiserror::Error;

/// Result type alias for engine operations.
pub type TspResult<T> = Result<T, TspError>;

/// Unified error type for the TSP engine.
#[derive(Debug, Error)]
pub enum TspError {
    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A city id does not resolve to a city of the active graph.
    #[error("unknown city: {0}")]
    UnknownCity(String),

    /// PMX cut points do not satisfy `point1 < point2 <= route_len`.
    #[error("invalid crossover points [{point1}, {point2}) for route length {route_len}")]
    InvalidCrossoverPoints {
        point1: usize,
        point2: usize,
        route_len: usize,
    },

    /// Two crossover parents are not permutations of the same tour.
    #[error("crossover parents are incompatible: {0}")]
    ParentMismatch(String),

    /// A route sequence is not a valid permutation.
    #[error("invalid route: {0}")]
    InvalidRoute(String),

    /// The engine has no population yet.
    #[error("population not initialized")]
    NotInitialized,

    /// A full run failed; `source` holds the original cause.
    #[error("genetic algorithm run failed: {source}")]
    RunFailed {
        #[source]
        source: Box<TspError>,
    },
}

impl TspError {
    /// Wraps `self` as the cause of a failed run.
    pub fn into_run_failure(self) -> Self {
        match self {
            TspError::RunFailed { .. } => self,
            other => TspError::RunFailed {
                source: Box::new(other),
            },
        }
    }
}
