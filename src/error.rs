//! Error types for the TSP solver.
//!
//! Every fallible operation returns [`TspResult`]. Numeric edge cases that
//! occur naturally during search (zero distances, zero-sum weights) are not
//! errors; they are handled by fallback policies inside the engines.

use thiserror::Error;

/// Result type alias for solver operations.
pub type TspResult<T> = Result<T, TspError>;

/// Unified error type for the solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TspError {
    /// The city map is too small for the requested algorithm.
    #[error("at least {required} cities are required, got {actual}")]
    InsufficientCities {
        /// Minimum number of cities the algorithm needs.
        required: usize,
        /// Number of cities supplied.
        actual: usize,
    },

    /// A tour or lookup referenced a city that is not in the map.
    #[error("unknown city: {0}")]
    UnknownCity(String),

    /// A city id was inserted twice into the same map.
    #[error("duplicate city: {0}")]
    DuplicateCity(String),

    /// A sequence is not a permutation of the map's cities.
    #[error("invalid tour: {0}")]
    InvalidTour(String),

    /// A configuration value is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A run was requested while another one is still active.
    #[error("a run is already in progress")]
    AlreadyRunning,

    /// `step` was called with no active run.
    #[error("no run is active")]
    NoActiveRun,
}
