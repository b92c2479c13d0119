//! Error types for the adaptive engine.

use thiserror::Error;

/// Errors that can occur when configuring the adaptive engine.
///
/// Region-level failures (no entry point, helix does not fit) are not
/// errors: the region is skipped with a diagnostic and the remaining
/// regions proceed.
#[derive(Error, Debug)]
pub enum AdaptiveError {
    /// Tool diameter must be positive.
    #[error("tool diameter must be positive (got {0})")]
    InvalidToolDiameter(f64),

    /// Step-over factor must be in (0, 1].
    #[error("step-over factor must be in (0, 1] (got {0})")]
    InvalidStepOver(f64),

    /// Tolerance must be positive.
    #[error("tolerance must be positive (got {0})")]
    InvalidTolerance(f64),
}

/// Result type for adaptive engine operations.
pub type Result<T> = std::result::Result<T, AdaptiveError>;
