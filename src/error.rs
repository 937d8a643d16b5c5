//! Crate-level error type.

use thiserror::Error;

/// Errors surfaced to callers of the locator and the decomposition.
///
/// Internal sweep invariant violations are programming errors and panic
/// instead of surfacing here.
#[derive(Debug, Error)]
pub enum Error {
    /// The room boundary is not a valid simple polygon.
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    /// A measured distance outside the valid domain (must be positive).
    #[error("invalid measurement: {0} (distances must be positive)")]
    InvalidMeasurement(f64),

    /// A query was issued before a successful `init`.
    #[error("locator not initialized")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, Error>;
