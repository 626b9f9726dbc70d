use crate::timeseries::Time;
use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum PlumeboxError {
    #[error("{0}")]
    Error(String),
    #[error("Extrapolation is not allowed. Target={0}, {1} interpolation range={2}")]
    ExtrapolationNotAllowed(Time, String, Time),
    #[error("Wrong units for '{variable}'. Expected {expected}, got {actual}")]
    WrongUnits {
        variable: String,
        expected: String,
        actual: String,
    },
}

/// Convenience type for `Result<T, PlumeboxError>`.
pub type PlumeboxResult<T> = Result<T, PlumeboxError>;
