//! Error types for series analysis

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AnalyticsError {
    /// No observations were supplied
    #[error("input data is empty")]
    EmptyInput,

    /// Observations were supplied but none had a parsable date and value
    #[error("no numeric observations in input")]
    NoNumericValues,

    /// Percentage change against a zero base
    #[error("percentage change from a zero base")]
    DivisionByZero,

    /// Not enough points for the requested statistic
    #[error("need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Indicator construction or parameter error
    #[error("indicator error: {0}")]
    Indicator(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
