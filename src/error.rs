//! Error types for the bayesian-sarima library.

use thiserror::Error;

/// Result type alias for SARIMA operations.
pub type Result<T> = std::result::Result<T, SarimaError>;

/// Errors that can occur during model construction, training, forecasting,
/// or persistence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SarimaError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Differenced series too short for the requested orders.
    #[error("insufficient data after differencing: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Model has not been trained (or loaded) yet.
    #[error("model must be trained before this operation")]
    NotTrained,

    /// Not enough trailing observations supplied to seed the forecast.
    #[error("insufficient observations for forecasting: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Posterior sampler failure, surfaced opaquely.
    #[error("sampler failure: {0}")]
    Sampler(String),

    /// Snapshot missing, unreadable, or corrupt; or a write failure.
    #[error("persistence error: {0}")]
    Persistence(String),
}
