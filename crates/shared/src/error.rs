//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input snapshot could not be read or decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Projection could not be produced.
    #[error("Projection error: {0}")]
    Projection(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78,
            Self::Snapshot(_) => 66,
            Self::Validation(_) | Self::Projection(_) => 65,
            Self::Internal(_) => 70,
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Snapshot(_) => "SNAPSHOT_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Projection(_) => "PROJECTION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
