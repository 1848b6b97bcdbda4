//! Application-level errors

use domain::DomainError;
use thiserror::Error;

use crate::ports::{LocationError, MapError};

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Location source error
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Map library error
    #[error(transparent)]
    Map(#[from] MapError),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    ///
    /// Nothing in this workspace retries automatically; this only decides
    /// whether an advisory suggests trying again.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ExternalService(_)
        )
    }
}
