//! Error types for the paging simulator.

use thiserror::Error;

/// Errors produced while validating or running a simulation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PagingError {
    /// Rejected user input: empty trace, bad token, out-of-range value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internally inconsistent configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A simulation invariant was observed broken. Never user-triggerable;
    /// the affected run is aborted instead of returning corrupted data.
    #[error("Internal invariant violation: {0}")]
    InternalInvariant(String),
}

impl PagingError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariant(message.into())
    }

    /// Whether the error was caused by the caller's input or configuration.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Configuration(_))
    }
}

pub type PagingResult<T> = Result<T, PagingError>;
