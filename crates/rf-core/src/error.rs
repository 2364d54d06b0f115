//! # AppError
//!
//! Centralized error taxonomy for rusty-flats. Every engine operation
//! resolves to one of these; none of them crash the view-model.

use thiserror::Error;

/// The primary error type for all rf-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., listing, user profile)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Validation failure (e.g., blank required field, malformed document)
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation requires a signed-in account
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Signed in, but not allowed (e.g., deleting someone else's listing)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Backing store or media service failure
    #[error("store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl AppError {
    /// Wraps a port-boundary failure. Optimistic local changes must be
    /// rolled back before this surfaces to the caller.
    pub fn store(err: anyhow::Error) -> Self {
        AppError::Store(err)
    }
}

/// A specialized Result type for rusty-flats logic.
pub type Result<T> = std::result::Result<T, AppError>;
