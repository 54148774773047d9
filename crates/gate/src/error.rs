//! Gate error types.

use server::BoxError;
use thiserror::Error;

/// Gate errors.
///
/// A request that uses introspection while it is disallowed is not an
/// error; it produces a terminal response. These variants cover failures
/// the gate passes through untouched, plus settings loading.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The allow predicate failed.
    #[error(transparent)]
    Predicate(BoxError),

    /// The validation collaborator failed.
    #[error(transparent)]
    Validation(#[from] graphql::Error),

    /// Failed to parse gate settings.
    #[error("failed to parse gate settings: {0}")]
    Parse(String),

    /// An I/O error occurred while reading settings.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
