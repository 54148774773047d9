//! Server error types.

use thiserror::Error;

/// Boxed error returned by plugin hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building a [`Server`](crate::Server).
///
/// Request-time failures never surface here; they become error responses.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The schema SDL could not be parsed.
    #[error(transparent)]
    GraphQL(#[from] graphql::Error),

    /// Two resolvers were registered for the same field.
    #[error("duplicate resolver for {type_name}.{field}")]
    DuplicateResolver { type_name: String, field: String },

    /// A resolver was registered for a field the schema does not define.
    #[error("resolver for unknown field {type_name}.{field}")]
    UnknownField { type_name: String, field: String },
}

pub type Result<T> = std::result::Result<T, Error>;
