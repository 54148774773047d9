//! GraphQL error types.

use thiserror::Error;

/// Errors raised while parsing schemas and documents.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The query document is not valid GraphQL syntax.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// The SDL failed to parse or describes an inconsistent schema.
    #[error("invalid schema: {0}")]
    Schema(String),

    /// No operation in the document has the requested name.
    #[error("unknown operation named '{0}'")]
    UnknownOperation(String),

    /// The document defines fragments only.
    #[error("document contains no operations")]
    NoOperation,

    /// Several operations were defined and no name was given.
    #[error("must provide operation name if query contains multiple operations")]
    AmbiguousOperation,

    /// A validator could not run.
    #[error("validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
