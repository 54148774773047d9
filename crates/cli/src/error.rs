//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A `--header` argument is not of the form `name:value`.
    #[error("invalid header '{arg}': expected name:value")]
    InvalidHeader { arg: String },

    /// `--variables` is not a JSON object.
    #[error("invalid variables: {reason}")]
    InvalidVariables { reason: String },

    /// A file named on the command line could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An error occurred loading gate settings.
    #[error(transparent)]
    Gate(#[from] gate::Error),

    /// An error occurred building the server.
    #[error(transparent)]
    Server(#[from] server::Error),

    /// The response could not be rendered.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
