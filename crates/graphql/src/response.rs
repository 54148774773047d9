//! Response envelope and structured errors.

use crate::HeaderSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A source position inside a GraphQL document (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl From<graphql_parser::Pos> for Location {
    fn from(pos: graphql_parser::Pos) -> Self {
        Self {
            line: pos.line,
            column: pos.column,
        }
    }
}

/// A structured GraphQL error as it appears in a response body.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct GraphQLError {
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    /// Free-form extensions; by convention `code` carries a machine-readable id.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            extensions: Map::new(),
        }
    }

    pub fn with_code(self, code: impl Into<String>) -> Self {
        self.with_extension("code", Value::String(code.into()))
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<Location>) -> Self {
        self.locations.push(location.into());
        self
    }

    /// The `extensions.code` value, if it is a string.
    pub fn code(&self) -> Option<&str> {
        self.extensions.get("code").and_then(Value::as_str)
    }
}

/// The `{ data, errors }` payload of a single result.
///
/// `data` is always serialized, as `null` when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl ExecutionResult {
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// A result with no data and the given errors.
    pub fn errors(errors: Vec<GraphQLError>) -> Self {
        Self { data: None, errors }
    }
}

/// Response body, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "singleResult", rename_all = "lowercase")]
pub enum ResponseBody {
    Single(ExecutionResult),
}

/// HTTP-level response parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpParts {
    /// `None` leaves the choice to whoever finally writes the response.
    pub status: Option<u16>,
    #[serde(default)]
    pub headers: HeaderSet,
}

/// A complete response: HTTP parts plus body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub http: HttpParts,
    pub body: ResponseBody,
}

impl Response {
    pub fn single(result: ExecutionResult) -> Self {
        Self {
            http: HttpParts::default(),
            body: ResponseBody::Single(result),
        }
    }

    /// A data-less response carrying one error and an explicit status.
    pub fn error(status: u16, error: GraphQLError) -> Self {
        Self::single(ExecutionResult::errors(vec![error])).with_status(status)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http.status = Some(status);
        self
    }

    pub fn with_headers(mut self, headers: impl Into<HeaderSet>) -> Self {
        self.http.headers = headers.into();
        self
    }

    pub fn result(&self) -> &ExecutionResult {
        let ResponseBody::Single(result) = &self.body;
        result
    }

    pub fn into_result(self) -> ExecutionResult {
        let ResponseBody::Single(result) = self.body;
        result
    }
}
