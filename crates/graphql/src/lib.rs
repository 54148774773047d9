//! GraphQL building blocks shared by the server and the introspection gate.
//!
//! This crate holds the parsed [`Schema`] and [`Document`] wrappers, the
//! response envelope ([`Response`], [`ExecutionResult`], [`GraphQLError`]),
//! the case-insensitive [`HeaderSet`], and the validation collaborator
//! ([`Validate`] with the built-in [`Validator`]).
//!
//! # Example
//!
//! ```
//! use graphql::{Document, Rule, Schema, validate};
//!
//! let schema = Schema::parse("type Query { helloWorld: String }")?;
//! let document = Document::parse("{ __schema { queryType { name } } }")?;
//!
//! let violations = validate(&schema, &document, &[Rule::NoSchemaIntrospection], Some(1));
//! assert_eq!(violations.len(), 1);
//! # Ok::<(), graphql::Error>(())
//! ```

pub mod document;
mod error;
mod headers;
mod response;
pub mod schema;
mod validate;

pub use document::{Document, Operation, OperationKind};
pub use error::{Error, Result};
pub use headers::HeaderSet;
pub use response::{ExecutionResult, GraphQLError, HttpParts, Location, Response, ResponseBody};
pub use schema::{Schema, TypeInfo, TypeKind, is_introspection_type};
pub use validate::{Rule, Validate, Validator, Violation, validate};
