//! In-process GraphQL request pipeline with plugin hooks.
//!
//! # Overview
//!
//! A [`Server`] owns a [`graphql::Schema`], a table of root-field resolvers
//! and an ordered list of [`Plugin`]s. Each call to
//! [`Server::execute_operation`] runs one request through these stages:
//!
//! 1. every plugin's [`Plugin::request_did_start`] produces a
//!    [`RequestListener`] for this request;
//! 2. the query is parsed and the operation selected (failures are 400s);
//! 3. each listener's [`RequestListener::response_for_operation`] may return
//!    a response, which is sent as-is and skips execution;
//! 4. otherwise the operation is executed against the resolvers.
//!
//! # Example
//!
//! ```
//! use server::{GraphQLRequest, Server};
//! use serde_json::json;
//!
//! # async fn example() -> server::Result<()> {
//! let server = Server::from_sdl("type Query { helloWorld: String }")?
//!     .resolver("Query", "helloWorld", |_, _| json!("hello world!"))
//!     .build()?;
//!
//! let response = server
//!     .execute_operation(GraphQLRequest::new("{ helloWorld }"))
//!     .await;
//! assert_eq!(response.result().data, Some(json!({"helloWorld": "hello world!"})));
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod execute;
mod introspection;
mod plugin;
mod server;

pub use context::{GraphQLRequest, HttpRequest, RequestContext};
pub use error::{BoxError, Error, Result};
pub use execute::Resolver;
pub use plugin::{Plugin, RequestListener};
pub use server::{Server, ServerBuilder, codes};
