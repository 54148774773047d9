//! Conditional GraphQL introspection gate.
//!
//! Per request, a [`Predicate`] decides whether introspection is allowed.
//! When it is not and the operation selects `__schema` or `__type`, the gate
//! short-circuits execution with a terminal response carrying a single error.
//! Everything else passes through untouched.
//!
//! ```
//! use gate::{ConditionalGate, GateConfig, Predicate};
//! use server::{GraphQLRequest, Server};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gate = ConditionalGate::new(
//!     GateConfig::builder(Predicate::new(|ctx| ctx.header("x-debug").is_some()))
//!         .override_status_code(403)
//!         .build(),
//! );
//! let server = Server::from_sdl("type Query { helloWorld: String }")?
//!     .resolver("Query", "helloWorld", |_, _| json!("hello world!"))
//!     .plugin(gate)
//!     .build()?;
//!
//! let response = server
//!     .execute_operation(GraphQLRequest::new("{ __schema { queryType { name } } }"))
//!     .await;
//! assert_eq!(response.http.status, Some(403));
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod gate;
mod policy;

pub use config::{ErrorSettings, GateConfig, GateConfigBuilder, GateSettings};
pub use error::{Error, Result};
pub use gate::{
    ConditionalGate, DEFAULT_ERROR_CODE, DEFAULT_ERROR_MESSAGE, Predicate, Verdict,
    introspection_not_allowed,
};
pub use policy::AllowPolicy;
