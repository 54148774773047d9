//! The request pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use graphql::{Document, GraphQLError, Response, Schema};
use serde_json::{Map, Value};
use tracing::Instrument;
use uuid::Uuid;

use crate::context::{GraphQLRequest, RequestContext};
use crate::execute::{self, Resolver, Resolvers};
use crate::plugin::Plugin;
use crate::{Error, Result};

/// Error codes attached to errors raised by the pipeline itself.
pub mod codes {
    pub const PARSE_FAILED: &str = "GRAPHQL_PARSE_FAILED";
    pub const VALIDATION_FAILED: &str = "GRAPHQL_VALIDATION_FAILED";
    pub const OPERATION_RESOLUTION_FAILURE: &str = "OPERATION_RESOLUTION_FAILURE";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// An in-process GraphQL server with plugin hooks.
pub struct Server {
    schema: Arc<Schema>,
    resolvers: Resolvers,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl Server {
    /// Start building a server for `schema`.
    pub fn builder(schema: Schema) -> ServerBuilder {
        ServerBuilder {
            schema,
            resolvers: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Start building a server from SDL.
    pub fn from_sdl(sdl: &str) -> Result<ServerBuilder> {
        Ok(Self::builder(Schema::parse(sdl)?))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Run one request through the pipeline.
    ///
    /// Never fails: parse, operation-selection and plugin errors all come
    /// back as error responses with a status set. Successful executions leave
    /// the status unset.
    pub async fn execute_operation(&self, request: GraphQLRequest) -> Response {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "graphql_request",
            %request_id,
            operation = request.operation_name.as_deref().unwrap_or("")
        );
        self.process(request).instrument(span).await
    }

    async fn process(&self, request: GraphQLRequest) -> Response {
        let mut listeners = Vec::with_capacity(self.plugins.len());
        for plugin in &self.plugins {
            listeners.push(plugin.request_did_start(&request).await);
        }

        let document = match Document::parse(&request.query) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!(error = %e, "failed to parse query");
                return Response::error(
                    400,
                    GraphQLError::new(e.to_string()).with_code(codes::PARSE_FAILED),
                );
            }
        };

        if let Err(e) = document.operation(request.operation_name.as_deref()) {
            tracing::debug!(error = %e, "failed to select operation");
            return Response::error(
                400,
                GraphQLError::new(e.to_string()).with_code(codes::OPERATION_RESOLUTION_FAILURE),
            );
        }

        let ctx = RequestContext::new(request, Arc::clone(&self.schema), document);

        for listener in &listeners {
            match listener.response_for_operation(&ctx).await {
                Ok(Some(response)) => {
                    tracing::debug!(status = ?response.http.status, "operation intercepted by plugin");
                    return response;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(error = %e, "plugin hook failed");
                    return Response::error(
                        500,
                        GraphQLError::new("Internal server error")
                            .with_code(codes::INTERNAL_SERVER_ERROR),
                    );
                }
            }
        }

        match execute::execute(&ctx, &self.resolvers) {
            Ok(result) => Response::single(result),
            Err(e) => {
                tracing::debug!(error = %e, "operation failed validation");
                Response::error(400, e.with_code(codes::VALIDATION_FAILED))
            }
        }
    }
}

/// Builder for [`Server`].
pub struct ServerBuilder {
    schema: Schema,
    resolvers: Vec<((String, String), Resolver)>,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl ServerBuilder {
    /// Register a resolver for a root field (`type_name` is the root type,
    /// such as `Query`).
    pub fn resolver<F>(
        mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        f: F,
    ) -> Self
    where
        F: Fn(&RequestContext, &Map<String, Value>) -> Value + Send + Sync + 'static,
    {
        self.resolvers
            .push(((type_name.into(), field.into()), Arc::new(f)));
        self
    }

    /// Install a plugin. Plugins run in registration order.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Finish building, checking every resolver targets a declared field.
    pub fn build(self) -> Result<Server> {
        let mut resolvers = HashMap::with_capacity(self.resolvers.len());

        for ((type_name, field), resolver) in self.resolvers {
            let declared = self
                .schema
                .get_type(&type_name)
                .is_some_and(|info| info.fields.contains_key(&field));
            if !declared {
                return Err(Error::UnknownField { type_name, field });
            }
            if resolvers.contains_key(&(type_name.clone(), field.clone())) {
                return Err(Error::DuplicateResolver { type_name, field });
            }
            resolvers.insert((type_name, field), resolver);
        }

        Ok(Server {
            schema: Arc::new(self.schema),
            resolvers,
            plugins: self.plugins,
        })
    }
}
