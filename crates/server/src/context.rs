//! Per-request types handed to plugins.

use graphql::{Document, HeaderSet, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Transport metadata for a request that arrived over HTTP.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub headers: HeaderSet,
}

/// An incoming GraphQL request, in the standard JSON request shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,

    #[serde(skip)]
    pub http: Option<HttpRequest>,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    /// Attach HTTP headers, marking the request as an HTTP POST.
    pub fn with_headers(mut self, headers: impl Into<HeaderSet>) -> Self {
        let headers: HeaderSet = headers.into();
        let http = self.http.get_or_insert_with(|| HttpRequest {
            method: "POST".to_string(),
            headers: HeaderSet::new(),
        });
        http.headers.extend(headers.iter());
        self
    }
}

/// Everything known about a request once its document has been parsed.
///
/// Hooks only ever see a shared reference; nothing in here can be changed by
/// a plugin.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request: GraphQLRequest,
    schema: Arc<Schema>,
    document: Document,
}

impl RequestContext {
    pub fn new(request: GraphQLRequest, schema: Arc<Schema>, document: Document) -> Self {
        Self {
            request,
            schema,
            document,
        }
    }

    pub fn request(&self) -> &GraphQLRequest {
        &self.request
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn operation_name(&self) -> Option<&str> {
        self.request.operation_name.as_deref()
    }

    /// Look up a request header; `None` for requests without HTTP metadata.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.http.as_ref()?.headers.get(name)
    }
}
