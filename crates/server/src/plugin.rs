//! Plugin hooks.
//!
//! Registration is two-phase: a [`Plugin`] is asked once per request for a
//! [`RequestListener`], and the listener's hooks then fire for that request
//! only.

use crate::context::{GraphQLRequest, RequestContext};
use crate::error::BoxError;
use async_trait::async_trait;
use graphql::Response;

/// A server plugin.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Called when a request arrives, before its document is parsed.
    async fn request_did_start(&self, request: &GraphQLRequest) -> Box<dyn RequestListener>;
}

/// Per-request hooks produced by a [`Plugin`].
#[async_trait]
pub trait RequestListener: Send + Sync {
    /// Called after parsing and operation selection, before execution.
    ///
    /// Returning `Some` stops the pipeline: the response is sent as-is and
    /// the operation is never executed. An `Err` is reported to the client as
    /// an internal server error.
    async fn response_for_operation(
        &self,
        _ctx: &RequestContext,
    ) -> Result<Option<Response>, BoxError> {
        Ok(None)
    }
}
