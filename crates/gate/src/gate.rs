//! The conditional introspection gate.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use graphql::{
    ExecutionResult, GraphQLError, HttpParts, Response, ResponseBody, Rule, Validate, Validator,
};
use server::{BoxError, GraphQLRequest, Plugin, RequestContext, RequestListener};

use crate::config::GateConfig;
use crate::{Error, Result};

/// Message of the error returned when no override error is configured.
pub const DEFAULT_ERROR_MESSAGE: &str = "Introspection is not allowed";

/// `extensions.code` of the error returned when no override error is configured.
pub const DEFAULT_ERROR_CODE: &str = "INTROSPECTION_NOT_ALLOWED";

const RULES: &[Rule] = &[Rule::NoSchemaIntrospection];

/// A fresh copy of the default error.
pub fn introspection_not_allowed() -> GraphQLError {
    GraphQLError::new(DEFAULT_ERROR_MESSAGE).with_code(DEFAULT_ERROR_CODE)
}

type PredicateFn = dyn Fn(&RequestContext) -> std::result::Result<bool, BoxError> + Send + Sync;

/// Decides whether introspection is allowed for a request.
///
/// Predicates are expected to be pure: the gate may call them any number of
/// times for the same request.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(move |ctx| Ok(f(ctx))))
    }

    /// A predicate that can fail. Failures are returned from
    /// [`ConditionalGate::evaluate`] as [`Error::Predicate`].
    pub fn fallible<F, E>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> std::result::Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self(Arc::new(move |ctx| f(ctx).map_err(Into::into)))
    }

    pub fn always() -> Self {
        Self::new(|_| true)
    }

    pub fn never() -> Self {
        Self::new(|_| false)
    }

    pub fn allows(&self, ctx: &RequestContext) -> std::result::Result<bool, BoxError> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Outcome of [`ConditionalGate::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Let the request continue normally.
    PassThrough,
    /// Send this response instead of executing the operation.
    Terminal(Response),
}

impl Verdict {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Verdict::PassThrough)
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Verdict::PassThrough => None,
            Verdict::Terminal(response) => Some(response),
        }
    }
}

/// Blocks introspection for requests its predicate rejects.
///
/// Requests that do not touch introspection always pass, whatever the
/// predicate says. Install it on a [`server::Server`] with
/// [`ServerBuilder::plugin`](server::ServerBuilder::plugin) or call
/// [`evaluate`](Self::evaluate) directly.
#[derive(Debug)]
pub struct ConditionalGate<V = Validator> {
    config: Arc<GateConfig>,
    validator: Arc<V>,
}

impl ConditionalGate {
    /// A gate using the built-in validator.
    pub fn new(config: GateConfig) -> Self {
        Self::with_validator(config, Validator)
    }
}

impl<V> Clone for ConditionalGate<V> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            validator: Arc::clone(&self.validator),
        }
    }
}

impl<V: Validate> ConditionalGate<V> {
    /// A gate that delegates the introspection check to `validator`.
    pub fn with_validator(config: GateConfig, validator: V) -> Self {
        Self {
            config: Arc::new(config),
            validator: Arc::new(validator),
        }
    }

    /// Decide whether `ctx` may proceed.
    ///
    /// The validator is only consulted when the predicate says no, and is
    /// asked to stop at the first violation.
    pub async fn evaluate(&self, ctx: &RequestContext) -> Result<Verdict> {
        if self.config.predicate().allows(ctx).map_err(Error::Predicate)? {
            return Ok(Verdict::PassThrough);
        }

        let violations = self
            .validator
            .validate(ctx.schema(), ctx.document(), RULES, Some(1))
            .await?;
        if violations.is_empty() {
            return Ok(Verdict::PassThrough);
        }

        Ok(Verdict::Terminal(self.terminal_response()))
    }

    fn terminal_response(&self) -> Response {
        let error = self
            .config
            .override_error()
            .cloned()
            .unwrap_or_else(introspection_not_allowed);

        Response {
            http: HttpParts {
                status: self.config.override_status_code(),
                headers: self.config.override_headers().cloned().unwrap_or_default(),
            },
            body: ResponseBody::Single(ExecutionResult::errors(vec![error])),
        }
    }
}

#[async_trait]
impl<V: Validate + 'static> Plugin for ConditionalGate<V> {
    async fn request_did_start(&self, _request: &GraphQLRequest) -> Box<dyn RequestListener> {
        Box::new(GateListener { gate: self.clone() })
    }
}

struct GateListener<V> {
    gate: ConditionalGate<V>,
}

#[async_trait]
impl<V: Validate + 'static> RequestListener for GateListener<V> {
    async fn response_for_operation(
        &self,
        ctx: &RequestContext,
    ) -> std::result::Result<Option<Response>, BoxError> {
        Ok(self.gate.evaluate(ctx).await?.into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql::{Document, HeaderSet, Schema, Violation};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SDL: &str = "type Query { helloWorld: String }";
    const INTROSPECTION: &str = "query { helloWorld __schema { queryType { name } } }";

    fn ctx(query: &str) -> RequestContext {
        let schema = Arc::new(Schema::parse(SDL).unwrap());
        let document = Document::parse(query).unwrap();
        RequestContext::new(GraphQLRequest::new(query), schema, document)
    }

    fn deny_gate() -> ConditionalGate {
        ConditionalGate::new(GateConfig::builder(Predicate::never()).build())
    }

    /// Counts calls and reports a fixed number of violations.
    #[derive(Default)]
    struct CountingValidator {
        calls: AtomicUsize,
        violations: usize,
    }

    impl Validate for CountingValidator {
        async fn validate(
            &self,
            _schema: &Schema,
            _document: &Document,
            rules: &[Rule],
            max_violations: Option<usize>,
        ) -> graphql::Result<Vec<Violation>> {
            assert_eq!(rules, [Rule::NoSchemaIntrospection]);
            assert_eq!(max_violations, Some(1));
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..self.violations)
                .map(|_| Violation {
                    rule: Rule::NoSchemaIntrospection,
                    message: "introspection".into(),
                    locations: Vec::new(),
                })
                .collect())
        }
    }

    struct FailingValidator;

    impl Validate for FailingValidator {
        async fn validate(
            &self,
            _schema: &Schema,
            _document: &Document,
            _rules: &[Rule],
            _max_violations: Option<usize>,
        ) -> graphql::Result<Vec<Violation>> {
            Err(graphql::Error::Validation("collaborator down".into()))
        }
    }

    #[tokio::test]
    async fn allowed_requests_pass_without_validation() {
        let validator = CountingValidator {
            violations: 1,
            ..Default::default()
        };
        let gate = ConditionalGate::with_validator(
            GateConfig::builder(Predicate::always()).build(),
            validator,
        );

        let verdict = gate.evaluate(&ctx(INTROSPECTION)).await.unwrap();
        assert!(verdict.is_pass_through());
        assert_eq!(gate.validator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn denied_but_harmless_request_passes() {
        let verdict = deny_gate().evaluate(&ctx("{ helloWorld }")).await.unwrap();
        assert_eq!(verdict, Verdict::PassThrough);
    }

    #[tokio::test]
    async fn denied_introspection_gets_default_error() {
        let verdict = deny_gate().evaluate(&ctx(INTROSPECTION)).await.unwrap();
        let response = verdict.into_response().unwrap();

        assert_eq!(response.http.status, None);
        assert!(response.http.headers.is_empty());
        let result = response.result();
        assert_eq!(result.data, None);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, DEFAULT_ERROR_MESSAGE);
        assert_eq!(result.errors[0].code(), Some(DEFAULT_ERROR_CODE));
    }

    #[tokio::test]
    async fn overrides_are_used_verbatim() {
        let error = GraphQLError::new("Message")
            .with_code("CODE")
            .with_extension("retryable", false);
        let config = GateConfig::builder(Predicate::never())
            .override_status_code(400)
            .override_headers([("x-custom-header", "custom")])
            .override_error(error.clone())
            .build();

        let response = ConditionalGate::new(config)
            .evaluate(&ctx(INTROSPECTION))
            .await
            .unwrap()
            .into_response()
            .unwrap();

        assert_eq!(response.http.status, Some(400));
        assert_eq!(response.http.headers.len(), 1);
        assert_eq!(response.http.headers.get("x-custom-header"), Some("custom"));
        assert_eq!(response.result().errors, vec![error]);
        assert_eq!(
            serde_json::to_value(response.result()).unwrap(),
            json!({
                "data": null,
                "errors": [{"message": "Message", "extensions": {"code": "CODE", "retryable": false}}]
            })
        );
    }

    #[tokio::test]
    async fn header_representations_are_equivalent() {
        let from_map = GateConfig::builder(Predicate::never())
            .override_headers(HashMap::from([("X-Custom-Header", "custom")]))
            .build();
        let mut set = HeaderSet::new();
        set.insert("x-custom-header", "custom");
        let from_set = GateConfig::builder(Predicate::never())
            .override_headers(set)
            .build();

        let request = ctx(INTROSPECTION);
        let a = ConditionalGate::new(from_map).evaluate(&request).await.unwrap();
        let b = ConditionalGate::new(from_set).evaluate(&request).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn default_error_is_fresh_per_violation() {
        let gate = deny_gate();
        let request = ctx(INTROSPECTION);
        let first = gate.evaluate(&request).await.unwrap();
        let second = gate.evaluate(&request).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(introspection_not_allowed(), introspection_not_allowed());
    }

    #[tokio::test]
    async fn validator_verdict_decides_after_denial() {
        let gate = ConditionalGate::with_validator(
            GateConfig::builder(Predicate::never()).build(),
            CountingValidator::default(),
        );
        // The built-in validator would flag this; the injected one reports nothing.
        let verdict = gate.evaluate(&ctx(INTROSPECTION)).await.unwrap();
        assert!(verdict.is_pass_through());
        assert_eq!(gate.validator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn predicate_failure_propagates() {
        let predicate = Predicate::fallible(|_| Err::<bool, _>("no session"));
        let gate = ConditionalGate::new(GateConfig::builder(predicate).build());

        let err = gate.evaluate(&ctx(INTROSPECTION)).await.unwrap_err();
        assert!(matches!(err, Error::Predicate(_)));
        assert_eq!(err.to_string(), "no session");
    }

    #[tokio::test]
    async fn validator_failure_propagates() {
        let gate = ConditionalGate::with_validator(
            GateConfig::builder(Predicate::never()).build(),
            FailingValidator,
        );
        let err = gate.evaluate(&ctx("{ helloWorld }")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn predicate_sees_request_context() {
        let predicate = Predicate::new(|ctx| ctx.request().query.contains("helloWorld"));
        let gate = ConditionalGate::new(GateConfig::builder(predicate).build());

        let allowed = gate.evaluate(&ctx(INTROSPECTION)).await.unwrap();
        assert!(allowed.is_pass_through());

        let denied = gate
            .evaluate(&ctx("{ __type(name: \"Query\") { name } }"))
            .await
            .unwrap();
        assert!(!denied.is_pass_through());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn shared_gate_decides_each_request_independently() {
        let gate = ConditionalGate::new(
            GateConfig::builder(Predicate::new(|ctx| ctx.header("x-allow").is_some()))
                .override_status_code(403)
                .build(),
        );

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let gate = gate.clone();
                tokio::spawn(async move {
                    let allowed = i % 2 == 0;
                    let introspective = i % 3 == 0;
                    let query = if introspective { INTROSPECTION } else { "{ helloWorld }" };
                    let mut request = GraphQLRequest::new(query);
                    if allowed {
                        request = request.with_headers([("x-allow", "1")]);
                    }
                    let schema = Arc::new(Schema::parse(SDL).unwrap());
                    let document = Document::parse(query).unwrap();
                    let ctx = RequestContext::new(request, schema, document);

                    let verdict = gate.evaluate(&ctx).await.unwrap();
                    (allowed, introspective, verdict)
                })
            })
            .collect();

        for task in tasks {
            let (allowed, introspective, verdict) = task.await.unwrap();
            if !allowed && introspective {
                let response = verdict.into_response().unwrap();
                assert_eq!(response.http.status, Some(403));
                assert_eq!(response.result().errors, vec![introspection_not_allowed()]);
            } else {
                assert!(verdict.is_pass_through());
            }
        }
    }
}
