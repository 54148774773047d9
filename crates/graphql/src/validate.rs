//! Document validation against a schema.

use crate::document::{OperationKind, Selection, SelectionSet};
use crate::schema::is_introspection_type;
use crate::{Document, Location, Result, Schema};
use graphql_parser::query::TypeCondition;
use std::future::Future;

/// A named validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Rule {
    /// Rejects any field whose return type is an introspection type.
    NoSchemaIntrospection,
}

/// A forbidden construct found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: Rule,
    pub message: String,
    pub locations: Vec<Location>,
}

/// Validates a document against a schema with a set of rules.
///
/// `max_violations` lets callers stop early; `None` collects everything.
pub trait Validate: Send + Sync {
    fn validate(
        &self,
        schema: &Schema,
        document: &Document,
        rules: &[Rule],
        max_violations: Option<usize>,
    ) -> impl Future<Output = Result<Vec<Violation>>> + Send;
}

/// The built-in validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validate for Validator {
    async fn validate(
        &self,
        schema: &Schema,
        document: &Document,
        rules: &[Rule],
        max_violations: Option<usize>,
    ) -> Result<Vec<Violation>> {
        Ok(validate(schema, document, rules, max_violations))
    }
}

/// Run `rules` over every operation and fragment definition in `document`.
pub fn validate(
    schema: &Schema,
    document: &Document,
    rules: &[Rule],
    max_violations: Option<usize>,
) -> Vec<Violation> {
    let mut walker = Walker {
        schema,
        rules,
        max_violations,
        violations: Vec::new(),
    };

    for op in document.operations() {
        let root = match op.kind {
            OperationKind::Query => Some(schema.query_type()),
            OperationKind::Mutation => schema.mutation_type(),
            OperationKind::Subscription => schema.subscription_type(),
        };
        walker.selection_set(root, op.selection_set);
    }
    for fragment in document.fragments() {
        let TypeCondition::On(type_name) = &fragment.type_condition;
        walker.selection_set(Some(type_name.as_str()), &fragment.selection_set);
    }

    walker.violations
}

struct Walker<'a> {
    schema: &'a Schema,
    rules: &'a [Rule],
    max_violations: Option<usize>,
    violations: Vec<Violation>,
}

impl<'a> Walker<'a> {
    fn done(&self) -> bool {
        self.max_violations
            .is_some_and(|max| self.violations.len() >= max)
    }

    // Fragment spreads are skipped: each fragment definition is walked once
    // with its own type condition.
    fn selection_set(&mut self, parent: Option<&'a str>, set: &'a SelectionSet) {
        for selection in &set.items {
            if self.done() {
                return;
            }
            match selection {
                Selection::Field(field) => {
                    let schema = self.schema;
                    let field_type = parent.and_then(|p| schema.field_type(p, &field.name));
                    self.field(&field.name, field.position.into(), field_type);
                    self.selection_set(field_type, &field.selection_set);
                }
                Selection::InlineFragment(fragment) => {
                    let narrowed = match &fragment.type_condition {
                        Some(TypeCondition::On(name)) => Some(name.as_str()),
                        None => parent,
                    };
                    self.selection_set(narrowed, &fragment.selection_set);
                }
                Selection::FragmentSpread(_) => {}
            }
        }
    }

    fn field(&mut self, name: &str, location: Location, field_type: Option<&str>) {
        for rule in self.rules {
            if self.done() {
                return;
            }
            match rule {
                Rule::NoSchemaIntrospection => {
                    if field_type.is_some_and(is_introspection_type) {
                        self.violations.push(Violation {
                            rule: *rule,
                            message: format!(
                                "GraphQL introspection has been disabled, but the requested query contained the field \"{name}\"."
                            ),
                            locations: vec![location],
                        });
                    }
                }
            }
        }
    }
}
