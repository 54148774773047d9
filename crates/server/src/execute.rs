//! Operation execution.
//!
//! Root fields are resolved through registered resolvers; nested selections
//! are projected out of the JSON those resolvers return.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use graphql::document::{Field, InputValue, Selection, SelectionSet};
use graphql::{ExecutionResult, GraphQLError, OperationKind};
use serde_json::{Map, Number, Value};

use crate::context::RequestContext;
use crate::introspection;

/// A root field resolver: receives the request context and the field's
/// coerced arguments.
pub type Resolver = Arc<dyn Fn(&RequestContext, &Map<String, Value>) -> Value + Send + Sync>;

pub(crate) type Resolvers = HashMap<(String, String), Resolver>;

/// Run the selected operation.
///
/// An `Err` means the operation cannot run against this schema at all, such
/// as a field the schema does not define.
pub(crate) fn execute(
    ctx: &RequestContext,
    resolvers: &Resolvers,
) -> Result<ExecutionResult, GraphQLError> {
    let schema = ctx.schema();
    let operation = ctx
        .document()
        .operation(ctx.operation_name())
        .map_err(|e| GraphQLError::new(e.to_string()))?;

    let root = match operation.kind {
        OperationKind::Query => Some(schema.query_type()),
        OperationKind::Mutation => schema.mutation_type(),
        OperationKind::Subscription => None,
    }
    .ok_or_else(|| {
        GraphQLError::new(format!(
            "Schema is not configured to execute {:?} operations.",
            operation.kind
        ))
    })?;

    let executor = Executor { ctx, resolvers };
    let data = executor.root(root, operation.selection_set)?;
    Ok(ExecutionResult::data(data))
}

struct Executor<'a> {
    ctx: &'a RequestContext,
    resolvers: &'a Resolvers,
}

impl<'a> Executor<'a> {
    fn root(&self, root: &str, set: &'a SelectionSet) -> Result<Value, GraphQLError> {
        let schema = self.ctx.schema();
        let is_query = root == schema.query_type();
        let mut data = Map::new();

        for field in self.collect_fields(set) {
            let key = response_key(field);
            let value = match field.name.as_str() {
                "__typename" => Value::String(root.to_string()),
                "__schema" if is_query => {
                    let value = introspection::schema_value(schema);
                    self.complete(value, "__Schema", field)?
                }
                "__type" if is_query => {
                    let args = self.arguments(field);
                    let value = args
                        .get("name")
                        .and_then(Value::as_str)
                        .map(|name| introspection::named_type_value(schema, name))
                        .unwrap_or(Value::Null);
                    self.complete(value, "__Type", field)?
                }
                name => {
                    let field_type = self.field_type(root, field)?;
                    let value = match self.resolvers.get(&(root.to_string(), name.to_string())) {
                        Some(resolver) => resolver(self.ctx, &self.arguments(field)),
                        None => Value::Null,
                    };
                    self.complete(value, field_type, field)?
                }
            };

            data.insert(key.to_string(), value);
        }

        Ok(Value::Object(data))
    }

    fn complete(
        &self,
        value: Value,
        type_name: &str,
        field: &'a Field,
    ) -> Result<Value, GraphQLError> {
        if field.selection_set.items.is_empty() {
            return Ok(value);
        }
        match value {
            Value::Array(items) => {
                let mut completed = Vec::with_capacity(items.len());
                for item in items {
                    completed.push(self.complete(item, type_name, field)?);
                }
                Ok(Value::Array(completed))
            }
            Value::Object(object) => self.project(&object, type_name, &field.selection_set),
            other => Ok(other),
        }
    }

    fn project(
        &self,
        object: &Map<String, Value>,
        type_name: &str,
        set: &'a SelectionSet,
    ) -> Result<Value, GraphQLError> {
        let mut data = Map::new();

        for field in self.collect_fields(set) {
            let key = response_key(field);
            let value = if field.name == "__typename" {
                object
                    .get("__typename")
                    .cloned()
                    .unwrap_or_else(|| Value::String(type_name.to_string()))
            } else {
                let field_type = self.field_type(type_name, field)?;
                let child = object.get(&field.name).cloned().unwrap_or(Value::Null);
                self.complete(child, field_type, field)?
            };
            data.insert(key.to_string(), value);
        }

        Ok(Value::Object(data))
    }

    fn field_type(&self, parent: &str, field: &Field) -> Result<&'a str, GraphQLError> {
        self.ctx.schema().field_type(parent, &field.name).ok_or_else(|| {
            GraphQLError::new(format!(
                "Cannot query field \"{}\" on type \"{parent}\".",
                field.name
            ))
            .with_location(field.position)
        })
    }

    /// Flatten inline fragments and fragment spreads into a field list.
    fn collect_fields(&self, set: &'a SelectionSet) -> Vec<&'a Field> {
        let mut fields = Vec::new();
        let mut visited = HashSet::new();
        self.collect_into(set, &mut fields, &mut visited);
        fields
    }

    fn collect_into(
        &self,
        set: &'a SelectionSet,
        fields: &mut Vec<&'a Field>,
        visited: &mut HashSet<&'a str>,
    ) {
        for selection in &set.items {
            match selection {
                Selection::Field(field) => fields.push(field),
                Selection::InlineFragment(fragment) => {
                    self.collect_into(&fragment.selection_set, fields, visited)
                }
                Selection::FragmentSpread(spread) => {
                    if !visited.insert(spread.fragment_name.as_str()) {
                        continue;
                    }
                    if let Some(fragment) = self.ctx.document().fragment(&spread.fragment_name) {
                        self.collect_into(&fragment.selection_set, fields, visited);
                    }
                }
            }
        }
    }

    fn arguments(&self, field: &Field) -> Map<String, Value> {
        let variables = &self.ctx.request().variables;
        field
            .arguments
            .iter()
            .map(|(name, value)| (name.clone(), to_json(value, variables)))
            .collect()
    }
}

fn response_key(field: &Field) -> &str {
    field.alias.as_deref().unwrap_or(&field.name)
}

fn to_json(value: &InputValue, variables: &Map<String, Value>) -> Value {
    match value {
        InputValue::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
        InputValue::Int(n) => n.as_i64().map(Value::from).unwrap_or(Value::Null),
        InputValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        InputValue::String(s) => Value::String(s.clone()),
        InputValue::Boolean(b) => Value::Bool(*b),
        InputValue::Null => Value::Null,
        InputValue::Enum(e) => Value::String(e.clone()),
        InputValue::List(items) => Value::Array(items.iter().map(|v| to_json(v, variables)).collect()),
        InputValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v, variables)))
                .collect(),
        ),
    }
}
