//! JSON values for the `__schema` and `__type` meta fields.
//!
//! Field types are reported by their named type only; list and non-null
//! wrappers are not tracked by the schema index.

use graphql::{Schema, TypeInfo, TypeKind};
use serde_json::{Value, json};

pub(crate) fn schema_value(schema: &Schema) -> Value {
    let root = |name: Option<&str>| {
        name.and_then(|n| schema.get_type(n))
            .map(|info| type_value(schema, info))
            .unwrap_or(Value::Null)
    };
    let types: Vec<Value> = schema.types().map(|info| type_value(schema, info)).collect();

    json!({
        "description": null,
        "queryType": root(Some(schema.query_type())),
        "mutationType": root(schema.mutation_type()),
        "subscriptionType": root(schema.subscription_type()),
        "types": types,
        "directives": [],
    })
}

pub(crate) fn named_type_value(schema: &Schema, name: &str) -> Value {
    schema
        .get_type(name)
        .map(|info| type_value(schema, info))
        .unwrap_or(Value::Null)
}

fn type_value(schema: &Schema, info: &TypeInfo) -> Value {
    let has_fields = matches!(info.kind, TypeKind::Object | TypeKind::Interface);
    let fields = has_fields.then(|| {
        info.fields
            .iter()
            .map(|(name, ty)| {
                json!({
                    "name": name,
                    "description": null,
                    "args": [],
                    "type": type_ref(schema, ty),
                    "isDeprecated": false,
                    "deprecationReason": null,
                })
            })
            .collect::<Vec<_>>()
    });
    let interfaces = (info.kind == TypeKind::Object).then(Vec::<Value>::new);

    json!({
        "kind": info.kind.as_str(),
        "name": info.name,
        "description": null,
        "fields": fields,
        "interfaces": interfaces,
        "possibleTypes": null,
        "enumValues": null,
        "inputFields": null,
        "ofType": null,
        "specifiedByURL": null,
    })
}

fn type_ref(schema: &Schema, name: &str) -> Value {
    let kind = schema
        .get_type(name)
        .map(|info| info.kind)
        .unwrap_or(TypeKind::Scalar);
    json!({ "kind": kind.as_str(), "name": name, "ofType": null })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_type_name() {
        let schema = Schema::parse("type Query { helloWorld: String }").unwrap();
        let value = schema_value(&schema);
        assert_eq!(value["queryType"]["name"], "Query");
        assert_eq!(value["mutationType"], Value::Null);
        assert_eq!(value["queryType"]["fields"][0]["name"], "helloWorld");
        assert_eq!(value["queryType"]["fields"][0]["type"]["kind"], "SCALAR");
    }

    #[test]
    fn unknown_type_is_null() {
        let schema = Schema::parse("type Query { a: Int }").unwrap();
        assert_eq!(named_type_value(&schema, "Nope"), Value::Null);
        assert_eq!(named_type_value(&schema, "Int")["kind"], "SCALAR");
    }
}
