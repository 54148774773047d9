//! Schema index built from SDL.

use crate::{Error, Result};
use graphql_parser::schema::{self, Definition, TypeDefinition, TypeExtension};
use indexmap::IndexMap;
use serde::Serialize;

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// The kind of a named type, as reported by `__Type.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Scalar => "SCALAR",
            TypeKind::Object => "OBJECT",
            TypeKind::Interface => "INTERFACE",
            TypeKind::Union => "UNION",
            TypeKind::Enum => "ENUM",
            TypeKind::InputObject => "INPUT_OBJECT",
        }
    }
}

/// A named type and its output fields.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub name: String,
    pub kind: TypeKind,
    /// Field name to the field's named (unwrapped) return type.
    pub fields: IndexMap<String, String>,
}

impl TypeInfo {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: IndexMap::new(),
        }
    }
}

/// An executable schema description: root operation types plus every named type.
#[derive(Debug, Clone)]
pub struct Schema {
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    types: IndexMap<String, TypeInfo>,
}

impl Schema {
    /// Parse a schema from SDL.
    ///
    /// Root types come from a `schema { ... }` block when present, otherwise
    /// from types named `Query`, `Mutation` and `Subscription`.
    pub fn parse(sdl: &str) -> Result<Self> {
        let document = schema::parse_schema::<String>(sdl)
            .map_err(|e| Error::Syntax(e.to_string()))?;

        let mut types: IndexMap<String, TypeInfo> = BUILTIN_SCALARS
            .iter()
            .map(|name| (name.to_string(), TypeInfo::new(*name, TypeKind::Scalar)))
            .collect();
        let mut roots = None;
        let mut extensions = Vec::new();

        for definition in document.definitions {
            match definition {
                Definition::SchemaDefinition(def) => {
                    roots = Some((def.query, def.mutation, def.subscription));
                }
                Definition::TypeDefinition(def) => {
                    let info = type_info(def);
                    types.insert(info.name.clone(), info);
                }
                Definition::TypeExtension(ext) => extensions.push(ext),
                Definition::DirectiveDefinition(_) => {}
            }
        }

        for ext in extensions {
            let (name, fields) = match ext {
                TypeExtension::Object(ext) => (ext.name, ext.fields),
                TypeExtension::Interface(ext) => (ext.name, ext.fields),
                _ => continue,
            };
            let info = types
                .get_mut(&name)
                .ok_or_else(|| Error::Schema(format!("cannot extend unknown type '{name}'")))?;
            for field in fields {
                info.fields.insert(field.name, named_type(&field.field_type));
            }
        }

        let (query, mutation, subscription) = match roots {
            Some(roots) => roots,
            None => (
                types.contains_key("Query").then(|| "Query".to_string()),
                types.contains_key("Mutation").then(|| "Mutation".to_string()),
                types.contains_key("Subscription").then(|| "Subscription".to_string()),
            ),
        };
        let query_type = query.ok_or_else(|| Error::Schema("schema has no query type".into()))?;

        for root in [Some(&query_type), mutation.as_ref(), subscription.as_ref()]
            .into_iter()
            .flatten()
        {
            match types.get(root) {
                Some(info) if info.kind == TypeKind::Object => {}
                _ => {
                    return Err(Error::Schema(format!(
                        "root type '{root}' must be a defined object type"
                    )));
                }
            }
        }

        Ok(Self {
            query_type,
            mutation_type: mutation,
            subscription_type: subscription,
            types,
        })
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn subscription_type(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeInfo> {
        self.types.get(name)
    }

    /// All named types in definition order, built-in scalars first.
    pub fn types(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.values()
    }

    /// Named return type of `parent.field`.
    ///
    /// Covers `__typename` on any type, `__schema` and `__type` on the query
    /// root, fields of the introspection types, and fields declared in SDL.
    pub fn field_type<'a>(&'a self, parent: &str, field: &str) -> Option<&'a str> {
        if field == "__typename" {
            return Some("String");
        }
        if parent == self.query_type {
            match field {
                "__schema" => return Some("__Schema"),
                "__type" => return Some("__Type"),
                _ => {}
            }
        }
        if is_introspection_type(parent) {
            return introspection_field_type(parent, field);
        }
        self.types
            .get(parent)
            .and_then(|info| info.fields.get(field))
            .map(String::as_str)
    }
}

/// Whether `name` is one of the built-in introspection types.
pub fn is_introspection_type(name: &str) -> bool {
    matches!(
        name,
        "__Schema"
            | "__Type"
            | "__Field"
            | "__InputValue"
            | "__EnumValue"
            | "__Directive"
            | "__DirectiveLocation"
            | "__TypeKind"
    )
}

fn introspection_field_type(parent: &str, field: &str) -> Option<&'static str> {
    let ty = match (parent, field) {
        ("__Schema", "description") => "String",
        ("__Schema", "types" | "queryType" | "mutationType" | "subscriptionType") => "__Type",
        ("__Schema", "directives") => "__Directive",

        ("__Type", "kind") => "__TypeKind",
        ("__Type", "name" | "description" | "specifiedByURL") => "String",
        ("__Type", "fields") => "__Field",
        ("__Type", "interfaces" | "possibleTypes" | "ofType") => "__Type",
        ("__Type", "enumValues") => "__EnumValue",
        ("__Type", "inputFields") => "__InputValue",
        ("__Type", "isOneOf") => "Boolean",

        ("__Field", "name" | "description" | "deprecationReason") => "String",
        ("__Field", "args") => "__InputValue",
        ("__Field", "type") => "__Type",
        ("__Field", "isDeprecated") => "Boolean",

        ("__InputValue", "name" | "description" | "defaultValue" | "deprecationReason") => {
            "String"
        }
        ("__InputValue", "type") => "__Type",
        ("__InputValue", "isDeprecated") => "Boolean",

        ("__EnumValue", "name" | "description" | "deprecationReason") => "String",
        ("__EnumValue", "isDeprecated") => "Boolean",

        ("__Directive", "name" | "description") => "String",
        ("__Directive", "locations") => "__DirectiveLocation",
        ("__Directive", "args") => "__InputValue",
        ("__Directive", "isRepeatable") => "Boolean",

        _ => return None,
    };
    Some(ty)
}

fn type_info(def: TypeDefinition<'_, String>) -> TypeInfo {
    match def {
        TypeDefinition::Scalar(t) => TypeInfo::new(t.name, TypeKind::Scalar),
        TypeDefinition::Object(t) => {
            let mut info = TypeInfo::new(t.name, TypeKind::Object);
            for field in t.fields {
                info.fields.insert(field.name, named_type(&field.field_type));
            }
            info
        }
        TypeDefinition::Interface(t) => {
            let mut info = TypeInfo::new(t.name, TypeKind::Interface);
            for field in t.fields {
                info.fields.insert(field.name, named_type(&field.field_type));
            }
            info
        }
        TypeDefinition::Union(t) => TypeInfo::new(t.name, TypeKind::Union),
        TypeDefinition::Enum(t) => TypeInfo::new(t.name, TypeKind::Enum),
        TypeDefinition::InputObject(t) => TypeInfo::new(t.name, TypeKind::InputObject),
    }
}

fn named_type(ty: &schema::Type<'_, String>) -> String {
    match ty {
        schema::Type::NamedType(name) => name.clone(),
        schema::Type::ListType(inner) | schema::Type::NonNullType(inner) => named_type(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SDL: &str = r#"
        type Query {
            helloWorld: String
            user(id: ID!): User
        }

        type User {
            id: ID!
            friends: [User!]!
        }
    "#;

    #[test]
    fn default_root_types() {
        let schema = Schema::parse(SDL).unwrap();
        assert_eq!(schema.query_type(), "Query");
        assert!(schema.mutation_type().is_none());
    }

    #[test]
    fn explicit_schema_block() {
        let schema = Schema::parse(
            "schema { query: Root } type Root { ok: Boolean }",
        )
        .unwrap();
        assert_eq!(schema.query_type(), "Root");
        assert_eq!(schema.field_type("Root", "__schema"), Some("__Schema"));
    }

    #[test]
    fn field_types_are_unwrapped() {
        let schema = Schema::parse(SDL).unwrap();
        assert_eq!(schema.field_type("User", "friends"), Some("User"));
        assert_eq!(schema.field_type("Query", "user"), Some("User"));
        assert_eq!(schema.field_type("User", "missing"), None);
    }

    #[test]
    fn meta_fields_only_on_query_root() {
        let schema = Schema::parse(SDL).unwrap();
        assert_eq!(schema.field_type("Query", "__type"), Some("__Type"));
        assert_eq!(schema.field_type("User", "__schema"), None);
        assert_eq!(schema.field_type("User", "__typename"), Some("String"));
        assert_eq!(schema.field_type("__Schema", "queryType"), Some("__Type"));
    }

    #[test]
    fn extensions_add_fields() {
        let schema =
            Schema::parse("type Query { a: Int } extend type Query { b: String }").unwrap();
        assert_eq!(schema.field_type("Query", "b"), Some("String"));
    }

    #[test]
    fn missing_query_type_is_rejected() {
        assert!(matches!(
            Schema::parse("type Foo { a: Int }"),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(matches!(Schema::parse("type {"), Err(Error::Syntax(_))));
    }
}
