//! Parsed executable documents.

use crate::{Error, Result};
use graphql_parser::query::{self, Definition, FragmentDefinition, OperationDefinition};

pub type SelectionSet = query::SelectionSet<'static, String>;
pub type Selection = query::Selection<'static, String>;
pub type Field = query::Field<'static, String>;
pub type InputValue = query::Value<'static, String>;

/// Operation type of an executable definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

/// A borrowed view of one operation inside a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    pub name: Option<&'a str>,
    pub kind: OperationKind,
    pub selection_set: &'a SelectionSet,
}

/// A parsed query document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    ast: query::Document<'static, String>,
}

impl Document {
    /// Parse query text.
    pub fn parse(source: &str) -> Result<Self> {
        let ast = query::parse_query::<String>(source)
            .map_err(|e| Error::Syntax(e.to_string()))?
            .into_static();
        Ok(Self { ast })
    }

    /// All operations, in document order.
    pub fn operations(&self) -> impl Iterator<Item = Operation<'_>> {
        self.ast.definitions.iter().filter_map(|def| match def {
            Definition::Operation(op) => Some(operation(op)),
            Definition::Fragment(_) => None,
        })
    }

    /// All fragment definitions, in document order.
    pub fn fragments(&self) -> impl Iterator<Item = &FragmentDefinition<'static, String>> {
        self.ast.definitions.iter().filter_map(|def| match def {
            Definition::Fragment(fragment) => Some(fragment),
            Definition::Operation(_) => None,
        })
    }

    pub fn fragment(&self, name: &str) -> Option<&FragmentDefinition<'static, String>> {
        self.fragments().find(|fragment| fragment.name == name)
    }

    /// Pick the operation to run.
    ///
    /// With a name, the operation must exist. Without one, the document must
    /// contain exactly one operation.
    pub fn operation(&self, name: Option<&str>) -> Result<Operation<'_>> {
        match name {
            Some(name) => self
                .operations()
                .find(|op| op.name == Some(name))
                .ok_or_else(|| Error::UnknownOperation(name.to_string())),
            None => {
                let mut operations = self.operations();
                let first = operations.next().ok_or(Error::NoOperation)?;
                if operations.next().is_some() {
                    return Err(Error::AmbiguousOperation);
                }
                Ok(first)
            }
        }
    }
}

fn operation<'a>(def: &'a OperationDefinition<'static, String>) -> Operation<'a> {
    match def {
        OperationDefinition::SelectionSet(set) => Operation {
            name: None,
            kind: OperationKind::Query,
            selection_set: set,
        },
        OperationDefinition::Query(q) => Operation {
            name: q.name.as_deref(),
            kind: OperationKind::Query,
            selection_set: &q.selection_set,
        },
        OperationDefinition::Mutation(m) => Operation {
            name: m.name.as_deref(),
            kind: OperationKind::Mutation,
            selection_set: &m.selection_set,
        },
        OperationDefinition::Subscription(s) => Operation {
            name: s.name.as_deref(),
            kind: OperationKind::Subscription,
            selection_set: &s.selection_set,
        },
    }
}
