//! Allow policies expressible in configuration files.

use serde::{Deserialize, Serialize};
use server::RequestContext;

use crate::gate::Predicate;

/// Who may use introspection.
///
/// ```toml
/// [allow]
/// mode = "header"
/// name = "x-allow-introspection"
/// value = "yes"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AllowPolicy {
    /// Everyone.
    Always,
    /// Nobody.
    #[default]
    Never,
    /// Requests carrying header `name`, optionally with exactly `value`.
    Header {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
}

impl AllowPolicy {
    pub fn allows(&self, ctx: &RequestContext) -> bool {
        match self {
            AllowPolicy::Always => true,
            AllowPolicy::Never => false,
            AllowPolicy::Header { name, value } => match (ctx.header(name), value) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
            },
        }
    }
}

impl From<AllowPolicy> for Predicate {
    fn from(policy: AllowPolicy) -> Self {
        match policy {
            AllowPolicy::Always => Predicate::always(),
            AllowPolicy::Never => Predicate::never(),
            header => Predicate::new(move |ctx| header.allows(ctx)),
        }
    }
}
