//! Gate configuration, programmatic and from TOML.

use std::path::Path;

use graphql::{GraphQLError, HeaderSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::gate::{DEFAULT_ERROR_MESSAGE, Predicate};
use crate::policy::AllowPolicy;
use crate::{Error, Result};

/// Immutable gate configuration.
///
/// Only the predicate is required. Unset overrides fall back to: no status
/// (the host decides), no extra headers, and the default
/// "Introspection is not allowed" error.
#[derive(Debug, Clone)]
pub struct GateConfig {
    predicate: Predicate,
    override_status_code: Option<u16>,
    override_headers: Option<HeaderSet>,
    override_error: Option<GraphQLError>,
}

impl GateConfig {
    pub fn builder(predicate: Predicate) -> GateConfigBuilder {
        GateConfigBuilder {
            config: Self {
                predicate,
                override_status_code: None,
                override_headers: None,
                override_error: None,
            },
        }
    }

    /// Build a configuration from file-based settings.
    pub fn from_settings(settings: GateSettings) -> Self {
        let mut builder = Self::builder(settings.allow.into());
        if let Some(status) = settings.status_code {
            builder = builder.override_status_code(status);
        }
        if !settings.headers.is_empty() {
            builder = builder.override_headers(settings.headers);
        }
        if let Some(error) = settings.error {
            builder = builder.override_error(error.into_error());
        }
        builder.build()
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn override_status_code(&self) -> Option<u16> {
        self.override_status_code
    }

    pub fn override_headers(&self) -> Option<&HeaderSet> {
        self.override_headers.as_ref()
    }

    pub fn override_error(&self) -> Option<&GraphQLError> {
        self.override_error.as_ref()
    }
}

#[derive(Debug)]
pub struct GateConfigBuilder {
    config: GateConfig,
}

impl GateConfigBuilder {
    pub fn override_status_code(mut self, status: u16) -> Self {
        self.config.override_status_code = Some(status);
        self
    }

    /// Headers attached to terminal responses. Names are stored lowercase.
    pub fn override_headers(mut self, headers: impl Into<HeaderSet>) -> Self {
        self.config.override_headers = Some(headers.into());
        self
    }

    /// Error returned verbatim instead of the default one.
    pub fn override_error(mut self, error: GraphQLError) -> Self {
        self.config.override_error = Some(error);
        self
    }

    pub fn build(self) -> GateConfig {
        self.config
    }
}

/// Gate settings loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateSettings {
    /// Status code of terminal responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Headers attached to terminal responses.
    #[serde(default, skip_serializing_if = "HeaderSet::is_empty")]
    pub headers: HeaderSet,

    /// Replacement for the default error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSettings>,

    /// Who may introspect. Defaults to nobody.
    #[serde(default)]
    pub allow: AllowPolicy,
}

impl GateSettings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse settings from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))
    }
}

/// The `[error]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSettings {
    #[serde(default = "default_message")]
    pub message: String,

    /// Stored as `extensions.code`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

fn default_message() -> String {
    DEFAULT_ERROR_MESSAGE.to_string()
}

impl ErrorSettings {
    pub fn into_error(self) -> GraphQLError {
        let mut error = GraphQLError::new(self.message);
        if let Some(code) = self.code {
            error = error.with_code(code);
        }
        for (key, value) in self.extensions {
            // An explicit `code` wins over `extensions.code`.
            if key == "code" && error.code().is_some() {
                continue;
            }
            error = error.with_extension(key, value);
        }
        error
    }
}
