//! Gate settings and request arguments from the command line.

use std::path::{Path, PathBuf};

use gate::GateSettings;
use graphql::HeaderSet;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Settings file picked up from the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "gate.toml";

/// Load gate settings.
///
/// An explicit path must exist. Otherwise `gate.toml` in the working
/// directory is used if present, falling back to the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<GateSettings> {
    match path {
        Some(path) => Ok(GateSettings::load(path)?),
        None => {
            let default = PathBuf::from(CONFIG_FILE);
            if default.exists() {
                tracing::debug!(path = CONFIG_FILE, "using settings from working directory");
                Ok(GateSettings::load(&default)?)
            } else {
                Ok(GateSettings::default())
            }
        }
    }
}

/// Parse repeated `name:value` arguments.
pub fn parse_headers(args: &[String]) -> Result<HeaderSet> {
    args.iter()
        .map(|arg| {
            let (name, value) = arg.split_once(':').ok_or_else(|| Error::InvalidHeader {
                arg: arg.clone(),
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::InvalidHeader { arg: arg.clone() });
            }
            Ok((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Parse `--variables`; absent means no variables.
pub fn parse_variables(json: Option<&str>) -> Result<Map<String, Value>> {
    let Some(json) = json else {
        return Ok(Map::new());
    };
    match serde_json::from_str(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::InvalidVariables {
            reason: format!("expected an object, got {other}"),
        }),
        Err(e) => Err(Error::InvalidVariables {
            reason: e.to_string(),
        }),
    }
}

/// Read a file named on the command line.
pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}
