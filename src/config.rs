use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for the compilation engine. Every field has a default so a partial
/// (or empty) JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Seconds without a heartbeat before an action counts as inactive. `None` disables the check.
    pub action_inactivity_threshold_secs: Option<i64>,
    /// Rejects parameters a schema does not declare, unless the schema says otherwise.
    pub reject_additional_properties: bool,
    /// Accepts strings that parse as the primitive a schema expects.
    pub type_loose: bool,
    /// Fills schema `default` values into missing parameters before validation.
    pub apply_schema_defaults: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            action_inactivity_threshold_secs: Some(300),
            reject_additional_properties: true,
            type_loose: true,
            apply_schema_defaults: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
