use crate::types::{FlowConfigError, PluginCoordinates};
use itertools::Itertools;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that block a plan or plugin from being installed at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstallError {
    #[error("{}", .0.iter().join("; "))]
    InvalidPlan(Vec<FlowConfigError>),

    #[error("Plugin {plugin} could not be installed: {}", .errors.join("; "))]
    InvalidPlugin {
        plugin: PluginCoordinates,
        errors: Vec<String>,
    },
}

impl InstallError {
    /// Every individual message carried by the error.
    pub fn messages(&self) -> Vec<String> {
        match self {
            InstallError::InvalidPlan(errors) => errors.iter().map(|e| e.to_string()).collect(),
            InstallError::InvalidPlugin { errors, .. } => errors.clone(),
        }
    }
}

/// Errors that can occur while loading the engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read engine configuration '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse engine configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A plugin published a schema that cannot be compiled.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("The schema published for action type: {type_name} is invalid: {detail}")]
    Invalid { type_name: String, detail: String },
}
