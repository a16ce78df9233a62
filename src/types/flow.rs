use super::plan::FlowPlan;
use super::variable::Variable;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowErrorType {
    InvalidConfig,
    InvalidActionParameters,
    UnregisteredAction,
    InactiveAction,
    UnresolvedVariable,
}

/// A single diagnostic produced while compiling or validating a plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowConfigError {
    pub config_name: String,
    pub error_type: FlowErrorType,
    pub message: String,
}

impl FlowConfigError {
    pub fn new(config_name: &str, error_type: FlowErrorType, message: impl Into<String>) -> Self {
        Self {
            config_name: config_name.to_string(),
            error_type,
            message: message.into(),
        }
    }

    pub fn invalid_config(config_name: &str, message: impl Into<String>) -> Self {
        Self::new(config_name, FlowErrorType::InvalidConfig, message)
    }
}

impl fmt::Display for FlowConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config named: {} had the following error: {}",
            self.config_name, self.message
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowState {
    #[default]
    Stopped,
    Invalid,
    Running,
    TestMode,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStatus {
    pub state: FlowState,
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default)]
    pub errors: Vec<FlowConfigError>,
}

impl FlowStatus {
    /// Status for a freshly compiled flow: invalid when anything was reported, stopped otherwise.
    pub fn from_errors(errors: Vec<FlowConfigError>, test_mode: bool) -> Self {
        let state = if errors.is_empty() {
            FlowState::Stopped
        } else {
            FlowState::Invalid
        };
        Self {
            state,
            test_mode,
            errors,
        }
    }
}

/// The compiled form of a flow plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub plan: FlowPlan,
    pub status: FlowStatus,
    /// Variables that were substituted into the plan, masked where sensitive.
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Flow {
    pub fn name(&self) -> &str {
        self.plan.name()
    }

    pub fn is_invalid(&self) -> bool {
        self.status.state == FlowState::Invalid
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status.state, FlowState::Running | FlowState::TestMode)
    }
}
