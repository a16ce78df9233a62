//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowplan crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowplan::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let config = EngineConfig::from_file("path/to/engine.json")?;
//! let descriptors: Vec<ActionDescriptor> =
//!     serde_json::from_str(&std::fs::read_to_string("path/to/descriptors.json")?)?;
//! let registry: ActionRegistry = descriptors.into_iter().collect();
//!
//! let compiler = FlowCompiler::builder(&registry).with_config(&config).build();
//! let plan: FlowPlan = serde_json::from_str(&std::fs::read_to_string("path/to/plan.json")?)?;
//! let flow = compiler.install(&plan, &[])?;
//! println!("Flow state: {:?}", flow.status.state);
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::compiler::{FlowCompiler, PluginRegistration, invalid_flows};
pub use crate::config::EngineConfig;
pub use crate::schema::ParameterValidator;
pub use crate::template::{TemplateResolver, resolve};
pub use crate::validation::{PlanValidator, check_reachability, validate_collection};

// Collaborator interfaces
pub use crate::registry::{
    ActionLookup, ActionRegistry, PlanCatalog, PlanSource, RuleValidator, TopicRuleValidator,
};

// Data model
pub use crate::types::{
    ActionConfiguration, ActionDescriptor, ActionType, Flow, FlowConfigError, FlowErrorType,
    FlowKind, FlowPlan, FlowState, FlowStatus, PlanHeader, PluginCoordinates, Variable,
    VariableDataType,
};

// Error types
pub use crate::error::{ConfigError, InstallError, SchemaError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
