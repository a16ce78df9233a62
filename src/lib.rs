//! # Flowplan - Flow Plan Compilation and Validation Engine
//!
//! **Flowplan** turns templated flow plans, authored by plugins of a data-pipeline
//! platform, into concrete and validated runtime flows. A plan that fails validation
//! is still compiled: the resulting [`types::Flow`] is marked `INVALID` and carries
//! every problem that was found, so operators can see and fix it.
//!
//! ## Core Workflow
//!
//! 1.  **Register Actions**: Load the descriptors published by installed plugins into an
//!     [`registry::ActionRegistry`] (or implement [`registry::ActionLookup`] over your own store).
//! 2.  **Build a Compiler**: Use `FlowCompiler::builder` with the registry, the plans that are
//!     already registered, and optionally a shared [`schema::ParameterValidator`].
//! 3.  **Compile**: `compile` resolves `${...}` variables, checks names, include/exclude lists,
//!     domain overlaps, action parameters (JSON Schema) and ingress reachability.
//! 4.  **Install**: `install` / `install_plugin` reject plans with structural problems outright.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowplan::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let registry = ActionRegistry::new().with_descriptor(
//!         ActionDescriptor::new("org.example.RestEgress", ActionType::Egress)
//!             .with_schema(json!({
//!                 "type": "object",
//!                 "properties": { "url": { "type": "string" } },
//!                 "required": ["url"]
//!             }))
//!             .heard_at(chrono::Utc::now()),
//!     );
//!
//!     let plan: FlowPlan = serde_json::from_value(json!({
//!         "type": "EGRESS",
//!         "name": "out",
//!         "egressAction": {
//!             "name": "RestEgress",
//!             "type": "org.example.RestEgress",
//!             "parameters": { "url": "${egressUrl}" }
//!         }
//!     }))?;
//!     let variables = vec![
//!         Variable::new("egressUrl", VariableDataType::String).with_value("https://egress"),
//!     ];
//!
//!     let catalog = PlanCatalog::new();
//!     let compiler = FlowCompiler::builder(&registry).with_plans(&catalog).build();
//!     let flow = compiler.compile(&plan, &variables);
//!
//!     for error in &flow.status.errors {
//!         println!("-> {error}");
//!     }
//!     println!("Flow '{}' is {:?}", flow.name(), flow.status.state);
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod prelude;
pub mod registry;
pub mod schema;
pub mod template;
pub mod types;
pub mod validation;
