use super::FlowCompiler;
use crate::error::InstallError;
use crate::types::{Flow, FlowPlan, PluginCoordinates, Variable};
use crate::validation::{duplicate_data_source_names, validate_variables};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything a plugin brings with it when it is installed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRegistration {
    pub coordinates: PluginCoordinates,
    #[serde(default)]
    pub flow_plans: Vec<FlowPlan>,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl FlowCompiler<'_> {
    /// Installs a single new plan. Structural problems with the plan itself block
    /// the install; anything else is recorded on the compiled flow.
    pub fn install(&self, plan: &FlowPlan, variables: &[Variable]) -> Result<Flow, InstallError> {
        let errors = self.validate_plan(plan);
        if !errors.is_empty() {
            warn!(plan = plan.name(), errors = errors.len(), "rejecting flow plan");
            return Err(InstallError::InvalidPlan(errors));
        }
        Ok(self.compile(plan, variables))
    }

    /// Validates a plugin's variables and plans as a unit, then compiles each plan.
    /// Nothing is compiled unless the whole registration is acceptable.
    pub fn install_plugin(
        &self,
        registration: &PluginRegistration,
    ) -> Result<Vec<Flow>, InstallError> {
        let mut problems = validate_variables(&registration.variables);
        if let Some(duplicates) = duplicate_data_source_names(&registration.flow_plans) {
            problems.push(duplicates);
        }
        for plan in &registration.flow_plans {
            problems.extend(self.validate_plan(plan).iter().map(ToString::to_string));
        }

        if !problems.is_empty() {
            warn!(
                plugin = %registration.coordinates,
                problems = problems.len(),
                "rejecting plugin registration"
            );
            return Err(InstallError::InvalidPlugin {
                plugin: registration.coordinates.clone(),
                errors: problems,
            });
        }

        info!(
            plugin = %registration.coordinates,
            plans = registration.flow_plans.len(),
            "installing plugin flow plans"
        );
        Ok(registration
            .flow_plans
            .iter()
            .map(|plan| self.compile(plan, &registration.variables))
            .collect())
    }
}
