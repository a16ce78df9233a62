//! Structural checks on a single plan and on plan collections.

mod domains;
mod names;
mod reachability;
mod sources;

pub use names::{duplicate_data_source_names, validate_collection};
pub use reachability::check_reachability;

use crate::registry::{PlanSource, RuleValidator};
use crate::types::{FlowConfigError, FlowKind, FlowPlan, Variable};
use itertools::Itertools;

/// Runs the plan-level structural checks against the currently registered plans.
pub struct PlanValidator<'a> {
    plans: &'a dyn PlanSource,
    rules: &'a dyn RuleValidator,
}

impl<'a> PlanValidator<'a> {
    pub fn new(plans: &'a dyn PlanSource, rules: &'a dyn RuleValidator) -> Self {
        Self { plans, rules }
    }

    /// Every structural problem with `plan`, de-duplicated in the order found.
    pub fn validate(&self, plan: &FlowPlan) -> Vec<FlowConfigError> {
        let mut errors = names::plan_name_errors(plan);
        errors.extend(names::duplicate_action_names(plan));
        errors.extend(sources::kind_specific_errors(plan));
        if let FlowPlan::Enrich(enrich) = plan {
            errors.extend(domains::domain_overlaps(
                enrich,
                &self.plans.get_all(FlowKind::Enrich),
            ));
        }
        errors.extend(self.rule_errors(plan));
        errors.extend(self.registration_conflicts(plan));
        errors.into_iter().unique().collect()
    }

    fn rule_errors(&self, plan: &FlowPlan) -> Vec<FlowConfigError> {
        self.rules
            .validate_subscriber(plan)
            .into_iter()
            .chain(self.rules.validate_publisher(plan))
            .map(|message| FlowConfigError::invalid_config(plan.name(), message))
            .collect()
    }

    /// Name clashes with plans that are already registered: the same kind owned by a
    /// different plugin, or a mutually exclusive kind under the same name.
    fn registration_conflicts(&self, plan: &FlowPlan) -> Vec<FlowConfigError> {
        let kind = plan.kind();
        let mut errors = Vec::new();
        for other_kind in FlowKind::ALL {
            if other_kind != kind && !kind.exclusive_with(other_kind) {
                continue;
            }
            for existing in self.plans.get_all(other_kind) {
                if existing.name() != plan.name() {
                    continue;
                }
                if other_kind == kind {
                    if !existing.source_plugin().same_plugin(plan.source_plugin()) {
                        errors.push(FlowConfigError::invalid_config(
                            plan.name(),
                            format!(
                                "A flow plan with the name: {} already exists from another source plugin: {}",
                                plan.name(),
                                existing.source_plugin()
                            ),
                        ));
                    }
                } else {
                    errors.push(FlowConfigError::invalid_config(
                        plan.name(),
                        format!(
                            "A {} named: {} already exists as a {} owned by plugin: {}",
                            kind.label(),
                            plan.name(),
                            other_kind.label(),
                            existing.source_plugin()
                        ),
                    ));
                }
            }
        }
        errors
    }
}

/// Checks that every variable's default value can be converted to its declared type.
pub fn validate_variables(variables: &[Variable]) -> Vec<String> {
    variables
        .iter()
        .filter_map(|variable| {
            let default_value = variable.default_value.as_deref()?;
            variable
                .data_type
                .validate_value(default_value)
                .err()
                .map(|reason| {
                    format!(
                        "Variable named: {} has an invalid default value: {}",
                        variable.name, reason
                    )
                })
        })
        .collect()
}
