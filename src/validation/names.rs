use crate::types::{FlowConfigError, FlowPlan};
use ahash::AHashMap;
use itertools::Itertools;

pub(super) fn plan_name_errors(plan: &FlowPlan) -> Vec<FlowConfigError> {
    if plan.name().trim().is_empty() {
        vec![FlowConfigError::invalid_config(
            plan.name(),
            "The flow plan name cannot be blank",
        )]
    } else {
        Vec::new()
    }
}

/// Action names must be unique across every action list of the plan. Each colliding
/// name is reported once, listing the colliding types in encounter order.
pub(super) fn duplicate_action_names(plan: &FlowPlan) -> Vec<FlowConfigError> {
    let mut errors = Vec::new();
    let mut order: Vec<&str> = Vec::new();
    let mut types_by_name: AHashMap<&str, Vec<&str>> = AHashMap::new();

    for (_, action) in plan.actions() {
        if action.name.trim().is_empty() {
            errors.push(FlowConfigError::invalid_config(
                plan.name(),
                "The plan cannot contain an action configuration with a name that is null or empty",
            ));
            continue;
        }
        types_by_name
            .entry(action.name.as_str())
            .or_insert_with(|| {
                order.push(action.name.as_str());
                Vec::new()
            })
            .push(action.type_name.as_str());
    }

    for name in order {
        if let Some(types) = types_by_name.get(name)
            && types.len() > 1
        {
            errors.push(FlowConfigError::invalid_config(
                name,
                format!(
                    "The action name: {} is duplicated for the following action types: {}",
                    name,
                    types.iter().join(", ")
                ),
            ));
        }
    }
    errors
}

/// Checks a keyed collection of plans: each key must match its plan's name and a
/// name may only be used once.
pub fn validate_collection(entries: &[(&str, &FlowPlan)]) -> Vec<FlowConfigError> {
    let mut errors = Vec::new();
    let mut order: Vec<&str> = Vec::new();
    let mut kinds_by_name: AHashMap<&str, Vec<String>> = AHashMap::new();

    for (key, plan) in entries {
        if *key != plan.name() {
            errors.push(FlowConfigError::invalid_config(
                plan.name(),
                format!(
                    "{} name: {} did not match the key {}",
                    plan.kind().label(),
                    plan.name(),
                    key
                ),
            ));
        }
        kinds_by_name
            .entry(plan.name())
            .or_insert_with(|| {
                order.push(plan.name());
                Vec::new()
            })
            .push(plan.kind().to_string());
    }

    for name in order {
        if let Some(kinds) = kinds_by_name.get(name)
            && kinds.len() > 1
        {
            errors.push(FlowConfigError::invalid_config(
                name,
                format!(
                    "The flow plan name: {} is duplicated for the following flow types: {}",
                    name,
                    kinds.join(", ")
                ),
            ));
        }
    }
    errors
}

/// Data sources share one namespace within a plugin registration.
pub fn duplicate_data_source_names(plans: &[FlowPlan]) -> Option<String> {
    let duplicates = plans
        .iter()
        .filter(|p| p.kind().is_data_source())
        .map(FlowPlan::name)
        .duplicates()
        .join(", ");
    (!duplicates.is_empty()).then(|| format!("Duplicate data source names found: {duplicates}"))
}
