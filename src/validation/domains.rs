use crate::types::{ActionConfiguration, EnrichFlowPlan, FlowConfigError, FlowPlan};
use itertools::Itertools;

fn overlaps(a: &ActionConfiguration, b: &ActionConfiguration) -> bool {
    a.type_name == b.type_name
        && b
            .requires_domains
            .iter()
            .any(|domain| a.requires_domains.contains(domain))
}

fn overlap_error(
    action: &ActionConfiguration,
    plan_name: &str,
    other_plan: &str,
) -> FlowConfigError {
    let qualifier = if action.requires_domains.len() > 1 {
        "s: at least one of "
    } else {
        ": "
    };
    FlowConfigError::invalid_config(
        plan_name,
        format!(
            "Action of type: {} is already configured in the enrich flow plan named: {} with overlapping domain{}{}",
            action.type_name,
            other_plan,
            qualifier,
            action.requires_domains.join(", ")
        ),
    )
}

/// Incoming actions of the same type as an existing action with an intersecting
/// domain claim.
fn against(
    incoming: &[ActionConfiguration],
    existing: &[ActionConfiguration],
    plan_name: &str,
    other_plan: &str,
) -> Vec<FlowConfigError> {
    incoming
        .iter()
        .filter(|action| existing.iter().any(|other| overlaps(action, other)))
        .map(|action| overlap_error(action, plan_name, other_plan))
        .collect()
}

/// Each action is compared with the actions listed after it in the same list.
fn within(actions: &[ActionConfiguration], plan_name: &str) -> Vec<FlowConfigError> {
    (0..actions.len())
        .flat_map(|i| against(&actions[i..=i], &actions[i + 1..], plan_name, plan_name))
        .collect()
}

/// Reports overlapping domain claims inside `plan` and against every other registered
/// enrich plan. Domain actions are compared with domain actions and enrich actions
/// with enrich actions.
pub(super) fn domain_overlaps(plan: &EnrichFlowPlan, registered: &[&FlowPlan]) -> Vec<FlowConfigError> {
    let name = plan.header.name.as_str();
    let mut errors = Vec::new();

    for other in registered {
        let FlowPlan::Enrich(other) = other else {
            continue;
        };
        if other.header.name == name {
            continue;
        }
        errors.extend(against(
            &plan.domain_actions,
            &other.domain_actions,
            name,
            &other.header.name,
        ));
        errors.extend(against(
            &plan.enrich_actions,
            &other.enrich_actions,
            name,
            &other.header.name,
        ));
    }

    errors.extend(within(&plan.enrich_actions, name));
    errors.extend(within(&plan.domain_actions, name));

    errors.into_iter().unique().collect()
}
