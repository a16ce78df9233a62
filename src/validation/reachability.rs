use crate::types::ActionConfiguration;
use ahash::AHashSet;

fn consumes(action: &ActionConfiguration) -> &str {
    action.consumes.as_deref().unwrap_or_default()
}

/// Verifies that every transform and load action can receive data, starting from the
/// ingress type and following consumes/produces declarations. Cycles and repeated
/// producers are fine; only membership in the produced set matters.
pub fn check_reachability(
    ingress_type: &str,
    transform_actions: &[ActionConfiguration],
    load_actions: &[ActionConfiguration],
) -> Vec<String> {
    let mut errors = Vec::new();

    if !transform_actions.is_empty() {
        if !transform_actions
            .iter()
            .any(|t| consumes(t) == ingress_type)
        {
            errors.push(format!(
                "None of the configured TransformActions in this flow consume the ingress flow type: {ingress_type}"
            ));
        }

        for (index, transform) in transform_actions.iter().enumerate() {
            let consumed = consumes(transform);
            let produced_elsewhere = transform_actions
                .iter()
                .enumerate()
                .any(|(other, t)| other != index && t.produces.as_deref() == Some(consumed));
            if consumed != ingress_type && !produced_elsewhere {
                errors.push(format!(
                    "Transform Action named: {} consumes: {} which is not produced in this flow",
                    transform.name, consumed
                ));
            }
        }
    }

    let mut reachable: AHashSet<&str> = transform_actions
        .iter()
        .filter_map(|t| t.produces.as_deref())
        .collect();
    reachable.insert(ingress_type);

    if transform_actions.is_empty() && !load_actions.iter().any(|l| consumes(l) == ingress_type)
    {
        errors.push(format!(
            "None of the configured Load Actions in this flow consume the ingress flow type: {ingress_type}"
        ));
    }

    for load in load_actions {
        let consumed = consumes(load);
        if !reachable.contains(consumed) {
            errors.push(format!(
                "Load Action named: {} consumes: {} which isn't produced in this flow",
                load.name, consumed
            ));
        }
    }

    errors
}
