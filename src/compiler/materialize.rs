use crate::template::TemplateResolver;
use crate::types::{ActionConfiguration, FlowConfigError, FlowPlan, Variable};
use serde_json::{Map, Value};

/// The plan after variable substitution, plus what the substitution reported.
pub(super) struct Materialized {
    pub plan: FlowPlan,
    pub errors: Vec<FlowConfigError>,
    pub applied: Vec<Variable>,
}

/// Resolves every templated field of `plan`. Action configurations are resolved
/// against their own name; everything else against the plan name. Parameters are
/// resolved twice: unmasked into `internal_parameters` and masked into `parameters`.
pub(super) fn materialize(plan: &FlowPlan, variables: &[Variable]) -> Materialized {
    let mut resolver = TemplateResolver::new(variables);
    let mut masked = TemplateResolver::new(variables).masked();
    let mut working = plan.clone();

    for (_, action) in working.actions_mut() {
        resolve_action(action, &mut resolver, &mut masked);
    }

    let mut extra = Vec::new();
    let plan = match resolve_plan_fields(&working, &mut resolver) {
        Ok(resolved) => resolved,
        Err(e) => {
            extra.push(FlowConfigError::invalid_config(
                plan.name(),
                format!("The resolved flow plan could not be applied: {e}"),
            ));
            working
        }
    };

    let mut errors = resolver.errors();
    errors.extend(extra);
    Materialized {
        plan,
        errors,
        applied: resolver.applied_variables(),
    }
}

fn resolve_action(
    action: &mut ActionConfiguration,
    resolver: &mut TemplateResolver<'_>,
    masked: &mut TemplateResolver<'_>,
) {
    let raw_name = action.name.clone();
    resolver.in_config(&raw_name);
    masked.in_config(&raw_name);

    action.name = resolver.resolve_text(&action.name).unwrap_or_default();
    action.type_name = resolver.resolve_text(&action.type_name).unwrap_or_default();
    action.consumes = action
        .consumes
        .as_deref()
        .and_then(|c| resolver.resolve_text(c));
    action.produces = action
        .produces
        .as_deref()
        .and_then(|p| resolver.resolve_text(p));
    action.requires_domains = resolve_list(resolver, &action.requires_domains);
    action.requires_enrichments = resolve_list(resolver, &action.requires_enrichments);

    let template = action.parameters.take().unwrap_or_default();
    action.internal_parameters = Some(resolver.resolve_map(&template));
    if !template.is_empty() {
        action.parameters = Some(masked.resolve_map(&template));
    }
}

fn resolve_list(resolver: &mut TemplateResolver<'_>, items: &[String]) -> Vec<String> {
    let source = Value::Array(items.iter().cloned().map(Value::String).collect());
    match resolver.resolve(&source) {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => items.to_vec(),
    }
}

/// Resolves the plan's own fields through its JSON form, leaving the already
/// resolved action configurations untouched.
fn resolve_plan_fields(
    plan: &FlowPlan,
    resolver: &mut TemplateResolver<'_>,
) -> Result<FlowPlan, serde_json::Error> {
    let mut document = match serde_json::to_value(plan)? {
        Value::Object(document) => document,
        _ => Map::new(),
    };
    let actions: Vec<(String, Value)> = FlowPlan::ACTION_KEYS
        .iter()
        .filter_map(|key| document.remove(*key).map(|value| (key.to_string(), value)))
        .collect();

    resolver.in_config(plan.name());
    let mut resolved = resolver.resolve_fields(&document);
    resolved.extend(actions);
    serde_json::from_value(Value::Object(resolved))
}
