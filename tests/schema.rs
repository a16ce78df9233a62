mod common;
use common::*;

use chrono::TimeZone;
use chrono::Utc;
use flowplan::prelude::*;
use serde_json::{Map, json};

fn validator_with(config: EngineConfig) -> ParameterValidator {
    ParameterValidator::new(&config).with_reference_time(now())
}

fn transform_with_schema(schema: serde_json::Value) -> ActionDescriptor {
    ActionDescriptor::new(TRANSFORM_ACTION, ActionType::Transform)
        .with_schema(schema)
        .heard_at(now())
}

fn transform_action(parameters: serde_json::Value) -> ActionConfiguration {
    ActionConfiguration::new("MyTransform", ActionType::Transform, TRANSFORM_ACTION)
        .with_parameters(parameters)
}

// --- Schema compliance ---

#[test]
fn test_missing_and_undeclared_parameters_in_one_error() {
    let validator = parameter_validator();
    let mut params = required_egress_params();
    params.remove("url");
    params.insert("url2".to_string(), json!("https://egress"));
    let mut action = egress_action(params);

    let errors = validator.validate(&mut action, &egress_descriptor());

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].config_name, "RestEgress");
    assert_eq!(errors[0].error_type, FlowErrorType::InvalidActionParameters);
    assert_eq!(
        errors[0].message,
        "$.url: is missing but it is required; $.url2: is not defined in the schema and the schema does not allow additional properties"
    );
}

#[test]
fn test_valid_parameters_get_schema_defaults() {
    let validator = parameter_validator();
    let mut action = egress_action(required_egress_params());

    let errors = validator.validate(&mut action, &egress_descriptor());

    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    let internal = action.internal_parameters.expect("defaults applied");
    assert_eq!(internal["retryCount"], json!(3));
    assert!(action.parameters.is_some_and(|p| !p.contains_key("retryCount")));
}

#[test]
fn test_nested_defaults_are_applied() {
    let validator = parameter_validator();
    let descriptor = transform_with_schema(json!({
        "type": "object",
        "properties": {
            "retry": {
                "type": "object",
                "properties": { "delayMs": { "type": "integer", "default": 100 } }
            }
        }
    }));
    let mut action = transform_action(json!({ "retry": {} }));

    assert!(validator.validate(&mut action, &descriptor).is_empty());
    assert_eq!(
        action.internal_parameters.unwrap()["retry"]["delayMs"],
        json!(100)
    );
}

#[test]
fn test_type_mismatch_message() {
    let validator = parameter_validator();
    let descriptor = transform_with_schema(json!({
        "type": "object",
        "properties": { "retries": { "type": "integer" } }
    }));
    let mut action = transform_action(json!({ "retries": "five" }));

    let errors = validator.validate(&mut action, &descriptor);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "$.retries: string found, integer expected");
}

#[test]
fn test_type_loose_accepts_convertible_strings() {
    let validator = parameter_validator();
    let descriptor = transform_with_schema(json!({
        "type": "object",
        "properties": {
            "retries": { "type": "integer" },
            "enabled": { "type": "boolean" },
            "tags": { "type": "array", "items": { "type": "string" } }
        }
    }));
    let mut action = transform_action(json!({ "retries": "5", "enabled": "true", "tags": "solo" }));

    let errors = validator.validate(&mut action, &descriptor);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

#[test]
fn test_type_loose_single_value_must_match_array_items() {
    let validator = parameter_validator();
    let descriptor = transform_with_schema(json!({
        "type": "object",
        "properties": {
            "tags": { "type": "array", "items": { "type": "string" } }
        }
    }));

    let mut action = transform_action(json!({ "tags": 5 }));
    assert_eq!(
        messages(&validator.validate(&mut action, &descriptor)),
        vec!["$.tags[0]: integer found, string expected"]
    );

    let mut action = transform_action(json!({ "tags": { "nested": 1 } }));
    assert_eq!(
        messages(&validator.validate(&mut action, &descriptor)),
        vec!["$.tags: object found, array expected"]
    );
}

#[test]
fn test_strict_typing_when_type_loose_disabled() {
    let validator = validator_with(EngineConfig {
        type_loose: false,
        ..EngineConfig::default()
    });
    let descriptor = transform_with_schema(json!({
        "type": "object",
        "properties": { "retries": { "type": "integer" } }
    }));
    let mut action = transform_action(json!({ "retries": "5" }));

    let errors = validator.validate(&mut action, &descriptor);
    assert_eq!(messages(&errors), vec!["$.retries: string found, integer expected"]);
}

#[test]
fn test_undeclared_properties_rejected_by_default() {
    let descriptor = transform_with_schema(json!({
        "type": "object",
        "properties": { "url": { "type": "string" } }
    }));

    let mut action = transform_action(json!({ "url": "x", "extra": "y" }));
    let errors = parameter_validator().validate(&mut action, &descriptor);
    assert_eq!(
        messages(&errors),
        vec!["$.extra: is not defined in the schema and the schema does not allow additional properties"]
    );

    let lenient = validator_with(EngineConfig {
        reject_additional_properties: false,
        ..EngineConfig::default()
    });
    let mut action = transform_action(json!({ "url": "x", "extra": "y" }));
    assert!(lenient.validate(&mut action, &descriptor).is_empty());
}

#[test]
fn test_descriptor_without_schema_accepts_anything() {
    let descriptor = ActionDescriptor::new(TRANSFORM_ACTION, ActionType::Transform).heard_at(now());
    let mut action = transform_action(json!({ "anything": [1, 2, 3] }));
    assert!(parameter_validator().validate(&mut action, &descriptor).is_empty());
}

#[test]
fn test_malformed_schema_is_a_config_error() {
    let descriptor = transform_with_schema(json!({
        "type": "object",
        "properties": { "name": { "type": "string", "pattern": "(" } }
    }));
    let mut action = transform_action(json!({ "name": "x" }));

    let errors = parameter_validator().validate(&mut action, &descriptor);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type, FlowErrorType::InvalidConfig);
    assert!(errors[0].message.starts_with(&format!(
        "The schema published for action type: {TRANSFORM_ACTION} is invalid: "
    )));
}

#[test]
fn test_compiled_schemas_are_cached() {
    let validator = parameter_validator();
    for _ in 0..3 {
        let mut action = egress_action(required_egress_params());
        validator.validate(&mut action, &egress_descriptor());
    }
    assert_eq!(validator.cached_schemas(), 1);
}

#[test]
fn test_republished_schema_replaces_cached_validator() {
    let validator = parameter_validator();
    let first = transform_with_schema(json!({
        "type": "object",
        "properties": { "retries": { "type": "integer" } }
    }));
    let second = transform_with_schema(json!({
        "type": "object",
        "properties": { "retries": { "type": "integer", "maximum": 3 } }
    }));

    let mut action = transform_action(json!({ "retries": 5 }));
    assert!(validator.validate(&mut action, &first).is_empty());

    let mut action = transform_action(json!({ "retries": 5 }));
    assert_eq!(
        messages(&validator.validate(&mut action, &second)),
        vec!["$.retries: must have a maximum value of 3"]
    );
    assert_eq!(validator.cached_schemas(), 1);
}

// --- Deferred validation ---

#[test]
fn test_unresolved_parameters_defer_schema_check() {
    let validator = parameter_validator();
    let mut params = Map::new();
    params.insert("url".to_string(), json!("${egressUrl}"));
    let mut action = egress_action(params);

    let errors = validator.validate(&mut action, &egress_descriptor());
    assert!(errors.is_empty());
    assert!(action.deferred_schema.is_some());

    // Still templated: nothing to report yet.
    assert!(validator.validate_deferred(&mut action).is_empty());
    assert!(action.deferred_schema.is_some());

    let mut resolved = required_egress_params();
    resolved.insert("retryCount".to_string(), json!("many"));
    action.internal_parameters = Some(resolved);
    let errors = validator.validate_deferred(&mut action);

    assert_eq!(
        messages(&errors),
        vec!["$.retryCount: string found, integer expected"]
    );
    assert!(action.deferred_schema.is_none());
}

#[test]
fn test_validate_deferred_without_pending_check_is_a_no_op() {
    let mut action = egress_action(Map::new());
    assert!(parameter_validator().validate_deferred(&mut action).is_empty());
}

// --- Registration, liveness and kind ---

#[test]
fn test_unregistered_action() {
    let registry = ActionRegistry::new();
    let mut action = egress_action(required_egress_params());

    let errors = parameter_validator().validate_with_lookup(&mut action, &registry);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type, FlowErrorType::UnregisteredAction);
    assert_eq!(
        errors[0].message,
        format!("Action: {EGRESS_ACTION} has not been registered with the system")
    );
}

#[test]
fn test_unregistered_action_includes_not_ready_reason() {
    let mut registry = ActionRegistry::new();
    registry.mark_not_ready(EGRESS_ACTION, "plugin is still starting");
    let mut action = egress_action(required_egress_params());

    let errors = parameter_validator().validate_with_lookup(&mut action, &registry);

    assert_eq!(
        errors[0].message,
        format!(
            "Action: {EGRESS_ACTION} has not been registered with the system: plugin is still starting"
        )
    );
}

#[test]
fn test_inactive_action_reports_last_heartbeat() {
    let last_heard = Utc.with_ymd_and_hms(2021, 12, 31, 0, 0, 0).unwrap();
    let descriptor = ActionDescriptor::new(EGRESS_ACTION, ActionType::Egress)
        .with_schema(egress_schema())
        .heard_at(last_heard);
    let mut params = required_egress_params();
    params.remove("url");
    let mut action = egress_action(params);

    let errors = parameter_validator().validate(&mut action, &descriptor);

    // Liveness is reported alone; parameters are not checked.
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type, FlowErrorType::InactiveAction);
    assert_eq!(
        errors[0].message,
        format!("Action: {EGRESS_ACTION} has not been active since 2021-12-31T00:00:00Z")
    );
}

#[test]
fn test_action_that_never_reported_is_inactive() {
    let descriptor = ActionDescriptor::new(EGRESS_ACTION, ActionType::Egress);
    let mut action = egress_action(required_egress_params());

    let errors = parameter_validator().validate(&mut action, &descriptor);
    assert_eq!(errors[0].error_type, FlowErrorType::InactiveAction);
}

#[test]
fn test_liveness_check_can_be_disabled() {
    let validator = validator_with(EngineConfig {
        action_inactivity_threshold_secs: None,
        ..EngineConfig::default()
    });
    let descriptor = ActionDescriptor::new(EGRESS_ACTION, ActionType::Egress);
    let mut action = egress_action(required_egress_params());
    assert!(validator.validate(&mut action, &descriptor).is_empty());
}

#[test]
fn test_kind_mismatch() {
    let descriptor = ActionDescriptor::new(EGRESS_ACTION, ActionType::Transform).heard_at(now());
    let mut action = egress_action(required_egress_params());

    let errors = parameter_validator().validate(&mut action, &descriptor);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type, FlowErrorType::InvalidConfig);
    assert_eq!(
        errors[0].message,
        format!("Action: {EGRESS_ACTION} is not registered as an action of type EGRESS")
    );
}

#[test]
fn test_blank_name_and_type() {
    let mut action = ActionConfiguration::new(" ", ActionType::Egress, "");
    let errors = parameter_validator().validate_with_lookup(&mut action, &registry());

    assert_eq!(
        messages(&errors),
        vec![
            "The action configuration name cannot be null or empty",
            "The action configuration type cannot be null or empty",
        ]
    );
}

// --- Domain and enrichment contracts ---

#[test]
fn test_contract_mismatch() {
    let registry = registry();
    let mut action = ActionConfiguration::new("MyEnrich", ActionType::Enrich, ENRICH_ACTION)
        .requiring_domains(&["other"])
        .requiring_enrichments(&["extra"]);

    let errors = parameter_validator().validate_with_lookup(&mut action, &registry);

    assert_eq!(
        messages(&errors),
        vec![
            "The action configuration requiresDomains value must be: [domainValue]",
            "The action configuration requiresEnrichment value must be: []",
        ]
    );
}

#[test]
fn test_contract_ignores_order_and_duplicates() {
    let descriptor = ActionDescriptor::new(ENRICH_ACTION, ActionType::Enrich)
        .requiring_domains(&["a", "b"])
        .heard_at(now());
    let mut action = ActionConfiguration::new("MyEnrich", ActionType::Enrich, ENRICH_ACTION)
        .requiring_domains(&["b", "a", "a"]);

    assert!(parameter_validator().validate(&mut action, &descriptor).is_empty());
}

#[test]
fn test_contract_not_checked_for_transforms() {
    let descriptor = ActionDescriptor::new(TRANSFORM_ACTION, ActionType::Transform)
        .requiring_domains(&["a"])
        .heard_at(now());
    let mut action = transform_action(json!({}));

    assert!(parameter_validator().validate(&mut action, &descriptor).is_empty());
}
