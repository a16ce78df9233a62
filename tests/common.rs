//! Common test utilities for building descriptors, plans and variables.
use chrono::{DateTime, TimeZone, Utc};
use flowplan::prelude::*;
use flowplan::types::{
    EgressFlowPlan, EnrichFlowPlan, IngressFlowPlan, OnErrorDataSourcePlan, RestDataSourcePlan,
    Subscription, TimedDataSourcePlan, TransformFlowPlan,
};
use serde_json::{Map, Value, json};
use std::sync::Arc;

pub const EGRESS_ACTION: &str = "org.example.action.RestPostEgressAction";
pub const TRANSFORM_ACTION: &str = "org.example.action.RoteTransformAction";
pub const LOAD_ACTION: &str = "org.example.action.RoteLoadAction";
pub const FORMAT_ACTION: &str = "org.example.action.RoteFormatAction";
pub const ENRICH_ACTION: &str = "org.example.action.RoteEnrichAction";
pub const DOMAIN_ACTION: &str = "org.example.action.RoteDomainAction";
pub const TIMED_INGRESS_ACTION: &str = "org.example.action.TimedIngressAction";

/// The fixed "now" used by every liveness check in the tests.
#[allow(dead_code)]
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn plugin() -> PluginCoordinates {
    PluginCoordinates::new("org.example", "example-plugin", "1.0.0")
}

#[allow(dead_code)]
pub fn other_plugin() -> PluginCoordinates {
    PluginCoordinates::new("org.other", "other-plugin", "2.0.0")
}

#[allow(dead_code)]
pub fn header(name: &str) -> PlanHeader {
    PlanHeader::new(name, plugin())
}

/// Schema for the REST egress action: `url`, `name` and `egressFlow` are required.
#[allow(dead_code)]
pub fn egress_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "url": { "type": "string" },
            "name": { "type": "string" },
            "egressFlow": { "type": "string" },
            "password": { "type": "string" },
            "retryCount": { "type": "integer", "default": 3 }
        },
        "required": ["url", "name", "egressFlow"],
        "additionalProperties": false
    })
}

#[allow(dead_code)]
pub fn required_egress_params() -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("url".to_string(), json!("https://egress"));
    params.insert("name".to_string(), json!("RestEgress"));
    params.insert("egressFlow".to_string(), json!("out"));
    params
}

#[allow(dead_code)]
pub fn egress_descriptor() -> ActionDescriptor {
    ActionDescriptor::new(EGRESS_ACTION, ActionType::Egress)
        .with_schema(egress_schema())
        .heard_at(now())
}

/// A registry with one live descriptor per action kind.
#[allow(dead_code)]
pub fn registry() -> ActionRegistry {
    ActionRegistry::new()
        .with_descriptor(egress_descriptor())
        .with_descriptor(ActionDescriptor::new(TRANSFORM_ACTION, ActionType::Transform).heard_at(now()))
        .with_descriptor(ActionDescriptor::new(LOAD_ACTION, ActionType::Load).heard_at(now()))
        .with_descriptor(
            ActionDescriptor::new(FORMAT_ACTION, ActionType::Format)
                .requiring_domains(&["domainValue"])
                .heard_at(now()),
        )
        .with_descriptor(
            ActionDescriptor::new(ENRICH_ACTION, ActionType::Enrich)
                .requiring_domains(&["domainValue"])
                .heard_at(now()),
        )
        .with_descriptor(
            ActionDescriptor::new(DOMAIN_ACTION, ActionType::Domain)
                .requiring_domains(&["domainValue"])
                .heard_at(now()),
        )
        .with_descriptor(
            ActionDescriptor::new(TIMED_INGRESS_ACTION, ActionType::TimedIngress).heard_at(now()),
        )
}

/// A validator whose clock is pinned to [`now`].
#[allow(dead_code)]
pub fn parameter_validator() -> Arc<ParameterValidator> {
    Arc::new(ParameterValidator::default().with_reference_time(now()))
}

#[allow(dead_code)]
pub fn egress_action(params: Map<String, Value>) -> ActionConfiguration {
    let mut action = ActionConfiguration::new("RestEgress", ActionType::Egress, EGRESS_ACTION);
    action.parameters = Some(params);
    action
}

#[allow(dead_code)]
pub fn egress_plan(name: &str, params: Map<String, Value>) -> FlowPlan {
    FlowPlan::Egress(EgressFlowPlan {
        header: header(name),
        egress_action: egress_action(params),
        ..Default::default()
    })
}

#[allow(dead_code)]
pub fn transform(name: &str, consumes: &str, produces: &str) -> ActionConfiguration {
    ActionConfiguration::new(name, ActionType::Transform, TRANSFORM_ACTION)
        .consuming(consumes)
        .producing(produces)
}

#[allow(dead_code)]
pub fn load(name: &str, consumes: &str) -> ActionConfiguration {
    ActionConfiguration::new(name, ActionType::Load, LOAD_ACTION).consuming(consumes)
}

#[allow(dead_code)]
pub fn ingress_plan(
    name: &str,
    ingress_type: &str,
    transform_actions: Vec<ActionConfiguration>,
    load_actions: Vec<ActionConfiguration>,
) -> FlowPlan {
    FlowPlan::Ingress(IngressFlowPlan {
        header: header(name),
        ingress_type: ingress_type.to_string(),
        transform_actions,
        load_actions,
    })
}

#[allow(dead_code)]
pub fn transform_plan(name: &str, source_plugin: PluginCoordinates) -> FlowPlan {
    FlowPlan::Transform(TransformFlowPlan {
        header: PlanHeader::new(name, source_plugin),
        transform_actions: vec![transform("transform", "any", "any")],
        subscribe: vec![Subscription {
            topic: "incoming".to_string(),
            condition: None,
        }],
        publish: None,
    })
}

#[allow(dead_code)]
pub fn enrich(name: &str, type_name: &str, domains: &[&str]) -> ActionConfiguration {
    ActionConfiguration::new(name, ActionType::Enrich, type_name).requiring_domains(domains)
}

#[allow(dead_code)]
pub fn domain(name: &str, type_name: &str, domains: &[&str]) -> ActionConfiguration {
    ActionConfiguration::new(name, ActionType::Domain, type_name).requiring_domains(domains)
}

#[allow(dead_code)]
pub fn enrich_plan(
    name: &str,
    domain_actions: Vec<ActionConfiguration>,
    enrich_actions: Vec<ActionConfiguration>,
) -> FlowPlan {
    FlowPlan::Enrich(EnrichFlowPlan {
        header: header(name),
        domain_actions,
        enrich_actions,
    })
}

#[allow(dead_code)]
pub fn rest_data_source(name: &str, source_plugin: PluginCoordinates) -> FlowPlan {
    FlowPlan::RestDataSource(RestDataSourcePlan {
        header: PlanHeader::new(name, source_plugin),
        topic: "incoming".to_string(),
        ..Default::default()
    })
}

#[allow(dead_code)]
pub fn timed_data_source(name: &str, source_plugin: PluginCoordinates, cron: &str) -> FlowPlan {
    FlowPlan::TimedDataSource(TimedDataSourcePlan {
        header: PlanHeader::new(name, source_plugin),
        topic: "incoming".to_string(),
        timed_ingress_action: Some(ActionConfiguration::new(
            "timedIngress",
            ActionType::TimedIngress,
            TIMED_INGRESS_ACTION,
        )),
        cron_schedule: cron.to_string(),
        ..Default::default()
    })
}

#[allow(dead_code)]
pub fn on_error_data_source(name: &str) -> OnErrorDataSourcePlan {
    OnErrorDataSourcePlan {
        header: header(name),
        topic: "errors".to_string(),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn string_var(name: &str, value: &str) -> Variable {
    Variable::new(name, VariableDataType::String).with_value(value)
}

#[allow(dead_code)]
pub fn list_var(name: &str, value: &str) -> Variable {
    Variable::new(name, VariableDataType::List).with_value(value)
}

#[allow(dead_code)]
pub fn map_var(name: &str, value: &str) -> Variable {
    Variable::new(name, VariableDataType::Map).with_value(value)
}

#[allow(dead_code)]
pub fn messages(errors: &[FlowConfigError]) -> Vec<String> {
    errors.iter().map(|e| e.message.clone()).collect()
}
