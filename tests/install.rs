mod common;
use common::*;

use flowplan::prelude::*;
use serde_json::json;

#[test]
fn test_install_rejects_structurally_invalid_plan() {
    let registry = registry();
    let compiler = FlowCompiler::builder(&registry).build();

    let result = compiler.install(&enrich_plan("enrichFlow", vec![], vec![]), &[]);

    let Err(error) = result else {
        panic!("expected the plan to be rejected");
    };
    assert_eq!(
        error.to_string(),
        "Config named: enrichFlow had the following error: Enrich flow plans must contain one or more domain and/or enrich actions"
    );
}

#[test]
fn test_install_error_joins_every_problem() {
    let registry = registry();
    let compiler = FlowCompiler::builder(&registry).build();
    let plan = ingress_plan(
        "ingress",
        " ",
        vec![transform("dup", "flowType", "a")],
        vec![load("dup", "a")],
    );

    let error = compiler.install(&plan, &[]).unwrap_err();

    assert_eq!(
        error.messages(),
        vec![
            format!(
                "Config named: dup had the following error: The action name: dup is duplicated for the following action types: {TRANSFORM_ACTION}, {LOAD_ACTION}"
            ),
            "Config named: ingress had the following error: The ingress flow type cannot be blank"
                .to_string(),
        ]
    );
    assert_eq!(error.to_string(), error.messages().join("; "));
}

#[test]
fn test_install_compiles_plan_with_runtime_problems() {
    let registry = registry();
    let compiler = FlowCompiler::builder(&registry)
        .with_parameter_validator(parameter_validator())
        .build();
    let mut params = required_egress_params();
    params.insert("url".to_string(), json!("${egressUrl}"));

    // Unresolved variables do not block installation; the flow is recorded as invalid.
    let flow = compiler
        .install(&egress_plan("egress", params.clone()), &[])
        .expect("plan is structurally valid");
    assert!(flow.is_invalid());

    let flow = compiler
        .install(
            &egress_plan("egress", params),
            &[string_var("egressUrl", "https://egress")],
        )
        .expect("plan is structurally valid");
    assert_eq!(flow.status.state, FlowState::Stopped);
}

#[test]
fn test_install_plugin_compiles_every_plan() {
    let registry = registry();
    let compiler = FlowCompiler::builder(&registry)
        .with_parameter_validator(parameter_validator())
        .build();
    let registration = PluginRegistration {
        coordinates: plugin(),
        flow_plans: vec![
            egress_plan("egress", required_egress_params()),
            rest_data_source("restSource", plugin()),
            timed_data_source("timedSource", plugin(), "${schedule}"),
        ],
        variables: vec![string_var("schedule", "*/5 * * * * *")],
    };

    let flows = compiler.install_plugin(&registration).expect("valid plugin");

    assert_eq!(flows.len(), 3);
    assert!(flows.iter().all(|flow| !flow.is_invalid()), "{flows:?}");
    let FlowPlan::TimedDataSource(timed) = &flows[2].plan else {
        panic!("expected a timed data source");
    };
    assert_eq!(timed.cron_schedule, "*/5 * * * * *");
}

#[test]
fn test_install_plugin_collects_every_problem() {
    let registry = registry();
    let compiler = FlowCompiler::builder(&registry).build();
    let registration = PluginRegistration {
        coordinates: plugin(),
        flow_plans: vec![
            rest_data_source("source", plugin()),
            timed_data_source("source", plugin(), "bad cron"),
        ],
        variables: vec![Variable::new("flag", VariableDataType::Boolean).with_default("maybe")],
    };

    let error = compiler.install_plugin(&registration).unwrap_err();

    assert_eq!(
        error.messages(),
        vec![
            "Variable named: flag has an invalid default value: A boolean value must be true or false",
            "Duplicate data source names found: source",
            "Config named: source had the following error: Invalid cronSchedule: bad cron",
        ]
    );
    assert!(
        error
            .to_string()
            .starts_with("Plugin org.example:example-plugin:1.0.0 could not be installed: ")
    );
}

#[test]
fn test_plugin_registration_from_json() {
    let registration: PluginRegistration = serde_json::from_value(json!({
        "coordinates": { "groupId": "org.example", "artifactId": "example-plugin", "version": "1.0.0" },
        "flowPlans": [
            {
                "type": "EGRESS",
                "name": "egress",
                "egressAction": {
                    "name": "RestEgress",
                    "type": EGRESS_ACTION,
                    "parameters": { "url": "${egressUrl}", "name": "RestEgress", "egressFlow": "out" }
                }
            }
        ],
        "variables": [
            { "name": "egressUrl", "dataType": "STRING", "value": "https://egress" }
        ]
    }))
    .expect("valid registration");

    assert_eq!(registration.coordinates, plugin());
    assert_eq!(registration.flow_plans[0].kind(), FlowKind::Egress);

    let registry = registry();
    let compiler = FlowCompiler::builder(&registry)
        .with_parameter_validator(parameter_validator())
        .build();
    let flows = compiler.install_plugin(&registration).expect("valid plugin");
    assert_eq!(flows[0].status.state, FlowState::Stopped);
}
