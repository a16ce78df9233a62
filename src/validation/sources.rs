use crate::template::is_templated;
use crate::types::{AnnotationConfig, FlowConfigError, FlowPlan};
use cron::Schedule;
use itertools::Itertools;
use regex::Regex;
use std::collections::BTreeMap;
use std::str::FromStr;

fn blank_entry_errors(
    name: &str,
    entries: &BTreeMap<String, String>,
    what: &str,
    errors: &mut Vec<FlowConfigError>,
) {
    if entries.keys().any(|k| k.trim().is_empty()) {
        errors.push(FlowConfigError::invalid_config(
            name,
            format!("Blank {what} keys are not allowed"),
        ));
    }
    if entries.values().any(|v| v.trim().is_empty()) {
        errors.push(FlowConfigError::invalid_config(
            name,
            format!("Blank {what} values are not allowed"),
        ));
    }
}

fn regex_errors<'a>(
    name: &str,
    field: &str,
    patterns: impl IntoIterator<Item = &'a String>,
    errors: &mut Vec<FlowConfigError>,
) {
    for pattern in patterns {
        if !is_templated(pattern) && Regex::new(pattern).is_err() {
            errors.push(FlowConfigError::invalid_config(
                name,
                format!("The {field} value is not a valid regular expression: {pattern}"),
            ));
        }
    }
}

fn common_errors(
    name: &str,
    topic: &str,
    metadata: &BTreeMap<String, String>,
    annotation_config: Option<&AnnotationConfig>,
    errors: &mut Vec<FlowConfigError>,
) {
    if topic.trim().is_empty() {
        errors.push(FlowConfigError::invalid_config(
            name,
            "The topic cannot be blank",
        ));
    }
    blank_entry_errors(name, metadata, "metadata", errors);
    if let Some(config) = annotation_config {
        blank_entry_errors(name, &config.annotations, "annotation", errors);
        regex_errors(name, "metadataPatterns", &config.metadata_patterns, errors);
    }
}

fn overlap_errors(
    name: &str,
    included: Option<&Vec<String>>,
    excluded: Option<&Vec<String>>,
    describe: impl Fn(&str) -> String,
) -> Vec<FlowConfigError> {
    let (Some(included), Some(excluded)) = (included, excluded) else {
        return Vec::new();
    };
    included
        .iter()
        .filter(|flow| excluded.contains(flow))
        .unique()
        .map(|flow| FlowConfigError::invalid_config(name, describe(flow)))
        .collect()
}

/// Checks that only apply to particular plan kinds: required fields, blank metadata
/// and annotations, include/exclude collisions, and regex and cron syntax.
pub(super) fn kind_specific_errors(plan: &FlowPlan) -> Vec<FlowConfigError> {
    let name = plan.name();
    let mut errors = Vec::new();
    match plan {
        FlowPlan::Ingress(p) => {
            if p.ingress_type.trim().is_empty() {
                errors.push(FlowConfigError::invalid_config(
                    name,
                    "The ingress flow type cannot be blank",
                ));
            }
        }
        FlowPlan::Enrich(p) => {
            if p.domain_actions.is_empty() && p.enrich_actions.is_empty() {
                errors.push(FlowConfigError::invalid_config(
                    name,
                    "Enrich flow plans must contain one or more domain and/or enrich actions",
                ));
            }
        }
        FlowPlan::Egress(p) => {
            errors.extend(overlap_errors(
                name,
                p.include_ingress_flows.as_ref(),
                p.exclude_ingress_flows.as_ref(),
                |flow| format!("Ingress Flow {flow} is both included and excluded"),
            ));
        }
        FlowPlan::Transform(_) => {}
        FlowPlan::RestDataSource(p) => {
            common_errors(
                name,
                &p.topic,
                &p.metadata,
                p.annotation_config.as_ref(),
                &mut errors,
            );
        }
        FlowPlan::TimedDataSource(p) => {
            common_errors(
                name,
                &p.topic,
                &p.metadata,
                p.annotation_config.as_ref(),
                &mut errors,
            );
            if p.timed_ingress_action.is_none() {
                errors.push(FlowConfigError::invalid_config(
                    name,
                    "A timed data source must specify a timedIngressAction",
                ));
            }
            if p.cron_schedule.trim().is_empty() {
                errors.push(FlowConfigError::invalid_config(
                    name,
                    "The cronSchedule cannot be blank",
                ));
            } else if !is_templated(&p.cron_schedule)
                && Schedule::from_str(p.cron_schedule.trim()).is_err()
            {
                errors.push(FlowConfigError::invalid_config(
                    name,
                    format!("Invalid cronSchedule: {}", p.cron_schedule),
                ));
            }
        }
        FlowPlan::OnErrorDataSource(p) => {
            common_errors(
                name,
                &p.topic,
                &p.metadata,
                p.annotation_config.as_ref(),
                &mut errors,
            );
            regex_errors(name, "errorMessageRegex", &p.error_message_regex, &mut errors);
            regex_errors(
                name,
                "includeSourceMetadataRegex",
                &p.include_source_metadata_regex,
                &mut errors,
            );
            regex_errors(
                name,
                "includeSourceAnnotationsRegex",
                &p.include_source_annotations_regex,
                &mut errors,
            );
            errors.extend(overlap_errors(
                name,
                p.include_flows.as_ref(),
                p.exclude_flows.as_ref(),
                |flow| format!("Flow: {flow} is both included and excluded"),
            ));
        }
    }
    errors
}
