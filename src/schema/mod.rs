//! Checks an action configuration against the descriptor its plugin published:
//! registration, liveness, slot kind, JSON-Schema parameter compliance (draft 2019-09)
//! and domain/enrichment contracts.

mod cache;
mod defaults;
mod messages;

use crate::config::EngineConfig;
use crate::registry::ActionLookup;
use crate::template::has_unresolved;
use crate::types::{ActionConfiguration, ActionDescriptor, FlowConfigError, FlowErrorType};
use ahash::AHashSet;
use cache::SchemaCache;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Validates action configurations against registered descriptors.
///
/// A single instance is meant to be shared (behind an `Arc`) by every compilation
/// pass; the compiled-schema cache it owns is safe for concurrent use.
pub struct ParameterValidator {
    config: EngineConfig,
    cache: SchemaCache,
    reference_time: Option<DateTime<Utc>>,
}

impl Default for ParameterValidator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ParameterValidator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
            cache: SchemaCache::new(config.reject_additional_properties),
            reference_time: None,
        }
    }

    /// Pins "now" for liveness checks instead of reading the clock.
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of compiled schemas currently cached.
    pub fn cached_schemas(&self) -> usize {
        self.cache.len()
    }

    /// Looks up the descriptor for `action` and validates against it.
    pub fn validate_with_lookup(
        &self,
        action: &mut ActionConfiguration,
        lookup: &dyn ActionLookup,
    ) -> Vec<FlowConfigError> {
        let mut errors = identity_errors(action);
        if action.type_name.trim().is_empty() {
            return errors;
        }
        match lookup.get_by_action_class(&action.type_name) {
            Some(descriptor) => errors.extend(self.check_against(action, descriptor)),
            None => {
                let mut message = format!(
                    "Action: {} has not been registered with the system",
                    action.type_name
                );
                if let Some(reason) = lookup.action_plugin_not_ready_reason(&action.type_name) {
                    message.push_str(": ");
                    message.push_str(&reason);
                }
                errors.push(FlowConfigError::new(
                    &action.name,
                    FlowErrorType::UnregisteredAction,
                    message,
                ));
            }
        }
        errors
    }

    /// Validates `action` against `descriptor`. The expected slot kind is the
    /// configuration's own `action_type`.
    pub fn validate(
        &self,
        action: &mut ActionConfiguration,
        descriptor: &ActionDescriptor,
    ) -> Vec<FlowConfigError> {
        let mut errors = identity_errors(action);
        if action.type_name.trim().is_empty() {
            return errors;
        }
        errors.extend(self.check_against(action, descriptor));
        errors
    }

    /// Re-runs a schema check that was deferred because parameters still held
    /// placeholders. Does nothing while they remain unresolved.
    pub fn validate_deferred(&self, action: &mut ActionConfiguration) -> Vec<FlowConfigError> {
        let Some(schema) = action.deferred_schema.clone() else {
            return Vec::new();
        };
        self.check_parameters(action, &schema).into_iter().collect()
    }

    fn check_against(
        &self,
        action: &mut ActionConfiguration,
        descriptor: &ActionDescriptor,
    ) -> Vec<FlowConfigError> {
        if let Some(inactive) = self.inactivity(action, descriptor) {
            return vec![inactive];
        }

        if descriptor.action_type != action.action_type {
            return vec![FlowConfigError::invalid_config(
                &action.name,
                format!(
                    "Action: {} is not registered as an action of type {}",
                    action.type_name, action.action_type
                ),
            )];
        }

        let mut errors = Vec::new();
        if let Some(schema) = &descriptor.schema {
            let schema = Arc::new(schema.clone());
            errors.extend(self.check_parameters(action, &schema));
        }
        if action.action_type.has_requirements() {
            errors.extend(contract_errors(action, descriptor));
        }
        errors
    }

    fn inactivity(
        &self,
        action: &ActionConfiguration,
        descriptor: &ActionDescriptor,
    ) -> Option<FlowConfigError> {
        let threshold = self.config.action_inactivity_threshold_secs?;
        let message = match descriptor.last_heard {
            None => format!("Action: {} has never reported a heartbeat", action.type_name),
            Some(last_heard) => {
                let now = self.reference_time.unwrap_or_else(Utc::now);
                let allowed = TimeDelta::try_seconds(threshold).unwrap_or(TimeDelta::MAX);
                if now.signed_duration_since(last_heard) <= allowed {
                    return None;
                }
                format!(
                    "Action: {} has not been active since {}",
                    action.type_name,
                    last_heard.to_rfc3339_opts(SecondsFormat::Secs, true)
                )
            }
        };
        Some(FlowConfigError::new(
            &action.name,
            FlowErrorType::InactiveAction,
            message,
        ))
    }

    fn check_parameters(
        &self,
        action: &mut ActionConfiguration,
        schema: &Arc<Value>,
    ) -> Option<FlowConfigError> {
        let mut parameters = action.effective_parameters();
        if has_unresolved(&Value::Object(parameters.clone())) {
            debug!(action = %action.name, "deferring parameter validation until placeholders resolve");
            action.deferred_schema = Some(Arc::clone(schema));
            return None;
        }
        action.deferred_schema = None;

        if self.config.apply_schema_defaults {
            defaults::apply_defaults(schema, &mut parameters);
            action.internal_parameters = Some(parameters.clone());
        }

        let validator = match self.cache.get_or_compile(&action.type_name, schema) {
            Ok(validator) => validator,
            Err(e) => return Some(FlowConfigError::invalid_config(&action.name, e.to_string())),
        };

        let violations =
            messages::violations(&validator, &Value::Object(parameters), self.config.type_loose);
        if violations.is_empty() {
            return None;
        }
        Some(FlowConfigError::new(
            &action.name,
            FlowErrorType::InvalidActionParameters,
            violations.join("; "),
        ))
    }
}

fn identity_errors(action: &ActionConfiguration) -> Vec<FlowConfigError> {
    let mut errors = Vec::new();
    if action.name.trim().is_empty() {
        errors.push(FlowConfigError::invalid_config(
            &action.name,
            "The action configuration name cannot be null or empty",
        ));
    }
    if action.type_name.trim().is_empty() {
        errors.push(FlowConfigError::invalid_config(
            &action.name,
            "The action configuration type cannot be null or empty",
        ));
    }
    errors
}

fn contract_errors(
    action: &ActionConfiguration,
    descriptor: &ActionDescriptor,
) -> Vec<FlowConfigError> {
    let mut errors = Vec::new();
    let checks = [
        (
            "requiresDomains",
            &action.requires_domains,
            &descriptor.requires_domains,
        ),
        (
            "requiresEnrichment",
            &action.requires_enrichments,
            &descriptor.requires_enrichments,
        ),
    ];
    for (attribute, declared, expected) in checks {
        let declared: AHashSet<&str> = declared.iter().map(String::as_str).collect();
        let wanted: AHashSet<&str> = expected.iter().map(String::as_str).collect();
        if declared != wanted {
            errors.push(FlowConfigError::invalid_config(
                &action.name,
                format!(
                    "The action configuration {} value must be: [{}]",
                    attribute,
                    expected.join(", ")
                ),
            ));
        }
    }
    errors
}
