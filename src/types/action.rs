use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// The slot an action occupies in a flow. A descriptor advertises one of these and a
/// configuration may only reference descriptors of its own slot kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    TimedIngress,
    #[default]
    Transform,
    Load,
    Domain,
    Enrich,
    Format,
    Validate,
    Egress,
}

impl ActionType {
    /// Domain, enrich and format actions declare domain/enrichment contracts.
    pub fn has_requirements(&self) -> bool {
        matches!(
            self,
            ActionType::Domain | ActionType::Enrich | ActionType::Format
        )
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionType::TimedIngress => "TIMED_INGRESS",
            ActionType::Transform => "TRANSFORM",
            ActionType::Load => "LOAD",
            ActionType::Domain => "DOMAIN",
            ActionType::Enrich => "ENRICH",
            ActionType::Format => "FORMAT",
            ActionType::Validate => "VALIDATE",
            ActionType::Egress => "EGRESS",
        };
        f.write_str(label)
    }
}

/// One named step of a flow plan, referencing the action type that implements it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfiguration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub action_type: ActionType,
    /// The opaque key of the implementing action (e.g. `org.example.RestEgress`).
    #[serde(default, rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_parameters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires_enrichments: Vec<String>,
    /// Schema retained when parameter validation had to wait for unresolved placeholders.
    #[serde(skip)]
    pub deferred_schema: Option<Arc<Value>>,
}

impl PartialEq for ActionConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.action_type == other.action_type
            && self.type_name == other.type_name
            && self.parameters == other.parameters
            && self.internal_parameters == other.internal_parameters
            && self.consumes == other.consumes
            && self.produces == other.produces
            && self.requires_domains == other.requires_domains
            && self.requires_enrichments == other.requires_enrichments
    }
}

impl ActionConfiguration {
    pub fn new(name: &str, action_type: ActionType, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            action_type,
            type_name: type_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        if let Value::Object(map) = parameters {
            self.parameters = Some(map);
        }
        self
    }

    pub fn consuming(mut self, consumes: &str) -> Self {
        self.consumes = Some(consumes.to_string());
        self
    }

    pub fn producing(mut self, produces: &str) -> Self {
        self.produces = Some(produces.to_string());
        self
    }

    pub fn requiring_domains(mut self, domains: &[&str]) -> Self {
        self.requires_domains = domains.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn requiring_enrichments(mut self, enrichments: &[&str]) -> Self {
        self.requires_enrichments = enrichments.iter().map(|e| e.to_string()).collect();
        self
    }

    /// The parameters that schema validation runs against: the resolved internal
    /// parameters when present, the raw parameters otherwise, or an empty map.
    pub fn effective_parameters(&self) -> Map<String, Value> {
        self.internal_parameters
            .as_ref()
            .or(self.parameters.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

/// Metadata an installed plugin publishes for one action type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    /// The action type key that configurations reference.
    pub name: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(default)]
    pub requires_domains: Vec<String>,
    #[serde(default)]
    pub requires_enrichments: Vec<String>,
    #[serde(default)]
    pub last_heard: Option<DateTime<Utc>>,
}

impl ActionDescriptor {
    pub fn new(name: &str, action_type: ActionType) -> Self {
        Self {
            name: name.to_string(),
            action_type,
            ..Default::default()
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn heard_at(mut self, last_heard: DateTime<Utc>) -> Self {
        self.last_heard = Some(last_heard);
        self
    }

    pub fn requiring_domains(mut self, domains: &[&str]) -> Self {
        self.requires_domains = domains.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn requiring_enrichments(mut self, enrichments: &[&str]) -> Self {
        self.requires_enrichments = enrichments.iter().map(|e| e.to_string()).collect();
        self
    }
}
