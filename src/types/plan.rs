use super::action::{ActionConfiguration, ActionType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies the plugin that owns a plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginCoordinates {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub artifact_id: String,
    #[serde(default)]
    pub version: String,
}

impl PluginCoordinates {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
        }
    }

    /// Same plugin, ignoring the version.
    pub fn same_plugin(&self, other: &PluginCoordinates) -> bool {
        self.group_id == other.group_id && self.artifact_id == other.artifact_id
    }
}

impl fmt::Display for PluginCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// The kinds of flow plan the engine compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowKind {
    Ingress,
    Transform,
    Enrich,
    Egress,
    RestDataSource,
    TimedDataSource,
    OnErrorDataSource,
}

impl FlowKind {
    pub const ALL: [FlowKind; 7] = [
        FlowKind::Ingress,
        FlowKind::Transform,
        FlowKind::Enrich,
        FlowKind::Egress,
        FlowKind::RestDataSource,
        FlowKind::TimedDataSource,
        FlowKind::OnErrorDataSource,
    ];

    /// Human readable name used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            FlowKind::Ingress => "Ingress Flow",
            FlowKind::Transform => "Transform Flow",
            FlowKind::Enrich => "Enrich Flow",
            FlowKind::Egress => "Egress Flow",
            FlowKind::RestDataSource => "Rest Data Source",
            FlowKind::TimedDataSource => "Timed Data Source",
            FlowKind::OnErrorDataSource => "On Error Data Source",
        }
    }

    pub fn is_data_source(&self) -> bool {
        matches!(
            self,
            FlowKind::RestDataSource | FlowKind::TimedDataSource | FlowKind::OnErrorDataSource
        )
    }

    /// Kinds whose names share one namespace with this kind.
    pub fn exclusive_with(&self, other: FlowKind) -> bool {
        *self != other && self.is_data_source() && other.is_data_source()
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowKind::Ingress => "INGRESS",
            FlowKind::Transform => "TRANSFORM",
            FlowKind::Enrich => "ENRICH",
            FlowKind::Egress => "EGRESS",
            FlowKind::RestDataSource => "REST_DATA_SOURCE",
            FlowKind::TimedDataSource => "TIMED_DATA_SOURCE",
            FlowKind::OnErrorDataSource => "ON_ERROR_DATA_SOURCE",
        };
        f.write_str(name)
    }
}

/// Fields every plan carries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanHeader {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_plugin: PluginCoordinates,
    #[serde(default)]
    pub test_mode: bool,
}

impl PlanHeader {
    pub fn new(name: &str, source_plugin: PluginCoordinates) -> Self {
        Self {
            name: name.to_string(),
            source_plugin,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default)]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRule {
    #[serde(default)]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_topic: Option<String>,
    #[serde(default)]
    pub rules: Vec<PublishRule>,
}

/// Annotations stamped on ingested data, plus metadata keys promoted to annotations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationConfig {
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub metadata_patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discard_prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressFlowPlan {
    #[serde(flatten)]
    pub header: PlanHeader,
    #[serde(default)]
    pub ingress_type: String,
    #[serde(default)]
    pub transform_actions: Vec<ActionConfiguration>,
    #[serde(default)]
    pub load_actions: Vec<ActionConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformFlowPlan {
    #[serde(flatten)]
    pub header: PlanHeader,
    #[serde(default)]
    pub transform_actions: Vec<ActionConfiguration>,
    #[serde(default)]
    pub subscribe: Vec<Subscription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<PublishRules>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichFlowPlan {
    #[serde(flatten)]
    pub header: PlanHeader,
    #[serde(default)]
    pub domain_actions: Vec<ActionConfiguration>,
    #[serde(default)]
    pub enrich_actions: Vec<ActionConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EgressFlowPlan {
    #[serde(flatten)]
    pub header: PlanHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_action: Option<ActionConfiguration>,
    #[serde(default)]
    pub validate_actions: Vec<ActionConfiguration>,
    #[serde(default)]
    pub egress_action: ActionConfiguration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_ingress_flows: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_ingress_flows: Option<Vec<String>>,
    #[serde(default)]
    pub subscribe: Vec<Subscription>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestDataSourcePlan {
    #[serde(flatten)]
    pub header: PlanHeader,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_config: Option<AnnotationConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedDataSourcePlan {
    #[serde(flatten)]
    pub header: PlanHeader,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_config: Option<AnnotationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timed_ingress_action: Option<ActionConfiguration>,
    #[serde(default)]
    pub cron_schedule: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnErrorDataSourcePlan {
    #[serde(flatten)]
    pub header: PlanHeader,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_config: Option<AnnotationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message_regex: Option<String>,
    #[serde(default)]
    pub include_source_metadata_regex: Vec<String>,
    #[serde(default)]
    pub include_source_annotations_regex: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_flows: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_flows: Option<Vec<String>>,
}

/// A templated, declarative flow definition as authored by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowPlan {
    Ingress(IngressFlowPlan),
    Transform(TransformFlowPlan),
    Enrich(EnrichFlowPlan),
    Egress(EgressFlowPlan),
    RestDataSource(RestDataSourcePlan),
    TimedDataSource(TimedDataSourcePlan),
    OnErrorDataSource(OnErrorDataSourcePlan),
}

impl FlowPlan {
    /// JSON keys under which plans store their action configurations.
    pub const ACTION_KEYS: [&'static str; 8] = [
        "transformActions",
        "loadActions",
        "domainActions",
        "enrichActions",
        "formatAction",
        "validateActions",
        "egressAction",
        "timedIngressAction",
    ];

    pub fn header(&self) -> &PlanHeader {
        match self {
            FlowPlan::Ingress(p) => &p.header,
            FlowPlan::Transform(p) => &p.header,
            FlowPlan::Enrich(p) => &p.header,
            FlowPlan::Egress(p) => &p.header,
            FlowPlan::RestDataSource(p) => &p.header,
            FlowPlan::TimedDataSource(p) => &p.header,
            FlowPlan::OnErrorDataSource(p) => &p.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut PlanHeader {
        match self {
            FlowPlan::Ingress(p) => &mut p.header,
            FlowPlan::Transform(p) => &mut p.header,
            FlowPlan::Enrich(p) => &mut p.header,
            FlowPlan::Egress(p) => &mut p.header,
            FlowPlan::RestDataSource(p) => &mut p.header,
            FlowPlan::TimedDataSource(p) => &mut p.header,
            FlowPlan::OnErrorDataSource(p) => &mut p.header,
        }
    }

    pub fn name(&self) -> &str {
        &self.header().name
    }

    pub fn source_plugin(&self) -> &PluginCoordinates {
        &self.header().source_plugin
    }

    pub fn kind(&self) -> FlowKind {
        match self {
            FlowPlan::Ingress(_) => FlowKind::Ingress,
            FlowPlan::Transform(_) => FlowKind::Transform,
            FlowPlan::Enrich(_) => FlowKind::Enrich,
            FlowPlan::Egress(_) => FlowKind::Egress,
            FlowPlan::RestDataSource(_) => FlowKind::RestDataSource,
            FlowPlan::TimedDataSource(_) => FlowKind::TimedDataSource,
            FlowPlan::OnErrorDataSource(_) => FlowKind::OnErrorDataSource,
        }
    }

    /// Every action configuration in declaration order, paired with the kind its slot expects.
    pub fn actions(&self) -> Vec<(ActionType, &ActionConfiguration)> {
        let mut actions = Vec::new();
        match self {
            FlowPlan::Ingress(p) => {
                slot(&mut actions, ActionType::Transform, &p.transform_actions);
                slot(&mut actions, ActionType::Load, &p.load_actions);
            }
            FlowPlan::Transform(p) => {
                slot(&mut actions, ActionType::Transform, &p.transform_actions)
            }
            FlowPlan::Enrich(p) => {
                slot(&mut actions, ActionType::Domain, &p.domain_actions);
                slot(&mut actions, ActionType::Enrich, &p.enrich_actions);
            }
            FlowPlan::Egress(p) => {
                slot(&mut actions, ActionType::Format, p.format_action.iter());
                slot(&mut actions, ActionType::Validate, &p.validate_actions);
                actions.push((ActionType::Egress, &p.egress_action));
            }
            FlowPlan::TimedDataSource(p) => {
                slot(&mut actions, ActionType::TimedIngress, p.timed_ingress_action.iter())
            }
            FlowPlan::RestDataSource(_) | FlowPlan::OnErrorDataSource(_) => {}
        }
        actions
    }

    pub fn actions_mut(&mut self) -> Vec<(ActionType, &mut ActionConfiguration)> {
        let mut actions = Vec::new();
        match self {
            FlowPlan::Ingress(p) => {
                slot_mut(&mut actions, ActionType::Transform, &mut p.transform_actions);
                slot_mut(&mut actions, ActionType::Load, &mut p.load_actions);
            }
            FlowPlan::Transform(p) => {
                slot_mut(&mut actions, ActionType::Transform, &mut p.transform_actions)
            }
            FlowPlan::Enrich(p) => {
                slot_mut(&mut actions, ActionType::Domain, &mut p.domain_actions);
                slot_mut(&mut actions, ActionType::Enrich, &mut p.enrich_actions);
            }
            FlowPlan::Egress(p) => {
                slot_mut(&mut actions, ActionType::Format, p.format_action.iter_mut());
                slot_mut(&mut actions, ActionType::Validate, &mut p.validate_actions);
                actions.push((ActionType::Egress, &mut p.egress_action));
            }
            FlowPlan::TimedDataSource(p) => slot_mut(
                &mut actions,
                ActionType::TimedIngress,
                p.timed_ingress_action.iter_mut(),
            ),
            FlowPlan::RestDataSource(_) | FlowPlan::OnErrorDataSource(_) => {}
        }
        actions
    }

    /// Stamps every configuration with the action kind of the slot it sits in.
    pub fn assign_action_types(&mut self) {
        for (action_type, action) in self.actions_mut() {
            action.action_type = action_type;
        }
    }
}

fn slot<'a>(
    out: &mut Vec<(ActionType, &'a ActionConfiguration)>,
    action_type: ActionType,
    actions: impl IntoIterator<Item = &'a ActionConfiguration>,
) {
    out.extend(actions.into_iter().map(|a| (action_type, a)));
}

fn slot_mut<'a>(
    out: &mut Vec<(ActionType, &'a mut ActionConfiguration)>,
    action_type: ActionType,
    actions: impl IntoIterator<Item = &'a mut ActionConfiguration>,
) {
    out.extend(actions.into_iter().map(|a| (action_type, a)));
}
