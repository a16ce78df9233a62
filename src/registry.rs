//! Read-only views of state owned outside the engine: the installed action
//! descriptors, the plans already registered, and the publish/subscribe rules.

use crate::types::{ActionDescriptor, FlowKind, FlowPlan, Subscription};
use ahash::AHashMap;

/// Looks up the descriptor published for an action type.
pub trait ActionLookup: Send + Sync {
    fn get_by_action_class(&self, type_name: &str) -> Option<&ActionDescriptor>;

    /// Why the plugin expected to provide `type_name` is not ready, if it is known.
    fn action_plugin_not_ready_reason(&self, _type_name: &str) -> Option<String> {
        None
    }
}

/// Enumerates the plans already registered for a kind.
pub trait PlanSource: Send + Sync {
    fn get_all(&self, kind: FlowKind) -> Vec<&FlowPlan>;
}

/// Checks publish/subscribe wiring. Each returned string is one problem.
pub trait RuleValidator: Send + Sync {
    fn validate_subscriber(&self, plan: &FlowPlan) -> Vec<String>;
    fn validate_publisher(&self, plan: &FlowPlan) -> Vec<String>;
}

/// In-memory descriptor registry keyed by action type.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    descriptors: AHashMap<String, ActionDescriptor>,
    not_ready: AHashMap<String, String>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_descriptor(mut self, descriptor: ActionDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Adds or replaces the descriptor for its action type.
    pub fn register(&mut self, descriptor: ActionDescriptor) {
        self.not_ready.remove(&descriptor.name);
        self.descriptors.insert(descriptor.name.clone(), descriptor);
    }

    /// Records that the plugin providing `type_name` is known but not ready yet.
    pub fn mark_not_ready(&mut self, type_name: &str, reason: &str) {
        self.not_ready
            .insert(type_name.to_string(), reason.to_string());
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl FromIterator<ActionDescriptor> for ActionRegistry {
    fn from_iter<I: IntoIterator<Item = ActionDescriptor>>(iter: I) -> Self {
        let mut registry = ActionRegistry::new();
        for descriptor in iter {
            registry.register(descriptor);
        }
        registry
    }
}

impl ActionLookup for ActionRegistry {
    fn get_by_action_class(&self, type_name: &str) -> Option<&ActionDescriptor> {
        self.descriptors.get(type_name)
    }

    fn action_plugin_not_ready_reason(&self, type_name: &str) -> Option<String> {
        self.not_ready.get(type_name).cloned()
    }
}

/// The set of plans currently registered, in registration order.
#[derive(Debug, Clone, Default)]
pub struct PlanCatalog {
    plans: Vec<FlowPlan>,
}

static EMPTY_CATALOG: PlanCatalog = PlanCatalog::new();

impl PlanCatalog {
    pub const fn new() -> Self {
        Self { plans: Vec::new() }
    }

    /// A catalog with nothing registered.
    pub fn empty() -> &'static PlanCatalog {
        &EMPTY_CATALOG
    }

    /// Registers a plan, replacing one of the same kind and name.
    pub fn insert(&mut self, plan: FlowPlan) {
        match self
            .plans
            .iter_mut()
            .find(|p| p.kind() == plan.kind() && p.name() == plan.name())
        {
            Some(existing) => *existing = plan,
            None => self.plans.push(plan),
        }
    }

    pub fn remove(&mut self, kind: FlowKind, name: &str) -> Option<FlowPlan> {
        let index = self
            .plans
            .iter()
            .position(|p| p.kind() == kind && p.name() == name)?;
        Some(self.plans.remove(index))
    }

    pub fn plans(&self) -> &[FlowPlan] {
        &self.plans
    }
}

impl From<Vec<FlowPlan>> for PlanCatalog {
    fn from(plans: Vec<FlowPlan>) -> Self {
        let mut catalog = PlanCatalog::new();
        for plan in plans {
            catalog.insert(plan);
        }
        catalog
    }
}

impl PlanSource for PlanCatalog {
    fn get_all(&self, kind: FlowKind) -> Vec<&FlowPlan> {
        self.plans.iter().filter(|p| p.kind() == kind).collect()
    }
}

/// Built-in rule checks: subscriptions and publish rules must name a topic.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopicRuleValidator;

impl TopicRuleValidator {
    fn check_subscriptions(subscriptions: &[Subscription], problems: &mut Vec<String>) {
        if subscriptions.iter().any(|s| s.topic.trim().is_empty()) {
            problems.push("Invalid subscription, the topic cannot be blank".to_string());
        }
    }
}

impl RuleValidator for TopicRuleValidator {
    fn validate_subscriber(&self, plan: &FlowPlan) -> Vec<String> {
        let mut problems = Vec::new();
        match plan {
            FlowPlan::Transform(p) => {
                if p.subscribe.is_empty() {
                    problems.push("The flow must subscribe to at least one topic".to_string());
                }
                Self::check_subscriptions(&p.subscribe, &mut problems);
            }
            FlowPlan::Egress(p) => Self::check_subscriptions(&p.subscribe, &mut problems),
            _ => {}
        }
        problems
    }

    fn validate_publisher(&self, plan: &FlowPlan) -> Vec<String> {
        let FlowPlan::Transform(transform) = plan else {
            return Vec::new();
        };
        let Some(publish) = &transform.publish else {
            return Vec::new();
        };
        let mut problems = Vec::new();
        let has_default = publish
            .default_topic
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !has_default && publish.rules.is_empty() {
            problems.push(
                "The publish rules must include a default topic or at least one rule".to_string(),
            );
        }
        if publish.rules.iter().any(|r| r.topic.trim().is_empty()) {
            problems.push("Invalid publish rule, the topic cannot be blank".to_string());
        }
        problems
    }
}
