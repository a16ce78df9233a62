use crate::config::EngineConfig;
use crate::registry::{ActionLookup, PlanCatalog, PlanSource, RuleValidator, TopicRuleValidator};
use crate::schema::ParameterValidator;
use crate::types::{Flow, FlowConfigError, FlowPlan, FlowStatus, Variable};
use crate::validation::{PlanValidator, check_reachability};
use itertools::Itertools;
use std::sync::Arc;
use tracing::debug;

mod install;
mod materialize;
mod revalidate;

pub use install::PluginRegistration;

use materialize::{Materialized, materialize};

/// Turns flow plans into validated flows.
///
/// A compiler only reads the state it is built with, so one instance can serve
/// many concurrent compilation passes.
pub struct FlowCompiler<'a> {
    actions: &'a dyn ActionLookup,
    plans: &'a dyn PlanSource,
    rules: Box<dyn RuleValidator>,
    parameters: Arc<ParameterValidator>,
}

pub struct FlowCompilerBuilder<'a> {
    actions: &'a dyn ActionLookup,
    plans: &'a dyn PlanSource,
    rules: Box<dyn RuleValidator>,
    parameters: Option<Arc<ParameterValidator>>,
    config: EngineConfig,
}

impl<'a> FlowCompilerBuilder<'a> {
    pub fn new(actions: &'a dyn ActionLookup) -> Self {
        Self {
            actions,
            plans: PlanCatalog::empty(),
            rules: Box::new(TopicRuleValidator),
            parameters: None,
            config: EngineConfig::default(),
        }
    }

    /// The plans already registered, used for name and domain-overlap checks.
    pub fn with_plans(mut self, plans: &'a dyn PlanSource) -> Self {
        self.plans = plans;
        self
    }

    pub fn with_rule_validator(mut self, rules: Box<dyn RuleValidator>) -> Self {
        self.rules = rules;
        self
    }

    /// Shares an existing validator (and its schema cache) with this compiler.
    pub fn with_parameter_validator(mut self, parameters: Arc<ParameterValidator>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Ignored when a parameter validator is supplied directly.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.config = config.clone();
        self
    }

    pub fn build(self) -> FlowCompiler<'a> {
        let parameters = self
            .parameters
            .unwrap_or_else(|| Arc::new(ParameterValidator::new(&self.config)));
        FlowCompiler {
            actions: self.actions,
            plans: self.plans,
            rules: self.rules,
            parameters,
        }
    }
}

impl<'a> FlowCompiler<'a> {
    pub fn builder(actions: &'a dyn ActionLookup) -> FlowCompilerBuilder<'a> {
        FlowCompilerBuilder::new(actions)
    }

    /// Compiles `plan` against `variables`. Never fails: every problem found is
    /// recorded on the returned flow, which is `INVALID` if there were any.
    pub fn compile(&self, plan: &FlowPlan, variables: &[Variable]) -> Flow {
        debug!(plan = plan.name(), kind = %plan.kind(), "compiling flow plan");
        let Materialized {
            plan: mut resolved,
            mut errors,
            applied,
        } = materialize(plan, variables);
        resolved.assign_action_types();

        errors.extend(self.check(&mut resolved));
        let errors: Vec<FlowConfigError> = errors.into_iter().unique().collect();
        if !errors.is_empty() {
            debug!(
                plan = resolved.name(),
                errors = errors.len(),
                "flow plan compiled with errors"
            );
        }

        let test_mode = resolved.header().test_mode;
        Flow {
            plan: resolved,
            status: FlowStatus::from_errors(errors, test_mode),
            variables: applied,
        }
    }

    /// Structural checks on a plan as written, before any variables are applied.
    pub fn validate_plan(&self, plan: &FlowPlan) -> Vec<FlowConfigError> {
        let mut plan = plan.clone();
        plan.assign_action_types();
        self.plan_validator().validate(&plan)
    }

    fn plan_validator(&self) -> PlanValidator<'_> {
        PlanValidator::new(self.plans, self.rules.as_ref())
    }

    /// Structural, parameter and reachability checks on an already resolved plan.
    fn check(&self, plan: &mut FlowPlan) -> Vec<FlowConfigError> {
        let mut errors = self.plan_validator().validate(plan);

        for (_, action) in plan.actions_mut() {
            errors.extend(self.parameters.validate_with_lookup(action, self.actions));
        }

        if let FlowPlan::Ingress(ingress) = plan {
            errors.extend(
                check_reachability(
                    &ingress.ingress_type,
                    &ingress.transform_actions,
                    &ingress.load_actions,
                )
                .into_iter()
                .map(|message| FlowConfigError::invalid_config(&ingress.header.name, message)),
            );
        }
        errors
    }
}

/// The flows currently marked invalid, for status reporting.
pub fn invalid_flows(flows: &[Flow]) -> Vec<&Flow> {
    flows.iter().filter(|flow| flow.is_invalid()).collect()
}
