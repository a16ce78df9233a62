//! The data model shared by every stage of compilation.

mod action;
mod flow;
mod plan;
mod variable;

pub use action::{ActionConfiguration, ActionDescriptor, ActionType};
pub use flow::{Flow, FlowConfigError, FlowErrorType, FlowState, FlowStatus};
pub use plan::{
    AnnotationConfig, EgressFlowPlan, EnrichFlowPlan, FlowKind, FlowPlan, IngressFlowPlan,
    OnErrorDataSourcePlan, PlanHeader, PluginCoordinates, PublishRule, PublishRules,
    RestDataSourcePlan, Subscription, TimedDataSourcePlan, TransformFlowPlan,
};
pub use variable::{MASKED_VALUE, Variable, VariableDataType, parse_list, parse_map};
