use super::FlowCompiler;
use crate::types::{Flow, FlowConfigError, FlowErrorType, FlowPlan, FlowState, Variable};
use itertools::Itertools;
use tracing::debug;

impl FlowCompiler<'_> {
    /// Re-checks an existing flow after the installed actions or registered plans
    /// changed. Unresolved-variable errors from the original compilation are kept,
    /// since the variables themselves have not been re-applied.
    pub fn revalidate(&self, flow: &mut Flow) {
        let mut errors: Vec<FlowConfigError> = flow
            .status
            .errors
            .iter()
            .filter(|e| e.error_type == FlowErrorType::UnresolvedVariable)
            .cloned()
            .collect();

        errors.extend(self.check(&mut flow.plan));
        let errors: Vec<FlowConfigError> = errors.into_iter().unique().collect();

        flow.status.state = match (flow.status.state, errors.is_empty()) {
            (_, false) => FlowState::Invalid,
            (FlowState::Invalid, true) => FlowState::Stopped,
            (state, true) => state,
        };
        debug!(
            flow = flow.name(),
            state = ?flow.status.state,
            errors = errors.len(),
            "revalidated flow"
        );
        flow.status.errors = errors;
    }

    /// Recompiles a plan that replaces `existing`. A valid replacement keeps the
    /// running and test-mode state of the flow it replaces.
    pub fn rebuild(&self, plan: &FlowPlan, variables: &[Variable], existing: &Flow) -> Flow {
        let mut flow = self.compile(plan, variables);
        if !flow.is_invalid() {
            if existing.is_running() {
                flow.status.state = existing.status.state;
            }
            flow.status.test_mode = flow.status.test_mode || existing.status.test_mode;
        }
        flow
    }
}
