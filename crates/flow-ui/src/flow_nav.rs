//! Step navigation for the active flow
//!
//! [`FlowNav`] turns step ids into route navigation. Every failure mode
//! (unknown step, boundary step, step without a path) degrades to "no
//! navigation occurs"; nothing here mutates flow state.

use flow_state::ReimbursementState;

use crate::flows::{get_flow_by_id, FlowDefinition};
use crate::navigation::{HistoryMode, Navigator};

/// Navigation actions derived from the active flow
#[derive(Debug, Clone)]
pub struct FlowNav {
    flow_id: String,
    flow: &'static FlowDefinition,
}

impl FlowNav {
    /// Resolve the flow named by `state`
    pub fn for_state(state: &ReimbursementState) -> Self {
        Self { flow_id: state.flow_id.clone(), flow: get_flow_by_id(Some(&state.flow_id)) }
    }

    /// Re-resolve only if `state` now names a different flow
    pub fn refresh(&mut self, state: &ReimbursementState) {
        if self.flow_id != state.flow_id {
            *self = Self::for_state(state);
        }
    }

    /// The resolved flow
    pub fn flow(&self) -> &'static FlowDefinition {
        self.flow
    }

    /// Navigate to a step's route; returns whether navigation happened
    pub fn go_to_step<N: Navigator + ?Sized>(&self, nav: &mut N, step_id: &str) -> bool {
        let Some(route) = self.flow.step(step_id).and_then(|s| s.path) else {
            tracing::debug!(flow = self.flow.id, step = step_id, "step has no route");
            return false;
        };
        let to = nav.location().with_route(route);
        nav.navigate(to, HistoryMode::Push);
        true
    }

    /// Navigate to the step after `current`
    pub fn go_next<N: Navigator + ?Sized>(
        &self,
        nav: &mut N,
        state: &ReimbursementState,
        current: &str,
    ) -> bool {
        match self.flow.get_next(state, current) {
            Some(next) => self.go_to_step(nav, next),
            None => {
                tracing::debug!(flow = self.flow.id, step = current, "no next step");
                false
            }
        }
    }

    /// Navigate to the step before `current`
    pub fn go_back<N: Navigator + ?Sized>(
        &self,
        nav: &mut N,
        state: &ReimbursementState,
        current: &str,
    ) -> bool {
        match self.flow.get_back(state, current) {
            Some(prev) => self.go_to_step(nav, prev),
            None => {
                tracing::debug!(flow = self.flow.id, step = current, "no previous step");
                false
            }
        }
    }
}
