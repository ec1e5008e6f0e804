//! Flow definitions and the flow registry
//!
//! A flow is an ordered list of steps plus pure transition functions. The
//! registry is built once and never changes; state refers to a flow by id
//! and [`get_flow_by_id`] always answers with a usable definition.

use flow_state::{ReimbursementState, DEFAULT_FLOW_ID};
use std::sync::OnceLock;

use crate::navigation::Route;

/// Identifier of the linear MVP flow
pub const MVP_LINEAR_V1: &str = DEFAULT_FLOW_ID;
/// Identifier of the linear vision flow (with analysis)
pub const VISION_LINEAR_V1: &str = "vision-linear-v1";
/// Identifier of the upload-first vision flow
pub const VISION_ALT_STEPS_V1: &str = "vision-alt-steps-v1";
/// Identifier of the single-page wizard flow
pub const VISION_WIZARD_V1: &str = "vision-wizard-v1";

/// Step transition: `(flow, state, current step id) -> target step id`
pub type TransitionFn = fn(&FlowDefinition, &ReimbursementState, &str) -> Option<&'static str>;

/// Progress step selection: `(flow, state) -> steps to show`
pub type ProgressFn = fn(&FlowDefinition, &ReimbursementState) -> Vec<FlowStep>;

/// Whether steps are separate pages or one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowMode {
    /// Every step has its own route
    Routes,
    /// All steps render on one route; the screen owns the step index
    Wizard,
}

/// One step of a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowStep {
    /// Unique within its flow
    pub id: &'static str,
    /// Display name
    pub label: &'static str,
    /// Route to navigate to (absent for wizard-internal steps)
    pub path: Option<Route>,
}

impl FlowStep {
    const fn routed(id: &'static str, label: &'static str, path: Route) -> Self {
        Self { id, label, path: Some(path) }
    }

    const fn internal(id: &'static str, label: &'static str) -> Self {
        Self { id, label, path: None }
    }
}

/// A named flow
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    /// Globally unique id
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// What the flow is for
    pub description: &'static str,
    /// Routing style
    pub mode: FlowMode,
    /// Steps in traversal order
    pub steps: Vec<FlowStep>,
    /// Where the flow starts
    pub entry_route: Route,
    /// Where a finished flow lands, if it has a dedicated page
    pub completion_route: Option<Route>,
    next: TransitionFn,
    back: TransitionFn,
    progress: ProgressFn,
}

impl FlowDefinition {
    /// Step after `current`, or `None` when there is no transition
    pub fn get_next(&self, state: &ReimbursementState, current: &str) -> Option<&'static str> {
        (self.next)(self, state, current)
    }

    /// Step before `current`, or `None` when there is no transition
    pub fn get_back(&self, state: &ReimbursementState, current: &str) -> Option<&'static str> {
        (self.back)(self, state, current)
    }

    /// Steps a progress indicator should show
    pub fn get_progress_steps(&self, state: &ReimbursementState) -> Vec<FlowStep> {
        (self.progress)(self, state)
    }

    /// Position of a step
    pub fn index_of(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    /// Look up a step
    pub fn step(&self, step_id: &str) -> Option<&FlowStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// First step
    pub fn first_step(&self) -> Option<&FlowStep> {
        self.steps.first()
    }

    /// Step rendered at `route`
    pub fn step_for_route(&self, route: Route) -> Option<&FlowStep> {
        self.steps.iter().find(|s| s.path == Some(route))
    }

    /// Check if `route` belongs to this flow
    pub fn owns_route(&self, route: Route) -> bool {
        match self.mode {
            FlowMode::Routes => self.step_for_route(route).is_some(),
            FlowMode::Wizard => route == self.entry_route,
        }
    }
}

// =============================================================================
// Transition Functions
// =============================================================================

/// Positional next: unknown step or last step yields `None`
pub fn linear_next(
    flow: &FlowDefinition,
    _state: &ReimbursementState,
    current: &str,
) -> Option<&'static str> {
    let index = flow.index_of(current)?;
    flow.steps.get(index + 1).map(|s| s.id)
}

/// Positional back: unknown step or first step yields `None`
pub fn linear_back(
    flow: &FlowDefinition,
    _state: &ReimbursementState,
    current: &str,
) -> Option<&'static str> {
    let index = flow.index_of(current)?;
    let prev = index.checked_sub(1)?;
    flow.steps.get(prev).map(|s| s.id)
}

/// Every step is a progress step
pub fn all_steps(flow: &FlowDefinition, _state: &ReimbursementState) -> Vec<FlowStep> {
    flow.steps.clone()
}

/// The analysis wait-state is not a step the user fills in
pub fn without_analysis(flow: &FlowDefinition, _state: &ReimbursementState) -> Vec<FlowStep> {
    flow.steps.iter().filter(|s| s.id != steps::ANALYZE).copied().collect()
}

/// Step identifiers shared by the flows
pub mod steps {
    /// Account and category selection
    pub const MYSELF: &str = "myself";
    /// Document upload
    pub const DOCS: &str = "docs";
    /// Document analysis
    pub const ANALYZE: &str = "analyze";
    /// Review
    pub const REVIEW: &str = "review";
    /// Confirmation
    pub const CONFIRM: &str = "confirm";
    /// Wizard: expense type
    pub const EXPENSE_TYPE: &str = "expenseType";
    /// Wizard: plan
    pub const PLAN: &str = "plan";
    /// Wizard: upload
    pub const UPLOAD: &str = "upload";
}

const MYSELF_STEP: FlowStep = FlowStep::routed(steps::MYSELF, "Expense", Route::Reimburse);
const DOCS_STEP: FlowStep = FlowStep::routed(steps::DOCS, "Documents", Route::ReimburseDocs);
const ANALYZE_STEP: FlowStep =
    FlowStep::routed(steps::ANALYZE, "Analyze", Route::ReimburseAnalyze);
const REVIEW_STEP: FlowStep = FlowStep::routed(steps::REVIEW, "Review", Route::ReimburseReview);
const CONFIRM_STEP: FlowStep =
    FlowStep::routed(steps::CONFIRM, "Confirm", Route::ReimburseConfirm);

// =============================================================================
// Registry
// =============================================================================

fn build_registry() -> Vec<FlowDefinition> {
    vec![
        // Default flow first; `default_flow` relies on it.
        FlowDefinition {
            id: MVP_LINEAR_V1,
            name: "MVP linear",
            description: "Details, documents, review and confirm on separate pages",
            mode: FlowMode::Routes,
            steps: vec![MYSELF_STEP, DOCS_STEP, REVIEW_STEP, CONFIRM_STEP],
            entry_route: Route::Reimburse,
            completion_route: None,
            next: linear_next,
            back: linear_back,
            progress: all_steps,
        },
        FlowDefinition {
            id: VISION_LINEAR_V1,
            name: "Vision linear",
            description: "Adds document analysis between upload and review",
            mode: FlowMode::Routes,
            steps: vec![MYSELF_STEP, DOCS_STEP, ANALYZE_STEP, REVIEW_STEP, CONFIRM_STEP],
            entry_route: Route::Reimburse,
            completion_route: None,
            next: linear_next,
            back: linear_back,
            progress: without_analysis,
        },
        FlowDefinition {
            id: VISION_ALT_STEPS_V1,
            name: "Vision upload first",
            description: "Starts with the receipt and asks for details after analysis",
            mode: FlowMode::Routes,
            steps: vec![DOCS_STEP, ANALYZE_STEP, MYSELF_STEP, REVIEW_STEP, CONFIRM_STEP],
            entry_route: Route::ReimburseDocs,
            completion_route: None,
            next: linear_next,
            back: linear_back,
            progress: without_analysis,
        },
        FlowDefinition {
            id: VISION_WIZARD_V1,
            name: "Vision wizard",
            description: "All steps on one page with an in-page step index",
            mode: FlowMode::Wizard,
            steps: vec![
                FlowStep::internal(steps::EXPENSE_TYPE, "Expense type"),
                FlowStep::internal(steps::PLAN, "Plan"),
                FlowStep::internal(steps::UPLOAD, "Upload"),
                FlowStep::internal(steps::REVIEW, "Review"),
            ],
            entry_route: Route::ReimburseWizard,
            completion_route: Some(Route::ReimburseWizardSuccess),
            next: linear_next,
            back: linear_back,
            progress: all_steps,
        },
    ]
}

/// All registered flows
pub fn registry() -> &'static [FlowDefinition] {
    static REGISTRY: OnceLock<Vec<FlowDefinition>> = OnceLock::new();
    REGISTRY.get_or_init(build_registry)
}

/// The flow used when no usable id is given
pub fn default_flow() -> &'static FlowDefinition {
    &registry()[0]
}

/// Check if `flow_id` names a registered flow
pub fn is_registered(flow_id: &str) -> bool {
    registry().iter().any(|f| f.id == flow_id)
}

/// Resolve a flow id, falling back to the default flow
///
/// Never fails: a missing, stale or corrupted id yields the default flow.
pub fn get_flow_by_id(flow_id: Option<&str>) -> &'static FlowDefinition {
    flow_id
        .and_then(|id| registry().iter().find(|f| f.id == id))
        .unwrap_or_else(default_flow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ReimbursementState {
        ReimbursementState::default()
    }

    #[test]
    fn test_registry_ids_are_unique() {
        let ids: Vec<&str> = registry().iter().map(|f| f.id).collect();
        for (i, id) in ids.iter().enumerate() {
            assert!(!ids[i + 1..].contains(id), "duplicate flow id {id}");
        }
    }

    #[test]
    fn test_step_ids_unique_within_flow() {
        for flow in registry() {
            for (i, step) in flow.steps.iter().enumerate() {
                assert!(flow.steps[i + 1..].iter().all(|s| s.id != step.id));
            }
        }
    }

    #[test]
    fn test_default_flow_is_mvp_linear() {
        assert_eq!(default_flow().id, DEFAULT_FLOW_ID);
        assert_eq!(default_flow().id, MVP_LINEAR_V1);
    }

    #[test]
    fn test_get_next_positional() {
        let s = state();
        for flow in registry() {
            let last = flow.steps.len() - 1;
            for (i, step) in flow.steps.iter().enumerate() {
                let expected = if i == last { None } else { Some(flow.steps[i + 1].id) };
                assert_eq!(flow.get_next(&s, step.id), expected, "{} / {}", flow.id, step.id);
            }
        }
    }

    #[test]
    fn test_get_back_positional() {
        let s = state();
        for flow in registry() {
            for (i, step) in flow.steps.iter().enumerate() {
                let expected = if i == 0 { None } else { Some(flow.steps[i - 1].id) };
                assert_eq!(flow.get_back(&s, step.id), expected, "{} / {}", flow.id, step.id);
            }
        }
    }

    #[test]
    fn test_unknown_step_has_no_transition() {
        let s = state();
        for flow in registry() {
            assert_eq!(flow.get_next(&s, "not-a-real-step"), None);
            assert_eq!(flow.get_back(&s, "not-a-real-step"), None);
        }
    }

    #[test]
    fn test_resolver_fallbacks() {
        let default = get_flow_by_id(Some(DEFAULT_FLOW_ID));
        assert_eq!(get_flow_by_id(None).id, default.id);
        assert_eq!(get_flow_by_id(Some("nonexistent-id")).id, default.id);
        assert_eq!(get_flow_by_id(Some("")).id, default.id);
        assert_eq!(get_flow_by_id(Some(VISION_ALT_STEPS_V1)).id, VISION_ALT_STEPS_V1);
    }

    #[test]
    fn test_wizard_progress_steps() {
        let wizard = get_flow_by_id(Some(VISION_WIZARD_V1));
        let mut s = state();
        s.amount = "99".to_string();
        s.accepted_terms = true;

        let ids: Vec<&str> = wizard.get_progress_steps(&s).iter().map(|st| st.id).collect();
        assert_eq!(ids, vec!["expenseType", "plan", "upload", "review"]);
        assert_eq!(wizard.get_progress_steps(&state()), wizard.get_progress_steps(&s));
    }

    #[test]
    fn test_wizard_steps_have_no_paths() {
        let wizard = get_flow_by_id(Some(VISION_WIZARD_V1));
        assert_eq!(wizard.mode, FlowMode::Wizard);
        assert!(wizard.steps.iter().all(|s| s.path.is_none()));
        assert!(wizard.owns_route(Route::ReimburseWizard));
        assert!(!wizard.owns_route(Route::Reimburse));
    }

    #[test]
    fn test_vision_progress_hides_analysis() {
        let flow = get_flow_by_id(Some(VISION_LINEAR_V1));
        let ids: Vec<&str> = flow.get_progress_steps(&state()).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["myself", "docs", "review", "confirm"]);
        assert!(flow.index_of(steps::ANALYZE).is_some());
    }

    #[test]
    fn test_alt_flow_starts_with_docs() {
        let flow = get_flow_by_id(Some(VISION_ALT_STEPS_V1));
        assert_eq!(flow.first_step().map(|s| s.id), Some(steps::DOCS));
        assert_eq!(flow.entry_route, Route::ReimburseDocs);
        assert_eq!(flow.get_next(&state(), steps::ANALYZE), Some(steps::MYSELF));
    }

    #[test]
    fn test_route_flows_entry_is_first_step_path() {
        for flow in registry().iter().filter(|f| f.mode == FlowMode::Routes) {
            assert_eq!(flow.first_step().and_then(|s| s.path), Some(flow.entry_route));
        }
    }
}
