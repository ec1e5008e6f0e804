use flow_state::{
    FlowContext, FlowStore, PlanSelectionMode, ReimbursementState, StatePatch, UploadLayout,
    UploadedFile,
};

use super::docs::{validate_upload, UploadError};
use super::myself::{ACCOUNTS, CATEGORIES};
use super::review::summary_rows;
use super::{header, Block, StepLayout, StepScreen, Tone};
use crate::config::FlowConfig;
use crate::controls::{Button, SelectOption};
use crate::flows::{get_flow_by_id, steps, FlowDefinition};
use crate::navigation::{HistoryMode, Navigator};

/// Single-page wizard
///
/// The wizard's steps have no routes: the screen keeps its own step index
/// and only navigates once, to the flow's completion page.
pub struct WizardScreen {
    store: FlowStore,
    config: FlowConfig,
    index: usize,
    error: Option<UploadError>,
}

impl WizardScreen {
    /// Mount the wizard at its first step
    pub fn new(ctx: &FlowContext, config: FlowConfig) -> Self {
        Self { store: ctx.store().clone(), config, index: 0, error: None }
    }

    fn flow(&self) -> &'static FlowDefinition {
        self.store.read(|s| get_flow_by_id(Some(&s.flow_id)))
    }

    fn step_count(&self) -> usize {
        self.store.read(|s| get_flow_by_id(Some(&s.flow_id)).get_progress_steps(s).len())
    }

    /// Zero-based index of the visible step
    pub fn index(&self) -> usize {
        self.index
    }

    /// Id of the visible step
    pub fn current_step(&self) -> &'static str {
        self.store.read(|s| {
            get_flow_by_id(Some(&s.flow_id))
                .get_progress_steps(s)
                .get(self.index)
                .map_or(steps::EXPENSE_TYPE, |step| step.id)
        })
    }

    fn is_last(&self) -> bool {
        self.index + 1 >= self.step_count()
    }

    /// Choose the expense type
    pub fn select_expense_type(&self, value: &str) {
        self.store.update_state(StatePatch::new().category(value));
    }

    /// Choose the benefit plan
    pub fn select_plan(&self, value: &str) {
        self.store.update_state(StatePatch::new().account(value));
    }

    /// Validate and record a file
    pub fn add_file(&mut self, name: &str, size: u64) -> Result<(), UploadError> {
        if let Err(e) = validate_upload(&self.config, name, size) {
            self.error = Some(e.clone());
            return Err(e);
        }
        self.error = None;
        let mut uploads = self.store.read(|s| s.uploads.clone());
        uploads.push(UploadedFile::completed(name, size));
        self.store.update_state(StatePatch::new().uploads(uploads));
        Ok(())
    }

    /// Accept or withdraw the terms
    pub fn set_accepted_terms(&self, value: bool) {
        self.store.update_state(StatePatch::new().accepted_terms(value));
    }

    /// Show the next step; stays put at the last step or while the
    /// visible step is incomplete
    pub fn next(&mut self) -> bool {
        let step = self.current_step();
        if self.is_last() || !self.store.read(|s| step_complete(s, step)) {
            return false;
        }
        self.index += 1;
        true
    }

    /// Show the previous step; stays put at the first step
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Submit from the last step and go to the completion page
    pub fn finish<N: Navigator + ?Sized>(&mut self, nav: &mut N) -> bool {
        let flow = self.flow();
        let accepted = self.store.read(|s| s.accepted_terms);
        let Some(route) = flow.completion_route.filter(|_| self.is_last() && accepted) else {
            return false;
        };
        tracing::info!(flow = flow.id, "wizard submitted");
        let to = nav.location().with_route(route);
        nav.navigate(to, HistoryMode::Push);
        true
    }
}

fn step_complete(state: &ReimbursementState, step_id: &str) -> bool {
    match step_id {
        steps::EXPENSE_TYPE => !state.category.is_empty(),
        steps::PLAN => !state.account.is_empty(),
        steps::REVIEW => state.accepted_terms,
        _ => true,
    }
}

fn selected(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl StepScreen for WizardScreen {
    fn step_id(&self) -> &'static str {
        self.current_step()
    }

    fn render(&self, state: &ReimbursementState) -> StepLayout {
        let step_id = get_flow_by_id(Some(&state.flow_id))
            .get_progress_steps(state)
            .get(self.index)
            .map_or(steps::EXPENSE_TYPE, |s| s.id);

        let mut content = Vec::new();
        if let Some(error) = &self.error {
            content.push(Block::notice(Tone::Error, error.to_string()));
        }

        match step_id {
            steps::EXPENSE_TYPE => content.push(Block::Cards {
                field: "category",
                options: CATEGORIES.iter().map(|(v, l)| SelectOption::new(*v, *l)).collect(),
                selected: selected(&state.category),
            }),
            steps::PLAN => {
                let options = ACCOUNTS
                    .iter()
                    .map(|(v, l, d)| SelectOption::new(*v, *l).with_detail(*d))
                    .collect();
                content.push(match state.layout_modes.plan_selection_mode {
                    PlanSelectionMode::Dropdown => Block::Select {
                        field: "account",
                        label: "Plan".to_string(),
                        options,
                        selected: selected(&state.account),
                    },
                    PlanSelectionMode::Cards => Block::Cards {
                        field: "account",
                        options,
                        selected: selected(&state.account),
                    },
                });
            }
            steps::UPLOAD => {
                content.push(Block::DropZone {
                    accepted: self.config.accepted_extensions.clone(),
                    compact: state.layout_modes.upload_layout == UploadLayout::Compact,
                });
                content.push(Block::FileList { files: state.uploads.clone() });
            }
            _ => {
                content.push(Block::Summary { rows: summary_rows(state) });
                content.push(Block::toggle(
                    "acceptedTerms",
                    "I certify this expense is eligible and not reimbursed elsewhere",
                    state.accepted_terms,
                ));
            }
        }

        let step_count = get_flow_by_id(Some(&state.flow_id)).get_progress_steps(state).len();
        let mut footer = if self.index + 1 >= step_count {
            vec![Button::primary("Submit", "finish").disabled(!state.accepted_terms)]
        } else {
            vec![Button::primary("Continue", "next").disabled(!step_complete(state, step_id))]
        };
        if self.index > 0 {
            footer.push(Button::secondary("Back", "back"));
        }

        StepLayout { header: header(state, step_id, "Reimburse myself", None), content, footer }
    }
}
