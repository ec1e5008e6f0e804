use flow_state::{
    spawn_delayed, AiCommunication, ExtractedData, FlowContext, FlowStore, ReimbursementState,
    StatePatch, TaskHandle,
};
use parking_lot::Mutex;
use std::sync::Arc;

use super::{back_button, header, Block, StepLayout, StepScreen, Tone};
use crate::config::FlowConfig;
use crate::controls::Button;
use crate::flow_nav::FlowNav;
use crate::flows::steps;
use crate::navigation::Navigator;

/// What the simulated analysis reads out of the uploaded documents
pub fn simulated_extraction(state: &ReimbursementState) -> ExtractedData {
    let description = match state.uploads.first() {
        Some(file) => format!("Itemized receipt ({})", file.name),
        None => "Itemized receipt".to_string(),
    };
    let category = if state.category.is_empty() { "dental" } else { state.category.as_str() };

    ExtractedData {
        start_date: Some("2026-09-14".to_string()),
        end_date: Some("2026-09-14".to_string()),
        amount: Some("185.00".to_string()),
        provider: Some("Bright Smile Dental".to_string()),
        category: Some(category.to_string()),
        expense_type: Some("office-visit".to_string()),
        description: Some(description),
    }
}

/// Write `extracted` and pre-fill the form fields the user left empty
fn apply_extraction(store: &FlowStore, extracted: ExtractedData) {
    let mut patch = StatePatch::new();
    store.read(|state| {
        let fill = |current: &str, found: &Option<String>| {
            found.clone().filter(|_| current.is_empty())
        };
        patch.provider = fill(&state.provider, &extracted.provider);
        patch.amount = fill(&state.amount, &extracted.amount);
        patch.service_date = fill(&state.service_date, &extracted.start_date);
        patch.category = fill(&state.category, &extracted.category);
    });
    store.update_state(patch.extracted(extracted));
}

/// Document analysis wait-state
///
/// Analysis starts on mount and, once done, moves the flow on by itself.
pub struct AnalyzeScreen {
    store: FlowStore,
    flow_nav: FlowNav,
    timer: Option<TaskHandle>,
}

impl AnalyzeScreen {
    /// Mount the screen and start analysis
    ///
    /// Must be called from within a tokio runtime. When the timer fires the
    /// results are written and `nav` is moved to the step after analysis.
    /// The timer callback locks `nav`, so release that lock before dropping
    /// the screen.
    pub fn mount<N>(ctx: &FlowContext, config: &FlowConfig, nav: Arc<Mutex<N>>) -> Self
    where
        N: Navigator + Send + 'static,
    {
        let store = ctx.store().clone();
        let flow_nav = store.read(FlowNav::for_state);

        let task_store = store.clone();
        let timer = spawn_delayed(config.analysis_delay, move || {
            let extracted = task_store.read(simulated_extraction);
            apply_extraction(&task_store, extracted);

            let state = task_store.snapshot();
            tracing::info!(flow = %state.flow_id, "document analysis finished");
            FlowNav::for_state(&state).go_next(&mut *nav.lock(), &state, steps::ANALYZE);
        });

        Self { store, flow_nav, timer: Some(timer) }
    }

    /// Whether analysis is still running
    pub fn is_analyzing(&self) -> bool {
        self.timer.as_ref().is_some_and(TaskHandle::is_active)
    }

    /// Stop analysis and move on without results
    pub fn skip<N: Navigator + ?Sized>(&mut self, nav: &mut N) -> bool {
        self.cancel();
        let state = self.store.snapshot();
        self.flow_nav.refresh(&state);
        self.flow_nav.go_next(nav, &state, steps::ANALYZE)
    }

    /// Stop analysis and go back
    pub fn back<N: Navigator + ?Sized>(&mut self, nav: &mut N) -> bool {
        self.cancel();
        let state = self.store.snapshot();
        self.flow_nav.refresh(&state);
        self.flow_nav.go_back(nav, &state, steps::ANALYZE)
    }

    fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

impl StepScreen for AnalyzeScreen {
    fn step_id(&self) -> &'static str {
        steps::ANALYZE
    }

    fn render(&self, state: &ReimbursementState) -> StepLayout {
        let mut content = Vec::new();

        if !state.extracted.is_empty() {
            content.push(Block::notice(Tone::Success, "We read your documents"));
        } else {
            match state.layout_modes.ai_communication {
                AiCommunication::Minimal => {
                    content.push(Block::Spinner { message: "Reading your documents".to_string() });
                }
                AiCommunication::Detailed => {
                    content.push(Block::Spinner { message: "Reading your documents".to_string() });
                    content.push(Block::text(
                        "Looking for the provider, date of service and amount billed.",
                    ));
                    content.push(Block::FileList { files: state.uploads.clone() });
                }
                AiCommunication::Prominent => {
                    content.push(Block::notice(
                        Tone::Info,
                        "Our assistant is reading your documents and will fill in the claim for you.",
                    ));
                    content.push(Block::Spinner { message: "Analyzing".to_string() });
                    content.push(Block::text("You can review and change everything it finds."));
                }
            }
        }

        let mut footer = vec![Button::ghost("Skip", "skip").loading(self.is_analyzing())];
        footer.extend(back_button(state, steps::ANALYZE));

        StepLayout {
            header: header(state, steps::ANALYZE, "Analyzing documents", None),
            content,
            footer,
        }
    }
}
