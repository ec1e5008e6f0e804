use flow_state::{FlowContext, FlowStore, ReimbursementState};

use super::review::summary_rows;
use super::{header, Block, StepLayout, StepScreen, Tone};
use crate::controls::Button;
use crate::flows::steps;
use crate::navigation::{HistoryMode, Navigator, Route};

/// Submission confirmation
pub struct ConfirmScreen {
    store: FlowStore,
}

impl ConfirmScreen {
    /// Mount the screen
    pub fn new(ctx: &FlowContext) -> Self {
        Self { store: ctx.store().clone() }
    }

    /// Clear the claim and leave the flow
    ///
    /// Variant, flow and layout modes stay, matching the query string that
    /// travels home with the user.
    pub fn done<N: Navigator + ?Sized>(&self, nav: &mut N) {
        self.store.reset_claim();
        let to = nav.location().with_route(Route::Home);
        nav.navigate(to, HistoryMode::Push);
    }
}

impl StepScreen for ConfirmScreen {
    fn step_id(&self) -> &'static str {
        steps::CONFIRM
    }

    fn render(&self, state: &ReimbursementState) -> StepLayout {
        StepLayout {
            header: header(state, steps::CONFIRM, "Request submitted", None),
            content: vec![
                Block::notice(Tone::Success, "We'll let you know when your payment is on its way"),
                Block::Summary { rows: summary_rows(state) },
            ],
            footer: vec![Button::primary("Done", "done")],
        }
    }
}
