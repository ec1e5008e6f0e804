use flow_state::{
    AiCommunication, FlowContext, FlowStore, ReimbursementState, ReviewLayout, StatePatch,
};

use super::{back_button, header, or_dash, Block, StepLayout, StepScreen, Tone};
use crate::controls::Button;
use crate::flow_nav::FlowNav;
use crate::flows::steps;
use crate::navigation::Navigator;

/// Review and submit
pub struct ReviewScreen {
    store: FlowStore,
    flow_nav: FlowNav,
}

impl ReviewScreen {
    /// Mount the screen
    pub fn new(ctx: &FlowContext) -> Self {
        let store = ctx.store().clone();
        let flow_nav = store.read(FlowNav::for_state);
        Self { store, flow_nav }
    }

    /// Edit the amount
    pub fn set_amount(&self, value: &str) {
        self.store.update_state(StatePatch::new().amount(value));
    }

    /// Edit the provider
    pub fn set_provider(&self, value: &str) {
        self.store.update_state(StatePatch::new().provider(value));
    }

    /// Edit the date of service
    pub fn set_service_date(&self, value: &str) {
        self.store.update_state(StatePatch::new().service_date(value));
    }

    /// Choose who receives the payout
    pub fn set_recipient(&self, value: &str) {
        self.store.update_state(StatePatch::new().recipient(value));
    }

    /// Set the mileage flag
    pub fn set_did_drive(&self, value: bool) {
        self.store.update_state(StatePatch::new().did_drive(value));
    }

    /// Accept or withdraw the terms
    pub fn set_accepted_terms(&self, value: bool) {
        self.store.update_state(StatePatch::new().accepted_terms(value));
    }

    /// Submit the claim; refused until the terms are accepted
    pub fn submit<N: Navigator + ?Sized>(&mut self, nav: &mut N) -> bool {
        let state = self.store.snapshot();
        if !state.accepted_terms {
            return false;
        }
        tracing::info!(flow = %state.flow_id, amount = %state.amount, "claim submitted");
        self.flow_nav.refresh(&state);
        self.flow_nav.go_next(nav, &state, steps::REVIEW)
    }

    /// Go to the previous step
    pub fn back<N: Navigator + ?Sized>(&mut self, nav: &mut N) -> bool {
        let state = self.store.snapshot();
        self.flow_nav.refresh(&state);
        self.flow_nav.go_back(nav, &state, steps::REVIEW)
    }
}

/// Claim details as label/value rows
pub(crate) fn summary_rows(state: &ReimbursementState) -> Vec<(String, String)> {
    [
        ("Account", state.account.as_str()),
        ("Category", state.category.as_str()),
        ("Provider", state.provider.as_str()),
        ("Date of service", state.service_date.as_str()),
        ("Amount", state.amount.as_str()),
        ("Recipient", state.recipient.as_str()),
    ]
    .into_iter()
    .map(|(label, value)| (label.to_string(), or_dash(value)))
    .chain(std::iter::once(("Documents".to_string(), state.uploads.len().to_string())))
    .collect()
}

fn form_blocks(state: &ReimbursementState) -> Vec<Block> {
    vec![
        Block::input("amount", "Amount", &state.amount),
        Block::input("provider", "Provider", &state.provider),
        Block::input("serviceDate", "Date of service", &state.service_date),
        Block::input("recipient", "Pay to", &state.recipient),
        Block::toggle("didDrive", "I drove to this appointment", state.did_drive),
    ]
}

impl StepScreen for ReviewScreen {
    fn step_id(&self) -> &'static str {
        steps::REVIEW
    }

    fn render(&self, state: &ReimbursementState) -> StepLayout {
        let mut content = Vec::new();

        if !state.extracted.is_empty()
            && state.layout_modes.ai_communication != AiCommunication::Minimal
        {
            content.push(Block::notice(Tone::Info, "Some fields were filled in from your documents"));
        }

        match state.layout_modes.review_layout {
            ReviewLayout::Form => content.extend(form_blocks(state)),
            ReviewLayout::Summary => content.push(Block::Summary { rows: summary_rows(state) }),
            ReviewLayout::Split => content.push(Block::Columns {
                left: form_blocks(state),
                right: vec![Block::Summary { rows: summary_rows(state) }],
            }),
        }
        content.push(Block::toggle(
            "acceptedTerms",
            "I certify this expense is eligible and not reimbursed elsewhere",
            state.accepted_terms,
        ));

        let mut footer = vec![Button::primary("Submit", "submit").disabled(!state.accepted_terms)];
        footer.extend(back_button(state, steps::REVIEW));

        StepLayout {
            header: header(state, steps::REVIEW, "Review your claim", None),
            content,
            footer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::VISION_LINEAR_V1;
    use crate::navigation::{History, Route};
    use flow_state::FlowProvider;

    #[test]
    fn test_submit_requires_terms() {
        let provider = FlowProvider::mount();
        let mut screen = ReviewScreen::new(&provider.context());
        let mut history = History::at("/reimburse/review");

        assert!(screen.render(&provider.store().snapshot()).button("submit").unwrap().disabled);
        assert!(!screen.submit(&mut history));
        assert_eq!(history.depth(), 1);

        screen.set_accepted_terms(true);
        assert!(screen.submit(&mut history));
        assert_eq!(history.location().route, Route::ReimburseConfirm);
    }

    #[test]
    fn test_edits_write_to_store() {
        let provider = FlowProvider::mount();
        let screen = ReviewScreen::new(&provider.context());

        screen.set_amount("80.25");
        screen.set_provider("Clinic");
        screen.set_service_date("2026-10-01");
        screen.set_recipient("me");
        screen.set_did_drive(true);

        let state = provider.store().snapshot();
        assert_eq!(state.amount, "80.25");
        assert_eq!(state.provider, "Clinic");
        assert_eq!(state.service_date, "2026-10-01");
        assert_eq!(state.recipient, "me");
        assert!(state.did_drive);
    }

    #[test]
    fn test_layouts() {
        let provider = FlowProvider::mount();
        let screen = ReviewScreen::new(&provider.context());
        let mut state = provider.store().snapshot();

        assert!(matches!(screen.render(&state).content[0], Block::Input { field: "amount", .. }));

        state.layout_modes.review_layout = ReviewLayout::Summary;
        let summary = screen.render(&state);
        let Block::Summary { rows } = &summary.content[0] else {
            panic!("expected summary");
        };
        assert_eq!(rows[0], ("Account".to_string(), "-".to_string()));

        state.layout_modes.review_layout = ReviewLayout::Split;
        assert!(matches!(screen.render(&state).content[0], Block::Columns { .. }));
    }

    #[test]
    fn test_prefill_notice() {
        let provider = FlowProvider::mount();
        let screen = ReviewScreen::new(&provider.context());
        let mut state = provider.store().snapshot();
        state.extracted.amount = Some("10".to_string());

        assert!(!matches!(screen.render(&state).content[0], Block::Notice { .. }));
        state.layout_modes.ai_communication = AiCommunication::Detailed;
        assert!(matches!(screen.render(&state).content[0], Block::Notice { .. }));
    }

    #[test]
    fn test_back_in_vision_flow_returns_to_analysis() {
        let provider = FlowProvider::mount();
        provider.store().update_state(StatePatch::new().flow_id(VISION_LINEAR_V1));
        let mut screen = ReviewScreen::new(&provider.context());
        let mut history = History::at("/reimburse/review");

        assert!(screen.back(&mut history));
        assert_eq!(history.location().route, Route::ReimburseAnalyze);
    }
}
