use flow_state::{FlowContext, FlowStore, PlanSelectionMode, ReimbursementState, StatePatch};

use super::{back_button, header, Block, StepLayout, StepScreen};
use crate::controls::{Button, SelectOption};
use crate::flow_nav::FlowNav;
use crate::flows::steps;
use crate::navigation::Navigator;

/// Benefit accounts: `(value, label, detail)`
pub const ACCOUNTS: [(&str, &str, &str); 3] = [
    ("hsa", "Health Savings Account", "Available $2,418.50"),
    ("fsa", "Flexible Spending Account", "Available $1,150.00"),
    ("dcfsa", "Dependent Care FSA", "Available $3,000.00"),
];

/// Expense categories: `(value, label)`
pub const CATEGORIES: [(&str, &str); 5] = [
    ("medical", "Medical"),
    ("dental", "Dental"),
    ("vision", "Vision"),
    ("pharmacy", "Pharmacy"),
    ("dependent-care", "Dependent care"),
];

/// Account and category selection
pub struct MyselfScreen {
    store: FlowStore,
    flow_nav: FlowNav,
}

impl MyselfScreen {
    /// Mount the screen
    pub fn new(ctx: &FlowContext) -> Self {
        let store = ctx.store().clone();
        let flow_nav = store.read(FlowNav::for_state);
        Self { store, flow_nav }
    }

    /// Choose an account
    pub fn select_account(&self, value: &str) {
        self.store.update_state(StatePatch::new().account(value));
    }

    /// Choose a category
    pub fn select_category(&self, value: &str) {
        self.store.update_state(StatePatch::new().category(value));
    }

    /// Go to the next step once both choices are made
    pub fn continue_to_next<N: Navigator + ?Sized>(&mut self, nav: &mut N) -> bool {
        let state = self.store.snapshot();
        if !is_complete(&state) {
            return false;
        }
        self.flow_nav.refresh(&state);
        self.flow_nav.go_next(nav, &state, steps::MYSELF)
    }

    /// Go to the previous step
    pub fn back<N: Navigator + ?Sized>(&mut self, nav: &mut N) -> bool {
        let state = self.store.snapshot();
        self.flow_nav.refresh(&state);
        self.flow_nav.go_back(nav, &state, steps::MYSELF)
    }
}

fn is_complete(state: &ReimbursementState) -> bool {
    !state.account.is_empty() && !state.category.is_empty()
}

fn selected(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl StepScreen for MyselfScreen {
    fn step_id(&self) -> &'static str {
        steps::MYSELF
    }

    fn render(&self, state: &ReimbursementState) -> StepLayout {
        let accounts = match state.layout_modes.plan_selection_mode {
            PlanSelectionMode::Dropdown => Block::Select {
                field: "account",
                label: "Account".to_string(),
                options: ACCOUNTS.iter().map(|(v, l, _)| SelectOption::new(*v, *l)).collect(),
                selected: selected(&state.account),
            },
            PlanSelectionMode::Cards => Block::Cards {
                field: "account",
                options: ACCOUNTS
                    .iter()
                    .map(|(v, l, d)| SelectOption::new(*v, *l).with_detail(*d))
                    .collect(),
                selected: selected(&state.account),
            },
        };

        let mut footer = vec![
            Button::primary("Continue", "next").disabled(!is_complete(state)),
        ];
        footer.extend(back_button(state, steps::MYSELF));

        StepLayout {
            header: header(
                state,
                steps::MYSELF,
                "Reimburse myself",
                Some("Which account should pay you back?"),
            ),
            content: vec![
                accounts,
                Block::Select {
                    field: "category",
                    label: "Category".to_string(),
                    options: CATEGORIES.iter().map(|(v, l)| SelectOption::new(*v, *l)).collect(),
                    selected: selected(&state.category),
                },
            ],
            footer,
        }
    }
}
