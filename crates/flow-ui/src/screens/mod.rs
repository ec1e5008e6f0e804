//! Step screens
//!
//! Every screen renders the same three zones: a header, scrollable
//! content blocks and a footer of action buttons. Where those zones sit on
//! the page is decided by [`crate::entry::EntryPresentation`], never by the
//! screen, so one screen tree works in every entry mode.
//!
//! Screens read the shared state when rendering and write to it from their
//! action methods. Background work (analysis timer, mobile upload poll) is
//! owned by the screen and stops when the screen is dropped.

use flow_state::{ReimbursementState, UploadedFile};
use serde::Serialize;

use crate::controls::{Button, SelectOption};
use crate::flows::{get_flow_by_id, steps};
use crate::progress::{render_progress, ProgressView};

mod analyze;
mod confirm;
mod docs;
mod myself;
mod review;
mod wizard;

pub use analyze::AnalyzeScreen;
pub use confirm::ConfirmScreen;
pub use docs::{DocsScreen, UploadError};
pub use myself::{MyselfScreen, ACCOUNTS, CATEGORIES};
pub use review::ReviewScreen;
pub use wizard::WizardScreen;

// =============================================================================
// Layout
// =============================================================================

/// Fixed top zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Page title
    pub title: String,
    /// Line under the title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Progress indicator
    pub progress: ProgressView,
}

/// Tone of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Neutral information
    Info,
    /// Something worked
    Success,
    /// Something needs fixing
    Error,
}

/// One piece of scrollable content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    /// Section heading
    Heading {
        /// Heading text
        text: String,
    },
    /// Paragraph
    Text {
        /// Body text
        text: String,
    },
    /// Highlighted message
    Notice {
        /// Tone
        tone: Tone,
        /// Message
        message: String,
    },
    /// Dropdown
    Select {
        /// State field it edits
        field: &'static str,
        /// Label
        label: String,
        /// Options
        options: Vec<SelectOption>,
        /// Selected value
        selected: Option<String>,
    },
    /// Card group with one selectable card
    Cards {
        /// State field it edits
        field: &'static str,
        /// Options
        options: Vec<SelectOption>,
        /// Selected value
        selected: Option<String>,
    },
    /// Single-line input
    Input {
        /// State field it edits
        field: &'static str,
        /// Label
        label: String,
        /// Current value
        value: String,
    },
    /// Checkbox or switch
    Toggle {
        /// State field it edits
        field: &'static str,
        /// Label
        label: String,
        /// Whether it is on
        checked: bool,
    },
    /// File picker target
    DropZone {
        /// Accepted extensions
        accepted: Vec<String>,
        /// Render as a single row
        compact: bool,
    },
    /// Uploaded documents
    FileList {
        /// Files in upload order
        files: Vec<UploadedFile>,
    },
    /// Hand-off to a phone
    MobileHandoff {
        /// Whether the screen is still waiting for the phone
        waiting: bool,
    },
    /// Read-only label/value pairs
    Summary {
        /// Rows
        rows: Vec<(String, String)>,
    },
    /// Busy indicator
    Spinner {
        /// Message under the spinner
        message: String,
    },
    /// Side-by-side content
    Columns {
        /// Left column
        left: Vec<Block>,
        /// Right column
        right: Vec<Block>,
    },
}

impl Block {
    /// A heading block
    pub fn heading(text: impl Into<String>) -> Self {
        Block::Heading { text: text.into() }
    }

    /// A paragraph block
    pub fn text(text: impl Into<String>) -> Self {
        Block::Text { text: text.into() }
    }

    /// A notice block
    pub fn notice(tone: Tone, message: impl Into<String>) -> Self {
        Block::Notice { tone, message: message.into() }
    }

    /// An input block
    pub fn input(field: &'static str, label: impl Into<String>, value: &str) -> Self {
        Block::Input { field, label: label.into(), value: value.to_string() }
    }

    /// A toggle block
    pub fn toggle(field: &'static str, label: impl Into<String>, checked: bool) -> Self {
        Block::Toggle { field, label: label.into(), checked }
    }
}

/// Rendered output of a step screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepLayout {
    /// Fixed top zone
    pub header: Header,
    /// Scrollable middle zone
    pub content: Vec<Block>,
    /// Fixed bottom zone
    pub footer: Vec<Button>,
}

impl StepLayout {
    /// Footer button firing `action`, if present
    pub fn button(&self, action: &str) -> Option<&Button> {
        self.footer.iter().find(|b| b.on_press == action)
    }
}

/// A screen rendered for one flow step
pub trait StepScreen {
    /// Step this screen renders
    fn step_id(&self) -> &'static str;

    /// Render the three layout zones for `state`
    fn render(&self, state: &ReimbursementState) -> StepLayout;
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Header with the progress indicator for `step_id` in the active flow
pub fn header(
    state: &ReimbursementState,
    step_id: &str,
    title: impl Into<String>,
    subtitle: Option<&str>,
) -> Header {
    let flow = get_flow_by_id(Some(&state.flow_id));
    let progress_steps = flow.get_progress_steps(state);

    // Steps hidden from progress (the analysis wait-state) show the step before them.
    let anchor = match flow.index_of(step_id) {
        Some(index) if !progress_steps.iter().any(|s| s.id == step_id) => flow.steps[..index]
            .iter()
            .rev()
            .find(|s| progress_steps.iter().any(|p| p.id == s.id))
            .map_or(step_id, |s| s.id),
        _ => step_id,
    };
    let skipped = skipped_steps(state, anchor, flow.index_of(anchor));

    Header {
        title: title.into(),
        subtitle: subtitle.map(str::to_string),
        progress: render_progress(
            state.layout_modes.progress_mode,
            anchor,
            &progress_steps,
            &skipped,
        ),
    }
}

/// Steps the user bypassed: documents, when moving on without uploading
fn skipped_steps(
    state: &ReimbursementState,
    current: &str,
    current_index: Option<usize>,
) -> Vec<&'static str> {
    let flow = get_flow_by_id(Some(&state.flow_id));
    let past_docs = match (flow.index_of(steps::DOCS), current_index) {
        (Some(docs), Some(here)) => here > docs,
        _ => false,
    };
    if past_docs && current != steps::DOCS && state.uploads.is_empty() {
        vec![steps::DOCS]
    } else {
        Vec::new()
    }
}

/// Back button, when the flow has a step before `step_id`
fn back_button(state: &ReimbursementState, step_id: &str) -> Option<Button> {
    get_flow_by_id(Some(&state.flow_id))
        .get_back(state, step_id)
        .map(|_| Button::secondary("Back", "back"))
}

/// Display value for an optional text field
fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::{MVP_LINEAR_V1, VISION_LINEAR_V1};
    use crate::progress::StepStatus;
    use flow_state::ProgressMode;

    #[test]
    fn test_header_progress_follows_mode() {
        let mut state = ReimbursementState::default();
        state.layout_modes.progress_mode = ProgressMode::Implicit;

        let h = header(&state, steps::DOCS, "Upload", None);
        assert_eq!(h.progress.caption().as_deref(), Some("Step 2 of 4"));

        state.layout_modes.progress_mode = ProgressMode::None;
        assert_eq!(header(&state, steps::DOCS, "Upload", None).progress, ProgressView::Hidden);
    }

    #[test]
    fn test_docs_marked_skipped_without_uploads() {
        let state = ReimbursementState {
            flow_id: MVP_LINEAR_V1.to_string(),
            ..Default::default()
        };
        let h = header(&state, steps::REVIEW, "Review", None);
        let ProgressView::Stepper { items } = h.progress else {
            panic!("expected stepper");
        };
        assert_eq!(items[1].status, StepStatus::Skipped);
        assert_eq!(items[2].status, StepStatus::Current);
    }

    #[test]
    fn test_analysis_page_uses_docs_position() {
        let state = ReimbursementState {
            flow_id: VISION_LINEAR_V1.to_string(),
            uploads: vec![UploadedFile::completed("r.pdf", 10)],
            ..Default::default()
        };
        let h = header(&state, steps::ANALYZE, "Analyzing", None);
        let ProgressView::Stepper { items } = h.progress else {
            panic!("expected stepper");
        };
        assert_eq!(items.len(), 4);
        assert_eq!(items[1].status, StepStatus::Current);
        assert!(items.iter().all(|i| i.status != StepStatus::Skipped));
    }

    #[test]
    fn test_block_serialization_tag() {
        let json = serde_json::to_value(Block::toggle("didDrive", "I drove", true)).unwrap();
        assert_eq!(json["type"], "toggle");
        assert_eq!(json["checked"], true);
    }
}
