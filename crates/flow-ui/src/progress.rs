//! Progress indicator
//!
//! A pure function of the progress mode, the current step and the step list.

use flow_state::ProgressMode;
use serde::Serialize;

use crate::flows::FlowStep;

/// Visual state of one step in the stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Before the current step
    Completed,
    /// The current step
    Current,
    /// After the current step
    Upcoming,
    /// Bypassed by the user's choices
    Skipped,
}

/// One stepper entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepperItem {
    /// Step id
    pub id: &'static str,
    /// Step label
    pub label: &'static str,
    /// One-based position
    pub position: usize,
    /// Visual state
    pub status: StepStatus,
}

/// What the progress indicator renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProgressView {
    /// Nothing
    Hidden,
    /// Current label and "step X of N"
    Implicit {
        /// Current step label
        label: &'static str,
        /// One-based position of the current step
        position: usize,
        /// Number of steps
        total: usize,
    },
    /// Full step list
    Stepper {
        /// Every step in order
        items: Vec<StepperItem>,
    },
}

impl ProgressView {
    /// "Step X of N" caption, when the view has one
    pub fn caption(&self) -> Option<String> {
        match self {
            ProgressView::Implicit { position, total, .. } => {
                Some(format!("Step {} of {}", position, total))
            }
            _ => None,
        }
    }
}

/// Render the progress indicator
///
/// An unknown `current` is treated as the first step. Steps listed in
/// `skipped` render as [`StepStatus::Skipped`] unless they are current.
pub fn render_progress(
    mode: ProgressMode,
    current: &str,
    steps: &[FlowStep],
    skipped: &[&str],
) -> ProgressView {
    if steps.is_empty() {
        return ProgressView::Hidden;
    }
    let current_index = steps.iter().position(|s| s.id == current).unwrap_or(0);

    match mode {
        ProgressMode::None => ProgressView::Hidden,
        ProgressMode::Implicit => ProgressView::Implicit {
            label: steps[current_index].label,
            position: current_index + 1,
            total: steps.len(),
        },
        ProgressMode::Stepper => ProgressView::Stepper {
            items: steps
                .iter()
                .enumerate()
                .map(|(index, step)| {
                    let status = if index == current_index {
                        StepStatus::Current
                    } else if skipped.contains(&step.id) {
                        StepStatus::Skipped
                    } else if index < current_index {
                        StepStatus::Completed
                    } else {
                        StepStatus::Upcoming
                    };
                    StepperItem { id: step.id, label: step.label, position: index + 1, status }
                })
                .collect(),
        },
    }
}
