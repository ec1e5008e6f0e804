//! Variation presets
//!
//! A preset bundles a variant, optionally a flow, and every layout mode so
//! that one action moves the prototype to a known configuration.

use flow_state::{
    AiCommunication, EntryMode, LayoutModes, PlanSelectionMode, ProgressMode, ReimbursementState,
    ReviewLayout, StatePatch, UploadLayout, Variant,
};

use crate::flows::{MVP_LINEAR_V1, VISION_LINEAR_V1, VISION_WIZARD_V1};

/// A named, immutable bundle of settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariationPreset {
    /// Stable identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Variant to switch to
    pub variant: Variant,
    /// Flow to switch to (None keeps the current flow)
    pub flow_id: Option<&'static str>,
    /// Every layout mode
    pub layout_modes: LayoutModes,
}

impl VariationPreset {
    /// Check if `state` is exactly this preset's configuration
    pub fn matches(&self, state: &ReimbursementState) -> bool {
        state.variant == self.variant
            && self.flow_id.map_or(true, |id| state.flow_id == id)
            && state.layout_modes == self.layout_modes
    }

    /// The store update that applies this preset in one merge
    pub fn to_patch(&self) -> StatePatch {
        let mut patch = StatePatch::new().variant(self.variant).layout_modes(self.layout_modes);
        if let Some(flow_id) = self.flow_id {
            patch = patch.flow_id(flow_id);
        }
        patch
    }
}

const fn modes(
    entry_mode: EntryMode,
    plan_selection_mode: PlanSelectionMode,
    progress_mode: ProgressMode,
    upload_layout: UploadLayout,
    review_layout: ReviewLayout,
    ai_communication: AiCommunication,
) -> LayoutModes {
    LayoutModes {
        entry_mode,
        plan_selection_mode,
        progress_mode,
        upload_layout,
        review_layout,
        ai_communication,
    }
}

static PRESETS: [VariationPreset; 6] = [
    VariationPreset {
        id: "mvp-default",
        name: "MVP",
        description: "Full-page linear flow, the shipping baseline",
        variant: Variant::Mvp,
        flow_id: Some(MVP_LINEAR_V1),
        layout_modes: modes(
            EntryMode::Fullpage,
            PlanSelectionMode::Dropdown,
            ProgressMode::Stepper,
            UploadLayout::Standard,
            ReviewLayout::Form,
            AiCommunication::Minimal,
        ),
    },
    VariationPreset {
        id: "mvp-modal",
        name: "MVP in a modal",
        description: "Same flow launched over the dashboard",
        variant: Variant::Mvp,
        flow_id: Some(MVP_LINEAR_V1),
        layout_modes: modes(
            EntryMode::Modal,
            PlanSelectionMode::Dropdown,
            ProgressMode::Implicit,
            UploadLayout::Compact,
            ReviewLayout::Summary,
            AiCommunication::Minimal,
        ),
    },
    VariationPreset {
        id: "mvp-keep-flow",
        name: "MVP look",
        description: "MVP layouts on whatever flow is active",
        variant: Variant::Mvp,
        flow_id: None,
        layout_modes: modes(
            EntryMode::Fullpage,
            PlanSelectionMode::Dropdown,
            ProgressMode::None,
            UploadLayout::Standard,
            ReviewLayout::Form,
            AiCommunication::Minimal,
        ),
    },
    VariationPreset {
        id: "vision-guided",
        name: "Vision guided",
        description: "Analysis-assisted flow with cards and a full stepper",
        variant: Variant::Vision,
        flow_id: Some(VISION_LINEAR_V1),
        layout_modes: modes(
            EntryMode::Fullpage,
            PlanSelectionMode::Cards,
            ProgressMode::Stepper,
            UploadLayout::Split,
            ReviewLayout::Split,
            AiCommunication::Detailed,
        ),
    },
    VariationPreset {
        id: "vision-drawer",
        name: "Vision drawer",
        description: "Analysis-assisted flow in a side drawer",
        variant: Variant::Vision,
        flow_id: Some(VISION_LINEAR_V1),
        layout_modes: modes(
            EntryMode::Drawer,
            PlanSelectionMode::Cards,
            ProgressMode::Implicit,
            UploadLayout::Compact,
            ReviewLayout::Summary,
            AiCommunication::Prominent,
        ),
    },
    VariationPreset {
        id: "vision-wizard",
        name: "Vision wizard",
        description: "Single-page wizard in a modal",
        variant: Variant::Vision,
        flow_id: Some(VISION_WIZARD_V1),
        layout_modes: modes(
            EntryMode::Modal,
            PlanSelectionMode::Cards,
            ProgressMode::Stepper,
            UploadLayout::Standard,
            ReviewLayout::Summary,
            AiCommunication::Prominent,
        ),
    },
];

/// All presets in display order
pub fn presets() -> &'static [VariationPreset] {
    &PRESETS
}

/// Look up a preset
pub fn find_preset(id: &str) -> Option<&'static VariationPreset> {
    PRESETS.iter().find(|p| p.id == id)
}

/// The preset `state` currently matches, if any
pub fn active_preset(state: &ReimbursementState) -> Option<&'static VariationPreset> {
    PRESETS.iter().find(|p| p.matches(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::is_registered;

    #[test]
    fn test_preset_ids_unique() {
        for (i, preset) in presets().iter().enumerate() {
            assert!(presets()[i + 1..].iter().all(|p| p.id != preset.id));
        }
    }

    #[test]
    fn test_preset_flows_are_registered() {
        for preset in presets() {
            if let Some(flow_id) = preset.flow_id {
                assert!(is_registered(flow_id), "{} names unknown flow {}", preset.id, flow_id);
            }
        }
    }

    #[test]
    fn test_default_state_matches_mvp_default() {
        let state = ReimbursementState::default();
        assert_eq!(active_preset(&state).map(|p| p.id), Some("mvp-default"));
    }

    #[test]
    fn test_patch_applies_every_field() {
        let preset = find_preset("vision-drawer").unwrap();
        let mut state = ReimbursementState::default();

        preset.to_patch().apply_to(&mut state);

        assert_eq!(state.variant, Variant::Vision);
        assert_eq!(state.flow_id, VISION_LINEAR_V1);
        assert_eq!(state.layout_modes, preset.layout_modes);
        assert!(preset.matches(&state));
    }

    #[test]
    fn test_preset_without_flow_keeps_flow() {
        let preset = find_preset("mvp-keep-flow").unwrap();
        let mut state =
            ReimbursementState { flow_id: VISION_WIZARD_V1.to_string(), ..Default::default() };

        preset.to_patch().apply_to(&mut state);

        assert_eq!(state.flow_id, VISION_WIZARD_V1);
        assert!(preset.matches(&state));
    }

    #[test]
    fn test_one_differing_mode_breaks_match() {
        let preset = find_preset("vision-guided").unwrap();
        let mut state = ReimbursementState::default();
        preset.to_patch().apply_to(&mut state);

        state.layout_modes.ai_communication = AiCommunication::Minimal;

        assert!(!preset.matches(&state));
        assert!(active_preset(&state).is_none());
    }
}
