//! Mode Sync Integration Tests
//!
//! URL, store and session selection staying consistent across mounts,
//! presets and flow switches.

use flow_state::{
    AiCommunication, EntryMode, FlowProvider, LayoutModes, PlanSelectionMode, ProgressMode,
    ReviewLayout, StatePatch, UploadLayout, Variant, WireValue, DEFAULT_FLOW_ID,
};
use flow_storage::{PersistedSelection, SessionStore};
use flow_ui::flows::{VISION_ALT_STEPS_V1, VISION_WIZARD_V1};
use flow_ui::{
    find_preset, presets, EntryPresentation, FlowConfig, History, Location, ModeChange,
    ModeSelector, Navigator, Route, ZonePlacement,
};

fn selector_with(session: &SessionStore) -> (FlowProvider, ModeSelector) {
    let provider = FlowProvider::mount();
    let selector = ModeSelector::new(&provider.context(), session.clone(), FlowConfig::default());
    (provider, selector)
}

/// Every preset lands completely, with nothing stale left behind
#[test]
fn test_every_preset_applies_completely() {
    let session = SessionStore::in_memory().unwrap();

    for preset in presets() {
        let (provider, selector) = selector_with(&session);
        // start from a configuration that differs in every field
        provider.store().update_state(
            StatePatch::new()
                .variant(Variant::Vision)
                .flow_id(VISION_ALT_STEPS_V1)
                .layout_modes(LayoutModes {
                    entry_mode: EntryMode::Drawer,
                    plan_selection_mode: PlanSelectionMode::Cards,
                    progress_mode: ProgressMode::Implicit,
                    upload_layout: UploadLayout::Split,
                    review_layout: ReviewLayout::Split,
                    ai_communication: AiCommunication::Detailed,
                }),
        );
        let mut history = History::at("/reimburse/docs");

        selector.apply_preset(&mut history, preset);

        let state = provider.store().snapshot();
        assert_eq!(state.variant, preset.variant, "{}", preset.id);
        assert_eq!(state.layout_modes, preset.layout_modes, "{}", preset.id);
        match preset.flow_id {
            Some(flow_id) => assert_eq!(state.flow_id, flow_id, "{}", preset.id),
            None => assert_eq!(state.flow_id, VISION_ALT_STEPS_V1, "{}", preset.id),
        }
        assert_eq!(selector.active_preset().map(|p| p.id), Some(preset.id));

        let url = history.location();
        for (param, value) in preset.layout_modes.to_pairs() {
            assert_eq!(url.param(param), Some(value), "{} {}", preset.id, param);
        }
        assert_eq!(url.param("variant"), Some(preset.variant.as_str()));
    }
}

/// Preset changes are never observable half-applied
#[tokio::test]
async fn test_preset_is_one_notification() {
    let session = SessionStore::in_memory().unwrap();
    let (provider, selector) = selector_with(&session);
    let mut rx = provider.store().subscribe();
    let mut history = History::at("/reimburse");

    selector.apply_preset(&mut history, find_preset("vision-drawer").unwrap());

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), 1);
    assert!(!rx.has_changed().unwrap());
}

/// Tampered query strings leave state as it was
#[test]
fn test_tampered_url_is_rejected() {
    let session = SessionStore::in_memory().unwrap();
    let (provider, selector) = selector_with(&session);
    let before = provider.store().snapshot();

    for url in [
        "/reimburse?entryMode=bogus",
        "/reimburse?entryMode=MODAL&variant=beta",
        "/reimburse?flowId=%3Cscript%3E&progressMode=",
        "/reimburse?aiCommunication=prominent%00",
    ] {
        assert_eq!(selector.sync_from_location(&Location::parse(url)), 0, "{url}");
    }

    assert_eq!(provider.store().snapshot(), before);
    assert_eq!(provider.store().read(|s| s.layout_modes.entry_mode), EntryMode::Fullpage);
}

/// A single-field update leaves everything else untouched
#[test]
fn test_shallow_merge_keeps_siblings() {
    let session = SessionStore::in_memory().unwrap();
    let (provider, selector) = selector_with(&session);
    selector.sync_from_location(&Location::parse(
        "/reimburse?entryMode=drawer&reviewLayout=summary&variant=vision",
    ));
    let before = provider.store().snapshot();

    provider.store().update_state(StatePatch::new().amount("50"));

    let mut expected = before;
    expected.amount = "50".to_string();
    assert_eq!(provider.store().snapshot(), expected);
}

/// Choices survive a remount in the same session, and the URL still wins
#[test]
fn test_selection_survives_remount() {
    let session = SessionStore::in_memory().unwrap();
    {
        let (_provider, selector) = selector_with(&session);
        let mut history = History::at("/reimburse");
        selector.apply_preset(&mut history, find_preset("mvp-modal").unwrap());
        selector.set_mode(&mut history, ModeChange::Upload(UploadLayout::Split));
    }

    let saved = PersistedSelection::load(&session, &FlowConfig::default().selection_key)
        .unwrap()
        .unwrap();
    assert_eq!(saved.layout_modes.get("uploadLayout").map(String::as_str), Some("split"));
    assert_eq!(saved.preset_id, None);

    let (provider, selector) = selector_with(&session);
    selector.mount(&History::at("/reimburse?reviewLayout=form"));

    let modes = provider.store().read(|s| s.layout_modes);
    assert_eq!(modes.entry_mode, EntryMode::Modal);
    assert_eq!(modes.upload_layout, UploadLayout::Split);
    assert_eq!(modes.review_layout, ReviewLayout::Form);
    assert_eq!(provider.store().read(|s| s.flow_id.clone()), DEFAULT_FLOW_ID);
}

/// Switching to the wizard moves to its page and picks a new container
#[test]
fn test_switch_to_wizard_preset() {
    let session = SessionStore::in_memory().unwrap();
    let (provider, selector) = selector_with(&session);
    let mut history = History::at("/reimburse/review?entryMode=fullpage");

    selector.apply_preset(&mut history, find_preset("vision-wizard").unwrap());

    let url = history.location();
    assert_eq!(url.route, Route::ReimburseWizard);
    assert_eq!(url.param("flowId"), Some(VISION_WIZARD_V1));
    assert_eq!(url.param("entryMode"), Some("modal"));
    assert_eq!(history.depth(), 2);

    let entry_mode = provider.store().read(|s| s.layout_modes.entry_mode);
    let presentation = EntryPresentation::for_mode(entry_mode, &FlowConfig::default());
    assert_eq!(presentation.placement(), ZonePlacement::Fixed);
}

/// The upload-first flow is reachable by URL even though no preset uses it
#[test]
fn test_alt_steps_flow_reachable_by_url() {
    assert!(presets().iter().all(|p| p.flow_id != Some(VISION_ALT_STEPS_V1)));

    let session = SessionStore::in_memory().unwrap();
    let (provider, selector) = selector_with(&session);
    selector.mount(&History::at("/reimburse/docs?flowId=vision-alt-steps-v1"));

    assert_eq!(provider.store().read(|s| s.flow_id.clone()), VISION_ALT_STEPS_V1);
}
