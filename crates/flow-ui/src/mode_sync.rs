//! Mode and variant synchronization (dev tool)
//!
//! Three places hold the prototype's configuration: URL query parameters,
//! the flow store, and the session store. URL and session values are
//! untrusted overlays: each field is parsed against its enumeration and
//! only accepted values reach the store, in one merge. User-driven changes
//! go the other way: store first, then the URL (replacing the current
//! history entry), then the session store.

use flow_state::{
    AiCommunication, EntryMode, FlowContext, FlowStore, LayoutField, LayoutModesPatch,
    PlanSelectionMode, ProgressMode, ReimbursementState, ReviewLayout, StatePatch, UploadLayout,
    Variant, WireValue,
};
use flow_storage::{PersistedSelection, SessionStore};

use crate::config::FlowConfig;
use crate::flows::{get_flow_by_id, is_registered, FlowDefinition, FlowMode};
use crate::navigation::{HistoryMode, Location, Navigator, Route};
use crate::presets::{active_preset, VariationPreset};

/// Query parameter carrying the variant
pub const VARIANT_PARAM: &str = "variant";
/// Query parameter carrying the flow id
pub const FLOW_ID_PARAM: &str = "flowId";

// =============================================================================
// Mode Changes
// =============================================================================

/// A single user-driven setting change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    /// Entry container
    Entry(EntryMode),
    /// Plan selection presentation
    PlanSelection(PlanSelectionMode),
    /// Progress indicator style
    Progress(ProgressMode),
    /// Upload layout
    Upload(UploadLayout),
    /// Review layout
    Review(ReviewLayout),
    /// Analysis messaging
    AiCommunication(AiCommunication),
    /// Product variant
    Variant(Variant),
}

impl ModeChange {
    /// Query parameter this change is mirrored to
    pub fn param(&self) -> &'static str {
        match self {
            ModeChange::Entry(_) => LayoutField::EntryMode.param(),
            ModeChange::PlanSelection(_) => LayoutField::PlanSelectionMode.param(),
            ModeChange::Progress(_) => LayoutField::ProgressMode.param(),
            ModeChange::Upload(_) => LayoutField::UploadLayout.param(),
            ModeChange::Review(_) => LayoutField::ReviewLayout.param(),
            ModeChange::AiCommunication(_) => LayoutField::AiCommunication.param(),
            ModeChange::Variant(_) => VARIANT_PARAM,
        }
    }

    /// Wire value of the change
    pub fn value(&self) -> &'static str {
        match self {
            ModeChange::Entry(v) => v.as_str(),
            ModeChange::PlanSelection(v) => v.as_str(),
            ModeChange::Progress(v) => v.as_str(),
            ModeChange::Upload(v) => v.as_str(),
            ModeChange::Review(v) => v.as_str(),
            ModeChange::AiCommunication(v) => v.as_str(),
            ModeChange::Variant(v) => v.as_str(),
        }
    }

    fn apply(self, state: &mut StatePatch, layout: &mut LayoutModesPatch) {
        match self {
            ModeChange::Entry(v) => layout.entry_mode = Some(v),
            ModeChange::PlanSelection(v) => layout.plan_selection_mode = Some(v),
            ModeChange::Progress(v) => layout.progress_mode = Some(v),
            ModeChange::Upload(v) => layout.upload_layout = Some(v),
            ModeChange::Review(v) => layout.review_layout = Some(v),
            ModeChange::AiCommunication(v) => layout.ai_communication = Some(v),
            ModeChange::Variant(v) => state.variant = Some(v),
        }
    }

    /// Parse one `(param, raw value)` pair; `None` for unknown params or values
    pub fn parse(param: &str, raw: &str) -> Option<Self> {
        match param {
            "entryMode" => EntryMode::parse(raw).map(ModeChange::Entry),
            "planSelectionMode" => PlanSelectionMode::parse(raw).map(ModeChange::PlanSelection),
            "progressMode" => ProgressMode::parse(raw).map(ModeChange::Progress),
            "uploadLayout" => UploadLayout::parse(raw).map(ModeChange::Upload),
            "reviewLayout" => ReviewLayout::parse(raw).map(ModeChange::Review),
            "aiCommunication" => AiCommunication::parse(raw).map(ModeChange::AiCommunication),
            VARIANT_PARAM => Variant::parse(raw).map(ModeChange::Variant),
            _ => None,
        }
    }
}

// =============================================================================
// Overlays
// =============================================================================

/// Validated subset of an untrusted source of settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Accepted top-level fields
    pub state: StatePatch,
    /// Accepted layout fields
    pub layout: LayoutModesPatch,
    /// Parameters that were present and valid
    pub accepted: Vec<&'static str>,
    /// Parameters that were present and rejected
    pub rejected: Vec<&'static str>,
}

impl Overlay {
    /// Every parameter the overlay reads
    pub const PARAMS: [&'static str; 8] = [
        "entryMode",
        "planSelectionMode",
        "progressMode",
        "uploadLayout",
        "reviewLayout",
        "aiCommunication",
        VARIANT_PARAM,
        FLOW_ID_PARAM,
    ];

    /// Validate values found through `lookup`
    pub fn from_lookup<'a>(lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        let mut overlay = Overlay::default();

        for param in Self::PARAMS {
            let Some(raw) = lookup(param) else {
                continue;
            };

            if param == FLOW_ID_PARAM {
                if is_registered(raw) {
                    overlay.state.flow_id = Some(raw.to_string());
                    overlay.accepted.push(param);
                } else {
                    overlay.rejected.push(param);
                }
                continue;
            }

            match ModeChange::parse(param, raw) {
                Some(change) => {
                    change.apply(&mut overlay.state, &mut overlay.layout);
                    overlay.accepted.push(param);
                }
                None => overlay.rejected.push(param),
            }
        }

        overlay
    }

    /// Validate a location's query string
    pub fn from_location(location: &Location) -> Self {
        Self::from_lookup(|key| location.param(key))
    }

    /// Validate a persisted selection
    pub fn from_selection(selection: &PersistedSelection) -> Self {
        Self::from_lookup(|key| match key {
            VARIANT_PARAM => selection.variant.as_deref(),
            FLOW_ID_PARAM => selection.flow_id.as_deref(),
            other => selection.layout_modes.get(other).map(String::as_str),
        })
    }

    /// Check if nothing was accepted
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

// =============================================================================
// Mode Selector
// =============================================================================

/// One selector row of the dev tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeControl {
    /// Query parameter
    pub param: &'static str,
    /// Allowed values
    pub options: Vec<&'static str>,
    /// Currently selected value
    pub selected: String,
}

/// Keeps URL, store and session selection consistent
pub struct ModeSelector {
    store: FlowStore,
    session: SessionStore,
    config: FlowConfig,
}

impl ModeSelector {
    /// Create a selector for the flow rendered under `ctx`
    ///
    /// # Panics
    ///
    /// Panics when `ctx` has no provider.
    pub fn new(ctx: &FlowContext, session: SessionStore, config: FlowConfig) -> Self {
        Self { store: ctx.store().clone(), session, config }
    }

    /// Restore the session selection, then let the URL override it
    pub fn mount<N: Navigator + ?Sized>(&self, nav: &N) {
        self.restore_from_session();
        self.sync_from_location(&nav.location());
    }

    /// Apply the persisted selection, if any; returns whether anything changed
    pub fn restore_from_session(&self) -> bool {
        let selection = match PersistedSelection::load(&self.session, &self.config.selection_key) {
            Ok(Some(selection)) => selection,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Failed to read persisted selection: {}", e);
                return false;
            }
        };
        self.apply_overlay(Overlay::from_selection(&selection), "session")
    }

    /// Apply valid query parameters of `location` (on mount and on every
    /// URL change); returns how many were accepted
    pub fn sync_from_location(&self, location: &Location) -> usize {
        let overlay = Overlay::from_location(location);
        let accepted = overlay.accepted.len();
        self.apply_overlay(overlay, "url");
        accepted
    }

    fn apply_overlay(&self, overlay: Overlay, source: &str) -> bool {
        if !overlay.rejected.is_empty() {
            tracing::debug!(source, rejected = ?overlay.rejected, "ignoring invalid mode values");
        }
        if overlay.is_empty() {
            return false;
        }
        tracing::debug!(source, accepted = ?overlay.accepted, "applying mode values");
        self.store.update_all(overlay.state, overlay.layout);
        true
    }

    /// Change one mode
    pub fn set_mode<N: Navigator + ?Sized>(&self, nav: &mut N, change: ModeChange) {
        let mut state = StatePatch::new();
        let mut layout = LayoutModesPatch::default();
        change.apply(&mut state, &mut layout);
        self.store.update_all(state, layout);

        let to = nav.location().with_param(change.param(), change.value());
        nav.navigate(to, HistoryMode::Replace);
        self.persist(None);
    }

    /// Switch flows; unknown ids resolve to the default flow
    pub fn set_flow<N: Navigator + ?Sized>(&self, nav: &mut N, flow_id: &str) {
        let flow = get_flow_by_id(Some(flow_id));
        tracing::info!(flow = flow.id, "switching flow");
        self.store.update_state(StatePatch::new().flow_id(flow.id));

        let here = nav.location();
        let to = here.clone().with_param(FLOW_ID_PARAM, flow.id);
        self.navigate_for_flow(nav, flow, here.route, to);
        self.persist(None);
    }

    /// Apply a preset atomically and mirror it into the URL in one navigation
    pub fn apply_preset<N: Navigator + ?Sized>(&self, nav: &mut N, preset: &VariationPreset) {
        tracing::info!(preset = preset.id, "applying preset");
        self.store.update_state(preset.to_patch());

        let here = nav.location();
        let mut to = here.clone().with_param(VARIANT_PARAM, preset.variant.as_str());
        for (param, value) in preset.layout_modes.to_pairs() {
            to = to.with_param(param, value);
        }

        match preset.flow_id {
            Some(flow_id) => {
                let flow = get_flow_by_id(Some(flow_id));
                to = to.with_param(FLOW_ID_PARAM, flow.id);
                self.navigate_for_flow(nav, flow, here.route, to);
            }
            None => nav.navigate(to, HistoryMode::Replace),
        }
        self.persist(Some(preset.id));
    }

    fn navigate_for_flow<N: Navigator + ?Sized>(
        &self,
        nav: &mut N,
        flow: &FlowDefinition,
        current: Route,
        to: Location,
    ) {
        match flow_route_target(flow, current) {
            Some(route) => {
                tracing::debug!(flow = flow.id, to = route.to_path(), "flow owns another route");
                nav.navigate(to.with_route(route), HistoryMode::Push);
            }
            None => nav.navigate(to, HistoryMode::Replace),
        }
    }

    /// The preset the current state matches
    pub fn active_preset(&self) -> Option<&'static VariationPreset> {
        self.store.read(active_preset)
    }

    /// Selector rows for every setting the tool controls
    pub fn controls(&self) -> Vec<ModeControl> {
        self.store.read(|state| {
            let mut rows: Vec<ModeControl> = LayoutField::ALL
                .iter()
                .map(|field| ModeControl {
                    param: field.param(),
                    options: field.allowed_values(),
                    selected: state.layout_modes.get(*field).to_string(),
                })
                .collect();
            rows.push(ModeControl {
                param: VARIANT_PARAM,
                options: Variant::ALL.iter().map(|v| v.as_str()).collect(),
                selected: state.variant.as_str().to_string(),
            });
            rows.push(ModeControl {
                param: FLOW_ID_PARAM,
                options: crate::flows::registry().iter().map(|f| f.id).collect(),
                selected: get_flow_by_id(Some(&state.flow_id)).id.to_string(),
            });
            rows
        })
    }

    fn persist(&self, preset_id: Option<&str>) {
        let selection = self.store.read(|state| selection_of(state, preset_id));
        if let Err(e) = selection.save(&self.session, &self.config.selection_key) {
            tracing::warn!("Failed to persist mode selection: {}", e);
        }
    }
}

/// Route a flow switch must move to, if the current one is not the flow's
pub fn flow_route_target(flow: &FlowDefinition, current: Route) -> Option<Route> {
    match flow.mode {
        FlowMode::Wizard if current != flow.entry_route => Some(flow.entry_route),
        FlowMode::Routes if !flow.owns_route(current) => Some(flow.entry_route),
        _ => None,
    }
}

fn selection_of(state: &ReimbursementState, preset_id: Option<&str>) -> PersistedSelection {
    PersistedSelection {
        variant: Some(state.variant.as_str().to_string()),
        flow_id: Some(state.flow_id.clone()),
        layout_modes: state
            .layout_modes
            .to_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        preset_id: preset_id.map(str::to_string),
    }
}
