//! Shared flow state store
//!
//! [`FlowStore`] is a dumb merge-and-notify container: it performs no
//! validation, callers are responsible for the values they write. Every
//! screen of one flow session must see the same store, so screens receive
//! it through a [`FlowContext`] handed out by the [`FlowProvider`] that
//! owns it.

use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::model::{
    AiCommunication, EntryMode, ExtractedData, LayoutModes, PlanSelectionMode, ProgressMode,
    ReimbursementState, ReviewLayout, UploadLayout, UploadedFile, Variant,
};

/// Store access errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A screen asked for the store without being mounted under a provider
    #[error("flow store accessed outside of a FlowProvider")]
    MissingProvider,
}

/// Result type for store access
pub type Result<T> = std::result::Result<T, StoreError>;

// =============================================================================
// Patches
// =============================================================================

/// Partial update of top-level state fields
///
/// Applying a patch is a single-level merge: `layout_modes`, when set,
/// replaces the whole group. Use [`LayoutModesPatch`] to change one mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    /// Benefit account
    pub account: Option<String>,
    /// Expense category
    pub category: Option<String>,
    /// Service provider
    pub provider: Option<String>,
    /// Date of service
    pub service_date: Option<String>,
    /// Amount requested
    pub amount: Option<String>,
    /// Payment method
    pub payment_method: Option<String>,
    /// Uploaded documents
    pub uploads: Option<Vec<UploadedFile>>,
    /// Auto-analysis toggle
    pub auto_analyze: Option<bool>,
    /// Analysis output
    pub extracted: Option<ExtractedData>,
    /// Payout recipient
    pub recipient: Option<String>,
    /// Mileage flag
    pub did_drive: Option<bool>,
    /// Terms accepted
    pub accepted_terms: Option<bool>,
    /// Product variant
    pub variant: Option<Variant>,
    /// Active flow identifier
    pub flow_id: Option<String>,
    /// Whole layout mode group
    pub layout_modes: Option<LayoutModes>,
}

impl StatePatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the account
    pub fn account(mut self, value: impl Into<String>) -> Self {
        self.account = Some(value.into());
        self
    }

    /// Set the category
    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.category = Some(value.into());
        self
    }

    /// Set the provider
    pub fn provider(mut self, value: impl Into<String>) -> Self {
        self.provider = Some(value.into());
        self
    }

    /// Set the service date
    pub fn service_date(mut self, value: impl Into<String>) -> Self {
        self.service_date = Some(value.into());
        self
    }

    /// Set the amount
    pub fn amount(mut self, value: impl Into<String>) -> Self {
        self.amount = Some(value.into());
        self
    }

    /// Set the payment method
    pub fn payment_method(mut self, value: impl Into<String>) -> Self {
        self.payment_method = Some(value.into());
        self
    }

    /// Replace the upload list
    pub fn uploads(mut self, value: Vec<UploadedFile>) -> Self {
        self.uploads = Some(value);
        self
    }

    /// Set the auto-analysis toggle
    pub fn auto_analyze(mut self, value: bool) -> Self {
        self.auto_analyze = Some(value);
        self
    }

    /// Replace the analysis output
    pub fn extracted(mut self, value: ExtractedData) -> Self {
        self.extracted = Some(value);
        self
    }

    /// Set the recipient
    pub fn recipient(mut self, value: impl Into<String>) -> Self {
        self.recipient = Some(value.into());
        self
    }

    /// Set the mileage flag
    pub fn did_drive(mut self, value: bool) -> Self {
        self.did_drive = Some(value);
        self
    }

    /// Set terms acceptance
    pub fn accepted_terms(mut self, value: bool) -> Self {
        self.accepted_terms = Some(value);
        self
    }

    /// Set the variant
    pub fn variant(mut self, value: Variant) -> Self {
        self.variant = Some(value);
        self
    }

    /// Set the flow identifier
    pub fn flow_id(mut self, value: impl Into<String>) -> Self {
        self.flow_id = Some(value.into());
        self
    }

    /// Replace the whole layout mode group
    pub fn layout_modes(mut self, value: LayoutModes) -> Self {
        self.layout_modes = Some(value);
        self
    }

    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `state`
    pub fn apply_to(self, state: &mut ReimbursementState) {
        fn merge<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        merge(&mut state.account, self.account);
        merge(&mut state.category, self.category);
        merge(&mut state.provider, self.provider);
        merge(&mut state.service_date, self.service_date);
        merge(&mut state.amount, self.amount);
        merge(&mut state.payment_method, self.payment_method);
        merge(&mut state.uploads, self.uploads);
        merge(&mut state.auto_analyze, self.auto_analyze);
        merge(&mut state.extracted, self.extracted);
        merge(&mut state.recipient, self.recipient);
        merge(&mut state.did_drive, self.did_drive);
        merge(&mut state.accepted_terms, self.accepted_terms);
        merge(&mut state.variant, self.variant);
        merge(&mut state.flow_id, self.flow_id);
        merge(&mut state.layout_modes, self.layout_modes);
    }
}

/// Partial update of the layout mode group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutModesPatch {
    /// Entry container
    pub entry_mode: Option<EntryMode>,
    /// Plan selection presentation
    pub plan_selection_mode: Option<PlanSelectionMode>,
    /// Progress indicator style
    pub progress_mode: Option<ProgressMode>,
    /// Upload layout
    pub upload_layout: Option<UploadLayout>,
    /// Review layout
    pub review_layout: Option<ReviewLayout>,
    /// Analysis messaging
    pub ai_communication: Option<AiCommunication>,
}

impl LayoutModesPatch {
    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `modes`
    pub fn apply_to(self, modes: &mut LayoutModes) {
        if let Some(v) = self.entry_mode {
            modes.entry_mode = v;
        }
        if let Some(v) = self.plan_selection_mode {
            modes.plan_selection_mode = v;
        }
        if let Some(v) = self.progress_mode {
            modes.progress_mode = v;
        }
        if let Some(v) = self.upload_layout {
            modes.upload_layout = v;
        }
        if let Some(v) = self.review_layout {
            modes.review_layout = v;
        }
        if let Some(v) = self.ai_communication {
            modes.ai_communication = v;
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Merge-and-notify store for one flow session
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct FlowStore {
    state: Arc<RwLock<ReimbursementState>>,
    initial: Arc<ReimbursementState>,
    revision_tx: Arc<watch::Sender<u64>>,
}

impl FlowStore {
    /// Create a store seeded with `initial`, which is also what reset restores
    pub fn new(initial: ReimbursementState) -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(initial.clone())),
            initial: Arc::new(initial),
            revision_tx: Arc::new(revision_tx),
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ReimbursementState {
        self.state.read().clone()
    }

    /// Read the state without copying it
    pub fn read<R>(&self, f: impl FnOnce(&ReimbursementState) -> R) -> R {
        f(&self.state.read())
    }

    /// Shallow-merge `patch` into the state
    pub fn update_state(&self, patch: StatePatch) {
        if patch.is_empty() {
            return;
        }
        patch.apply_to(&mut self.state.write());
        self.notify();
    }

    /// Merge `patch` into the layout mode group only
    pub fn update_layout_modes(&self, patch: LayoutModesPatch) {
        if patch.is_empty() {
            return;
        }
        patch.apply_to(&mut self.state.write().layout_modes);
        self.notify();
    }

    /// Apply both patches under one write lock and one notification
    pub fn update_all(&self, patch: StatePatch, layout: LayoutModesPatch) {
        {
            let mut state = self.state.write();
            patch.apply_to(&mut state);
            layout.apply_to(&mut state.layout_modes);
        }
        self.notify();
    }

    /// Restore the initial snapshot
    pub fn reset_state(&self) {
        *self.state.write() = (*self.initial).clone();
        self.notify();
    }

    /// Clear the claim but keep the variant, flow and layout modes
    ///
    /// Those three mirror the URL and the session selection, so a finished
    /// claim must not drift from either.
    pub fn reset_claim(&self) {
        {
            let mut state = self.state.write();
            let mut fresh = (*self.initial).clone();
            fresh.variant = state.variant;
            fresh.flow_id = std::mem::take(&mut state.flow_id);
            fresh.layout_modes = state.layout_modes;
            *state = fresh;
        }
        self.notify();
    }

    /// Subscribe to change notifications (the value is a revision counter)
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    /// Number of changes applied so far
    pub fn revision(&self) -> u64 {
        *self.revision_tx.borrow()
    }

    fn notify(&self) {
        self.revision_tx.send_modify(|rev| *rev += 1);
        tracing::trace!(revision = self.revision(), "flow state changed");
    }
}

impl Default for FlowStore {
    fn default() -> Self {
        Self::new(ReimbursementState::default())
    }
}

// =============================================================================
// Provider
// =============================================================================

/// Owner of the store for one flow session
pub struct FlowProvider {
    store: FlowStore,
}

impl FlowProvider {
    /// Mount a provider with default state
    pub fn mount() -> Self {
        Self::with_state(ReimbursementState::default())
    }

    /// Mount a provider with a custom initial state
    pub fn with_state(initial: ReimbursementState) -> Self {
        Self { store: FlowStore::new(initial) }
    }

    /// Context to hand to screens rendered under this provider
    pub fn context(&self) -> FlowContext {
        FlowContext { store: Some(self.store.clone()) }
    }

    /// The owned store
    pub fn store(&self) -> &FlowStore {
        &self.store
    }
}

/// What a screen receives from its host
#[derive(Clone)]
pub struct FlowContext {
    store: Option<FlowStore>,
}

impl FlowContext {
    /// A context with no provider above it
    pub fn detached() -> Self {
        Self { store: None }
    }

    /// The store, or an error when there is no provider
    pub fn try_store(&self) -> Result<&FlowStore> {
        self.store.as_ref().ok_or(StoreError::MissingProvider)
    }

    /// The store
    ///
    /// # Panics
    ///
    /// Panics when the context was not created by a [`FlowProvider`]. That
    /// is an integration bug and is never recovered from.
    pub fn store(&self) -> &FlowStore {
        match self.try_store() {
            Ok(store) => store,
            Err(err) => panic!("{err}: wrap the flow's screens in a FlowProvider"),
        }
    }
}
