//! Reimbursement flow data model
//!
//! All enumerated settings keep their wire spelling (URL query values and
//! persisted JSON) separate from their Rust representation: parsing is an
//! exact match against [`WireValue::ALL`], anything else is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default flow identifier used when a state carries no usable flow
pub const DEFAULT_FLOW_ID: &str = "mvp-linear-v1";

// =============================================================================
// Wire Values
// =============================================================================

/// A closed set of values with a fixed string representation
pub trait WireValue: Sized + Copy + 'static {
    /// Every allowed value, in display order
    const ALL: &'static [Self];

    /// Wire spelling of this value
    fn as_str(&self) -> &'static str;

    /// Parse a wire spelling, rejecting anything outside [`Self::ALL`]
    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == raw)
    }
}

/// Container hosting the flow's screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    /// Screens render directly in the page
    #[default]
    Fullpage,
    /// Screens render inside an overlay dialog
    Modal,
    /// Screens render inside a slide-in panel
    Drawer,
}

impl WireValue for EntryMode {
    const ALL: &'static [Self] = &[EntryMode::Fullpage, EntryMode::Modal, EntryMode::Drawer];

    fn as_str(&self) -> &'static str {
        match self {
            EntryMode::Fullpage => "fullpage",
            EntryMode::Modal => "modal",
            EntryMode::Drawer => "drawer",
        }
    }
}

/// How the account/plan choice is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSelectionMode {
    /// Single select control
    #[default]
    Dropdown,
    /// One card per plan
    Cards,
}

impl WireValue for PlanSelectionMode {
    const ALL: &'static [Self] = &[PlanSelectionMode::Dropdown, PlanSelectionMode::Cards];

    fn as_str(&self) -> &'static str {
        match self {
            PlanSelectionMode::Dropdown => "dropdown",
            PlanSelectionMode::Cards => "cards",
        }
    }
}

/// Progress indicator style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    /// No indicator
    None,
    /// Current label and "step X of N"
    Implicit,
    /// Full step list
    #[default]
    Stepper,
}

impl WireValue for ProgressMode {
    const ALL: &'static [Self] = &[ProgressMode::None, ProgressMode::Implicit, ProgressMode::Stepper];

    fn as_str(&self) -> &'static str {
        match self {
            ProgressMode::None => "none",
            ProgressMode::Implicit => "implicit",
            ProgressMode::Stepper => "stepper",
        }
    }
}

/// Document upload screen layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadLayout {
    /// Drop zone above the file list
    #[default]
    Standard,
    /// Inline picker and condensed list
    Compact,
    /// Drop zone beside the file list
    Split,
}

impl WireValue for UploadLayout {
    const ALL: &'static [Self] = &[UploadLayout::Standard, UploadLayout::Compact, UploadLayout::Split];

    fn as_str(&self) -> &'static str {
        match self {
            UploadLayout::Standard => "standard",
            UploadLayout::Compact => "compact",
            UploadLayout::Split => "split",
        }
    }
}

/// Review screen layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewLayout {
    /// Editable form
    #[default]
    Form,
    /// Read-only summary with edit links
    Summary,
    /// Document preview beside the form
    Split,
}

impl WireValue for ReviewLayout {
    const ALL: &'static [Self] = &[ReviewLayout::Form, ReviewLayout::Summary, ReviewLayout::Split];

    fn as_str(&self) -> &'static str {
        match self {
            ReviewLayout::Form => "form",
            ReviewLayout::Summary => "summary",
            ReviewLayout::Split => "split",
        }
    }
}

/// How loudly the analysis step talks about extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiCommunication {
    /// Spinner only
    #[default]
    Minimal,
    /// Spinner with a list of what is being read
    Detailed,
    /// Full-screen explanation with confidence hints
    Prominent,
}

impl WireValue for AiCommunication {
    const ALL: &'static [Self] =
        &[AiCommunication::Minimal, AiCommunication::Detailed, AiCommunication::Prominent];

    fn as_str(&self) -> &'static str {
        match self {
            AiCommunication::Minimal => "minimal",
            AiCommunication::Detailed => "detailed",
            AiCommunication::Prominent => "prominent",
        }
    }
}

/// Product variant being demonstrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Minimum viable product
    #[default]
    Mvp,
    /// Long-term vision
    Vision,
}

impl WireValue for Variant {
    const ALL: &'static [Self] = &[Variant::Mvp, Variant::Vision];

    fn as_str(&self) -> &'static str {
        match self {
            Variant::Mvp => "mvp",
            Variant::Vision => "vision",
        }
    }
}

// =============================================================================
// Layout Modes
// =============================================================================

/// Presentation configuration, independent of form data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutModes {
    /// Entry container
    pub entry_mode: EntryMode,
    /// Plan selection presentation
    pub plan_selection_mode: PlanSelectionMode,
    /// Progress indicator style
    pub progress_mode: ProgressMode,
    /// Upload screen layout
    pub upload_layout: UploadLayout,
    /// Review screen layout
    pub review_layout: ReviewLayout,
    /// Analysis messaging
    pub ai_communication: AiCommunication,
}

/// One layout mode field, named by its query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutField {
    /// `entryMode`
    EntryMode,
    /// `planSelectionMode`
    PlanSelectionMode,
    /// `progressMode`
    ProgressMode,
    /// `uploadLayout`
    UploadLayout,
    /// `reviewLayout`
    ReviewLayout,
    /// `aiCommunication`
    AiCommunication,
}

impl LayoutField {
    /// All layout fields
    pub const ALL: [LayoutField; 6] = [
        LayoutField::EntryMode,
        LayoutField::PlanSelectionMode,
        LayoutField::ProgressMode,
        LayoutField::UploadLayout,
        LayoutField::ReviewLayout,
        LayoutField::AiCommunication,
    ];

    /// Query parameter name
    pub fn param(&self) -> &'static str {
        match self {
            LayoutField::EntryMode => "entryMode",
            LayoutField::PlanSelectionMode => "planSelectionMode",
            LayoutField::ProgressMode => "progressMode",
            LayoutField::UploadLayout => "uploadLayout",
            LayoutField::ReviewLayout => "reviewLayout",
            LayoutField::AiCommunication => "aiCommunication",
        }
    }

    /// Allowed wire values for this field
    pub fn allowed_values(&self) -> Vec<&'static str> {
        fn names<T: WireValue>() -> Vec<&'static str> {
            T::ALL.iter().map(|v| v.as_str()).collect()
        }
        match self {
            LayoutField::EntryMode => names::<EntryMode>(),
            LayoutField::PlanSelectionMode => names::<PlanSelectionMode>(),
            LayoutField::ProgressMode => names::<ProgressMode>(),
            LayoutField::UploadLayout => names::<UploadLayout>(),
            LayoutField::ReviewLayout => names::<ReviewLayout>(),
            LayoutField::AiCommunication => names::<AiCommunication>(),
        }
    }
}

impl LayoutModes {
    /// Wire value of one field
    pub fn get(&self, field: LayoutField) -> &'static str {
        match field {
            LayoutField::EntryMode => self.entry_mode.as_str(),
            LayoutField::PlanSelectionMode => self.plan_selection_mode.as_str(),
            LayoutField::ProgressMode => self.progress_mode.as_str(),
            LayoutField::UploadLayout => self.upload_layout.as_str(),
            LayoutField::ReviewLayout => self.review_layout.as_str(),
            LayoutField::AiCommunication => self.ai_communication.as_str(),
        }
    }

    /// All fields as (query parameter, wire value) pairs
    pub fn to_pairs(&self) -> Vec<(&'static str, &'static str)> {
        LayoutField::ALL.iter().map(|f| (f.param(), self.get(*f))).collect()
    }
}

// =============================================================================
// Form Data
// =============================================================================

/// Upload progress of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Transfer in progress
    Uploading,
    /// Stored successfully
    #[default]
    Complete,
    /// Rejected or failed
    Failed,
}

/// Metadata of an uploaded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// File name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// When the upload was recorded
    pub date: DateTime<Utc>,
    /// Upload status
    pub status: UploadStatus,
}

impl UploadedFile {
    /// Record a completed upload at the current time
    pub fn completed(name: impl Into<String>, size: u64) -> Self {
        Self { name: name.into(), size, date: Utc::now(), status: UploadStatus::Complete }
    }
}

/// Fields extracted from uploaded documents by the analysis step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    /// Service start date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Service end date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Amount billed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Provider name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Expense category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Expense type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub expense_type: Option<String>,
    /// Free-text description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExtractedData {
    /// Check if analysis has produced anything yet
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The single mutable state of one flow traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReimbursementState {
    /// Benefit account to reimburse from
    pub account: String,
    /// Expense category
    pub category: String,
    /// Service provider
    pub provider: String,
    /// Date of service
    pub service_date: String,
    /// Amount requested
    pub amount: String,
    /// Payment method for the payout
    pub payment_method: String,

    /// Uploaded documents
    pub uploads: Vec<UploadedFile>,
    /// Run analysis automatically after upload
    pub auto_analyze: bool,

    /// Analysis output
    pub extracted: ExtractedData,

    /// Who receives the payout
    pub recipient: String,
    /// Mileage claim flag
    pub did_drive: bool,
    /// Terms accepted on review
    pub accepted_terms: bool,

    /// Product variant
    pub variant: Variant,
    /// Active flow identifier
    pub flow_id: String,
    /// Presentation configuration
    pub layout_modes: LayoutModes,
}

impl Default for ReimbursementState {
    fn default() -> Self {
        Self {
            account: String::new(),
            category: String::new(),
            provider: String::new(),
            service_date: String::new(),
            amount: String::new(),
            payment_method: String::new(),
            uploads: Vec::new(),
            auto_analyze: true,
            extracted: ExtractedData::default(),
            recipient: String::new(),
            did_drive: false,
            accepted_terms: false,
            variant: Variant::default(),
            flow_id: DEFAULT_FLOW_ID.to_string(),
            layout_modes: LayoutModes::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_only_exact_spellings() {
        assert_eq!(EntryMode::parse("drawer"), Some(EntryMode::Drawer));
        assert_eq!(EntryMode::parse("Drawer"), None);
        assert_eq!(EntryMode::parse("bogus"), None);
        assert_eq!(EntryMode::parse(""), None);
        assert_eq!(ProgressMode::parse("none"), Some(ProgressMode::None));
        assert_eq!(Variant::parse("vision"), Some(Variant::Vision));
    }

    #[test]
    fn test_as_str_matches_serde() {
        for mode in ReviewLayout::ALL {
            let json = serde_json::to_value(mode).unwrap();
            assert_eq!(json, mode.as_str());
        }
        for comm in AiCommunication::ALL {
            let json = serde_json::to_value(comm).unwrap();
            assert_eq!(json, comm.as_str());
        }
    }

    #[test]
    fn test_layout_defaults() {
        let modes = LayoutModes::default();
        assert_eq!(modes.entry_mode, EntryMode::Fullpage);
        assert_eq!(modes.plan_selection_mode, PlanSelectionMode::Dropdown);
        assert_eq!(modes.progress_mode, ProgressMode::Stepper);
        assert_eq!(modes.upload_layout, UploadLayout::Standard);
        assert_eq!(modes.review_layout, ReviewLayout::Form);
        assert_eq!(modes.ai_communication, AiCommunication::Minimal);
    }

    #[test]
    fn test_layout_pairs_cover_every_field() {
        let pairs = LayoutModes::default().to_pairs();
        assert_eq!(pairs.len(), LayoutField::ALL.len());
        assert!(pairs.contains(&("entryMode", "fullpage")));
        assert!(pairs.contains(&("aiCommunication", "minimal")));
    }

    #[test]
    fn test_allowed_values() {
        assert_eq!(LayoutField::UploadLayout.allowed_values(), vec!["standard", "compact", "split"]);
        assert_eq!(LayoutField::PlanSelectionMode.allowed_values(), vec!["dropdown", "cards"]);
    }

    #[test]
    fn test_default_state() {
        let state = ReimbursementState::default();
        assert_eq!(state.flow_id, DEFAULT_FLOW_ID);
        assert_eq!(state.variant, Variant::Mvp);
        assert!(state.auto_analyze);
        assert!(state.uploads.is_empty());
        assert!(state.extracted.is_empty());
    }

    #[test]
    fn test_extracted_type_field_name() {
        let data = ExtractedData { expense_type: Some("dental".to_string()), ..Default::default() };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["type"], "dental");
    }
}
