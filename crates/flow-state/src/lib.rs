//! Flow state for the reimbursement prototype
//!
//! This crate provides the reimbursement data model, the shared
//! merge-and-notify store with its provider scoping, and cancellable
//! screen-scoped background tasks.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod model;
pub mod store;
pub mod task;

pub use model::{
    AiCommunication, EntryMode, ExtractedData, LayoutField, LayoutModes, PlanSelectionMode,
    ProgressMode, ReimbursementState, ReviewLayout, UploadLayout, UploadStatus, UploadedFile,
    Variant, WireValue, DEFAULT_FLOW_ID,
};
pub use store::{
    FlowContext, FlowProvider, FlowStore, LayoutModesPatch, StatePatch, StoreError,
};
pub use task::{spawn_delayed, spawn_poll, TaskHandle};
