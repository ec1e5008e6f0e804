//! Flow engine and screens for the reimbursement prototype
//!
//! This crate provides the flow registry and navigation on top of the
//! shared state in `flow-state`, the step screens, and the dev tool that
//! keeps URL, state and session selection in sync.
//!
//! # Modules
//!
//! - [`navigation`] - Routes, locations and history
//! - [`flows`] - Flow definitions, registry and resolver
//! - [`flow_nav`] - Step navigation for the active flow
//! - [`progress`] - Progress indicator
//! - [`entry`] - Full page, modal and drawer containers
//! - [`screens`] - Step screens
//! - [`presets`] - Variation presets
//! - [`mode_sync`] - Mode and variant synchronization
//! - [`controls`] - UI control props
//! - [`config`] - Runtime configuration
//!
//! # Example
//!
//! ```rust
//! use flow_state::{FlowProvider, StatePatch};
//! use flow_ui::flow_nav::FlowNav;
//! use flow_ui::navigation::{History, Navigator, Route};
//!
//! let provider = FlowProvider::mount();
//! let store = provider.context().store().clone();
//! store.update_state(StatePatch::new().account("hsa"));
//!
//! let state = store.snapshot();
//! let mut history = History::at("/reimburse?entryMode=modal");
//! assert!(FlowNav::for_state(&state).go_next(&mut history, &state, "myself"));
//! assert_eq!(history.location().route, Route::ReimburseDocs);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod controls;
pub mod entry;
pub mod flow_nav;
pub mod flows;
pub mod mode_sync;
pub mod navigation;
pub mod presets;
pub mod progress;
pub mod screens;

pub use config::FlowConfig;
pub use entry::{EntryPresentation, PresentedScreen, ZonePlacement};
pub use flow_nav::FlowNav;
pub use flows::{
    default_flow, get_flow_by_id, is_registered, registry, FlowDefinition, FlowMode, FlowStep,
};
pub use mode_sync::{ModeChange, ModeSelector, Overlay};
pub use navigation::{History, HistoryMode, Location, Navigator, Route, Router};
pub use presets::{active_preset, find_preset, presets, VariationPreset};
pub use progress::{render_progress, ProgressView, StepStatus};
pub use screens::{StepLayout, StepScreen, UploadError};
