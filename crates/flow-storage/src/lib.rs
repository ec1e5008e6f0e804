//! Session storage for the reimbursement prototype
//!
//! This crate provides the session-scoped key-value store and the records
//! the flow persists in it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod selection;
pub mod session;

pub use selection::{MobileUploadSignal, PersistedSelection};
pub use session::{KvConfig, Result, SessionStore, StorageError};
