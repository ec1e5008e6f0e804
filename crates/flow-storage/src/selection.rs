//! Records persisted in the session store
//!
//! Values here are stored as raw strings. They come back from storage that
//! any other tab can write to, so they are untrusted until the mode selector
//! validates them against its enumerations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::session::{Result, SessionStore};

/// The mode selector's last user-driven choice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSelection {
    /// Product variant ("mvp" or "vision")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    /// Active flow identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,

    /// Layout modes keyed by their query-parameter name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub layout_modes: BTreeMap<String, String>,

    /// Preset the selection was produced by, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_id: Option<String>,
}

impl PersistedSelection {
    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.variant.is_none()
            && self.flow_id.is_none()
            && self.layout_modes.is_empty()
            && self.preset_id.is_none()
    }

    /// Load the selection stored under `key`
    pub fn load(store: &SessionStore, key: &str) -> Result<Option<Self>> {
        store.get(key)
    }

    /// Overwrite the selection stored under `key`
    pub fn save(&self, store: &SessionStore, key: &str) -> Result<()> {
        store.set(key, self)
    }
}

/// A completed upload announced by a second device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileUploadSignal {
    /// File name as uploaded
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

impl MobileUploadSignal {
    /// Announce an upload (what the phone does)
    pub fn publish(&self, store: &SessionStore, key: &str) -> Result<()> {
        store.set(key, self)
    }

    /// Consume a pending announcement, if any
    pub fn take(store: &SessionStore, key: &str) -> Result<Option<Self>> {
        store.take(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_round_trip_through_store() {
        let store = SessionStore::in_memory().unwrap();
        let mut selection = PersistedSelection {
            variant: Some("vision".to_string()),
            flow_id: Some("vision-linear-v1".to_string()),
            ..Default::default()
        };
        selection.layout_modes.insert("entryMode".to_string(), "drawer".to_string());

        selection.save(&store, "sel").unwrap();
        let loaded = PersistedSelection::load(&store, "sel").unwrap();

        assert_eq!(loaded, Some(selection));
    }

    #[test]
    fn test_selection_serializes_camel_case() {
        let selection = PersistedSelection {
            flow_id: Some("mvp-linear-v1".to_string()),
            preset_id: Some("mvp-default".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["flowId"], "mvp-linear-v1");
        assert_eq!(json["presetId"], "mvp-default");
        assert!(json.get("variant").is_none());
        assert!(json.get("layoutModes").is_none());
    }

    #[test]
    fn test_selection_tolerates_missing_fields() {
        let parsed: PersistedSelection = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());

        let parsed: PersistedSelection =
            serde_json::from_str(r#"{"layoutModes":{"progressMode":"none"}}"#).unwrap();
        assert_eq!(parsed.layout_modes.get("progressMode").map(String::as_str), Some("none"));
    }

    #[test]
    fn test_mobile_signal_consumed_once() {
        let store = SessionStore::in_memory().unwrap();
        let signal = MobileUploadSignal { name: "receipt.jpg".to_string(), size: 2048 };

        signal.publish(&store, "mobile").unwrap();

        assert_eq!(MobileUploadSignal::take(&store, "mobile").unwrap(), Some(signal));
        assert_eq!(MobileUploadSignal::take(&store, "mobile").unwrap(), None);
    }
}
