//! Runtime configuration for the flow screens and the mode selector

use std::time::Duration;

use crate::navigation::Route;

/// Flow configuration
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// How long simulated document analysis takes
    pub analysis_delay: Duration,
    /// How often the upload screen checks for a mobile upload
    pub mobile_poll_interval: Duration,
    /// Session store key of the persisted mode selection
    pub selection_key: String,
    /// Session store key a second device writes finished uploads to
    pub mobile_upload_key: String,
    /// Header title of the drawer container
    pub drawer_title: String,
    /// Where closing a modal or drawer lands
    pub close_route: Route,
    /// Accepted upload extensions (lowercase, no dot)
    pub accepted_extensions: Vec<String>,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            analysis_delay: Duration::from_millis(2500),
            mobile_poll_interval: Duration::from_millis(1500),
            selection_key: "reimburse:selection".to_string(),
            mobile_upload_key: "reimburse:mobile-upload".to_string(),
            drawer_title: "Reimburse expense".to_string(),
            close_route: Route::Home,
            accepted_extensions: ["pdf", "jpg", "jpeg", "png", "heic"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            max_upload_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl FlowConfig {
    /// Set the analysis delay
    pub fn analysis_delay(mut self, delay: Duration) -> Self {
        self.analysis_delay = delay;
        self
    }

    /// Set the mobile upload poll interval
    pub fn mobile_poll_interval(mut self, interval: Duration) -> Self {
        self.mobile_poll_interval = interval;
        self
    }

    /// Set the persisted selection key
    pub fn selection_key(mut self, key: impl Into<String>) -> Self {
        self.selection_key = key.into();
        self
    }

    /// Set the mobile upload signal key
    pub fn mobile_upload_key(mut self, key: impl Into<String>) -> Self {
        self.mobile_upload_key = key.into();
        self
    }

    /// Set the drawer title
    pub fn drawer_title(mut self, title: impl Into<String>) -> Self {
        self.drawer_title = title.into();
        self
    }

    /// Set the route overlays close to
    pub fn close_route(mut self, route: Route) -> Self {
        self.close_route = route;
        self
    }

    /// Set the largest accepted upload
    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Check if a file name has an accepted extension
    pub fn accepts(&self, file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.accepted_extensions.iter().any(|a| *a == ext))
    }
}
