use flow_state::{
    spawn_poll, FlowContext, FlowStore, ReimbursementState, StatePatch, TaskHandle, UploadLayout,
    UploadedFile,
};
use flow_storage::{MobileUploadSignal, SessionStore};
use thiserror::Error;

use super::{back_button, header, Block, StepLayout, StepScreen, Tone};
use crate::config::FlowConfig;
use crate::controls::Button;
use crate::flow_nav::FlowNav;
use crate::flows::steps;
use crate::navigation::Navigator;

/// Why an upload was refused
///
/// Shown on the upload screen only; it never reaches flow state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    /// Extension not in the accepted list
    #[error("{name} is not a supported file type")]
    UnsupportedType {
        /// Offending file name
        name: String,
    },

    /// Zero-byte file
    #[error("{name} is empty")]
    Empty {
        /// Offending file name
        name: String,
    },

    /// Larger than the configured limit
    #[error("{name} is larger than {limit} bytes")]
    TooLarge {
        /// Offending file name
        name: String,
        /// Configured limit
        limit: u64,
    },
}

/// Check a file against the upload rules
pub fn validate_upload(config: &FlowConfig, name: &str, size: u64) -> Result<(), UploadError> {
    if !config.accepts(name) {
        return Err(UploadError::UnsupportedType { name: name.to_string() });
    }
    if size == 0 {
        return Err(UploadError::Empty { name: name.to_string() });
    }
    if size > config.max_upload_bytes {
        return Err(UploadError::TooLarge { name: name.to_string(), limit: config.max_upload_bytes });
    }
    Ok(())
}

fn append_upload(store: &FlowStore, file: UploadedFile) {
    let mut uploads = store.read(|s| s.uploads.clone());
    uploads.push(file);
    store.update_state(StatePatch::new().uploads(uploads));
}

/// Document upload
pub struct DocsScreen {
    store: FlowStore,
    config: FlowConfig,
    flow_nav: FlowNav,
    error: Option<UploadError>,
    mobile_poll: Option<TaskHandle>,
}

impl DocsScreen {
    /// Mount the screen without the mobile hand-off
    pub fn new(ctx: &FlowContext, config: FlowConfig) -> Self {
        let store = ctx.store().clone();
        let flow_nav = store.read(FlowNav::for_state);
        Self { store, config, flow_nav, error: None, mobile_poll: None }
    }

    /// Mount the screen and start waiting for a phone upload
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(ctx: &FlowContext, config: FlowConfig, session: SessionStore) -> Self {
        let mut screen = Self::new(ctx, config);
        screen.start_mobile_poll(session);
        screen
    }

    /// Poll the session store for a phone upload until one arrives
    ///
    /// The signal is consumed when read, so a file is appended at most once.
    pub fn start_mobile_poll(&mut self, session: SessionStore) {
        let key = self.config.mobile_upload_key.clone();
        let store = self.store.clone();

        self.mobile_poll = Some(spawn_poll(
            self.config.mobile_poll_interval,
            move || match MobileUploadSignal::take(&session, &key) {
                Ok(signal) => signal,
                Err(e) => {
                    tracing::warn!("Failed to read mobile upload signal: {}", e);
                    None
                }
            },
            move |signal: MobileUploadSignal| {
                tracing::info!(file = %signal.name, "received upload from phone");
                append_upload(&store, UploadedFile::completed(signal.name, signal.size));
            },
        ));
    }

    /// Whether the screen is still waiting for a phone upload
    pub fn is_polling(&self) -> bool {
        self.mobile_poll.as_ref().is_some_and(TaskHandle::is_active)
    }

    /// Stop waiting for a phone upload
    pub fn stop_mobile_poll(&mut self) {
        if let Some(handle) = self.mobile_poll.take() {
            handle.cancel();
        }
    }

    /// Validate and record a file picked on this device
    ///
    /// A refused file sets the screen's error; the next accepted file clears it.
    pub fn add_file(&mut self, name: &str, size: u64) -> Result<(), UploadError> {
        if let Err(e) = validate_upload(&self.config, name, size) {
            tracing::debug!("Upload refused: {}", e);
            self.error = Some(e.clone());
            return Err(e);
        }
        self.error = None;
        append_upload(&self.store, UploadedFile::completed(name, size));
        Ok(())
    }

    /// Remove the file at `index`; returns whether one was removed
    pub fn remove_file(&self, index: usize) -> bool {
        let mut uploads = self.store.read(|s| s.uploads.clone());
        if index >= uploads.len() {
            return false;
        }
        uploads.remove(index);
        self.store.update_state(StatePatch::new().uploads(uploads));
        true
    }

    /// Turn automatic analysis on or off
    pub fn set_auto_analyze(&self, on: bool) {
        self.store.update_state(StatePatch::new().auto_analyze(on));
    }

    /// The current upload error, if any
    pub fn error(&self) -> Option<&UploadError> {
        self.error.as_ref()
    }

    /// Go on with the uploaded documents
    ///
    /// With automatic analysis off, the analysis step is passed over.
    pub fn continue_to_next<N: Navigator + ?Sized>(&mut self, nav: &mut N) -> bool {
        let state = self.store.snapshot();
        if state.uploads.is_empty() {
            return false;
        }
        self.advance(nav, &state)
    }

    /// Go on without uploading anything
    pub fn skip<N: Navigator + ?Sized>(&mut self, nav: &mut N) -> bool {
        let state = self.store.snapshot();
        self.advance(nav, &state)
    }

    /// Go to the previous step
    pub fn back<N: Navigator + ?Sized>(&mut self, nav: &mut N) -> bool {
        let state = self.store.snapshot();
        self.flow_nav.refresh(&state);
        self.flow_nav.go_back(nav, &state, steps::DOCS)
    }

    fn advance<N: Navigator + ?Sized>(&mut self, nav: &mut N, state: &ReimbursementState) -> bool {
        self.flow_nav.refresh(state);
        let flow = self.flow_nav.flow();
        let analyze_next = flow.get_next(state, steps::DOCS) == Some(steps::ANALYZE);

        if analyze_next && (!state.auto_analyze || state.uploads.is_empty()) {
            tracing::debug!(flow = flow.id, "passing over analysis");
            return self.flow_nav.go_next(nav, state, steps::ANALYZE);
        }
        self.flow_nav.go_next(nav, state, steps::DOCS)
    }

    fn flow_analyzes(&self, state: &ReimbursementState) -> bool {
        crate::flows::get_flow_by_id(Some(&state.flow_id)).index_of(steps::ANALYZE).is_some()
    }
}

impl StepScreen for DocsScreen {
    fn step_id(&self) -> &'static str {
        steps::DOCS
    }

    fn render(&self, state: &ReimbursementState) -> StepLayout {
        let drop_zone = |compact| Block::DropZone {
            accepted: self.config.accepted_extensions.clone(),
            compact,
        };
        let files = Block::FileList { files: state.uploads.clone() };
        let handoff = Block::MobileHandoff { waiting: self.is_polling() };

        let mut content = Vec::new();
        if let Some(error) = &self.error {
            content.push(Block::notice(Tone::Error, error.to_string()));
        }
        match state.layout_modes.upload_layout {
            UploadLayout::Standard => content.extend([drop_zone(false), files, handoff]),
            UploadLayout::Compact => content.extend([drop_zone(true), files]),
            UploadLayout::Split => content.push(Block::Columns {
                left: vec![drop_zone(false), files],
                right: vec![handoff],
            }),
        }
        if self.flow_analyzes(state) {
            content.push(Block::toggle(
                "autoAnalyze",
                "Read my documents automatically",
                state.auto_analyze,
            ));
        }

        let mut footer = vec![
            Button::primary("Continue", "next").disabled(state.uploads.is_empty()),
            Button::ghost("Skip for now", "skip"),
        ];
        footer.extend(back_button(state, steps::DOCS));

        StepLayout {
            header: header(
                state,
                steps::DOCS,
                "Upload documents",
                Some("Add an itemized receipt or explanation of benefits"),
            ),
            content,
            footer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::{VISION_ALT_STEPS_V1, VISION_LINEAR_V1};
    use crate::navigation::{History, Route};
    use flow_state::FlowProvider;
    use std::time::Duration;

    fn config() -> FlowConfig {
        FlowConfig::default().mobile_poll_interval(Duration::from_millis(100))
    }

    #[test]
    fn test_validation() {
        let config = FlowConfig::default().max_upload_bytes(1000);
        assert!(validate_upload(&config, "a.pdf", 10).is_ok());
        assert_eq!(
            validate_upload(&config, "a.exe", 10),
            Err(UploadError::UnsupportedType { name: "a.exe".to_string() })
        );
        assert!(matches!(validate_upload(&config, "a.png", 0), Err(UploadError::Empty { .. })));
        assert!(matches!(
            validate_upload(&config, "a.png", 1001),
            Err(UploadError::TooLarge { limit: 1000, .. })
        ));
    }

    #[test]
    fn test_error_flag_is_local_and_cleared_by_valid_upload() {
        let provider = FlowProvider::mount();
        let mut screen = DocsScreen::new(&provider.context(), config());

        assert!(screen.add_file("notes.docx", 10).is_err());
        assert!(screen.error().is_some());
        assert!(provider.store().read(|s| s.uploads.is_empty()));
        let layout = screen.render(&provider.store().snapshot());
        assert!(matches!(layout.content[0], Block::Notice { tone: Tone::Error, .. }));

        screen.add_file("receipt.pdf", 2048).unwrap();
        assert!(screen.error().is_none());
        let uploads = provider.store().read(|s| s.uploads.clone());
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].name, "receipt.pdf");
        assert_eq!(uploads[0].size, 2048);
    }

    #[test]
    fn test_remove_file() {
        let provider = FlowProvider::mount();
        let mut screen = DocsScreen::new(&provider.context(), config());
        screen.add_file("a.pdf", 1).unwrap();
        screen.add_file("b.pdf", 1).unwrap();

        assert!(screen.remove_file(0));
        assert!(!screen.remove_file(5));
        let names: Vec<String> =
            provider.store().read(|s| s.uploads.iter().map(|u| u.name.clone()).collect());
        assert_eq!(names, vec!["b.pdf"]);
    }

    #[test]
    fn test_layouts() {
        let provider = FlowProvider::mount();
        let screen = DocsScreen::new(&provider.context(), config());
        let mut state = provider.store().snapshot();

        let standard = screen.render(&state);
        assert_eq!(standard.content.len(), 3);

        state.layout_modes.upload_layout = UploadLayout::Compact;
        let compact = screen.render(&state);
        assert!(matches!(compact.content[0], Block::DropZone { compact: true, .. }));

        state.layout_modes.upload_layout = UploadLayout::Split;
        let split = screen.render(&state);
        assert!(matches!(split.content[0], Block::Columns { .. }));
    }

    #[test]
    fn test_auto_analyze_toggle_only_in_analyzing_flows() {
        let provider = FlowProvider::mount();
        let screen = DocsScreen::new(&provider.context(), config());
        let mut state = provider.store().snapshot();
        let has_toggle = |layout: &StepLayout| {
            layout.content.iter().any(|b| matches!(b, Block::Toggle { field: "autoAnalyze", .. }))
        };

        assert!(!has_toggle(&screen.render(&state)));
        state.flow_id = VISION_LINEAR_V1.to_string();
        assert!(has_toggle(&screen.render(&state)));
    }

    #[test]
    fn test_continue_needs_an_upload() {
        let provider = FlowProvider::mount();
        let mut screen = DocsScreen::new(&provider.context(), config());
        let mut history = History::at("/reimburse/docs");

        assert!(!screen.continue_to_next(&mut history));
        assert!(screen.skip(&mut history));
        assert_eq!(history.location().route, Route::ReimburseReview);
    }

    #[test]
    fn test_auto_analyze_off_passes_over_analysis() {
        let provider = FlowProvider::mount();
        provider.store().update_state(StatePatch::new().flow_id(VISION_LINEAR_V1));
        let mut screen = DocsScreen::new(&provider.context(), config());
        screen.add_file("receipt.jpg", 500).unwrap();

        let mut history = History::at("/reimburse/docs");
        assert!(screen.continue_to_next(&mut history));
        assert_eq!(history.location().route, Route::ReimburseAnalyze);

        screen.set_auto_analyze(false);
        let mut history = History::at("/reimburse/docs");
        assert!(screen.continue_to_next(&mut history));
        assert_eq!(history.location().route, Route::ReimburseReview);
    }

    #[test]
    fn test_alt_flow_has_no_back_from_docs() {
        let provider = FlowProvider::mount();
        provider.store().update_state(StatePatch::new().flow_id(VISION_ALT_STEPS_V1));
        let mut screen = DocsScreen::new(&provider.context(), config());

        assert!(!screen.back(&mut History::at("/reimburse/docs")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mobile_upload_is_applied_once() {
        let provider = FlowProvider::mount();
        let session = SessionStore::in_memory().unwrap();
        let screen = DocsScreen::mount(&provider.context(), config(), session.clone());
        assert!(screen.is_polling());

        tokio::time::sleep(Duration::from_millis(250)).await;
        MobileUploadSignal { name: "phone.heic".to_string(), size: 900 }
            .publish(&session, &config().mobile_upload_key)
            .unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        let uploads = provider.store().read(|s| s.uploads.clone());
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].name, "phone.heic");
        assert!(!screen.is_polling());

        // A second signal after success is never picked up.
        MobileUploadSignal { name: "again.heic".to_string(), size: 900 }
            .publish(&session, &config().mobile_upload_key)
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(provider.store().read(|s| s.uploads.len()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_screen_stops_polling() {
        let provider = FlowProvider::mount();
        let session = SessionStore::in_memory().unwrap();
        let screen = DocsScreen::mount(&provider.context(), config(), session.clone());

        tokio::time::sleep(Duration::from_millis(150)).await;
        drop(screen);

        MobileUploadSignal { name: "late.pdf".to_string(), size: 10 }
            .publish(&session, &config().mobile_upload_key)
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(provider.store().read(|s| s.uploads.is_empty()));
        assert!(session.contains(&config().mobile_upload_key).unwrap());
    }
}
