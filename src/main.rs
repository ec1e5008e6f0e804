//! Reimbursement prototype demo
//!
//! Opens the flow at a URL (first argument, default `/reimburse`), applies
//! the URL's modes, and walks the active flow step by step, printing each
//! screen as its container presents it.
//!
//! ```text
//! reimburse-proto "/reimburse?flowId=vision-linear-v1&entryMode=drawer"
//! RUST_LOG=debug reimburse-proto "/reimburse/wizard?flowId=vision-wizard-v1"
//! ```

use anyhow::{Context, Result};
use flow_state::{FlowContext, FlowProvider, ReimbursementState};
use flow_storage::{MobileUploadSignal, SessionStore};
use flow_ui::flows::steps;
use flow_ui::screens::{
    AnalyzeScreen, ConfirmScreen, DocsScreen, MyselfScreen, ReviewScreen, WizardScreen, ACCOUNTS,
    CATEGORIES,
};
use flow_ui::{
    get_flow_by_id, EntryPresentation, FlowConfig, FlowMode, FlowNav, History, HistoryMode,
    ModeSelector, Navigator, StepScreen,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

type SharedHistory = Arc<Mutex<History>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let start = std::env::args().nth(1).unwrap_or_else(|| "/reimburse".to_string());
    let config = FlowConfig::default()
        .analysis_delay(Duration::from_millis(400))
        .mobile_poll_interval(Duration::from_millis(100));
    let session = SessionStore::in_memory().context("Failed to open session store")?;

    let provider = FlowProvider::mount();
    let ctx = provider.context();
    let history: SharedHistory = Arc::new(Mutex::new(History::at(&start)));

    let selector = ModeSelector::new(&ctx, session.clone(), config.clone());
    selector.mount(&*history.lock());

    let state = provider.store().snapshot();
    let flow = get_flow_by_id(Some(&state.flow_id));
    {
        let mut nav = history.lock();
        let here = nav.location();
        if !flow.owns_route(here.route) {
            tracing::info!(from = %here, to = flow.entry_route.to_path(), "opening flow entry");
            nav.navigate(here.with_route(flow.entry_route), HistoryMode::Replace);
        }
    }

    let presentation = EntryPresentation::for_mode(state.layout_modes.entry_mode, &config);
    println!("flow:         {} ({})", flow.name, flow.id);
    println!("presentation: {:?}", presentation);
    if let Some(preset) = selector.active_preset() {
        println!("preset:       {}", preset.name);
    }
    println!();

    match flow.mode {
        FlowMode::Routes => walk_routes(&ctx, &config, &session, &presentation, &history).await?,
        FlowMode::Wizard => walk_wizard(&ctx, &config, &presentation, &history)?,
    }

    println!();
    println!("finished at {}", history.lock().location());
    Ok(())
}

fn show(presentation: &EntryPresentation, screen: &dyn StepScreen, state: &ReimbursementState) {
    let presented = presentation.present(screen.render(state));
    let header = &presented.layout.header;
    let caption = header.progress.caption().map(|c| format!(" - {c}")).unwrap_or_default();
    let buttons: Vec<String> = presented
        .layout
        .footer
        .iter()
        .map(|b| if b.disabled { format!("({})", b.label) } else { b.label.clone() })
        .collect();

    println!("[{}] {}{} ({:?})", screen.step_id(), header.title, caption, presented.placement);
    println!("    {} blocks | {}", presented.layout.content.len(), buttons.join(" "));
}

/// Drive a route-mode flow from the current route until no transition remains
async fn walk_routes(
    ctx: &FlowContext,
    config: &FlowConfig,
    session: &SessionStore,
    presentation: &EntryPresentation,
    history: &SharedHistory,
) -> Result<()> {
    let store = ctx.store();

    loop {
        let route = history.lock().location().route;
        let state = store.snapshot();
        let flow = get_flow_by_id(Some(&state.flow_id));
        let Some(step) = flow.step_for_route(route) else {
            tracing::warn!(route = route.to_path(), "route is not part of the active flow");
            return Ok(());
        };

        let advanced = match step.id {
            steps::MYSELF => {
                let mut screen = MyselfScreen::new(ctx);
                show(presentation, &screen, &state);
                screen.select_account(ACCOUNTS[0].0);
                screen.select_category(CATEGORIES[1].0);
                screen.continue_to_next(&mut *history.lock())
            }
            steps::DOCS => {
                MobileUploadSignal { name: "receipt-from-phone.jpg".to_string(), size: 48_213 }
                    .publish(session, &config.mobile_upload_key)
                    .context("Failed to publish mobile upload")?;
                let mut screen = DocsScreen::mount(ctx, config.clone(), session.clone());
                tokio::time::sleep(config.mobile_poll_interval * 2).await;
                show(presentation, &screen, &store.snapshot());
                if let Err(e) = screen.add_file("notes.txt", 120) {
                    println!("    refused: {e}");
                }
                screen.continue_to_next(&mut *history.lock())
            }
            steps::ANALYZE => {
                let depth = history.lock().depth();
                let screen = AnalyzeScreen::mount(ctx, config, Arc::clone(history));
                show(presentation, &screen, &state);
                tokio::time::sleep(config.analysis_delay + Duration::from_millis(100)).await;
                let moved = history.lock().depth() > depth;
                drop(screen);
                moved
            }
            steps::REVIEW => {
                let mut screen = ReviewScreen::new(ctx);
                screen.set_recipient("me");
                screen.set_accepted_terms(true);
                show(presentation, &screen, &store.snapshot());
                screen.submit(&mut *history.lock())
            }
            steps::CONFIRM => {
                let screen = ConfirmScreen::new(ctx);
                show(presentation, &screen, &state);
                if !FlowNav::for_state(&state).go_next(&mut *history.lock(), &state, step.id) {
                    screen.done(&mut *history.lock());
                }
                false
            }
            other => {
                tracing::warn!(step = other, "no screen for step");
                false
            }
        };

        if !advanced {
            return Ok(());
        }
    }
}

/// Drive the single-page wizard to its completion page
fn walk_wizard(
    ctx: &FlowContext,
    config: &FlowConfig,
    presentation: &EntryPresentation,
    history: &SharedHistory,
) -> Result<()> {
    let store = ctx.store();
    let mut screen = WizardScreen::new(ctx, config.clone());

    loop {
        show(presentation, &screen, &store.snapshot());
        match screen.step_id() {
            steps::EXPENSE_TYPE => screen.select_expense_type(CATEGORIES[0].0),
            steps::PLAN => screen.select_plan(ACCOUNTS[1].0),
            steps::UPLOAD => {
                screen.add_file("eob.pdf", 88_004).context("Upload refused")?;
            }
            _ => screen.set_accepted_terms(true),
        }
        if !screen.next() {
            break;
        }
    }

    if !screen.finish(&mut *history.lock()) {
        anyhow::bail!("wizard could not be submitted");
    }
    Ok(())
}
