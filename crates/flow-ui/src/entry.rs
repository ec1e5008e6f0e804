//! Entry presentation
//!
//! Decides how the flow's screens are contained: directly on the page, in a
//! dialog, or in a drawer. Screens never look at the entry mode; they hand
//! their three zones to [`EntryPresentation::present`] and the presentation
//! decides whether header and footer are pinned.

use flow_state::EntryMode;
use serde::Serialize;

use crate::config::FlowConfig;
use crate::controls::Shell;
use crate::navigation::{HistoryMode, Navigator, Route};
use crate::screens::StepLayout;

/// Where header and footer sit relative to the content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZonePlacement {
    /// One after another in page flow
    Stacked,
    /// Header and footer pinned, content scrolls between them
    Fixed,
}

/// Container for the flow's screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPresentation {
    /// No container
    FullPage,
    /// Overlay dialog
    Modal {
        /// Where closing lands
        close_route: Route,
    },
    /// Slide-in panel with its own title
    Drawer {
        /// Panel header title
        title: String,
        /// Where closing lands
        close_route: Route,
    },
}

/// A screen placed in its container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedScreen {
    /// Container, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<Shell>,
    /// Zone placement
    pub placement: ZonePlacement,
    /// The screen's zones
    pub layout: StepLayout,
}

impl EntryPresentation {
    /// Presentation for an entry mode
    pub fn for_mode(mode: EntryMode, config: &FlowConfig) -> Self {
        match mode {
            EntryMode::Fullpage => EntryPresentation::FullPage,
            EntryMode::Modal => EntryPresentation::Modal { close_route: config.close_route },
            EntryMode::Drawer => EntryPresentation::Drawer {
                title: config.drawer_title.clone(),
                close_route: config.close_route,
            },
        }
    }

    /// Zone placement inside this container
    pub fn placement(&self) -> ZonePlacement {
        match self {
            EntryPresentation::FullPage => ZonePlacement::Stacked,
            EntryPresentation::Modal { .. } | EntryPresentation::Drawer { .. } => {
                ZonePlacement::Fixed
            }
        }
    }

    /// The container's props
    pub fn shell(&self) -> Option<Shell> {
        match self {
            EntryPresentation::FullPage => None,
            EntryPresentation::Modal { .. } => Some(Shell::dialog()),
            EntryPresentation::Drawer { title, .. } => Some(Shell::drawer(title.clone())),
        }
    }

    /// Place a rendered screen in this container
    pub fn present(&self, layout: StepLayout) -> PresentedScreen {
        PresentedScreen { shell: self.shell(), placement: self.placement(), layout }
    }

    /// Close the container; returns whether navigation happened
    ///
    /// The host drops the mounted screen afterwards, which cancels any of
    /// its background work.
    pub fn close<N: Navigator + ?Sized>(&self, nav: &mut N) -> bool {
        let close_route = match self {
            EntryPresentation::FullPage => return false,
            EntryPresentation::Modal { close_route } => *close_route,
            EntryPresentation::Drawer { close_route, .. } => *close_route,
        };
        let to = nav.location().with_route(close_route);
        tracing::debug!(to = %to, "closing flow container");
        nav.navigate(to, HistoryMode::Push);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ShellKind;
    use crate::navigation::{Location, MockNavigator};
    use crate::screens::{MyselfScreen, StepScreen};
    use flow_state::FlowProvider;
    use mockall::predicate::eq;

    fn layout() -> StepLayout {
        let provider = FlowProvider::mount();
        MyselfScreen::new(&provider.context()).render(&provider.store().snapshot())
    }

    #[test]
    fn test_full_page_has_no_container() {
        let presentation = EntryPresentation::for_mode(EntryMode::Fullpage, &FlowConfig::default());
        let presented = presentation.present(layout());

        assert!(presented.shell.is_none());
        assert_eq!(presented.placement, ZonePlacement::Stacked);
    }

    #[test]
    fn test_overlays_pin_zones() {
        let config = FlowConfig::default().drawer_title("Get paid back");

        let modal = EntryPresentation::for_mode(EntryMode::Modal, &config).present(layout());
        assert_eq!(modal.shell.as_ref().map(|s| s.kind), Some(ShellKind::Dialog));
        assert_eq!(modal.placement, ZonePlacement::Fixed);

        let drawer = EntryPresentation::for_mode(EntryMode::Drawer, &config).present(layout());
        let shell = drawer.shell.unwrap();
        assert_eq!(shell.kind, ShellKind::Drawer);
        assert_eq!(shell.title.as_deref(), Some("Get paid back"));
        assert_eq!(drawer.placement, ZonePlacement::Fixed);
    }

    #[test]
    fn test_same_screen_in_every_container() {
        let config = FlowConfig::default();
        let screens: Vec<StepLayout> = [EntryMode::Fullpage, EntryMode::Modal, EntryMode::Drawer]
            .into_iter()
            .map(|mode| EntryPresentation::for_mode(mode, &config).present(layout()).layout)
            .collect();
        assert!(screens.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_close_navigates_to_safe_route() {
        let presentation = EntryPresentation::for_mode(EntryMode::Drawer, &FlowConfig::default());
        let mut mock = MockNavigator::new();
        mock.expect_location()
            .return_const(Location::new(Route::ReimburseDocs).with_param("entryMode", "drawer"));
        mock.expect_navigate()
            .with(
                eq(Location::new(Route::Home).with_param("entryMode", "drawer")),
                eq(HistoryMode::Push),
            )
            .times(1)
            .return_const(());

        assert!(presentation.close(&mut mock));
    }

    #[test]
    fn test_full_page_close_is_noop() {
        let mut mock = MockNavigator::new();
        mock.expect_navigate().never();
        assert!(!EntryPresentation::FullPage.close(&mut mock));
    }
}
