//! Navigation for the reimbursement flow
//!
//! This module provides:
//! - Route definitions for the flow's pages
//! - A router turning URLs into [`Location`]s (route plus query string)
//! - The [`Navigator`] seam screens and the mode selector navigate through
//! - [`History`], an in-memory navigator with push/replace semantics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Query Parameters
// =============================================================================

/// Query string parameters, ordered by name so URLs render deterministically
pub type QueryParams = BTreeMap<String, String>;

// =============================================================================
// Route Definitions
// =============================================================================

/// All routes the flow consumes or produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Route {
    /// Home page, also the safe route overlays close to
    #[default]
    Home,
    /// Account and category selection
    Reimburse,
    /// Document upload
    ReimburseDocs,
    /// Document analysis wait-state
    ReimburseAnalyze,
    /// Review
    ReimburseReview,
    /// Confirmation
    ReimburseConfirm,
    /// Single-page wizard
    ReimburseWizard,
    /// Wizard completion
    ReimburseWizardSuccess,
    /// Not found
    NotFound,
}

impl Route {
    /// Every routable page (excludes [`Route::NotFound`])
    pub const ALL: [Route; 8] = [
        Route::Home,
        Route::Reimburse,
        Route::ReimburseDocs,
        Route::ReimburseAnalyze,
        Route::ReimburseReview,
        Route::ReimburseConfirm,
        Route::ReimburseWizard,
        Route::ReimburseWizardSuccess,
    ];

    /// Get the URL path for this route
    pub fn to_path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Reimburse => "/reimburse",
            Route::ReimburseDocs => "/reimburse/docs",
            Route::ReimburseAnalyze => "/reimburse/analyze",
            Route::ReimburseReview => "/reimburse/review",
            Route::ReimburseConfirm => "/reimburse/confirm",
            Route::ReimburseWizard => "/reimburse/wizard",
            Route::ReimburseWizardSuccess => "/reimburse/wizard/success",
            Route::NotFound => "/not-found",
        }
    }
}

// =============================================================================
// Locations
// =============================================================================

/// A route with its query string
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    /// The matched route
    pub route: Route,
    /// Query parameters
    pub query: QueryParams,
}

impl Location {
    /// A location with no query string
    pub fn new(route: Route) -> Self {
        Self { route, query: QueryParams::new() }
    }

    /// Parse a URL (path plus optional query string)
    pub fn parse(url: &str) -> Self {
        Router::new().match_url(url)
    }

    /// Same query string, different route
    pub fn with_route(&self, route: Route) -> Self {
        Self { route, query: self.query.clone() }
    }

    /// Add or replace a query parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Get a query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Render as a URL
    pub fn to_url(&self) -> String {
        let mut url = self.route.to_path().to_string();
        if !self.query.is_empty() {
            let pairs: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        url
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_url())
    }
}

// =============================================================================
// Router
// =============================================================================

/// URL Router for parsing paths to routes
pub struct Router {
    /// Path segments of each route
    patterns: Vec<(Vec<&'static str>, Route)>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a new router with all routes
    pub fn new() -> Self {
        let patterns = Route::ALL
            .iter()
            .map(|route| {
                let segments = route.to_path().split('/').filter(|s| !s.is_empty()).collect();
                (segments, *route)
            })
            .collect();
        Self { patterns }
    }

    /// Match a path (query string ignored) to a route
    pub fn match_path(&self, path: &str) -> Route {
        self.match_url(path).route
    }

    /// Match a full URL to a location
    pub fn match_url(&self, url: &str) -> Location {
        let (pathname, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };

        let path_segments: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();

        let route = self
            .patterns
            .iter()
            .find(|(segments, _)| *segments == path_segments)
            .map(|(_, route)| *route)
            .unwrap_or(Route::NotFound);

        let mut params = QueryParams::new();
        self.parse_query(query, &mut params);

        Location { route, query: params }
    }

    /// Parse query string into params
    fn parse_query(&self, query: Option<&str>, params: &mut QueryParams) {
        if let Some(query) = query {
            for pair in query.split('&') {
                if let Some((key, value)) = pair.split_once('=') {
                    if let (Ok(key), Ok(value)) =
                        (urlencoding::decode(key), urlencoding::decode(value))
                    {
                        params.insert(key.into_owned(), value.into_owned());
                    }
                }
            }
        }
    }
}

// =============================================================================
// Navigator
// =============================================================================

/// How a navigation affects browsing history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// New history entry
    Push,
    /// Overwrite the current entry
    Replace,
}

/// Something that owns the current location and can change it
#[cfg_attr(test, mockall::automock)]
pub trait Navigator {
    /// The current location
    fn location(&self) -> Location;

    /// Move to `to`
    fn navigate(&mut self, to: Location, mode: HistoryMode);
}

/// A history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    /// The location
    pub location: Location,
    /// Unique key for this entry
    pub key: String,
}

impl StackEntry {
    /// Create a new stack entry
    pub fn new(location: Location) -> Self {
        Self { location, key: uuid::Uuid::new_v4().to_string() }
    }
}

/// In-memory browsing history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    /// Entries (oldest first, never empty)
    entries: Vec<StackEntry>,
}

impl History {
    /// Start a history at `location`
    pub fn new(location: Location) -> Self {
        Self { entries: vec![StackEntry::new(location)] }
    }

    /// Start a history at a parsed URL
    pub fn at(url: &str) -> Self {
        Self::new(Location::parse(url))
    }

    /// The current entry
    pub fn current(&self) -> &StackEntry {
        // The first entry is never removed.
        &self.entries[self.entries.len() - 1]
    }

    /// Go back one entry (returns false at the first entry)
    pub fn back(&mut self) -> bool {
        if self.entries.len() > 1 {
            self.entries.pop();
            true
        } else {
            false
        }
    }

    /// Number of entries
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// All entries
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }
}

impl Navigator for History {
    fn location(&self) -> Location {
        self.current().location.clone()
    }

    fn navigate(&mut self, to: Location, mode: HistoryMode) {
        tracing::debug!(url = %to, ?mode, "navigate");
        match mode {
            HistoryMode::Push => self.entries.push(StackEntry::new(to)),
            HistoryMode::Replace => {
                let last = self.entries.len() - 1;
                self.entries[last] = StackEntry::new(to);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
