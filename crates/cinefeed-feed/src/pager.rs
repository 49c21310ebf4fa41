//! Paging/search state machine.
//!
//! `Pager` owns the accumulated result list for one screen. Every fetch is
//! split in two phases: `begin_*` mutates the state synchronously and hands
//! out a `PageRequest` stamped with a generation number, `complete` applies
//! the response only if no newer request was issued in the meantime. The
//! `load_*` wrappers run both phases against a `LocalCatalogApi`.
#![allow(clippy::future_not_send)]

use cinefeed_api::tmdb::{CatalogError, LocalCatalogApi, Movie, MoviePage};
use tracing::instrument;

/// User-facing message shown when a page fetch fails.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load movies";

/// Which listing the pager is walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowseMode {
    /// Discover listing.
    #[default]
    Browse,
    /// Search results for the active query.
    Search,
}

/// Load status of a pager or collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded.
    Success,
    /// The last fetch failed.
    Error,
}

/// Read-only snapshot of the browse state.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseState {
    mode: BrowseMode,
    query: String,
    movies: Vec<Movie>,
    page: u32,
    total_pages: u32,
    status: LoadStatus,
    error_message: Option<String>,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            mode: BrowseMode::Browse,
            query: String::new(),
            movies: Vec::new(),
            page: 1,
            total_pages: 1,
            status: LoadStatus::Idle,
            error_message: None,
        }
    }
}

impl BrowseState {
    /// Active mode.
    #[must_use]
    pub const fn mode(&self) -> BrowseMode {
        self.mode
    }

    /// Active query (empty in browse mode).
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Accumulated movies in arrival order.
    #[must_use]
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Last loaded page (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Total pages reported by the catalog.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Current load status.
    #[must_use]
    pub const fn status(&self) -> LoadStatus {
        self.status
    }

    /// Message of the last failure, cleared by the next successful fetch.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Whether another page can be requested.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    /// Puts the state back at page 1 with no results.
    fn reset(&mut self, mode: BrowseMode, query: String) {
        self.mode = mode;
        self.query = query;
        self.movies.clear();
        self.page = 1;
        self.total_pages = 1;
    }
}

/// Whether a request replaces or extends the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Page 1 after a reset.
    First,
    /// The page after the current one.
    Next,
}

/// One issued page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Generation stamped at issue time.
    pub generation: u64,
    /// Replace or append.
    pub kind: RequestKind,
    /// Listing to fetch from.
    pub mode: BrowseMode,
    /// Search query (empty in browse mode).
    pub query: String,
    /// Page number to fetch.
    pub page: u32,
}

impl PageRequest {
    /// Fetches the page from the catalog endpoint matching `mode`.
    ///
    /// # Errors
    ///
    /// Propagates the catalog error unchanged.
    pub async fn fetch<A: LocalCatalogApi>(&self, api: &A) -> Result<MoviePage, CatalogError> {
        match self.mode {
            BrowseMode::Browse => api.discover_movies(self.page).await,
            BrowseMode::Search => api.search_movies(&self.query, self.page).await,
        }
    }
}

/// Paging/search state machine for one screen.
#[derive(Debug, Default)]
pub struct Pager {
    state: BrowseState,
    /// Text typed into the search box, not yet submitted.
    query_input: String,
    /// Generation of the most recently issued request.
    generation: u64,
}

impl Pager {
    /// Creates an idle pager in browse mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state snapshot.
    #[must_use]
    pub const fn state(&self) -> &BrowseState {
        &self.state
    }

    /// Unsubmitted search box text.
    #[must_use]
    pub fn query_input(&self) -> &str {
        &self.query_input
    }

    /// Updates the search box text without fetching.
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query_input = text.into();
    }

    /// Resets to page 1 of `mode`/`query` and issues the page-1 request.
    ///
    /// A blank query in search mode falls back to browse mode.
    pub fn begin_first_page(&mut self, mode: BrowseMode, query: &str) -> PageRequest {
        let query = query.trim();
        let (mode, query) = match mode {
            BrowseMode::Search if !query.is_empty() => (BrowseMode::Search, String::from(query)),
            _ => (BrowseMode::Browse, String::new()),
        };
        self.state.reset(mode, query);
        self.issue(RequestKind::First, 1)
    }

    /// Issues the request for the next page, or `None` when already on the
    /// last page or a fetch is in flight.
    pub fn begin_next_page(&mut self) -> Option<PageRequest> {
        if self.state.status == LoadStatus::Loading || !self.state.has_more() {
            return None;
        }
        let next = self.state.page.saturating_add(1);
        Some(self.issue(RequestKind::Next, next))
    }

    /// Re-issues page 1 of the active mode and query.
    pub fn begin_refresh(&mut self) -> PageRequest {
        let mode = self.state.mode;
        let query = self.state.query.clone();
        self.begin_first_page(mode, &query)
    }

    /// Leaves search mode and issues page 1 of the browse listing.
    pub fn begin_clear_search(&mut self) -> PageRequest {
        self.query_input.clear();
        self.begin_first_page(BrowseMode::Browse, "")
    }

    /// Issues page 1 of a search for the current search box text.
    pub fn begin_submit_search(&mut self) -> PageRequest {
        let query = self.query_input.clone();
        self.begin_first_page(BrowseMode::Search, &query)
    }

    fn issue(&mut self, kind: RequestKind, page: u32) -> PageRequest {
        self.generation = self.generation.saturating_add(1);
        self.state.status = LoadStatus::Loading;
        tracing::debug!(
            generation = self.generation,
            ?kind,
            mode = ?self.state.mode,
            page,
            "Page request issued"
        );
        PageRequest {
            generation: self.generation,
            kind,
            mode: self.state.mode,
            query: self.state.query.clone(),
            page,
        }
    }

    /// Applies the outcome of `request`.
    ///
    /// Returns `false` (state untouched) when a newer request has been
    /// issued since `request`.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        result: Result<MoviePage, CatalogError>,
    ) -> bool {
        if request.generation != self.generation {
            tracing::debug!(
                stale = request.generation,
                current = self.generation,
                "Discarding stale page response"
            );
            return false;
        }

        match result {
            Ok(response) => {
                let received = response.results.len();
                match request.kind {
                    RequestKind::First => self.state.movies = response.results,
                    RequestKind::Next => self.state.movies.extend(response.results),
                }
                self.state.page = response.page.max(1);
                self.state.total_pages = response.total_pages.max(self.state.page);
                self.state.status = LoadStatus::Success;
                self.state.error_message = None;
                tracing::info!(
                    page = self.state.page,
                    total_pages = self.state.total_pages,
                    received,
                    accumulated = self.state.movies.len(),
                    "Page loaded"
                );
            }
            Err(err) => {
                tracing::warn!(
                    page = request.page,
                    kind = ?request.kind,
                    error = %err,
                    "Page load failed"
                );
                if request.kind == RequestKind::First {
                    self.state.movies.clear();
                }
                self.state.status = LoadStatus::Error;
                self.state.error_message = Some(String::from(LOAD_ERROR_MESSAGE));
            }
        }
        true
    }

    /// Loads page 1 of `mode`/`query`, replacing the result list.
    #[instrument(skip_all, fields(mode = ?mode, query = query))]
    pub async fn load_first_page<A: LocalCatalogApi>(
        &mut self,
        api: &A,
        mode: BrowseMode,
        query: &str,
    ) {
        let request = self.begin_first_page(mode, query);
        self.run(api, &request).await;
    }

    /// Loads and appends the next page. Returns `false` if nothing was requested.
    #[instrument(skip_all)]
    pub async fn load_next_page<A: LocalCatalogApi>(&mut self, api: &A) -> bool {
        let Some(request) = self.begin_next_page() else {
            return false;
        };
        self.run(api, &request).await;
        true
    }

    /// Reloads page 1 of the active mode and query.
    #[instrument(skip_all)]
    pub async fn refresh<A: LocalCatalogApi>(&mut self, api: &A) {
        let request = self.begin_refresh();
        self.run(api, &request).await;
    }

    /// Returns to the browse listing.
    #[instrument(skip_all)]
    pub async fn clear_search<A: LocalCatalogApi>(&mut self, api: &A) {
        let request = self.begin_clear_search();
        self.run(api, &request).await;
    }

    /// Searches for the current search box text.
    #[instrument(skip_all)]
    pub async fn submit_search<A: LocalCatalogApi>(&mut self, api: &A) {
        let request = self.begin_submit_search();
        self.run(api, &request).await;
    }

    async fn run<A: LocalCatalogApi>(&mut self, api: &A, request: &PageRequest) {
        let result = request.fetch(api).await;
        self.complete(request, result);
    }
}
