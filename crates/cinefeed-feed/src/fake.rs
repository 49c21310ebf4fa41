//! In-memory catalog used by the unit tests.
#![allow(clippy::future_not_send)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use cinefeed_api::tmdb::{CatalogError, LocalCatalogApi, Movie, MoviePage};

/// Builds a movie with only the fields the feed cares about.
pub fn movie(id: u64) -> Movie {
    Movie {
        id,
        title: format!("Movie {id}"),
        overview: String::new(),
        poster_path: None,
        backdrop_path: None,
        vote_average: 6.0,
        vote_count: 10,
        release_date: None,
    }
}

/// Builds a page whose results are `movie(id)` for each id.
pub fn page(page: u32, total_pages: u32, ids: &[u64]) -> MoviePage {
    MoviePage {
        page,
        results: ids.iter().copied().map(movie).collect(),
        total_pages,
        total_results: 0,
    }
}

/// Scripted catalog. Unscripted pages fail with a transport error,
/// unscripted ids are `NotFound`.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    discover: HashMap<u32, MoviePage>,
    search: HashMap<(String, u32), MoviePage>,
    details: HashMap<u64, Movie>,
    broken_ids: HashSet<u64>,
    /// Every call made, in order (`discover:1`, `search:iron:2`, `details:1726`).
    pub calls: RefCell<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discover(mut self, page: MoviePage) -> Self {
        self.discover.insert(page.page, page);
        self
    }

    pub fn with_search(mut self, query: &str, page: MoviePage) -> Self {
        self.search.insert((String::from(query), page.page), page);
        self
    }

    pub fn with_details(mut self, ids: &[u64]) -> Self {
        for id in ids {
            self.details.insert(*id, movie(*id));
        }
        self
    }

    pub fn with_broken_id(mut self, id: u64) -> Self {
        self.broken_ids.insert(id);
        self
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl LocalCatalogApi for FakeCatalog {
    async fn discover_movies(&self, page: u32) -> Result<MoviePage, CatalogError> {
        self.record(format!("discover:{page}"));
        self.discover
            .get(&page)
            .cloned()
            .ok_or_else(|| CatalogError::transport(format!("no discover page {page}")))
    }

    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError> {
        self.record(format!("search:{query}:{page}"));
        self.search
            .get(&(String::from(query), page))
            .cloned()
            .ok_or_else(|| CatalogError::transport(format!("no search page {query}/{page}")))
    }

    async fn movie_details(&self, id: u64) -> Result<Movie, CatalogError> {
        self.record(format!("details:{id}"));
        if self.broken_ids.contains(&id) {
            return Err(CatalogError::transport(format!("details {id} unavailable")));
        }
        self.details
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound { id })
    }
}
