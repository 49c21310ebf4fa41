//! `CatalogApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::CatalogError;
use super::types::{Movie, MoviePage};

/// Movie catalog trait.
///
/// The pager and the spotlight resolver only talk to the catalog through
/// this trait, so tests substitute an in-memory catalog.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Fetches one page of the discover (browse) listing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Transport` if the HTTP request, status, or JSON parsing fails.
    async fn discover_movies(&self, page: u32) -> Result<MoviePage, CatalogError>;

    /// Fetches one page of search results for `query`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Transport` if the HTTP request, status, or JSON parsing fails.
    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError>;

    /// Fetches a single movie by its TMDB id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the id does not exist, or
    /// `CatalogError::Transport` for any other failure.
    async fn movie_details(&self, id: u64) -> Result<Movie, CatalogError>;
}
