//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 movie endpoints
//! (discover, search, details) and maps failures onto `CatalogError`.

mod api;
mod client;
mod error;
mod rate_limiter;
mod types;

pub use api::{CatalogApi, LocalCatalogApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use error::CatalogError;
#[allow(clippy::module_name_repetitions)]
pub use types::{
    BACKDROP_BASE_URL, HIGHLY_RATED_THRESHOLD, Movie, MoviePage, POSTER_BASE_URL,
    TmdbErrorResponse,
};
