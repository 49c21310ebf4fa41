//! Catalog client library for cinefeed.
//!
//! Provides the TMDB movie catalog client and the `LocalCatalogApi` seam
//! the feed logic is written against.

/// TMDB API client.
pub mod tmdb;
