//! TMDB movie response types.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Base URL for poster images (w500 rendition).
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Base URL for backdrop images (w780 rendition).
pub const BACKDROP_BASE_URL: &str = "https://image.tmdb.org/t/p/w780";

/// Vote average above which a movie is flagged as highly rated.
pub const HIGHLY_RATED_THRESHOLD: f64 = 7.5;

// --- Movie ---

/// A single catalog entry.
///
/// The same shape is returned by `discover/movie`, `search/movie` and
/// `movie/{id}`; fields only present on the details endpoint are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Movie {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Synopsis (empty when TMDB has none).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub overview: String,
    /// Poster image path fragment.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path fragment.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Rating average (0.0-10.0).
    #[serde(default)]
    pub vote_average: f64,
    /// Number of votes.
    #[serde(default)]
    pub vote_count: u32,
    /// Release date. TMDB sends `""` for unknown dates.
    #[serde(default, deserialize_with = "optional_date")]
    pub release_date: Option<NaiveDate>,
}

impl Movie {
    /// Full poster URL, if the movie has a poster.
    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| format!("{POSTER_BASE_URL}{path}"))
    }

    /// Full backdrop URL, if the movie has a backdrop.
    #[must_use]
    pub fn backdrop_url(&self) -> Option<String> {
        self.backdrop_path
            .as_deref()
            .map(|path| format!("{BACKDROP_BASE_URL}{path}"))
    }

    /// Release year, if known.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|d| d.year())
    }

    /// Whether the rating is above `HIGHLY_RATED_THRESHOLD`.
    #[must_use]
    pub fn is_highly_rated(&self) -> bool {
        self.vote_average > HIGHLY_RATED_THRESHOLD
    }

    /// Rating as a rounded percentage (7.45 -> 75).
    #[must_use]
    #[allow(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn rating_percent(&self) -> u8 {
        (self.vote_average.clamp(0.0, 10.0) * 10.0).round() as u8
    }
}

/// Treats a JSON `null` string as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses `YYYY-MM-DD`; `null`, `""` and unparseable values become `None`.
fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

// --- Paged listing ---

/// One page of `discover/movie` or `search/movie` results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoviePage {
    /// Current page number (1-based).
    pub page: u32,
    /// Movies on this page, in API order.
    pub results: Vec<Movie>,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code (34 = resource not found).
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
    /// Success flag (always false for errors).
    #[serde(default)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn movie_json(release_date: &str) -> String {
        format!(
            r#"{{"id":1726,"title":"Iron Man","overview":null,"poster_path":"/p.jpg","backdrop_path":null,"vote_average":7.64,"vote_count":26000,"release_date":{release_date}}}"#
        )
    }

    #[test]
    fn test_movie_parses_release_date() {
        // Arrange
        let json = movie_json(r#""2008-04-30""#);

        // Act
        let movie: Movie = serde_json::from_str(&json).unwrap();

        // Assert
        assert_eq!(movie.release_date, NaiveDate::from_ymd_opt(2008, 4, 30));
        assert_eq!(movie.release_year(), Some(2008));
        assert!(movie.overview.is_empty());
    }

    #[test]
    fn test_movie_empty_release_date_is_none() {
        // Arrange
        let json = movie_json(r#""""#);

        // Act
        let movie: Movie = serde_json::from_str(&json).unwrap();

        // Assert
        assert!(movie.release_date.is_none());
        assert!(movie.release_year().is_none());
    }

    #[test]
    fn test_movie_null_release_date_is_none() {
        // Arrange
        let json = movie_json("null");

        // Act
        let movie: Movie = serde_json::from_str(&json).unwrap();

        // Assert
        assert!(movie.release_date.is_none());
    }

    #[test]
    fn test_movie_image_urls() {
        // Arrange
        let movie: Movie = serde_json::from_str(&movie_json("null")).unwrap();

        // Act & Assert
        assert_eq!(
            movie.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/p.jpg")
        );
        assert!(movie.backdrop_url().is_none());
    }

    #[test]
    fn test_movie_rating_helpers() {
        // Arrange
        let movie: Movie = serde_json::from_str(&movie_json("null")).unwrap();

        // Act & Assert
        assert!(movie.is_highly_rated());
        assert_eq!(movie.rating_percent(), 76);
    }

    #[test]
    fn test_movie_missing_id_fails() {
        // Arrange
        let json = r#"{"title":"No id"}"#;

        // Act
        let result: Result<Movie, _> = serde_json::from_str(json);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_discover_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/discover_page1.json");

        // Act
        let page: MoviePage = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.results.len(), 4);
        assert_eq!(page.results[0].id, 950_396);
    }
}
