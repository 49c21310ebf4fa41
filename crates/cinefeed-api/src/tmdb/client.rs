//! `TmdbClient` - TMDB API client implementation.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::LocalCatalogApi;
use super::error::CatalogError;
use super::rate_limiter::{TmdbRateLimiter, wait_turn};
use super::types::{Movie, MoviePage, TmdbErrorResponse};

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default response language.
const DEFAULT_LANGUAGE: &str = "pt-BR";

/// TMDB `status_code` for a missing resource.
const TMDB_NOT_FOUND_CODE: u32 = 34;

/// TMDB API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Bearer API token.
    api_token: String,
    /// Response language sent with every request.
    language: String,
    /// Rate limiter shared by concurrent requests.
    rate_limiter: Mutex<TmdbRateLimiter>,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    api_token: Option<String>,
    user_agent: Option<String>,
    language: Option<String>,
    min_interval: Option<Duration>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_token: None,
            user_agent: None,
            language: None,
            min_interval: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API bearer token (required).
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the response language (default: "pt-BR").
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the minimum request interval (default: 25ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Configuration` if
    /// - `api_token` is not set or blank,
    /// - `user_agent` is not set,
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient, CatalogError> {
        let api_token = self
            .api_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| CatalogError::Configuration(String::from("api_token is required")))?;
        let user_agent = self
            .user_agent
            .ok_or_else(|| CatalogError::Configuration(String::from("user_agent is required")))?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| {
                CatalogError::Configuration(format!("invalid default base URL: {e}"))
            })?,
        };

        let rate_limiter = self
            .min_interval
            .map_or_else(TmdbRateLimiter::default_interval, TmdbRateLimiter::new);

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .map_err(|e| CatalogError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(TmdbClient {
            http_client,
            base_url,
            api_token,
            language: self
                .language
                .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE)),
            rate_limiter: Mutex::new(rate_limiter),
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Response language sent with every request.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Sends a GET request with Bearer auth, language, query params, and rate limiting.
    #[instrument(skip_all, fields(path = path))]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        wait_turn(&self.rate_limiter).await;

        let url = self
            .base_url
            .join(path)
            .map_err(|e| CatalogError::transport(format!("failed to join URL path {path}: {e}")))?;

        let request = self
            .http_client
            .get(url)
            .bearer_auth(&self.api_token)
            .query(&[("language", self.language.as_str())])
            .query(query)
            .build()
            .map_err(|e| CatalogError::transport(format!("failed to build request {path}: {e}")))?;

        tracing::debug!(url = %request.url(), "TMDB API request");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| CatalogError::transport(format!("request failed {path}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::transport(format!("failed to read body {path}: {e}")))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| CatalogError::transport(format!("failed to decode JSON {path}: {e}")))
    }
}

/// Maps a non-success response onto `CatalogError::Transport`.
///
/// A TMDB `status_code` of 34 is reported as HTTP 404 regardless of the
/// actual status so `movie_details` can turn it into `NotFound`.
fn status_error(status: StatusCode, body: &str) -> CatalogError {
    let parsed = serde_json::from_str::<TmdbErrorResponse>(body).ok();
    let message = parsed.as_ref().map_or_else(
        || format!("TMDB API error (HTTP {status}): {body}"),
        |err| {
            format!(
                "TMDB API error (HTTP {status}): code={}, message={}",
                err.status_code, err.status_message
            )
        },
    );
    let not_found = parsed
        .as_ref()
        .is_some_and(|err| err.status_code == TMDB_NOT_FOUND_CODE);
    let reported = if not_found {
        StatusCode::NOT_FOUND
    } else {
        status
    };
    CatalogError::Transport {
        status: Some(reported.as_u16()),
        message,
    }
}

impl LocalCatalogApi for TmdbClient {
    #[instrument(skip_all, fields(page = page))]
    async fn discover_movies(&self, page: u32) -> Result<MoviePage, CatalogError> {
        let query = [("page", page.to_string())];
        self.get_json("discover/movie", &query).await
    }

    #[instrument(skip_all, fields(page = page))]
    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError> {
        let params = [("query", String::from(query)), ("page", page.to_string())];
        self.get_json("search/movie", &params).await
    }

    #[instrument(skip_all, fields(id = id))]
    async fn movie_details(&self, id: u64) -> Result<Movie, CatalogError> {
        let path = format!("movie/{id}");
        match self.get_json(&path, &[]).await {
            Err(CatalogError::Transport {
                status: Some(404), ..
            }) => Err(CatalogError::NotFound { id }),
            other => other,
        }
    }
}
