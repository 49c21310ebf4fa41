//! Catalog error taxonomy.

/// Errors produced by catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Network failure, non-success HTTP status, or undecodable payload.
    #[error("catalog request failed: {message}")]
    Transport {
        /// HTTP status, when the server answered.
        status: Option<u16>,
        /// Failure description.
        message: String,
    },
    /// The request was valid but no movie has this id.
    #[error("movie {id} not found")]
    NotFound {
        /// Requested TMDB movie id.
        id: u64,
    },
    /// The client cannot issue requests (e.g. missing API credential).
    #[error("catalog client misconfigured: {0}")]
    Configuration(String),
}

impl CatalogError {
    /// Builds a `Transport` error without an HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Returns `true` for errors that can never succeed on a retry.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
