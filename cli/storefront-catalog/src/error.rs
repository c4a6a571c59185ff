//! Error handling for catalog API operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Common error type for catalog API operations.
///
/// Covers the three failure classes of the remote source: the request never
/// completed ([CatalogClientError::Transport]), the source answered with a
/// non-success status ([CatalogClientError::Status]), or the body did not
/// have the expected shape ([CatalogClientError::Decode]).
#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("invalid catalog url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to '{url}' failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{url}' responded with {status}")]
    Status { url: String, status: StatusCode },
    #[error("unexpected response from '{url}'")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("product with id {0} does not exist")]
    NotFound(u64),
    #[error("{0}")]
    Other(String),
}

impl CatalogClientError {
    /// The HTTP status of the response that caused this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CatalogClientError::Status { status, .. } => Some(*status),
            CatalogClientError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            CatalogClientError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }
}
