//! Error types for the ChatNoir front end

use thiserror::Error;

/// Crate result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the search backend
#[derive(Debug, Error)]
pub enum Error {
    /// Dev-mode bootstrap could not obtain a CSRF cookie
    #[error("Failed to retrieve CSRF token. {0}")]
    Csrf(#[source] Box<Error>),

    /// Token issuance failed or returned an unusable body
    #[error("Invalid state returned. {0}")]
    InvalidState(#[source] Box<Error>),

    /// Search request failed
    #[error("Search request failed. {0}")]
    Search(#[source] Box<Error>),

    /// Transport level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn csrf(source: Error) -> Self {
        Self::Csrf(Box::new(source))
    }

    pub(crate) fn invalid_state(source: Error) -> Self {
        Self::InvalidState(Box::new(source))
    }

    pub(crate) fn search(source: Error) -> Self {
        Self::Search(Box::new(source))
    }

    /// HTTP status code carried by this error or any wrapped error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Csrf(inner) | Self::InvalidState(inner) | Self::Search(inner) => inner.status(),
            _ => None,
        }
    }

    /// Whether the failure was a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout(),
            Self::Csrf(inner) | Self::InvalidState(inner) | Self::Search(inner) => {
                inner.is_timeout()
            }
            _ => false,
        }
    }
}
