//! # Fetch Errors
//!
//! Failures raised while retrieving a schema document. The fetcher never
//! retries or recovers; every error is handed back to the caller, which
//! reports it on the owning file.

use thiserror::Error;

/// Error while retrieving or parsing a schema document.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The remote origin answered with a status code of 400 or above.
    #[error("Loading error: {status} ({uri})")]
    Loading {
        /// Requested URL.
        uri: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request never produced a response.
    #[error("HTTP error fetching {uri}: {source}")]
    Http {
        /// Requested URL.
        uri: String,
        /// Transport failure.
        source: reqwest::Error,
    },

    /// A local schema file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Resolved filesystem path.
        path: String,
        /// Underlying IO failure.
        source: std::io::Error,
    },

    /// The document is not valid JSON.
    #[error("invalid JSON in {origin}: {source}")]
    Parse {
        /// URL or path the text came from.
        origin: String,
        /// Parser failure.
        source: serde_json::Error,
    },

    /// A remote reference or base is not a usable URL.
    #[error("invalid URL '{uri}': {reason}")]
    InvalidUrl {
        /// Offending URL text.
        uri: String,
        /// Parser message.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl FetchError {
    /// HTTP status code for [`FetchError::Loading`].
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Loading { status, .. } => Some(*status),
            _ => None,
        }
    }
}
