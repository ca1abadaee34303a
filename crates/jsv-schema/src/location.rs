//! # Location Classification
//!
//! A reference string is either a remote HTTP(S) address or a local
//! filesystem path. The decision is structural: a string is remote if and
//! only if it starts with `http://` or `https://` (case-sensitive). There is
//! no DNS lookup and no existence check.
//!
//! Strings are classified once, at the boundary where they enter the
//! system, and carried as a [`Location`] afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// Where a schema document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// An HTTP or HTTPS URL.
    Remote {
        /// The URL exactly as it was supplied.
        url: String,
    },
    /// A filesystem path, possibly relative.
    Local {
        /// The path as it was supplied.
        path: PathBuf,
    },
}

impl Location {
    /// Classify a reference or base string.
    pub fn classify(uri_or_path: &str) -> Self {
        if is_remote(uri_or_path) {
            Location::Remote {
                url: uri_or_path.to_string(),
            }
        } else {
            Location::Local {
                path: PathBuf::from(uri_or_path),
            }
        }
    }

    /// Returns true for [`Location::Remote`].
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Remote { .. })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Remote { url } => f.write_str(url),
            Location::Local { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Anchored, case-sensitive scheme check.
pub fn is_remote(uri_or_path: &str) -> bool {
    uri_or_path.starts_with(HTTP_PREFIX) || uri_or_path.starts_with(HTTPS_PREFIX)
}

/// The root against which relative references of one file are resolved.
///
/// Set once per validated file and never changed during its validation.
/// Local bases are made absolute against the working directory at
/// construction; remote bases always end in `/` so that a relative
/// reference lands inside the base rather than replacing its last segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirectory {
    location: Location,
}

impl BaseDirectory {
    /// Classify `raw` and normalize it into a base directory.
    pub fn new(raw: &str) -> Self {
        match Location::classify(raw) {
            Location::Remote { url } => Self::remote(url),
            Location::Local { path } => Self::local(path),
        }
    }

    /// A local base directory.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = if path.is_absolute() {
            path
        } else {
            match std::env::current_dir() {
                Ok(cwd) => cwd.join(path),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "cannot read working directory; keeping relative base"
                    );
                    path
                }
            }
        };
        Self {
            location: Location::Local { path },
        }
    }

    /// The current working directory, used when no root is given.
    pub fn current_dir() -> Self {
        Self::local(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    fn remote(mut url: String) -> Self {
        if !url.ends_with('/') {
            url.push('/');
        }
        Self {
            location: Location::Remote { url },
        }
    }

    /// The underlying location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Returns true when the base is an HTTP(S) URL.
    pub fn is_remote(&self) -> bool {
        self.location.is_remote()
    }

    /// The local directory, if this base is local.
    pub fn as_path(&self) -> Option<&Path> {
        match &self.location {
            Location::Local { path } => Some(path),
            Location::Remote { .. } => None,
        }
    }

    /// The base URL, if this base is remote.
    pub fn as_url(&self) -> Option<&str> {
        match &self.location {
            Location::Remote { url } => Some(url),
            Location::Local { .. } => None,
        }
    }

    /// The base as an absolute URL ending in `/`: `file://` for a local
    /// directory, the base itself for a remote one. `None` when a local
    /// base could not be made absolute or a remote one does not parse.
    pub fn to_url(&self) -> Option<Url> {
        match &self.location {
            Location::Remote { url } => Url::parse(url).ok(),
            Location::Local { path } => Url::from_directory_path(path).ok(),
        }
    }
}

impl fmt::Display for BaseDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.location.fmt(f)
    }
}
