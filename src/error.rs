// src/error.rs
// =============================================================================
// Error types for fetching pages/files and writing them to disk.
//
// Two kinds of things can go wrong:
// - FetchError: the network side (bad URL, connection, timeout, HTTP status)
// - WriteError: the filesystem side (create, write, flush)
//
// Inside the download pool both are turned into a plain Failure message for
// the one task they belong to. Only a failed page fetch (or an output
// directory we can't create) stops the whole run.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Something went wrong talking to the server.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The shared HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The locator could not be parsed as an absolute URL
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Connection, DNS, TLS or body read failure
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The per-request timeout fired
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The server answered with something other than 2xx
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    // Sorts a reqwest error into Timeout or Request
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Writing a downloaded file (or creating its directory) failed.
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Why a single download task failed.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
