//! Error types for haul-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} {reason} from '{url}'")]
    Status {
        url:    String,
        status: u16,
        reason: String,
    },

    #[error("request to '{url}' failed: {source}")]
    Request {
        url:    String,
        #[source]
        source: BoxError,
    },

    #[error("connection dropped while reading '{url}': {source}")]
    Body {
        url:    String,
        #[source]
        source: BoxError,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[cfg(feature = "reqwest")]
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;
