//! Streaming HTTP fetch into staged files.
//!
//! # Architecture
//!
//! - `http` - [`HttpClient`] trait and the `reqwest`-backed [`ReqwestClient`]
//! - `fetcher` - [`Fetcher`], which streams one response body to disk
//!
//! The crate does no retrying, verification or placement; it only turns a URL
//! into bytes on disk or a [`FetchError`].

mod error;
mod fetcher;
mod http;

pub use error::{BoxError, FetchError, Result};
pub use fetcher::Fetcher;
pub use http::{BoxStream, ClientConfig, FetchResponse, HttpClient};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
