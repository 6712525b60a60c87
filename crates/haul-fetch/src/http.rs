use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Status line and body of a GET response.
///
/// The body is only read if the caller accepts the status.
pub struct FetchResponse<E> {
    pub status: u16,
    pub reason: String,
    pub body:   BoxStream<'static, std::result::Result<Bytes, E>>,
}

impl<E> FetchResponse<E> {
    pub fn is_ok(&self) -> bool { self.status == 200 }
}

impl<E> std::fmt::Debug for FetchResponse<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchResponse")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

/// Asynchronous HTTP client abstraction.
///
/// The pipeline only ever issues a single GET per run. Implementations handle
/// their own redirect following and timeouts.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - In-memory implementations for testing
pub trait HttpClient: Send + Sync {
    /// Error type for HTTP operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue a GET request and return the status line with a streaming body.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was received at all (DNS failure,
    /// refused connection, timeout). HTTP error statuses are not errors here.
    fn get(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<FetchResponse<Self::Error>, Self::Error>> + Send;
}

/// Transport settings for [`ReqwestClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub timeout:    Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout:    None,
            user_agent: concat!("haul/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use futures_util::StreamExt;

    use super::*;
    use crate::error::{FetchError, Result};

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone, Debug)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Create a new ReqwestClient with default configuration.
        pub fn new() -> Result<Self> { Self::with_config(&ClientConfig::default()) }

        pub fn with_config(config: &ClientConfig) -> Result<Self> {
            let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
            if let Some(timeout) = config.timeout {
                builder = builder.timeout(timeout);
            }
            let client = builder.build().map_err(FetchError::ClientBuild)?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get(
            &self,
            url: &str,
        ) -> std::result::Result<FetchResponse<Self::Error>, Self::Error> {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            Ok(FetchResponse {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body:   Box::pin(response.bytes_stream().map(|chunk| chunk.map(Bytes::from))),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
