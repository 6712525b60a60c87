use std::path::Path;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::{FetchError, Result};
use crate::http::HttpClient;

/// Streams a single URL into a caller-owned file.
///
/// The fetcher never creates or removes files on its own; the caller decides
/// where bytes are staged and cleans up on failure.
#[derive(Debug)]
pub struct Fetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self { Self { client } }

    pub fn client(&self) -> &C { &self.client }

    /// Download `url` into `staging`, truncating it first.
    ///
    /// Any status other than 200 is rejected before the body is read.
    /// Returns the number of bytes written.
    pub async fn fetch_to(&self, url: &str, staging: &Path) -> Result<u64> {
        tracing::debug!(url, staging = %staging.display(), "connecting");
        let response = self.client.get(url).await.map_err(|e| FetchError::Request {
            url:    url.to_string(),
            source: Box::new(e),
        })?;

        if !response.is_ok() {
            return Err(FetchError::Status {
                url:    url.to_string(),
                status: response.status,
                reason: response.reason,
            });
        }

        let write_err = |e| FetchError::Write {
            path:   staging.to_path_buf(),
            source: e,
        };
        let mut file = tokio::fs::File::create(staging).await.map_err(write_err)?;
        let mut body = response.body;
        let mut bytes_downloaded = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| FetchError::Body {
                url:    url.to_string(),
                source: Box::new(e),
            })?;
            file.write_all(&chunk).await.map_err(write_err)?;
            bytes_downloaded += chunk.len() as u64;
            tracing::trace!(bytes_downloaded, "chunk written");
        }

        file.flush().await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        tracing::debug!(url, bytes_downloaded, "download complete");
        Ok(bytes_downloaded)
    }
}
