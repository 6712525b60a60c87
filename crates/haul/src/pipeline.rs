use std::io;
use std::path::{Path, PathBuf};

use haul_archive::{ArchiveFormat, Extractor, Target, payload_name, resolve_format};
use haul_fetch::{Fetcher, HttpClient};
use tempfile::{TempDir, TempPath};
use tracing::Instrument;

use crate::config::DownloadRequest;
use crate::error::{Error, Result};

const STAGING_PREFIX: &str = "haul-download-";
const EXTRACT_PREFIX: &str = "haul-extract-";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Size of the destination after placement.
    pub size:         u64,
    pub decompressed: bool,
}

/// Fetch, verify, optionally extract, then place.
///
/// Every byte is written to a temporary in the staging root first; the
/// destination is only touched once all checks have passed. Temporaries are
/// removed before [`Pipeline::run`] returns, whatever the outcome.
#[derive(Debug)]
pub struct Pipeline<C: HttpClient> {
    fetcher:      Fetcher<C>,
    staging_root: PathBuf,
}

impl<C: HttpClient> Pipeline<C> {
    pub fn new(client: C) -> Self {
        Self {
            fetcher:      Fetcher::new(client),
            staging_root: std::env::temp_dir(),
        }
    }

    pub fn staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = root.into();
        self
    }

    pub fn client(&self) -> &C { self.fetcher.client() }

    pub async fn run(&self, request: &DownloadRequest) -> Result<RunOutcome> {
        let span = tracing::info_span!(
            "pipeline",
            source = %request.source,
            destination = %request.destination.display(),
        );
        self.run_staged(request).instrument(span).await
    }

    async fn run_staged(&self, request: &DownloadRequest) -> Result<RunOutcome> {
        // Fail before any network traffic if the format cannot be known.
        let format = if request.decompress {
            Some(resolve_format(request.format, request.source_name())?)
        } else {
            None
        };

        std::fs::create_dir_all(&self.staging_root)
            .map_err(|e| Error::io(&self.staging_root, e))?;
        let staged = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&self.staging_root)
            .map_err(|e| Error::io(&self.staging_root, e))?
            .into_temp_path();

        let result = self.fetch_verify_place(request, format, &staged).await;
        release_file(staged);
        result
    }

    async fn fetch_verify_place(
        &self,
        request: &DownloadRequest,
        format: Option<ArchiveFormat>,
        staged: &Path,
    ) -> Result<RunOutcome> {
        tracing::debug!(staged = %staged.display(), "fetching");
        let bytes_downloaded = self
            .fetcher
            .fetch_to(request.source.as_str(), staged)
            .await
            .map_err(Error::Transport)?;

        if let Some(checksum) = &request.checksum {
            let expected = checksum.clone();
            let path = staged.to_path_buf();
            blocking(staged, move || {
                expected.verify_file(&path).map_err(|e| Error::verification(&path, e))
            })
            .await?;
            tracing::debug!(algorithm = %checksum.algorithm(), "checksum verified");
        }

        match format {
            Some(format) => self.extract_and_place(request, format, staged).await?,
            None => {
                let from = staged.to_path_buf();
                let to = request.destination.clone();
                blocking(staged, move || haul_fs::replace_with(&from, &to).map_err(Error::Placement))
                    .await?;
            }
        }

        let size = std::fs::metadata(&request.destination)
            .map_err(|e| Error::io(&request.destination, e))?
            .len();
        tracing::info!(size, bytes_downloaded, decompressed = format.is_some(), "placed");

        Ok(RunOutcome {
            size,
            decompressed: format.is_some(),
        })
    }

    async fn extract_and_place(
        &self,
        request: &DownloadRequest,
        format: ArchiveFormat,
        staged: &Path,
    ) -> Result<()> {
        let mut extractor = Extractor::new(format);
        if let Some(name) = payload_name(request.source_name(), format) {
            extractor = extractor.payload_name(name);
        }
        let source = staged.to_path_buf();
        let destination = request.destination.clone();
        let scratch_err = |e| Error::io(&self.staging_root, e);

        if request.wants_directory() {
            let scratch = tempfile::Builder::new()
                .prefix(EXTRACT_PREFIX)
                .tempdir_in(&self.staging_root)
                .map_err(scratch_err)?;
            let tree = scratch.path().to_path_buf();
            let result = blocking(staged, move || {
                let report = extractor.extract(&source, Target::Directory(&tree))?;
                tracing::debug!(%format, entries = report.entry_count, bytes = report.total_bytes, "extracted");
                let placed = haul_fs::merge_dir(&tree, &destination).map_err(Error::Placement)?;
                tracing::debug!(entries = placed.len(), "merged into destination");
                Ok(())
            })
            .await;
            release_dir(scratch);
            result
        } else {
            let scratch = tempfile::Builder::new()
                .prefix(EXTRACT_PREFIX)
                .tempfile_in(&self.staging_root)
                .map_err(scratch_err)?
                .into_temp_path();
            let payload = scratch.to_path_buf();
            let result = blocking(staged, move || {
                let report = extractor.extract(&source, Target::File(&payload))?;
                tracing::debug!(%format, bytes = report.total_bytes, "extracted");
                haul_fs::replace_with(&payload, &destination).map_err(Error::Placement)
            })
            .await;
            release_file(scratch);
            result
        }
    }
}

/// Run filesystem-heavy work off the async workers, inside the current span.
pub(crate) async fn blocking<T, F>(context: &Path, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(work))
        .await
        .map_err(|e| Error::io(context, io::Error::other(e)))?
}

fn release_file(path: TempPath) {
    let shown = path.to_path_buf();
    if let Err(e) = path.close()
        && e.kind() != io::ErrorKind::NotFound
    {
        tracing::warn!(path = %shown.display(), error = %e, "failed to remove temporary file");
    }
}

fn release_dir(dir: TempDir) {
    let shown = dir.path().to_path_buf();
    if let Err(e) = dir.close()
        && e.kind() != io::ErrorKind::NotFound
    {
        tracing::warn!(path = %shown.display(), error = %e, "failed to remove temporary directory");
    }
}
