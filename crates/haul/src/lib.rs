//! Idempotent download, verify, extract and place.
//!
//! # Architecture
//!
//! - `config` - Layered request configuration and validation
//! - `decide` - Whether a run needs to touch the network at all
//! - `pipeline` - Staged fetch, verification, extraction and placement
//! - `report` - The JSON result of a run
//! - `logging` - Subscriber setup for the binary
//!
//! [`execute`] ties them together: decide, run the pipeline if needed, then
//! apply file attributes regardless of whether anything was downloaded.

pub mod config;
pub mod decide;
pub mod logging;
pub mod pipeline;
pub mod report;

mod error;

pub use config::{DownloadRequest, RawRequest};
pub use decide::{Decision, Existing};
pub use error::{Error, Failure, Result};
pub use pipeline::{Pipeline, RunOutcome};
pub use report::Report;

use haul_fetch::HttpClient;

/// Run one request to completion.
///
/// On failure the partial report (for instance `changed` and `size` when
/// only attribute application failed) is returned inside the [`Failure`].
pub async fn execute<C: HttpClient>(
    pipeline: &Pipeline<C>,
    request: &DownloadRequest,
) -> std::result::Result<Report, Failure> {
    let mut report = Report::for_request(request);
    match run(pipeline, request, &mut report).await {
        Ok(()) => Ok(report),
        Err(error) => Err(Failure::new(error, report)),
    }
}

async fn run<C: HttpClient>(
    pipeline: &Pipeline<C>,
    request: &DownloadRequest,
    report: &mut Report,
) -> Result<()> {
    let destination = request.destination.clone();
    let checksum = request.checksum.clone();
    let force = request.force;
    let decision = pipeline::blocking(&request.destination, move || {
        decide::decide(&destination, force, checksum.as_ref())
    })
    .await?;

    if decision.must_download() {
        let outcome = pipeline.run(request).await?;
        report.changed = true;
        report.size = Some(outcome.size);
        if outcome.decompressed {
            report.decompressed = Some(true);
        }
    } else {
        tracing::info!(destination = %request.destination.display(), "up to date");
    }

    let is_dir = Existing::probe(&request.destination)? == Existing::Directory;
    let attributes = request.attributes(is_dir);
    let destination = request.destination.clone();
    let changed = pipeline::blocking(&request.destination, move || {
        haul_fs::apply_attributes(&destination, &attributes).map_err(Error::Attributes)
    })
    .await?;
    if changed {
        tracing::info!(destination = %request.destination.display(), "attributes updated");
        report.changed = true;
    }

    Ok(())
}
