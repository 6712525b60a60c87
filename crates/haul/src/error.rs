use std::io;
use std::path::{Path, PathBuf};

use haul_verify::VerificationError;

use crate::report::Report;

/// Everything that can end a run.
///
/// No variant is retried; each aborts the run and is reported alongside
/// whatever result fields were already known (see [`Failure`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("failed to download file: {0}")]
    Transport(#[source] haul_fetch::FetchError),

    #[error("checksum verification failed. Expected: {expected}, Got: {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("could not determine compression format for {name}")]
    FormatUndetermined { name: String },

    #[error("decompression failed: {0}")]
    Extraction(#[source] haul_archive::Error),

    #[error("failed to place download: {0}")]
    Placement(#[source] haul_fs::Error),

    #[error("failed to apply file attributes: {0}")]
    Attributes(#[source] haul_fs::Error),

    #[error("I/O error at '{path}': {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map a failed check of the file at `path`.
    pub(crate) fn verification(path: &Path, e: VerificationError) -> Self {
        match e {
            VerificationError::Mismatch { expected, actual } => {
                Self::ChecksumMismatch { expected, actual }
            }
            VerificationError::Io(source) => Self::io(path, source),
            other => Self::io(path, io::Error::other(other)),
        }
    }
}

impl From<haul_archive::Error> for Error {
    fn from(e: haul_archive::Error) -> Self {
        match e {
            haul_archive::Error::FormatUndetermined { name } => Self::FormatUndetermined { name },
            other => Self::Extraction(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A failed run together with the partial report built before it failed.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct Failure {
    pub error:  Error,
    pub report: Report,
}

impl Failure {
    pub fn new(error: Error, report: Report) -> Self { Self { error, report } }

    /// The report with `failed` and `msg` filled in from the error.
    pub fn into_report(self) -> Report { self.report.failed(&self.error) }
}
