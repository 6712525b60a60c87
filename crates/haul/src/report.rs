use std::path::{Path, PathBuf};

use haul_verify::ChecksumAlgorithm;
use serde::Serialize;

use crate::config::DownloadRequest;
use crate::error::Error;

/// Result of one run, printed as a single JSON object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub changed: bool,
    pub src:     String,
    pub dest:    PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum:           Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum_algorithm: Option<ChecksumAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decompressed:       Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size:               Option<u64>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg:    Option<String>,
}

impl Report {
    pub fn new(src: impl Into<String>, dest: impl AsRef<Path>) -> Self {
        Self {
            src: src.into(),
            dest: dest.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Starting report for a request; echoes the expected checksum if any.
    pub fn for_request(request: &DownloadRequest) -> Self {
        let mut report = Self::new(request.source.as_str(), &request.destination);
        if let Some(checksum) = &request.checksum {
            report.checksum = Some(checksum.expected().to_string());
            report.checksum_algorithm = Some(checksum.algorithm());
        }
        report
    }

    pub fn failed(mut self, error: &Error) -> Self {
        self.failed = true;
        self.msg = Some(error.to_string());
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> { serde_json::to_string(self) }
}
