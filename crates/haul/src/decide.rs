use std::io;
use std::path::Path;

use haul_verify::{Checksum, digest_file};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The destination already satisfies the request.
    Skip,
    MustDownload,
}

impl Decision {
    pub fn must_download(self) -> bool { self == Decision::MustDownload }
}

/// What the decider knows about the destination before any network access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Existing {
    Absent,
    File,
    Directory,
}

impl Existing {
    /// Follows symlinks, so a dangling link counts as absent.
    pub fn probe(path: &Path) -> Result<Self> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(Existing::Directory),
            Ok(_) => Ok(Existing::File),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Existing::Absent),
            Err(e) => Err(Error::io(path, e)),
        }
    }
}

/// Pure decision core. `digest` is only called when a comparison is needed.
pub fn decide_with(
    existing: Existing,
    force: bool,
    expected: Option<&Checksum>,
    digest: impl FnOnce(&Checksum) -> Result<String>,
) -> Result<Decision> {
    if force || existing == Existing::Absent {
        return Ok(Decision::MustDownload);
    }
    let Some(expected) = expected else {
        return Ok(Decision::Skip);
    };
    if existing == Existing::Directory {
        return Ok(Decision::MustDownload);
    }

    let actual = digest(expected)?;
    if expected.matches(&actual) {
        Ok(Decision::Skip)
    } else {
        tracing::debug!(expected = expected.expected(), actual = %actual, "destination digest differs");
        Ok(Decision::MustDownload)
    }
}

/// Decide by inspecting `destination` on disk.
pub fn decide(destination: &Path, force: bool, expected: Option<&Checksum>) -> Result<Decision> {
    let existing = Existing::probe(destination)?;
    let decision = decide_with(existing, force, expected, |checksum| {
        digest_file(destination, checksum.algorithm()).map_err(|e| Error::io(destination, e))
    })?;
    tracing::debug!(destination = %destination.display(), ?existing, force, ?decision, "decided");
    Ok(decision)
}
