use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::format::ArchiveFormat;

mod stream;
mod tar;
mod zip;

const DEFAULT_PAYLOAD_NAME: &str = "download";

/// Where extracted output goes.
#[derive(Clone, Copy, Debug)]
pub enum Target<'a> {
    /// Write the single logical payload to this file path.
    File(&'a Path),
    /// Expand entries beneath this existing directory.
    Directory(&'a Path),
}

/// Totals for one extraction.
#[derive(Clone, Debug, Default)]
pub struct ArchiveReport {
    pub entry_count: usize,
    pub total_bytes: u64,
}

impl ArchiveReport {
    fn record(&mut self, size: u64) {
        self.entry_count += 1;
        self.total_bytes += size;
    }
}

/// Extracts one artifact of a known format into a [`Target`].
///
/// The extractor never touches anything outside the target, so callers point
/// it at a scratch location and promote the result only on success.
#[derive(Clone, Debug)]
pub struct Extractor {
    format:       ArchiveFormat,
    payload_name: Option<String>,
}

impl Extractor {
    pub fn new(format: ArchiveFormat) -> Self {
        Self {
            format,
            payload_name: None,
        }
    }

    /// File name used when a single-stream format is extracted into a directory.
    pub fn payload_name(mut self, name: impl Into<String>) -> Self {
        self.payload_name = Some(name.into());
        self
    }

    pub fn extract(&self, source: &Path, target: Target<'_>) -> Result<ArchiveReport> {
        tracing::debug!(
            format = %self.format,
            source = %source.display(),
            ?target,
            "extracting"
        );
        match (self.format, target) {
            (ArchiveFormat::Zip, Target::Directory(dir)) => zip::extract_all(source, dir),
            (ArchiveFormat::Zip, Target::File(path)) => zip::extract_first(source, path),
            (ArchiveFormat::Tar, Target::Directory(dir)) => tar::extract_all(source, dir),
            (ArchiveFormat::Tar, Target::File(path)) => tar::extract_first(source, path),
            (ArchiveFormat::Gz, target) => stream::decompress(
                ArchiveFormat::Gz,
                source,
                &self.payload_path(target),
                flate2::read::MultiGzDecoder::new,
            ),
            (ArchiveFormat::Bz2, target) => stream::decompress(
                ArchiveFormat::Bz2,
                source,
                &self.payload_path(target),
                bzip2::read::MultiBzDecoder::new,
            ),
            (ArchiveFormat::Xz, target) => stream::decompress(
                ArchiveFormat::Xz,
                source,
                &self.payload_path(target),
                xz2::read::XzDecoder::new_multi_decoder,
            ),
        }
    }

    /// Single-stream formats always produce one file, even for a directory target.
    fn payload_path(&self, target: Target<'_>) -> PathBuf {
        match target {
            Target::File(path) => path.to_path_buf(),
            Target::Directory(dir) => {
                dir.join(self.payload_name.as_deref().unwrap_or(DEFAULT_PAYLOAD_NAME))
            }
        }
    }
}

pub(crate) fn open_source(source: &Path) -> Result<File> {
    File::open(source).map_err(|e| Error::ExtractionFailed {
        path:   source.to_path_buf(),
        source: e,
    })
}

pub(crate) fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreationFailed {
            path:   parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Stream `reader` into a new file at `path`.
///
/// Read failures mean the archive data is bad and surface as [`Error::Corrupted`];
/// write failures surface as [`Error::ExtractionFailed`].
pub(crate) fn write_entry<R: Read>(
    format: ArchiveFormat,
    reader: &mut R,
    path: &Path,
) -> Result<u64> {
    create_parent(path)?;
    let write_err = |e: io::Error| Error::ExtractionFailed {
        path:   path.to_path_buf(),
        source: e,
    };
    let mut out = File::create(path).map_err(write_err)?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::corrupted(format, e)),
        };
        out.write_all(&buf[..n]).map_err(write_err)?;
        written += n as u64;
    }
    out.flush().map_err(write_err)?;
    Ok(written)
}

#[cfg(unix)]
pub(crate) fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode {
        // Keep the owner able to read and replace what we extract.
        let mode = (mode & 0o7777) | 0o600;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> { Ok(()) }
