use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::{ArchiveReport, apply_mode, create_parent, open_source, write_entry};
use crate::error::{Error, Result};
use crate::format::{ArchiveFormat, Decoder, sniff_tar_compress};
use crate::sanitize::{sanitize_path, sanitize_symlink_target};

const FORMAT: ArchiveFormat = ArchiveFormat::Tar;

/// Open a tar archive, transparently decoding gzip, bzip2 or xz outer compression.
fn open(source: &Path) -> Result<tar::Archive<Decoder<BufReader<File>>>> {
    let mut file = open_source(source)?;
    let codec = sniff_tar_compress(&mut file)?;
    tracing::trace!(?codec, "tar compression detected");
    Ok(tar::Archive::new(codec.decoder(BufReader::new(file))))
}

pub(super) fn extract_all(source: &Path, destination: &Path) -> Result<ArchiveReport> {
    let mut archive = open(source)?;
    let mut report = ArchiveReport::default();

    for entry in archive.entries().map_err(|e| Error::corrupted(FORMAT, e))? {
        let mut entry = entry.map_err(|e| Error::corrupted(FORMAT, e))?;
        let raw_path = entry.path().map_err(|_| Error::InvalidPath)?.into_owned();
        let resolved = sanitize_path(&raw_path, destination)?;
        let entry_type = entry.header().entry_type();
        let mode = entry.header().mode().ok();

        let size = if entry_type.is_dir() {
            std::fs::create_dir_all(&resolved).map_err(|e| {
                Error::DirectoryCreationFailed {
                    path:   resolved.clone(),
                    source: e,
                }
            })?;
            0
        } else if entry_type.is_symlink() {
            let target = link_target(&entry)?;
            let target = sanitize_symlink_target(&target, &resolved, destination)?;
            create_symlink(&target, &resolved)?;
            0
        } else if entry_type.is_hard_link() {
            let target = link_target(&entry)?;
            let existing = sanitize_path(&target, destination)?;
            create_parent(&resolved)?;
            remove_existing(&resolved)?;
            std::fs::copy(&existing, &resolved).map_err(|e| {
                Error::ExtractionFailed {
                    path:   resolved.clone(),
                    source: e,
                }
            })?
        } else if entry_type.is_file() || entry_type.is_contiguous() {
            let size = write_entry(FORMAT, &mut entry, &resolved)?;
            apply_mode(&resolved, mode)?;
            size
        } else {
            tracing::debug!(path = %raw_path.display(), ?entry_type, "skipping special tar entry");
            continue;
        };

        report.record(size);
    }

    Ok(report)
}

pub(super) fn extract_first(source: &Path, destination: &Path) -> Result<ArchiveReport> {
    let mut archive = open(source)?;
    let mut entries = archive.entries().map_err(|e| Error::corrupted(FORMAT, e))?;

    let mut first = entries
        .next()
        .ok_or(Error::EmptyArchive { format: FORMAT })?
        .map_err(|e| Error::corrupted(FORMAT, e))?;
    let original_path = first.path().map_err(|_| Error::InvalidPath)?.into_owned();
    let entry_type = first.header().entry_type();
    if !(entry_type.is_file() || entry_type.is_contiguous()) {
        return Err(Error::NotAFile {
            format: FORMAT,
            entry:  original_path,
        });
    }

    let size = write_entry(FORMAT, &mut first, destination)?;
    drop(first);

    if let Some(Ok(_)) = entries.next() {
        tracing::warn!(
            source = %source.display(),
            "tar archive has more than one entry; extracted only the first"
        );
    }

    let mut report = ArchiveReport::default();
    report.record(size);
    Ok(report)
}

fn link_target<R: std::io::Read>(entry: &tar::Entry<'_, R>) -> Result<PathBuf> {
    entry
        .link_name()
        .map_err(|_| Error::InvalidPath)?
        .map(|p| p.into_owned())
        .ok_or(Error::InvalidPath)
}

fn remove_existing(path: &Path) -> Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path)?,
        Ok(_) => std::fs::remove_file(path)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    create_parent(link)?;
    remove_existing(link)?;
    std::os::unix::fs::symlink(target, link).map_err(|e| Error::ExtractionFailed {
        path:   link.to_path_buf(),
        source: e,
    })
}

#[cfg(not(unix))]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    tracing::warn!(
        link = %link.display(),
        target = %target.display(),
        "symlinks are not supported on this platform; skipping"
    );
    Ok(())
}
