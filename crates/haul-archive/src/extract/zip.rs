use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::{ArchiveReport, apply_mode, open_source, write_entry};
use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::sanitize::sanitize_path;

const FORMAT: ArchiveFormat = ArchiveFormat::Zip;

fn open(source: &Path) -> Result<zip::ZipArchive<BufReader<std::fs::File>>> {
    let file = open_source(source)?;
    zip::ZipArchive::new(BufReader::new(file)).map_err(|e| Error::corrupted(FORMAT, e))
}

pub(super) fn extract_all(source: &Path, destination: &Path) -> Result<ArchiveReport> {
    let mut archive = open(source)?;
    let mut report = ArchiveReport::default();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| Error::corrupted(FORMAT, e))?;
        let raw_path = PathBuf::from(file.name());
        let resolved = sanitize_path(&raw_path, destination)?;

        if file.is_dir() {
            std::fs::create_dir_all(&resolved).map_err(|e| {
                Error::DirectoryCreationFailed {
                    path:   resolved.clone(),
                    source: e,
                }
            })?;
            report.record(0);
            continue;
        }

        let mode = file.unix_mode();
        let size = write_entry(FORMAT, &mut file, &resolved)?;
        apply_mode(&resolved, mode)?;

        report.record(size);
    }

    Ok(report)
}

pub(super) fn extract_first(source: &Path, destination: &Path) -> Result<ArchiveReport> {
    let mut archive = open(source)?;
    if archive.is_empty() {
        return Err(Error::EmptyArchive { format: FORMAT });
    }
    if archive.len() > 1 {
        tracing::warn!(
            entries = archive.len(),
            source = %source.display(),
            "zip archive has more than one entry; extracting only the first"
        );
    }

    let mut file = archive.by_index(0).map_err(|e| Error::corrupted(FORMAT, e))?;
    let original_path = PathBuf::from(file.name());
    if file.is_dir() {
        return Err(Error::NotAFile {
            format: FORMAT,
            entry:  original_path,
        });
    }

    let size = write_entry(FORMAT, &mut file, destination)?;
    let mut report = ArchiveReport::default();
    report.record(size);
    Ok(report)
}
