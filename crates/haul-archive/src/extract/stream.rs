use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::{ArchiveReport, open_source, write_entry};
use crate::error::Result;
use crate::format::ArchiveFormat;

/// Decompress a single-stream artifact into `destination` through `decoder`.
pub(super) fn decompress<D: Read>(
    format: ArchiveFormat,
    source: &Path,
    destination: &Path,
    decoder: impl FnOnce(BufReader<File>) -> D,
) -> Result<ArchiveReport> {
    let mut reader = decoder(BufReader::new(open_source(source)?));
    let size = write_entry(format, &mut reader, destination)?;

    let mut report = ArchiveReport::default();
    report.record(size);
    Ok(report)
}
