use crate::{ArchiveFormat, Error, FormatHint, Result};

// Checked in order; `.tar.gz` must win over `.gz`.
const SUFFIXES: [(&str, ArchiveFormat); 7] = [
    (".zip", ArchiveFormat::Zip),
    (".tar.gz", ArchiveFormat::Tar),
    (".tgz", ArchiveFormat::Tar),
    (".tar", ArchiveFormat::Tar),
    (".gz", ArchiveFormat::Gz),
    (".bz2", ArchiveFormat::Bz2),
    (".xz", ArchiveFormat::Xz),
];

/// Infer the format from a file name's suffix.
pub fn infer_from_name(name: &str) -> Option<ArchiveFormat> {
    let lower = name.to_ascii_lowercase();
    SUFFIXES
        .iter()
        .find(|(suffix, _)| lower.ends_with(suffix))
        .map(|&(_, format)| format)
}

/// Resolve a hint to a concrete format, inferring from `name` when the hint is `auto`.
pub fn resolve_format(hint: FormatHint, name: &str) -> Result<ArchiveFormat> {
    match hint.explicit() {
        Some(format) => Ok(format),
        None => infer_from_name(name).ok_or_else(|| Error::FormatUndetermined {
            name: name.to_string(),
        }),
    }
}

/// Name of the payload left after stripping a single-stream compression suffix.
///
/// `data.csv.gz` becomes `data.csv`. Returns `None` when nothing would remain.
pub fn payload_name(name: &str, format: ArchiveFormat) -> Option<String> {
    let suffix = match format {
        ArchiveFormat::Gz => ".gz",
        ArchiveFormat::Bz2 => ".bz2",
        ArchiveFormat::Xz => ".xz",
        ArchiveFormat::Zip | ArchiveFormat::Tar => return None,
    };
    let stem = if name.to_ascii_lowercase().ends_with(suffix) {
        &name[..name.len() - suffix.len()]
    } else {
        name
    };
    (!stem.is_empty() && stem != "." && stem != "..").then(|| stem.to_string())
}
