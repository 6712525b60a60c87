use std::io;
use std::path::PathBuf;

use crate::ArchiveFormat;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not determine compression format for '{name}'")]
    FormatUndetermined { name: String },

    #[error("{format} archive is corrupted: {reason}")]
    Corrupted {
        format: ArchiveFormat,
        reason: String,
    },

    #[error("{format} archive contains no entries")]
    EmptyArchive { format: ArchiveFormat },

    #[error("first entry '{entry}' of {format} archive is not a regular file")]
    NotAFile {
        format: ArchiveFormat,
        entry:  PathBuf,
    },

    #[error("zip-slip attack detected: entry '{entry}' resolves to '{resolved}'")]
    ZipSlip { entry: PathBuf, resolved: PathBuf },

    #[error("symlink target escapes base directory: '{target}' -> '{resolved}'")]
    SymlinkEscape { target: PathBuf, resolved: PathBuf },

    #[error("symlink target is absolute path: '{target}' in '{symlink}'")]
    AbsoluteSymlinkTarget { target: PathBuf, symlink: PathBuf },

    #[error("entry path is not valid")]
    InvalidPath,

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn corrupted(format: ArchiveFormat, reason: impl ToString) -> Self {
        Self::Corrupted {
            format,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
