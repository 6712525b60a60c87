use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove '{path}': {source}")]
    Remove {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move '{from}' to '{to}': {source}")]
    Move {
        from:   PathBuf,
        to:     PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy '{from}' to '{to}': {source}")]
    Copy {
        from:   PathBuf,
        to:     PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read metadata of '{path}': {source}")]
    Metadata {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid mode '{0}': expected octal digits such as 0644")]
    InvalidMode(String),

    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("unknown group '{0}'")]
    UnknownGroup(String),

    #[error("failed to look up '{name}': {source}")]
    Lookup {
        name:   String,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("failed to set mode {mode:o} on '{path}': {source}")]
    SetMode {
        path:   PathBuf,
        mode:   u32,
        #[source]
        source: io::Error,
    },

    #[error("failed to change ownership of '{path}': {source}")]
    Chown {
        path:   PathBuf,
        #[source]
        source: nix::errno::Errno,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
