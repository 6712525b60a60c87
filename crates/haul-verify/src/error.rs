use std::io;

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("unsupported checksum algorithm '{0}' (expected one of md5, sha1, sha224, sha256, sha384, sha512)")]
    UnsupportedAlgorithm(String),

    #[error("checksum '{0}' is not a hex digest")]
    MalformedDigest(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VerificationError>;
