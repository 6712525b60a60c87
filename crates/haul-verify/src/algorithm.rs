use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VerificationError;
use crate::hasher::{
    Hasher, Md5Hasher, Sha1Hasher, Sha224Hasher, Sha256Hasher, Sha384Hasher, Sha512Hasher,
};

/// Closed set of supported checksum algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Md5,
    #[default]
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl ChecksumAlgorithm {
    pub const ALL: [ChecksumAlgorithm; 6] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Fresh hash state for this algorithm.
    pub fn hasher(self) -> Box<dyn Hasher> {
        match self {
            Self::Md5 => Box::new(Md5Hasher::new()),
            Self::Sha1 => Box::new(Sha1Hasher::new()),
            Self::Sha224 => Box::new(Sha224Hasher::new()),
            Self::Sha256 => Box::new(Sha256Hasher::new()),
            Self::Sha384 => Box::new(Sha384Hasher::new()),
            Self::Sha512 => Box::new(Sha512Hasher::new()),
        }
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ChecksumAlgorithm {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VerificationError::UnsupportedAlgorithm(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_sha1() {
        assert_eq!(ChecksumAlgorithm::default(), ChecksumAlgorithm::Sha1);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("SHA256".parse::<ChecksumAlgorithm>().unwrap(), ChecksumAlgorithm::Sha256);
        assert_eq!("md5".parse::<ChecksumAlgorithm>().unwrap(), ChecksumAlgorithm::Md5);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "blake3".parse::<ChecksumAlgorithm>().unwrap_err();
        assert!(matches!(err, VerificationError::UnsupportedAlgorithm(ref s) if s == "blake3"));
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for algorithm in ChecksumAlgorithm::ALL {
            assert_eq!(algorithm.to_string().parse::<ChecksumAlgorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn output_len_matches_hasher() {
        for algorithm in ChecksumAlgorithm::ALL {
            assert_eq!(algorithm.hasher().finalize().len(), algorithm.output_len());
        }
    }
}
