use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::{ChecksumAlgorithm, Result, VerificationError};

const BUFFER_SIZE: usize = 64 * 1024;

/// Digest a byte stream incrementally and return the lowercase hex digest.
///
/// Memory use is bounded by a fixed buffer regardless of stream length.
pub fn digest_reader<R: Read>(mut reader: R, algorithm: ChecksumAlgorithm) -> io::Result<String> {
    let mut hasher = algorithm.hasher();
    let mut buf = vec![0u8; BUFFER_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Digest the contents of a regular file.
pub fn digest_file(path: impl AsRef<Path>, algorithm: ChecksumAlgorithm) -> io::Result<String> {
    digest_reader(File::open(path)?, algorithm)
}

/// An expected digest paired with the algorithm that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checksum {
    algorithm: ChecksumAlgorithm,
    expected:  String,
}

impl Checksum {
    /// Validates that `expected` is hex of the right length; stores it lowercased.
    pub fn new(algorithm: ChecksumAlgorithm, expected: impl AsRef<str>) -> Result<Self> {
        let expected = expected.as_ref().trim().to_ascii_lowercase();
        let well_formed = expected.len() == algorithm.output_len() * 2
            && expected.bytes().all(|b| b.is_ascii_hexdigit());
        if !well_formed {
            return Err(VerificationError::MalformedDigest(expected));
        }
        Ok(Self {
            algorithm,
            expected,
        })
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm { self.algorithm }

    pub fn expected(&self) -> &str { &self.expected }

    pub fn matches(&self, actual: &str) -> bool { self.expected.eq_ignore_ascii_case(actual) }

    pub fn verify_hex(&self, actual: &str) -> Result<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(VerificationError::Mismatch {
                expected: self.expected.clone(),
                actual:   actual.to_ascii_lowercase(),
            })
        }
    }

    /// Digest `path` and compare. Returns the computed digest on success.
    pub fn verify_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let actual = digest_file(path, self.algorithm)?;
        self.verify_hex(&actual)?;
        Ok(actual)
    }
}
