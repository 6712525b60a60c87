//! Checksum computation and verification for downloaded artifacts.
//!
//! Digests are computed incrementally through a fixed buffer so artifacts of
//! any size hash in bounded memory. The algorithm set is closed; unknown names
//! are rejected when parsed, never at hashing time.
//!
//! # Example
//!
//! ```
//! use haul_verify::{digest_reader, ChecksumAlgorithm, Checksum};
//!
//! let actual = digest_reader(&b"hello"[..], ChecksumAlgorithm::Sha256).unwrap();
//! let expected = Checksum::new(
//!     ChecksumAlgorithm::Sha256,
//!     "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
//! )
//! .unwrap();
//! expected.verify_hex(&actual).unwrap();
//! ```

pub use self::algorithm::ChecksumAlgorithm;
pub use self::checksum::{Checksum, digest_file, digest_reader};
pub use self::error::{Result, VerificationError};
pub use self::hasher::{
    DigestHasher, Hasher, Md5Hasher, Sha1Hasher, Sha224Hasher, Sha256Hasher, Sha384Hasher,
    Sha512Hasher,
};

mod algorithm;
mod checksum;
mod error;
mod hasher;
